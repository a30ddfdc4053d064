//! Hashing seam for the crate's identity-keyed maps and sets.
//!
//! Component ids are small integers, so the default build uses the fast
//! non-cryptographic hasher; the `std-hash` feature swaps the standard
//! library maps back in.

#[cfg(feature = "std-hash")]
pub mod map {
    pub use std::collections::{HashMap, HashSet};
}

#[cfg(not(feature = "std-hash"))]
pub mod map {
    pub use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
}
