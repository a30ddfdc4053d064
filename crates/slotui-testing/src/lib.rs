//! Testing utilities and harness for slotui.
//!
//! Mirrors what a headless display host would do, without a display: a
//! [`RecordingSurface`] that captures every open/apply/close and keeps the
//! current cell state, an [`EndpointHarness`] that drives an endpoint tick
//! by tick, and probe components whose callbacks record into shareable
//! [`CallLog`]s.

mod harness;
mod probes;
mod surface;

pub use harness::EndpointHarness;
pub use probes::{before_render_probe, click_probe, tick_probe, CallLog};
pub use surface::RecordingSurface;

pub mod prelude {
    pub use crate::harness::EndpointHarness;
    pub use crate::probes::{before_render_probe, click_probe, tick_probe, CallLog};
    pub use crate::surface::RecordingSurface;
}
