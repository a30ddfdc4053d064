//! Core component tree for slot-grid UIs.
//!
//! This crate renders a tree of composable rectangular components onto a
//! fixed grid of addressable cells and routes cell-level interaction events
//! back down that tree. The pieces, leaves first:
//!
//! - [`SlotGrid`]: an immutable 2-D reservation grid with dense reserved
//!   indices and sparse `(row, col)` positions.
//! - [`Component`]: the recurring unit of composition: bindings to child
//!   nodes, a cached last render, a changed-slot set, and the hook/lock
//!   ownership pair guaranteeing a node lives in at most one tree.
//! - the render pipeline: full and incremental ("smart") rendering with a
//!   per-pass child memoizer.
//! - the dispatch pipelines: ticks and before-render top-down, change marks
//!   and re-render requests bottom-up, clicks down the recorded bindings.
//!
//! The surrounding display, event, and scheduler infrastructure is out of
//! scope here; a driver feeds ticks and clicks in and pushes rendered arrays
//! out (see the `slotui-shell` crate). Cell values are opaque to the core:
//! they are only cloned, compared, and placed.
//!
//! Trees are single-threaded cooperative structures; handles are `!Send` by
//! construction and the core performs no locking.

pub mod collections;
pub mod essentials;

mod component;
mod dispatch;
mod grid;
mod render;

pub use component::{
    BindError, Component, ComponentBehavior, ComponentConfig, ComponentId, OverlapPolicy,
};
pub use grid::{GridError, Position, SlotGrid};

#[cfg(test)]
mod tests;
