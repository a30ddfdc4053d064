//! Render-endpoint leaves: components with no children of their own.
//!
//! All three are static, non-incremental, tick-free nodes whose entire
//! output comes from the render fallback, so the render pipeline stops at
//! them without descending further.

use crate::component::{Component, ComponentConfig};
use crate::grid::SlotGrid;

fn leaf_config<T>(fallback: Option<T>) -> ComponentConfig<T> {
    let mut config = ComponentConfig::new();
    config.static_render = true;
    config.smart_render = false;
    config.component_tick = false;
    config.render_fallback = fallback;
    config
}

/// A 1x1 leaf displaying a single value.
pub fn value<T, E>(item: T) -> Component<T, E> {
    Component::new(SlotGrid::single(), leaf_config(Some(item)))
}

/// A leaf displaying the same value on every reserved cell of `grid`.
pub fn filled<T, E>(item: T, grid: SlotGrid) -> Component<T, E> {
    Component::new(grid, leaf_config(Some(item)))
}

/// A leaf whose cells all render empty.
pub fn empty<T, E>(grid: SlotGrid) -> Component<T, E> {
    Component::new(grid, leaf_config(None))
}
