//! Behavioral suite for the component tree.

mod composition;

use crate::{essentials, Component, ComponentConfig, SlotGrid};

pub(crate) type TestComponent = Component<u32, String>;

pub(crate) fn rect(height: usize, width: usize) -> SlotGrid {
    SlotGrid::rect(height, width).unwrap()
}

pub(crate) fn plain(height: usize, width: usize) -> TestComponent {
    Component::new(rect(height, width), ComponentConfig::new())
}

pub(crate) fn with_fallback(height: usize, width: usize, fallback: u32) -> TestComponent {
    Component::new(
        rect(height, width),
        ComponentConfig::new().render_fallback(fallback),
    )
}

pub(crate) fn shaped(grid: SlotGrid) -> TestComponent {
    Component::new(grid, ComponentConfig::new())
}

pub(crate) fn value(item: u32) -> TestComponent {
    essentials::value(item)
}
