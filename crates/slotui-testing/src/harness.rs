//! A step-driven endpoint harness.

use crate::surface::RecordingSurface;
use slotui_core::Component;
use slotui_shell::{Endpoint, EndpointConfig};

/// An endpoint wired to a [`RecordingSurface`], driven tick by tick.
///
/// The harness owns the whole stack; tests build the tree through
/// [`EndpointHarness::root`], open the display, then advance time with
/// [`EndpointHarness::step`] and inspect the recorded surface.
pub struct EndpointHarness<T, E> {
    endpoint: Endpoint<T, E, RecordingSurface<T>>,
}

impl<T: Clone + PartialEq, E> EndpointHarness<T, E> {
    /// A harness over a fully reserved `height` x `width` display.
    pub fn rect(height: usize, width: usize, config: EndpointConfig<T>) -> Self {
        Self {
            endpoint: Endpoint::new(RecordingSurface::rect(height, width), config),
        }
    }

    pub fn endpoint(&self) -> &Endpoint<T, E, RecordingSurface<T>> {
        &self.endpoint
    }

    pub fn endpoint_mut(&mut self) -> &mut Endpoint<T, E, RecordingSurface<T>> {
        &mut self.endpoint
    }

    pub fn root(&self) -> Component<T, E> {
        self.endpoint.root()
    }

    pub fn surface(&self) -> &RecordingSurface<T> {
        self.endpoint.surface()
    }

    pub fn open(&mut self) {
        self.endpoint.open();
    }

    pub fn close(&mut self) {
        self.endpoint.close();
    }

    /// Delivers `ticks` global ticks.
    pub fn step(&mut self, ticks: usize) {
        for _ in 0..ticks {
            self.endpoint.tick();
        }
    }

    pub fn click(&mut self, event: &E, slot: usize) {
        self.endpoint.click(event, slot);
    }

    /// The currently displayed cells.
    pub fn cells(&self) -> &[Option<T>] {
        self.surface().cells()
    }
}
