//! Dispatch pipelines over the component tree.
//!
//! Four flows share the hook links: change propagation and re-render
//! requests bubble bottom-up, before-render and component-tick dispatch walk
//! top-down, and click routing descends along the recorded bindings. None of
//! them allocate beyond the child handle snapshots taken per level.

use crate::component::Component;

impl<T, E> Component<T, E> {
    // ── bottom-up ──────────────────────────────────────────────────────

    /// Marks `index` as changed and ripples the change to the root.
    ///
    /// The index is translated into the set of parent slots currently
    /// displaying this node at that child-local index, and each of those is
    /// marked changed in turn, so every ancestor's incremental render
    /// recomputes exactly the affected cells.
    pub fn slot_changed(&self, index: usize) {
        if index >= self.inner.grid.total_reserved() {
            log::warn!(
                "ignoring change mark at slot {} of component {} ({} slots)",
                index,
                self.inner.id,
                self.inner.grid.total_reserved()
            );
            return;
        }
        self.inner.changed.borrow_mut().insert(index);
        if let Some(parent) = self.parent() {
            for slot in parent.slots_showing(self, index) {
                parent.slot_changed(slot);
            }
        }
    }

    /// Requests a re-render as soon as possible (within one tick).
    pub fn request_rerender(&self) {
        self.request_rerender_within(1);
    }

    /// Requests a re-render within `within_ticks` ticks.
    ///
    /// The request bubbles up the hook chain until it reaches the tree root,
    /// which retains the smallest pending delay for the driver to act on.
    /// Static nodes swallow the request: their tree never re-renders.
    pub fn request_rerender_within(&self, within_ticks: u32) {
        if self.inner.config.static_render {
            return;
        }
        match self.parent() {
            Some(parent) => parent.request_rerender_within(within_ticks),
            None => {
                let merged = match self.inner.render_request.get() {
                    Some(current) => current.min(within_ticks),
                    None => within_ticks,
                };
                self.inner.render_request.set(Some(merged));
            }
        }
    }

    /// Takes the pending re-render request, leaving none.
    pub fn take_render_request(&self) -> Option<u32> {
        self.inner.render_request.take()
    }

    /// The pending re-render request, if any.
    pub fn pending_render_request(&self) -> Option<u32> {
        self.inner.render_request.get()
    }

    // ── top-down ───────────────────────────────────────────────────────

    /// Invokes every node's before-render callback, parents before children.
    /// On static nodes the callback runs exactly once ever.
    pub fn dispatch_before_render(&self, frame: u64) {
        if !(self.inner.config.static_render && self.inner.before_render_fired.get()) {
            self.inner.before_render_fired.set(true);
            self.with_behavior_taken(|behavior, component| {
                behavior.before_render(component, frame);
            });
        }
        for child in self.children() {
            child.dispatch_before_render(frame);
        }
    }

    /// Delivers a global tick to the tree, parents before children.
    ///
    /// A node fires when `global_tick` is a multiple of its own tick speed
    /// and receives its local counter `global_tick / tick_speed`; recursion
    /// continues regardless, so every subtree ticks at its own rate against
    /// the one global clock. `next_frame` is the frame number the next
    /// render pass will carry.
    pub fn dispatch_on_component_tick(&self, global_tick: u64, next_frame: u64) {
        let config = &self.inner.config;
        if config.component_tick && global_tick % config.tick_speed == 0 {
            let local_tick = global_tick / config.tick_speed;
            self.with_behavior_taken(|behavior, component| {
                behavior.on_component_tick(component, local_tick, next_frame);
            });
        }
        for child in self.children() {
            child.dispatch_on_component_tick(global_tick, next_frame);
        }
    }

    /// Routes an interaction at `slot` down the tree.
    ///
    /// This node's own click handler runs first, then the event is forwarded
    /// to the bound child at the child-local index recorded when it was
    /// bound. Slots without a binding end the route here.
    pub fn click(&self, event: &E, slot: usize) {
        if slot >= self.inner.grid.total_reserved() {
            log::warn!(
                "ignoring click at slot {} of component {} ({} slots)",
                slot,
                self.inner.id,
                self.inner.grid.total_reserved()
            );
            return;
        }
        let taken = self.inner.click_handler.borrow_mut().take();
        if let Some(mut handler) = taken {
            handler(event, slot);
            let mut cell = self.inner.click_handler.borrow_mut();
            if cell.is_none() {
                *cell = Some(handler);
            }
        }
        let target = self.inner.bindings.borrow()[slot]
            .as_ref()
            .map(|binding| (binding.child.clone(), binding.child_local));
        if let Some((child, child_local)) = target {
            child.click(event, child_local);
        }
    }
}
