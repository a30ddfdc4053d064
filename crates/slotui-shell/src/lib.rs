//! Orchestration shell for slotui component trees.
//!
//! The core crate deliberately stops at the tree: it needs something outside
//! to own the root, feed it tick pulses and interaction events, and push
//! rendered arrays at a display. That something is the [`Endpoint`] here. It
//! locks one root component, translates a monotonically increasing global
//! tick into component-tick dispatch and scheduled re-renders, and hands
//! frames to a [`Surface`], the narrow seam behind which a concrete display
//! (an in-memory buffer in tests, an inventory window in a game, a terminal
//! pane) lives.
//!
//! The shell is cooperative: it never blocks and never consults a clock.
//! Whoever owns the endpoint decides when a tick happens and on which thread
//! the whole tree lives.

use slotui_core::{Component, ComponentConfig, SlotGrid};

/// A display sink for rendered cell arrays.
///
/// `apply` receives the freshly rendered array plus the previously rendered
/// one and is expected to update only the cells that differ.
pub trait Surface<T> {
    /// The reservation shape of this display. Queried once when the
    /// endpoint is built; the root component's grid is created from it.
    fn grid(&self) -> SlotGrid;

    /// Presents the display with its first rendered content.
    fn open(&mut self, initial: &[Option<T>]);

    /// Pushes a newly rendered frame. `previous` is the last frame the
    /// endpoint rendered, if any, for diffing.
    fn apply(&mut self, rendered: &[Option<T>], previous: Option<&[Option<T>]>);

    /// Tears the display down.
    fn close(&mut self);
}

/// Settings for an [`Endpoint`] and the root component it creates.
#[derive(Clone, Debug)]
pub struct EndpointConfig<T> {
    /// Whether the tree receives component ticks at all.
    pub component_tick: bool,
    /// Global ticks between two local ticks of the root. Minimum 1.
    pub tick_speed: u64,
    /// Service `request_rerender_within(0)` at the end of the dispatch that
    /// raised it instead of waiting for the next tick.
    pub direct_render: bool,
    /// Render once and freeze.
    pub static_render: bool,
    /// Schedule re-renders automatically when the tree changes.
    pub auto_render: bool,
    /// How many ticks an automatic re-render may be deferred.
    pub auto_render_speed: u32,
    /// Re-render only changed slots.
    pub smart_render: bool,
    /// Value shown in cells no component occupies.
    pub background: Option<T>,
}

impl<T> EndpointConfig<T> {
    pub fn new() -> Self {
        Self {
            component_tick: true,
            tick_speed: 20,
            direct_render: false,
            static_render: false,
            auto_render: true,
            auto_render_speed: 1,
            smart_render: true,
            background: None,
        }
    }

    pub fn component_tick(mut self, value: bool) -> Self {
        self.component_tick = value;
        self
    }

    pub fn tick_speed(mut self, ticks: u64) -> Self {
        self.tick_speed = ticks;
        self
    }

    pub fn direct_render(mut self, value: bool) -> Self {
        self.direct_render = value;
        self
    }

    pub fn static_render(mut self, value: bool) -> Self {
        self.static_render = value;
        self
    }

    pub fn auto_render(mut self, value: bool) -> Self {
        self.auto_render = value;
        self
    }

    pub fn auto_render_speed(mut self, ticks: u32) -> Self {
        self.auto_render_speed = ticks;
        self
    }

    pub fn smart_render(mut self, value: bool) -> Self {
        self.smart_render = value;
        self
    }

    pub fn background(mut self, value: T) -> Self {
        self.background = Some(value);
        self
    }

    fn component_config(self) -> ComponentConfig<T> {
        let mut config = ComponentConfig::new();
        config.static_render = self.static_render;
        config.smart_render = self.smart_render;
        config.auto_render = self.auto_render;
        config.auto_render_speed = self.auto_render_speed;
        config.component_tick = self.component_tick;
        config.tick_speed = self.tick_speed;
        config.render_fallback = self.background;
        config
    }
}

impl<T> Default for EndpointConfig<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The rendering component at the top of a tree.
///
/// Owns a locked root [`Component`] shaped after the surface's grid. Build
/// the user tree through [`Endpoint::root`], then drive the endpoint from
/// the host: call [`Endpoint::tick`] on every scheduling pulse and
/// [`Endpoint::click`] for every interaction. Re-render requests bubbling up
/// from the tree are retained at the root with their smallest delay and
/// serviced by the tick countdown (or immediately, with
/// [`EndpointConfig::direct_render`]).
pub struct Endpoint<T, E, S> {
    surface: S,
    root: Component<T, E>,
    slots: usize,
    static_render: bool,
    smart_render: bool,
    direct_render: bool,
    frame: u64,
    tick: u64,
    requested: Option<u32>,
    opened: bool,
}

impl<T, E, S> Endpoint<T, E, S>
where
    T: Clone + PartialEq,
    S: Surface<T>,
{
    pub fn new(surface: S, config: EndpointConfig<T>) -> Self {
        let grid = surface.grid();
        let slots = grid.total_reserved();
        let static_render = config.static_render;
        let smart_render = config.smart_render;
        let direct_render = config.direct_render;
        let root = Component::new_root(grid, config.component_config());
        Self {
            surface,
            root,
            slots,
            static_render,
            smart_render,
            direct_render,
            frame: 1,
            tick: 0,
            requested: None,
            opened: false,
        }
    }

    /// A handle to the root component, for building the tree.
    pub fn root(&self) -> Component<T, E> {
        self.root.clone()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn is_open(&self) -> bool {
        self.opened
    }

    /// The frame number the next render pass will carry.
    pub fn next_frame(&self) -> u64 {
        self.frame
    }

    /// Global ticks delivered so far.
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    /// The pending re-render countdown, if a request is scheduled.
    pub fn pending_update_in(&self) -> Option<u32> {
        self.requested
    }

    /// Presents the surface. The first open renders the first frame; a
    /// reopen after ticking replays the cached last render.
    pub fn open(&mut self) {
        if self.opened {
            return;
        }
        let initial = if self.tick == 0 {
            self.render_next()
        } else {
            match self.root.last_render() {
                Some(last) => last,
                None => self.render_next(),
            }
        };
        self.surface.open(&initial);
        self.opened = true;
        log::debug!("endpoint opened ({} slots)", self.slots);
        self.service_render_requests();
    }

    /// Tears the surface down. The tree and its cached render survive, so a
    /// later [`Endpoint::open`] can resume.
    pub fn close(&mut self) {
        if !self.opened {
            return;
        }
        self.surface.close();
        self.opened = false;
        log::debug!("endpoint closed");
    }

    /// Delivers one global tick: dispatches component ticks through the
    /// tree, then counts down any pending re-render request and performs
    /// the surface update when it expires. Tick 0 never renders; the open
    /// call already presented that state.
    pub fn tick(&mut self) {
        let tick = self.tick;
        self.tick += 1;
        self.root.dispatch_on_component_tick(tick, self.frame);
        self.service_render_requests();
        if tick >= 1 {
            if let Some(remaining) = self.requested {
                let remaining = remaining.saturating_sub(1);
                if remaining == 0 {
                    self.requested = None;
                    self.perform_surface_update();
                } else {
                    self.requested = Some(remaining);
                }
            }
        }
    }

    /// Routes an interaction on the display into the tree. Slots outside
    /// the root's reserved range are ignored.
    pub fn click(&mut self, event: &E, slot: usize) {
        if slot >= self.slots {
            return;
        }
        self.root.click(event, slot);
        self.service_render_requests();
    }

    /// Drains the root's pending re-render request into the countdown,
    /// retaining the smallest delay seen so far. A zero-delay request is
    /// serviced immediately when direct rendering is enabled.
    fn service_render_requests(&mut self) {
        if let Some(request) = self.root.take_render_request() {
            if self.direct_render && request == 0 {
                self.perform_surface_update();
            } else {
                let sanitized = request.max(1);
                self.requested = Some(match self.requested {
                    Some(current) => current.min(sanitized),
                    None => sanitized,
                });
            }
        }
    }

    fn perform_surface_update(&mut self) {
        if self.static_render || (self.smart_render && !self.root.has_unrendered_changes()) {
            log::trace!("surface update skipped: tree is clean");
            return;
        }
        let previous = self.root.last_render();
        let rendered = self.render_next();
        self.requested = None;
        if !self.smart_render && previous.as_ref() == Some(&rendered) {
            log::trace!("surface update skipped: frame unchanged");
            return;
        }
        self.surface.apply(&rendered, previous.as_deref());
    }

    fn render_next(&mut self) -> Vec<Option<T>> {
        let frame = self.frame;
        self.frame += 1;
        self.root.dispatch_before_render(frame);
        self.root.render_next_frame(frame)
    }
}

// Unit-level endpoint tests live in `tests/endpoint.rs` as an integration
// test: they use `slotui-testing`, which depends on `slotui-shell`, so
// compiling them inline would instantiate a second copy of this crate's
// `Surface` trait that `RecordingSurface` does not implement.
