//! Component nodes: identity, ownership, and composition.
//!
//! A [`Component`] is a cheap handle over reference-counted node state.
//! Equality is identity: two handles compare equal iff they point at the
//! same node. All interior state lives behind per-field `Cell`/`RefCell` so
//! that tree operations can nest without aliasing whole-node borrows.
//!
//! Ownership across trees is enforced by the hook/lock pair: a node is "in
//! use" when it is locked (a tree root) or hooked to a parent. Binding a node
//! that is already in use, or binding that would make a node its own
//! ancestor, fails up front; nothing is mutated on the error paths.

use crate::collections::map::HashSet;
use crate::grid::{GridError, Position, SlotGrid};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_COMPONENT_ID: AtomicUsize = AtomicUsize::new(1);

fn next_component_id() -> ComponentId {
    ComponentId(NEXT_COMPONENT_ID.fetch_add(1, Ordering::Relaxed))
}

/// Stable identity of a component node, unique for the process lifetime.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentId(usize);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors raised by composition operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// The child is locked or already hooked to a parent.
    AlreadyInUse,
    /// Binding would make a node its own descendant.
    Cycle,
    /// A target slot is already bound and eviction was not requested.
    Overlap { index: usize },
    /// The child's shape does not fit the parent's grid at the start slot.
    Grid(GridError),
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindError::AlreadyInUse => write!(f, "component already in use"),
            BindError::Cycle => write!(f, "binding would create a cycle"),
            BindError::Overlap { index } => write!(f, "slot {index} already bound"),
            BindError::Grid(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for BindError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BindError::Grid(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GridError> for BindError {
    fn from(err: GridError) -> Self {
        BindError::Grid(err)
    }
}

/// What `bind` does when a target slot is already occupied.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum OverlapPolicy {
    /// Fail with [`BindError::Overlap`].
    #[default]
    Reject,
    /// Unbind whichever child currently occupies the slot, then install.
    Evict,
}

/// Per-node settings, immutable once the component is created.
#[derive(Clone, Debug)]
pub struct ComponentConfig<T> {
    /// Freeze the first produced render forever.
    pub static_render: bool,
    /// Re-render only the slots marked changed since the last render.
    pub smart_render: bool,
    /// Request a scheduled re-render whenever a bind/unbind changes slots.
    pub auto_render: bool,
    /// How many ticks an auto-render request may be deferred.
    pub auto_render_speed: u32,
    /// Whether this node receives component ticks.
    pub component_tick: bool,
    /// Global ticks between two local ticks of this node. Minimum 1.
    pub tick_speed: u64,
    /// Value rendered into slots no child occupies.
    pub render_fallback: Option<T>,
}

impl<T> ComponentConfig<T> {
    pub fn new() -> Self {
        Self {
            static_render: false,
            smart_render: true,
            auto_render: true,
            auto_render_speed: 1,
            component_tick: true,
            tick_speed: 20,
            render_fallback: None,
        }
    }

    pub fn static_render(mut self, value: bool) -> Self {
        self.static_render = value;
        self
    }

    pub fn smart_render(mut self, value: bool) -> Self {
        self.smart_render = value;
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

    pub fn component_tick(mut self, value: bool) -> Self {
        self.component_tick = value;
        self
    }

    pub fn tick_speed(mut self, ticks: u64) -> Self {
        self.tick_speed = ticks;
        self
    }

    pub fn render_fallback(mut self, value: T) -> Self {
        self.render_fallback = Some(value);
        self
    }
}

impl<T> Default for ComponentConfig<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-node callbacks a component variant can implement.
///
/// Every method receives the owning [`Component`] handle so a variant can
/// mutate its own subtree (bind, unbind, request re-renders) from inside the
/// callback.
pub trait ComponentBehavior<T, E> {
    /// Runs once, right after the behavior is attached to its node.
    fn set_up(&mut self, component: &Component<T, E>) {
        let _ = component;
    }

    /// Runs immediately before each render pass; once ever on static nodes.
    fn before_render(&mut self, component: &Component<T, E>, frame: u64) {
        let _ = (component, frame);
    }

    /// Runs when the global tick is a multiple of this node's tick speed.
    /// `tick` is the node-local counter, `frame` the next frame number.
    fn on_component_tick(&mut self, component: &Component<T, E>, tick: u64, frame: u64) {
        let _ = (component, tick, frame);
    }
}

/// The no-op behavior.
impl<T, E> ComponentBehavior<T, E> for () {}

pub(crate) struct Binding<T, E> {
    pub(crate) child: Component<T, E>,
    pub(crate) child_local: usize,
}

pub(crate) struct ComponentInner<T, E> {
    pub(crate) id: ComponentId,
    pub(crate) grid: SlotGrid,
    pub(crate) config: ComponentConfig<T>,
    pub(crate) bindings: RefCell<Vec<Option<Binding<T, E>>>>,
    pub(crate) last_render: RefCell<Option<Vec<Option<T>>>>,
    pub(crate) changed: RefCell<BTreeSet<usize>>,
    pub(crate) hook: RefCell<Option<Weak<ComponentInner<T, E>>>>,
    pub(crate) locked: Cell<bool>,
    pub(crate) render_request: Cell<Option<u32>>,
    pub(crate) before_render_fired: Cell<bool>,
    pub(crate) behavior: RefCell<Option<Box<dyn ComponentBehavior<T, E>>>>,
    pub(crate) click_handler: RefCell<Option<Box<dyn FnMut(&E, usize)>>>,
}

/// A node of the component tree.
///
/// `T` is the opaque cell value pushed to displays; `E` the opaque payload of
/// interaction events. Handles are cheap to clone and deliberately `!Send`:
/// a tree belongs to one logical thread of control.
pub struct Component<T, E> {
    pub(crate) inner: Rc<ComponentInner<T, E>>,
}

impl<T, E> Clone for Component<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T, E> PartialEq for Component<T, E> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T, E> Eq for Component<T, E> {}

impl<T, E> Hash for Component<T, E> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl<T, E> fmt::Debug for Component<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.inner.id)
            .field("slots", &self.inner.grid.total_reserved())
            .finish()
    }
}

impl<T, E> Component<T, E> {
    /// Creates an unattached component with the no-op behavior.
    pub fn new(grid: SlotGrid, config: ComponentConfig<T>) -> Self {
        Self::assemble(grid, config, None)
    }

    /// Creates a component and attaches `behavior`, running its `set_up`.
    pub fn with_behavior(
        grid: SlotGrid,
        config: ComponentConfig<T>,
        behavior: impl ComponentBehavior<T, E> + 'static,
    ) -> Self {
        let component = Self::assemble(grid, config, Some(Box::new(behavior)));
        component.with_behavior_taken(|behavior, component| behavior.set_up(component));
        component
    }

    /// Creates a component that is already locked, for use as a tree root.
    pub fn new_root(grid: SlotGrid, config: ComponentConfig<T>) -> Self {
        let component = Self::new(grid, config);
        component.inner.locked.set(true);
        component
    }

    fn assemble(
        grid: SlotGrid,
        mut config: ComponentConfig<T>,
        behavior: Option<Box<dyn ComponentBehavior<T, E>>>,
    ) -> Self {
        config.tick_speed = config.tick_speed.max(1);
        let total = grid.total_reserved();
        let mut bindings = Vec::with_capacity(total);
        bindings.resize_with(total, || None);
        Self {
            inner: Rc::new(ComponentInner {
                id: next_component_id(),
                grid,
                config,
                bindings: RefCell::new(bindings),
                last_render: RefCell::new(None),
                changed: RefCell::new(BTreeSet::new()),
                hook: RefCell::new(None),
                locked: Cell::new(false),
                render_request: Cell::new(None),
                before_render_fired: Cell::new(false),
                behavior: RefCell::new(behavior),
                click_handler: RefCell::new(None),
            }),
        }
    }

    pub fn id(&self) -> ComponentId {
        self.inner.id
    }

    /// This node's reservation grid, shared by value.
    pub fn grid(&self) -> SlotGrid {
        self.inner.grid.clone()
    }

    pub fn config(&self) -> &ComponentConfig<T> {
        &self.inner.config
    }

    /// Installs the click callback invoked by [`Component::click`].
    pub fn set_click_handler(&self, handler: impl FnMut(&E, usize) + 'static) {
        *self.inner.click_handler.borrow_mut() = Some(Box::new(handler));
    }

    // ── ownership ──────────────────────────────────────────────────────

    /// Marks this node as in use without attaching it to a parent.
    pub fn lock(&self) -> Result<(), BindError> {
        if self.is_locked() {
            return Err(BindError::AlreadyInUse);
        }
        self.inner.locked.set(true);
        Ok(())
    }

    /// True while the node is locked or hooked to a live parent.
    pub fn is_locked(&self) -> bool {
        self.inner.locked.get() || self.parent().is_some()
    }

    /// The current parent, if this node is hooked into a tree.
    pub fn parent(&self) -> Option<Component<T, E>> {
        self.inner
            .hook
            .borrow()
            .as_ref()?
            .upgrade()
            .map(|inner| Component { inner })
    }

    fn hook(&self, parent: &Self) -> Result<(), BindError> {
        if self.is_locked() {
            return Err(BindError::AlreadyInUse);
        }
        if self.is_self_or_ancestor_of(parent) {
            return Err(BindError::Cycle);
        }
        *self.inner.hook.borrow_mut() = Some(Rc::downgrade(&parent.inner));
        Ok(())
    }

    fn unhook(&self) {
        *self.inner.hook.borrow_mut() = None;
    }

    /// True if `node` is this component or has it somewhere up its hook
    /// chain. Used to reject binds that would create a cycle.
    fn is_self_or_ancestor_of(&self, node: &Self) -> bool {
        if self == node {
            return true;
        }
        let mut cursor = node.parent();
        while let Some(ancestor) = cursor {
            if ancestor == *self {
                return true;
            }
            cursor = ancestor.parent();
        }
        false
    }

    // ── composition ────────────────────────────────────────────────────

    /// Binds `child` so that its reserved index 0 lands at `start` in this
    /// node's grid.
    ///
    /// Every reserved cell of the child is mapped into this grid by offset;
    /// the bind fails if any mapped cell is missing or unreserved, if the
    /// child is already in use, if it would become its own ancestor, or if a
    /// target slot is occupied and `policy` is [`OverlapPolicy::Reject`].
    pub fn bind(
        &self,
        child: &Self,
        start: usize,
        policy: OverlapPolicy,
    ) -> Result<(), BindError> {
        let origin = self.inner.grid.position_of_index(start)?;
        let child_grid = child.grid();

        let mut targets = Vec::with_capacity(child_grid.total_reserved());
        for cell in child_grid.reserved_positions() {
            let mapped = Position::new(origin.row + cell.row, origin.col + cell.col);
            targets.push(self.inner.grid.index_of_position(mapped)?);
        }

        if child.is_self_or_ancestor_of(self) {
            return Err(BindError::Cycle);
        }
        if child.is_locked() {
            return Err(BindError::AlreadyInUse);
        }

        let mut evicted: Vec<Component<T, E>> = Vec::new();
        {
            let bindings = self.inner.bindings.borrow();
            for &index in &targets {
                if let Some(existing) = &bindings[index] {
                    match policy {
                        OverlapPolicy::Reject => return Err(BindError::Overlap { index }),
                        OverlapPolicy::Evict => {
                            if !evicted.contains(&existing.child) {
                                evicted.push(existing.child.clone());
                            }
                        }
                    }
                }
            }
        }
        for occupant in evicted {
            self.unbind(&occupant);
        }

        child.hook(self)?;

        {
            let mut bindings = self.inner.bindings.borrow_mut();
            for (child_local, &index) in targets.iter().enumerate() {
                bindings[index] = Some(Binding {
                    child: child.clone(),
                    child_local,
                });
            }
        }
        log::debug!(
            "bound component {} into {} at slot {} ({} slots)",
            child.inner.id,
            self.inner.id,
            start,
            targets.len()
        );

        for &index in &targets {
            self.slot_changed(index);
        }
        if self.inner.config.auto_render {
            self.request_rerender_within(self.inner.config.auto_render_speed);
        }
        Ok(())
    }

    /// Removes every binding of `child` and clears its hook. A no-op if the
    /// child is not bound here.
    pub fn unbind(&self, child: &Self) {
        let mut vacated = Vec::new();
        {
            let mut bindings = self.inner.bindings.borrow_mut();
            for (index, slot) in bindings.iter_mut().enumerate() {
                if slot.as_ref().is_some_and(|binding| binding.child == *child) {
                    *slot = None;
                    vacated.push(index);
                }
            }
        }
        if vacated.is_empty() {
            return;
        }
        child.unhook();
        log::debug!(
            "unbound component {} from {} ({} slots vacated)",
            child.inner.id,
            self.inner.id,
            vacated.len()
        );
        for &index in &vacated {
            self.slot_changed(index);
        }
        if self.inner.config.auto_render {
            self.request_rerender_within(self.inner.config.auto_render_speed);
        }
    }

    /// Unbinds every currently bound child.
    pub fn unbind_all(&self) {
        for child in self.children() {
            self.unbind(&child);
        }
    }

    // ── queries ────────────────────────────────────────────────────────

    /// The child bound at `index`, if any.
    pub fn child_at(&self, index: usize) -> Option<Component<T, E>> {
        self.inner
            .bindings
            .borrow()
            .get(index)?
            .as_ref()
            .map(|binding| binding.child.clone())
    }

    /// All distinct bound children, ordered by their first slot.
    pub fn children(&self) -> Vec<Component<T, E>> {
        let mut seen = HashSet::default();
        let mut out = Vec::new();
        for binding in self.inner.bindings.borrow().iter().flatten() {
            if seen.insert(binding.child.id()) {
                out.push(binding.child.clone());
            }
        }
        out
    }

    /// Distinct bound children matching `predicate`.
    pub fn children_where(
        &self,
        mut predicate: impl FnMut(&Component<T, E>) -> bool,
    ) -> Vec<Component<T, E>> {
        self.children()
            .into_iter()
            .filter(|child| predicate(child))
            .collect()
    }

    /// Map from this node's slots to the child-local index displayed there.
    pub fn slot_index_map(&self, child: &Self) -> BTreeMap<usize, usize> {
        self.inner
            .bindings
            .borrow()
            .iter()
            .enumerate()
            .filter_map(|(index, binding)| {
                binding
                    .as_ref()
                    .filter(|binding| binding.child == *child)
                    .map(|binding| (index, binding.child_local))
            })
            .collect()
    }

    /// Map from the child's own indices to the set of this node's slots
    /// displaying them. A child index may show at several slots at once.
    pub fn child_index_map(&self, child: &Self) -> BTreeMap<usize, BTreeSet<usize>> {
        let mut map: BTreeMap<usize, BTreeSet<usize>> = BTreeMap::new();
        for (index, binding) in self.inner.bindings.borrow().iter().enumerate() {
            if let Some(binding) = binding {
                if binding.child == *child {
                    map.entry(binding.child_local).or_default().insert(index);
                }
            }
        }
        map
    }

    /// The set of this node's slots currently displaying `child_local` of
    /// `child`.
    pub fn slots_showing(&self, child: &Self, child_local: usize) -> BTreeSet<usize> {
        self.inner
            .bindings
            .borrow()
            .iter()
            .enumerate()
            .filter_map(|(index, binding)| {
                binding
                    .as_ref()
                    .filter(|binding| {
                        binding.child == *child && binding.child_local == child_local
                    })
                    .map(|_| index)
            })
            .collect()
    }

    /// Runs a closure against the attached behavior. The behavior is taken
    /// out for the duration of the call so it can freely mutate the node.
    pub(crate) fn with_behavior_taken(
        &self,
        run: impl FnOnce(&mut dyn ComponentBehavior<T, E>, &Component<T, E>),
    ) {
        let taken = self.inner.behavior.borrow_mut().take();
        if let Some(mut behavior) = taken {
            run(behavior.as_mut(), self);
            *self.inner.behavior.borrow_mut() = Some(behavior);
        }
    }

    #[cfg(test)]
    pub(crate) fn install_binding_alias(&self, index: usize, child: &Self, child_local: usize) {
        self.inner.bindings.borrow_mut()[index] = Some(Binding {
            child: child.clone(),
            child_local,
        });
    }
}
