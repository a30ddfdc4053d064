//! The render pipeline.
//!
//! Rendering turns a component subtree into a flat array of cell values, one
//! per reserved index, with `None` meaning "empty cell". Two strategies sit
//! behind one entry point: a full pass over every slot, and an incremental
//! pass limited to the slots marked changed since the previous render. Both
//! share a per-call memoizer so a child occupying several slots renders at
//! most once per pass.

use crate::collections::map::HashMap;
use crate::component::{Binding, Component, ComponentId};

type RenderMemo<T> = HashMap<ComponentId, Vec<Option<T>>>;

impl<T: Clone, E> Component<T, E> {
    /// Renders the next frame honoring this node's settings.
    ///
    /// Static nodes return their cached first render unchanged; everything
    /// else runs [`Component::smart_render`] or [`Component::render`] per
    /// configuration and caches the result as the new last render.
    pub fn render_next_frame(&self, frame: u64) -> Vec<Option<T>> {
        if self.inner.config.static_render {
            if let Some(cached) = self.inner.last_render.borrow().as_ref() {
                return cached.clone();
            }
        }
        let rendered = if self.inner.config.smart_render {
            self.smart_render(frame)
        } else {
            self.render(frame)
        };
        *self.inner.last_render.borrow_mut() = Some(rendered.clone());
        rendered
    }

    /// Full render: every reserved slot is recomputed.
    ///
    /// Unbound slots yield the render fallback; bound slots yield the
    /// child-local cell of that child's next frame. Clears the changed set.
    pub fn render(&self, frame: u64) -> Vec<Option<T>> {
        log::trace!("full render of component {} (frame {frame})", self.inner.id);
        self.inner.changed.borrow_mut().clear();
        let bindings = self.inner.bindings.borrow();
        let mut results: RenderMemo<T> = HashMap::default();
        let mut output = vec![self.inner.config.render_fallback.clone(); bindings.len()];
        for (index, binding) in bindings.iter().enumerate() {
            if let Some(binding) = binding {
                output[index] = Self::render_or_cached(&mut results, binding, frame);
            }
        }
        output
    }

    /// Incremental render: recomputes only the slots marked changed since
    /// the previous render, starting from a copy of that render.
    ///
    /// Falls back to a full render when no previous render exists. Clears
    /// the changed set.
    pub fn smart_render(&self, frame: u64) -> Vec<Option<T>> {
        let previous = self.inner.last_render.borrow().clone();
        let Some(mut output) = previous else {
            return self.render(frame);
        };
        let changed = std::mem::take(&mut *self.inner.changed.borrow_mut());
        if changed.is_empty() {
            return output;
        }
        log::trace!(
            "smart render of component {} (frame {frame}, {} changed slots)",
            self.inner.id,
            changed.len()
        );
        let bindings = self.inner.bindings.borrow();
        let mut results: RenderMemo<T> = HashMap::default();
        for index in changed {
            output[index] = match &bindings[index] {
                Some(binding) => Self::render_or_cached(&mut results, binding, frame),
                None => self.inner.config.render_fallback.clone(),
            };
        }
        output
    }

    fn render_or_cached(results: &mut RenderMemo<T>, binding: &Binding<T, E>, frame: u64) -> Option<T> {
        let rendered = results
            .entry(binding.child.id())
            .or_insert_with(|| binding.child.render_next_frame(frame));
        rendered[binding.child_local].clone()
    }

    /// True when slots changed since the last render, or when no render has
    /// happened yet. Drivers use this to skip redundant display updates.
    pub fn has_unrendered_changes(&self) -> bool {
        !self.inner.changed.borrow().is_empty() || self.inner.last_render.borrow().is_none()
    }

    /// A copy of the most recent render, if any.
    pub fn last_render(&self) -> Option<Vec<Option<T>>> {
        self.inner.last_render.borrow().clone()
    }
}
