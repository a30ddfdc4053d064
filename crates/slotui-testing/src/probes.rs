//! Probe components: leaves whose callbacks record into shareable logs.

use slotui_core::{Component, ComponentBehavior, ComponentConfig, SlotGrid};
use std::cell::RefCell;
use std::rc::Rc;

/// A shareable append-only record of callback invocations.
pub struct CallLog<V> {
    entries: Rc<RefCell<Vec<V>>>,
}

impl<V> CallLog<V> {
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub(crate) fn push(&self, value: V) {
        self.entries.borrow_mut().push(value);
    }
}

impl<V: Clone> CallLog<V> {
    /// A copy of everything recorded so far.
    pub fn snapshot(&self) -> Vec<V> {
        self.entries.borrow().clone()
    }
}

impl<V> Clone for CallLog<V> {
    fn clone(&self) -> Self {
        Self {
            entries: Rc::clone(&self.entries),
        }
    }
}

impl<V> Default for CallLog<V> {
    fn default() -> Self {
        Self {
            entries: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

fn probe_grid() -> SlotGrid {
    SlotGrid::rect(1, 1).expect("1x1 grid is never empty")
}

/// A 1x1 component recording the local slot of every click it receives.
pub fn click_probe<T, E>() -> (Component<T, E>, CallLog<usize>) {
    let log = CallLog::default();
    let component = Component::new(probe_grid(), ComponentConfig::new());
    let recorder = log.clone();
    component.set_click_handler(move |_event, slot| recorder.push(slot));
    (component, log)
}

struct TickProbe {
    log: CallLog<(u64, u64)>,
}

impl<T, E> ComponentBehavior<T, E> for TickProbe {
    fn on_component_tick(&mut self, _component: &Component<T, E>, tick: u64, frame: u64) {
        self.log.push((tick, frame));
    }
}

/// A 1x1 component recording `(local_tick, next_frame)` for every component
/// tick it receives at the given tick speed.
pub fn tick_probe<T, E>(tick_speed: u64) -> (Component<T, E>, CallLog<(u64, u64)>) {
    let log = CallLog::default();
    let component = Component::with_behavior(
        probe_grid(),
        ComponentConfig::new().tick_speed(tick_speed),
        TickProbe { log: log.clone() },
    );
    (component, log)
}

struct BeforeRenderProbe {
    log: CallLog<u64>,
}

impl<T, E> ComponentBehavior<T, E> for BeforeRenderProbe {
    fn before_render(&mut self, _component: &Component<T, E>, frame: u64) {
        self.log.push(frame);
    }
}

/// A 1x1 component recording the frame number of every before-render call.
pub fn before_render_probe<T, E>() -> (Component<T, E>, CallLog<u64>) {
    let log = CallLog::default();
    let component = Component::with_behavior(
        probe_grid(),
        ComponentConfig::new(),
        BeforeRenderProbe { log: log.clone() },
    );
    (component, log)
}
