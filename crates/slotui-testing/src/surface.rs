//! An in-memory surface that records everything pushed at it.

use slotui_core::SlotGrid;
use slotui_shell::Surface;

/// A headless display: keeps the current cells, applies diffs the way a real
/// display backend would, and counts lifecycle calls for assertions.
pub struct RecordingSurface<T> {
    grid: SlotGrid,
    cells: Vec<Option<T>>,
    diffs: Vec<Vec<usize>>,
    open_calls: usize,
    apply_calls: usize,
    close_calls: usize,
    opened: bool,
}

impl<T: Clone + PartialEq> RecordingSurface<T> {
    /// A fully reserved `height` x `width` display.
    pub fn rect(height: usize, width: usize) -> Self {
        let grid = SlotGrid::rect(height, width).expect("display dimensions must be non-zero");
        Self::shaped(grid)
    }

    pub fn shaped(grid: SlotGrid) -> Self {
        Self {
            grid,
            cells: Vec::new(),
            diffs: Vec::new(),
            open_calls: 0,
            apply_calls: 0,
            close_calls: 0,
            opened: false,
        }
    }

    /// The currently displayed cells, indexed by reserved index.
    pub fn cells(&self) -> &[Option<T>] {
        &self.cells
    }

    /// Which cell indices each `apply` call actually changed.
    pub fn diffs(&self) -> &[Vec<usize>] {
        &self.diffs
    }

    pub fn open_count(&self) -> usize {
        self.open_calls
    }

    pub fn apply_count(&self) -> usize {
        self.apply_calls
    }

    pub fn close_count(&self) -> usize {
        self.close_calls
    }

    pub fn is_open(&self) -> bool {
        self.opened
    }
}

impl<T: Clone + PartialEq> Surface<T> for RecordingSurface<T> {
    fn grid(&self) -> SlotGrid {
        self.grid.clone()
    }

    fn open(&mut self, initial: &[Option<T>]) {
        self.open_calls += 1;
        self.opened = true;
        self.cells = initial.to_vec();
    }

    fn apply(&mut self, rendered: &[Option<T>], _previous: Option<&[Option<T>]>) {
        self.apply_calls += 1;
        if self.cells.len() != rendered.len() {
            self.cells = vec![None; rendered.len()];
        }
        // Update only the cells that differ, like a real display would.
        let mut changed = Vec::new();
        for (index, cell) in rendered.iter().enumerate() {
            if self.cells[index] != *cell {
                self.cells[index] = cell.clone();
                changed.push(index);
            }
        }
        self.diffs.push(changed);
    }

    fn close(&mut self) {
        self.close_calls += 1;
        self.opened = false;
    }
}
