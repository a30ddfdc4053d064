//! Immutable reservation grids.
//!
//! A [`SlotGrid`] describes which cells of a rectangular area are usable
//! ("reserved"). Rows may have different widths, so irregular shapes such as
//! L-pieces are representable. Two coordinate systems exist side by side:
//!
//! - the **reserved index**, a dense `0..total_reserved()` numbering that
//!   only touches reserved cells in row-major scan order, and
//! - the **2-D position**, a `(row, col)` pair within the possibly sparse
//!   grid.
//!
//! Conversions between the two are pure functions; the numbering is stable
//! for the lifetime of a grid because grids never change after construction.

use smallvec::SmallVec;
use std::fmt;

type Row = SmallVec<[bool; 8]>;

/// A `(row, col)` cell position inside a [`SlotGrid`]. Zero-indexed,
/// row-major.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Errors raised by grid construction and addressing lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// The grid would contain no reserved cells at all.
    Empty,
    /// A row index beyond the last row.
    RowOutOfRange { row: usize, rows: usize },
    /// A reserved index beyond the last reserved cell.
    IndexOutOfRange { index: usize, total: usize },
    /// A position outside the stored cells.
    PositionOutOfRange { row: usize, col: usize },
    /// A position that exists but is marked unreserved.
    SlotNotReserved { row: usize, col: usize },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::Empty => write!(f, "slot grid has no reserved slots"),
            GridError::RowOutOfRange { row, rows } => {
                write!(f, "row {row} out of range ({rows} rows)")
            }
            GridError::IndexOutOfRange { index, total } => {
                write!(f, "reserved index {index} out of range ({total} reserved)")
            }
            GridError::PositionOutOfRange { row, col } => {
                write!(f, "position ({row}, {col}) outside the grid")
            }
            GridError::SlotNotReserved { row, col } => {
                write!(f, "slot at ({row}, {col}) is not reserved")
            }
        }
    }
}

impl std::error::Error for GridError {}

/// An immutable 2-D reservation grid.
///
/// Constructed once, trimmed once, then shared by value. Trimming drops
/// trailing unreserved cells inside each row and removes leading/trailing
/// rows that contain no reserved cell; interior all-unreserved rows are
/// kept so that addressing of the remaining rows stays put.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotGrid {
    rows: Vec<Row>,
    total: usize,
}

impl SlotGrid {
    /// Builds a grid from per-row reservation flags (`true` = reserved).
    pub fn rows<I, R>(rows: I) -> Result<Self, GridError>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = bool>,
    {
        let raw: Vec<Row> = rows
            .into_iter()
            .map(|row| row.into_iter().collect())
            .collect();
        Self::trimmed(raw)
    }

    /// Builds a fully reserved `height` x `width` rectangle.
    pub fn rect(height: usize, width: usize) -> Result<Self, GridError> {
        Self::trimmed(vec![SmallVec::from_elem(true, width); height])
    }

    /// Splits a flat reservation array into rows of uniform `width`.
    /// Trailing cells that do not fill a complete row are dropped.
    pub fn from_flat(width: usize, cells: &[bool]) -> Result<Self, GridError> {
        if width == 0 {
            return Err(GridError::Empty);
        }
        Self::trimmed(
            cells
                .chunks_exact(width)
                .map(SmallVec::from_slice)
                .collect(),
        )
    }

    /// Splits a flat reservation array into rows of the given widths.
    pub fn from_row_widths(widths: &[usize], cells: &[bool]) -> Result<Self, GridError> {
        let needed: usize = widths.iter().sum();
        if needed > cells.len() {
            return Err(GridError::IndexOutOfRange {
                index: needed,
                total: cells.len(),
            });
        }
        let mut rows = Vec::with_capacity(widths.len());
        let mut offset = 0;
        for &width in widths {
            rows.push(Row::from_slice(&cells[offset..offset + width]));
            offset += width;
        }
        Self::trimmed(rows)
    }

    /// A single reserved cell. Used for 1x1 leaf components.
    pub(crate) fn single() -> Self {
        Self {
            rows: vec![SmallVec::from_elem(true, 1)],
            total: 1,
        }
    }

    fn trimmed(mut rows: Vec<Row>) -> Result<Self, GridError> {
        // Inside each row, a reserved cell must come last: drop trailing
        // unreserved cells.
        for row in &mut rows {
            let keep = row.iter().rposition(|&cell| cell).map_or(0, |last| last + 1);
            row.truncate(keep);
        }

        // Drop leading and trailing rows without any reserved cell.
        let first = rows.iter().position(|row| row.contains(&true));
        let Some(first) = first else {
            return Err(GridError::Empty);
        };
        let last = rows
            .iter()
            .rposition(|row| row.contains(&true))
            .unwrap_or(first);
        rows.drain(last + 1..);
        rows.drain(..first);

        let total = rows
            .iter()
            .map(|row| row.iter().filter(|&&cell| cell).count())
            .sum();
        Ok(Self { rows, total })
    }

    /// Count of reserved (usable) cells.
    pub fn total_reserved(&self) -> usize {
        self.total
    }

    /// Number of stored rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Count of reserved cells in `row`.
    pub fn reserved_in_row(&self, row: usize) -> Result<usize, GridError> {
        let cells = self.row(row)?;
        Ok(cells.iter().filter(|&&cell| cell).count())
    }

    /// Stored width of `row`, counting unreserved cells as well.
    pub fn width_of_row(&self, row: usize) -> Result<usize, GridError> {
        Ok(self.row(row)?.len())
    }

    fn row(&self, row: usize) -> Result<&Row, GridError> {
        self.rows.get(row).ok_or(GridError::RowOutOfRange {
            row,
            rows: self.rows.len(),
        })
    }

    /// Position of the `index`-th reserved cell in row-major scan order.
    pub fn position_of_index(&self, index: usize) -> Result<Position, GridError> {
        if index >= self.total {
            return Err(GridError::IndexOutOfRange {
                index,
                total: self.total,
            });
        }
        let mut remaining = index;
        for (row, cells) in self.rows.iter().enumerate() {
            for (col, &cell) in cells.iter().enumerate() {
                if cell {
                    if remaining == 0 {
                        return Ok(Position { row, col });
                    }
                    remaining -= 1;
                }
            }
        }
        // Unreachable: `index < self.total` guarantees a hit above.
        Err(GridError::IndexOutOfRange {
            index,
            total: self.total,
        })
    }

    /// Reserved index of the cell at `position`.
    ///
    /// Distinguishes two failures: the position may lie outside the stored
    /// cells entirely, or it may name a cell that exists but is unreserved.
    pub fn index_of_position(&self, position: Position) -> Result<usize, GridError> {
        let Position { row, col } = position;
        let cells = self.rows.get(row).ok_or(GridError::PositionOutOfRange { row, col })?;
        match cells.get(col) {
            None => Err(GridError::PositionOutOfRange { row, col }),
            Some(false) => Err(GridError::SlotNotReserved { row, col }),
            Some(true) => {
                let before_row: usize = self.rows[..row]
                    .iter()
                    .map(|r| r.iter().filter(|&&cell| cell).count())
                    .sum();
                let before_col = cells[..col].iter().filter(|&&cell| cell).count();
                Ok(before_row + before_col)
            }
        }
    }

    /// Iterates the positions of all reserved cells in scan order; the n-th
    /// yielded position corresponds to reserved index n.
    pub fn reserved_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|&(_, &cell)| cell)
                .map(move |(col, _)| Position { row, col })
        })
    }
}
