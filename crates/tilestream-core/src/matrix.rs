//! Sparse, growable chunk storage addressed by signed chunk coordinates.
//!
//! The matrix is a rectangle of slots (rows of columns) whose slot `[0][0]`
//! holds chunk `(col_offset, row_offset)`. Growing toward negative
//! coordinates pushes slots onto the front and lowers the offsets, so slot
//! indices stay non-negative without reallocating the existing rows. Only the
//! region the camera has touched is ever stored, and [`ChunkMatrix::trim`]
//! gives memory back when edges fall empty.

use std::collections::VecDeque;

use crate::coords::{ChunkCoord, ChunkRange};

/// Number of rows and columns to drop from each edge of a matrix
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Trim {
    pub leading_rows: usize,
    pub trailing_rows: usize,
    pub leading_cols: usize,
    pub trailing_cols: usize,
}

impl Trim {
    pub fn is_noop(&self) -> bool {
        *self == Trim::default()
    }
}

/// Rectangular grid of optional chunks with a movable origin.
#[derive(Debug, Clone)]
pub struct ChunkMatrix<T> {
    /// Slots, `rows[row][col]`; every row has exactly `width` slots
    rows: VecDeque<VecDeque<Option<T>>>,
    width: usize,
    /// Chunk row stored in `rows[0]`
    row_offset: i64,
    /// Chunk column stored in `rows[_][0]`
    col_offset: i64,
}

impl<T> ChunkMatrix<T> {
    /// Create an empty matrix anchored at chunk (0, 0).
    pub fn new() -> Self {
        Self {
            rows: VecDeque::new(),
            width: 0,
            row_offset: 0,
            col_offset: 0,
        }
    }

    /// Whether the matrix stores no slots at all.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of stored rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of stored columns.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn row_offset(&self) -> i64 {
        self.row_offset
    }

    pub fn col_offset(&self) -> i64 {
        self.col_offset
    }

    /// Chunk coordinates covered by the stored slots, or `None` when empty.
    pub fn extent(&self) -> Option<ChunkRange> {
        if self.is_empty() {
            return None;
        }
        Some(ChunkRange::new(
            self.col_offset,
            self.row_offset,
            self.col_offset + self.width as i64 - 1,
            self.row_offset + self.rows.len() as i64 - 1,
        ))
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.iter().filter(|slot| slot.is_some()).count())
            .sum()
    }

    /// Drop every slot and move the origin to `origin`.
    ///
    /// Used to place a fresh matrix near the first region the camera looks
    /// at instead of at chunk (0, 0).
    pub fn anchor(&mut self, origin: ChunkCoord) {
        self.rows.clear();
        self.width = 0;
        self.row_offset = origin.y;
        self.col_offset = origin.x;
    }

    /// Translate a chunk coordinate into `(row, col)` slot indices.
    ///
    /// Returns `None` for coordinates outside the stored rectangle.
    pub fn index_of(&self, coord: ChunkCoord) -> Option<(usize, usize)> {
        let row = usize::try_from(coord.y.checked_sub(self.row_offset)?).ok()?;
        let col = usize::try_from(coord.x.checked_sub(self.col_offset)?).ok()?;
        if row >= self.rows.len() || col >= self.width {
            return None;
        }
        Some((row, col))
    }

    /// Get a reference to the chunk stored at `coord`.
    pub fn get(&self, coord: ChunkCoord) -> Option<&T> {
        let (row, col) = self.index_of(coord)?;
        self.rows[row][col].as_ref()
    }

    /// Get a mutable reference to the chunk stored at `coord`.
    pub fn get_mut(&mut self, coord: ChunkCoord) -> Option<&mut T> {
        let (row, col) = self.index_of(coord)?;
        self.rows[row][col].as_mut()
    }

    /// Grow the rectangle until `coord` is addressable and return its indices.
    ///
    /// Leading growth lowers the offsets so every existing chunk keeps its
    /// coordinate. New slots start empty.
    pub fn grow_to_include(&mut self, coord: ChunkCoord) -> (usize, usize) {
        if coord.x < self.col_offset {
            let extra = (self.col_offset - coord.x) as usize;
            for row in self.rows.iter_mut() {
                for _ in 0..extra {
                    row.push_front(None);
                }
            }
            self.width += extra;
            self.col_offset = coord.x;
        }
        let last_col = self.col_offset + self.width as i64 - 1;
        if coord.x > last_col {
            let extra = (coord.x - last_col) as usize;
            for row in self.rows.iter_mut() {
                row.extend((0..extra).map(|_| None));
            }
            self.width += extra;
        }

        if coord.y < self.row_offset {
            let extra = (self.row_offset - coord.y) as usize;
            for _ in 0..extra {
                let row = self.empty_row();
                self.rows.push_front(row);
            }
            self.row_offset = coord.y;
        }
        let last_row = self.row_offset + self.rows.len() as i64 - 1;
        if coord.y > last_row {
            let extra = (coord.y - last_row) as usize;
            for _ in 0..extra {
                let row = self.empty_row();
                self.rows.push_back(row);
            }
        }

        (
            (coord.y - self.row_offset) as usize,
            (coord.x - self.col_offset) as usize,
        )
    }

    /// Slot for `coord`, growing the matrix first if needed.
    pub fn slot_mut(&mut self, coord: ChunkCoord) -> &mut Option<T> {
        let (row, col) = self.grow_to_include(coord);
        &mut self.rows[row][col]
    }

    /// Insert a chunk, returning the previous occupant.
    pub fn insert(&mut self, coord: ChunkCoord, value: T) -> Option<T> {
        self.slot_mut(coord).replace(value)
    }

    /// Clear the slot at `coord`. Never shrinks the matrix.
    pub fn remove(&mut self, coord: ChunkCoord) -> Option<T> {
        let (row, col) = self.index_of(coord)?;
        self.rows[row][col].take()
    }

    /// Iterate over occupied slots with their chunk coordinates, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (ChunkCoord, &T)> {
        let (row_offset, col_offset) = (self.row_offset, self.col_offset);
        self.rows.iter().enumerate().flat_map(move |(r, row)| {
            row.iter().enumerate().filter_map(move |(c, slot)| {
                slot.as_ref().map(|value| {
                    (
                        ChunkCoord::new(col_offset + c as i64, row_offset + r as i64),
                        value,
                    )
                })
            })
        })
    }

    /// Iterate mutably over occupied slots with their chunk coordinates.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ChunkCoord, &mut T)> {
        let (row_offset, col_offset) = (self.row_offset, self.col_offset);
        self.rows.iter_mut().enumerate().flat_map(move |(r, row)| {
            row.iter_mut().enumerate().filter_map(move |(c, slot)| {
                slot.as_mut().map(|value| {
                    (
                        ChunkCoord::new(col_offset + c as i64, row_offset + r as i64),
                        value,
                    )
                })
            })
        })
    }

    /// Iterate over every slot, occupied or not, with its chunk coordinate.
    pub(crate) fn slots_mut(&mut self) -> impl Iterator<Item = (ChunkCoord, &mut Option<T>)> {
        let (row_offset, col_offset) = (self.row_offset, self.col_offset);
        self.rows.iter_mut().enumerate().flat_map(move |(r, row)| {
            row.iter_mut().enumerate().map(move |(c, slot)| {
                (
                    ChunkCoord::new(col_offset + c as i64, row_offset + r as i64),
                    slot,
                )
            })
        })
    }

    /// Whether every slot of row index `row` is empty.
    pub fn row_is_empty(&self, row: usize) -> bool {
        self.rows
            .get(row)
            .map_or(true, |slots| slots.iter().all(Option::is_none))
    }

    /// Whether every slot of column index `col` is empty within `rows`.
    pub fn col_is_empty(&self, col: usize, rows: std::ops::Range<usize>) -> bool {
        self.rows
            .range(rows)
            .all(|slots| slots.get(col).map_or(true, Option::is_none))
    }

    /// Drop rows and columns from the edges of the rectangle.
    ///
    /// Leading removals raise the offsets so surviving chunks keep their
    /// coordinates. Counts larger than the matrix simply empty it, and a
    /// matrix left without rows or columns is reset to empty.
    pub fn trim(&mut self, trim: Trim) {
        let leading_rows = trim.leading_rows.min(self.rows.len());
        self.rows.drain(..leading_rows);
        self.row_offset += leading_rows as i64;

        let trailing_rows = trim.trailing_rows.min(self.rows.len());
        self.rows.truncate(self.rows.len() - trailing_rows);

        let leading_cols = trim.leading_cols.min(self.width);
        let trailing_cols = trim.trailing_cols.min(self.width - leading_cols);
        for row in self.rows.iter_mut() {
            row.drain(..leading_cols);
            row.truncate(row.len() - trailing_cols);
        }
        self.width -= leading_cols + trailing_cols;
        self.col_offset += leading_cols as i64;

        if self.rows.is_empty() || self.width == 0 {
            self.rows.clear();
            self.width = 0;
        }
    }

    fn empty_row(&self) -> VecDeque<Option<T>> {
        (0..self.width).map(|_| None).collect()
    }
}

impl<T> Default for ChunkMatrix<T> {
    fn default() -> Self {
        Self::new()
    }
}
