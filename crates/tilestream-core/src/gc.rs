//! Garbage collection of off-screen chunks.
//!
//! A sweep clears every live slot outside the keep-alive range that the
//! caller's predicate condemns, then the matrix edges that fell empty are
//! trimmed so storage follows the camera instead of the whole visited area.

use tracing::debug;

use crate::coords::ChunkRange;
use crate::matrix::{ChunkMatrix, Trim};

/// Outcome of one collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GcReport {
    /// Chunks dropped by the sweep
    pub removed: usize,
    /// Rows and columns dropped from the matrix edges
    pub trim: Trim,
}

/// Sweep `matrix` and compact its edges.
///
/// Slots inside `keep` are never handed to `condemn`, even when they lie
/// inside the stored rectangle. Edge rows and columns are only removed when
/// every slot in them is empty and they do not overlap `keep`.
pub fn collect<T, F>(matrix: &mut ChunkMatrix<T>, keep: &ChunkRange, mut condemn: F) -> GcReport
where
    F: FnMut(&T) -> bool,
{
    let mut removed = 0;
    for (coord, slot) in matrix.slots_mut() {
        if keep.contains(coord) {
            continue;
        }
        if slot.as_ref().is_some_and(|chunk| condemn(chunk)) {
            *slot = None;
            removed += 1;
        }
    }

    let trim = edges_to_trim(matrix, keep);
    if !trim.is_noop() {
        matrix.trim(trim);
    }

    if removed > 0 || !trim.is_noop() {
        debug!(
            removed,
            ?trim,
            height = matrix.height(),
            width = matrix.width(),
            "Collected off-screen chunks"
        );
    }

    GcReport { removed, trim }
}

/// Count the empty, non-kept rows and columns on each edge of `matrix`.
fn edges_to_trim<T>(matrix: &ChunkMatrix<T>, keep: &ChunkRange) -> Trim {
    let height = matrix.height();
    let width = matrix.width();
    let row_offset = matrix.row_offset();
    let col_offset = matrix.col_offset();

    let row_removable =
        |row: usize| !keep.contains_y(row_offset + row as i64) && matrix.row_is_empty(row);

    let leading_rows = (0..height).take_while(|&row| row_removable(row)).count();
    let trailing_rows = (leading_rows..height)
        .rev()
        .take_while(|&row| row_removable(row))
        .count();

    // Columns are judged only over the rows that survive.
    let rows = leading_rows..height - trailing_rows;
    if rows.is_empty() {
        return Trim {
            leading_rows,
            trailing_rows,
            leading_cols: 0,
            trailing_cols: 0,
        };
    }

    let col_removable = |col: usize| {
        !keep.contains_x(col_offset + col as i64) && matrix.col_is_empty(col, rows.clone())
    };

    let leading_cols = (0..width).take_while(|&col| col_removable(col)).count();
    let trailing_cols = (leading_cols..width)
        .rev()
        .take_while(|&col| col_removable(col))
        .count();

    Trim {
        leading_rows,
        trailing_rows,
        leading_cols,
        trailing_cols,
    }
}
