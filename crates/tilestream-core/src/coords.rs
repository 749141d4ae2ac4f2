//! Cell and chunk coordinates, and the inclusive ranges built from them.
//!
//! Both coordinate spaces are signed: a camera can look at space left of or
//! above the map, and the ranges computed from it must be able to say so.

use serde::{Deserialize, Serialize};

/// Address of a single cell in map space.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct CellCoord {
    pub x: i64,
    pub y: i64,
}

impl CellCoord {
    pub const fn new(x: i64, y: i64) -> Self {
        CellCoord { x, y }
    }

    /// Chunk that owns this cell.
    ///
    /// Uses floor division, so cell `-1` belongs to chunk `-1`, not chunk `0`.
    pub fn chunk(&self, chunk_size: i64) -> ChunkCoord {
        ChunkCoord::new(self.x.div_euclid(chunk_size), self.y.div_euclid(chunk_size))
    }

    /// Offset of this cell inside its owning chunk, always in `0..chunk_size`.
    pub fn local(&self, chunk_size: i64) -> (i64, i64) {
        (self.x.rem_euclid(chunk_size), self.y.rem_euclid(chunk_size))
    }
}

/// Address of a chunk in the chunk grid (column `x`, row `y`).
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub x: i64,
    pub y: i64,
}

impl ChunkCoord {
    pub const fn new(x: i64, y: i64) -> Self {
        ChunkCoord { x, y }
    }

    /// First cell of this chunk (its top-left corner in cell space).
    pub fn origin_cell(&self, chunk_size: i64) -> CellCoord {
        CellCoord::new(self.x * chunk_size, self.y * chunk_size)
    }
}

/// Inclusive rectangle of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRange {
    pub x_start: i64,
    pub y_start: i64,
    pub x_end: i64,
    pub y_end: i64,
}

impl CellRange {
    pub fn new(x_start: i64, y_start: i64, x_end: i64, y_end: i64) -> Self {
        Self {
            x_start,
            y_start,
            x_end,
            y_end,
        }
    }

    /// Grow the range by `margin` cells on every side, saturating at the
    /// `i64` limits
    pub fn expand(&self, margin: i64) -> Self {
        Self {
            x_start: self.x_start.saturating_sub(margin),
            y_start: self.y_start.saturating_sub(margin),
            x_end: self.x_end.saturating_add(margin),
            y_end: self.y_end.saturating_add(margin),
        }
    }

    /// Chunks touched by this range
    pub fn to_chunks(&self, chunk_size: i64) -> ChunkRange {
        ChunkRange {
            x_start: self.x_start.div_euclid(chunk_size),
            y_start: self.y_start.div_euclid(chunk_size),
            x_end: self.x_end.div_euclid(chunk_size),
            y_end: self.y_end.div_euclid(chunk_size),
        }
    }
}

/// Inclusive rectangle of chunk coordinates.
///
/// Ranges produced from the viewport may lie partly or entirely outside the
/// map; [`ChunkRange::clamp`] pulls them back into valid chunk coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRange {
    pub x_start: i64,
    pub y_start: i64,
    pub x_end: i64,
    pub y_end: i64,
}

impl ChunkRange {
    pub fn new(x_start: i64, y_start: i64, x_end: i64, y_end: i64) -> Self {
        Self {
            x_start,
            y_start,
            x_end,
            y_end,
        }
    }

    pub fn start(&self) -> ChunkCoord {
        ChunkCoord::new(self.x_start, self.y_start)
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.contains_x(coord.x) && self.contains_y(coord.y)
    }

    pub fn contains_x(&self, x: i64) -> bool {
        x >= self.x_start && x <= self.x_end
    }

    pub fn contains_y(&self, y: i64) -> bool {
        y >= self.y_start && y <= self.y_end
    }

    /// Whether the two rectangles share at least one chunk
    pub fn intersects(&self, other: &ChunkRange) -> bool {
        self.x_start <= other.x_end
            && other.x_start <= self.x_end
            && self.y_start <= other.y_end
            && other.y_start <= self.y_end
    }

    /// Clamp every bound into `[0, chunk_cols - 1] × [0, chunk_rows - 1]`.
    ///
    /// The result is never empty, even when `self` lies entirely outside the
    /// map; callers check [`ChunkRange::intersects`] against the unclamped
    /// range to detect that case.
    pub fn clamp(&self, chunk_cols: i64, chunk_rows: i64) -> Self {
        let max_x = chunk_cols - 1;
        let max_y = chunk_rows - 1;
        Self {
            x_start: self.x_start.clamp(0, max_x),
            y_start: self.y_start.clamp(0, max_y),
            x_end: self.x_end.clamp(0, max_x),
            y_end: self.y_end.clamp(0, max_y),
        }
    }

    /// Number of chunks in the range (zero when inverted)
    pub fn len(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        ((self.x_end - self.x_start + 1) * (self.y_end - self.y_start + 1)) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.x_end < self.x_start || self.y_end < self.y_start
    }

    /// Iterate chunk coordinates row by row, left to right
    pub fn iter(&self) -> impl Iterator<Item = ChunkCoord> {
        let (x_start, x_end) = (self.x_start, self.x_end);
        (self.y_start..=self.y_end)
            .flat_map(move |y| (x_start..=x_end).map(move |x| ChunkCoord::new(x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_chunk_floor_division() {
        assert_eq!(CellCoord::new(0, 0).chunk(4), ChunkCoord::new(0, 0));
        assert_eq!(CellCoord::new(3, 7).chunk(4), ChunkCoord::new(0, 1));
        assert_eq!(CellCoord::new(-1, -4).chunk(4), ChunkCoord::new(-1, -1));
        assert_eq!(CellCoord::new(-5, 8).chunk(4), ChunkCoord::new(-2, 2));
    }

    #[test]
    fn test_cell_local_offset() {
        assert_eq!(CellCoord::new(5, 6).local(4), (1, 2));
        assert_eq!(CellCoord::new(-1, -4).local(4), (3, 0));
    }

    #[test]
    fn test_chunk_origin_cell() {
        assert_eq!(ChunkCoord::new(2, 3).origin_cell(8), CellCoord::new(16, 24));
        assert_eq!(ChunkCoord::new(-1, 0).origin_cell(8), CellCoord::new(-8, 0));
    }

    #[test]
    fn test_cell_range_to_chunks() {
        let cells = CellRange::new(0, 0, 7, 7).expand(2);
        assert_eq!(cells, CellRange::new(-2, -2, 9, 9));
        assert_eq!(cells.to_chunks(4), ChunkRange::new(-1, -1, 2, 2));
    }

    #[test]
    fn test_expand_saturates() {
        let far = CellRange::new(i64::MAX, i64::MIN, i64::MAX, i64::MIN).expand(2);
        assert_eq!(far, CellRange::new(i64::MAX - 2, i64::MIN, i64::MAX, i64::MIN + 2));

        let chunks = far.to_chunks(4);
        assert!(!chunks.clamp(4, 4).intersects(&chunks));
    }

    #[test]
    fn test_clamp_inside_map() {
        let range = ChunkRange::new(-1, -1, 2, 2);
        assert_eq!(range.clamp(4, 4), ChunkRange::new(0, 0, 2, 2));
        assert_eq!(range.clamp(2, 3), ChunkRange::new(0, 0, 1, 2));
    }

    #[test]
    fn test_clamp_fully_outside_does_not_intersect() {
        let range = ChunkRange::new(-10, 0, -5, 1);
        let clamped = range.clamp(4, 4);
        assert_eq!(clamped, ChunkRange::new(0, 0, 0, 1));
        assert!(!clamped.intersects(&range));

        let straddling = ChunkRange::new(-2, 0, 1, 1);
        assert!(straddling.clamp(4, 4).intersects(&straddling));
    }

    #[test]
    fn test_iter_row_major() {
        let coords: Vec<_> = ChunkRange::new(0, 0, 1, 1).iter().collect();
        assert_eq!(
            coords,
            vec![
                ChunkCoord::new(0, 0),
                ChunkCoord::new(1, 0),
                ChunkCoord::new(0, 1),
                ChunkCoord::new(1, 1),
            ]
        );
    }

    #[test]
    fn test_len_and_empty() {
        assert_eq!(ChunkRange::new(0, 0, 2, 1).len(), 6);
        assert!(ChunkRange::new(3, 0, 2, 0).is_empty());
        assert_eq!(ChunkRange::new(3, 0, 2, 0).len(), 0);
    }

    #[test]
    fn test_contains() {
        let range = ChunkRange::new(-1, -1, 1, 1);
        assert!(range.contains(ChunkCoord::new(0, 0)));
        assert!(range.contains(ChunkCoord::new(-1, 1)));
        assert!(!range.contains(ChunkCoord::new(2, 0)));
        assert!(!range.contains(ChunkCoord::new(0, -2)));
    }
}
