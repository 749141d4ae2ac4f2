use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::coords::{CellCoord, ChunkCoord};
use crate::grid::GridOptions;

/// Axis-aligned rectangle in world (pixel) space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Half-open containment: the left/top edges are inside, right/bottom are not
    pub fn contains(&self, point: DVec2) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }
}

/// Validated, immutable geometry of a chunked tile map.
///
/// This is the read-only view of the map handed to generators and
/// predicates. Build it through [`crate::TileMapConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapGeometry {
    /// World position of cell (0, 0)'s top-left corner
    pub pos: DVec2,
    pub cell_width: f64,
    pub cell_height: f64,
    /// Chunk edge length in cells
    pub chunk_size: i64,
    pub rows: i64,
    pub cols: i64,
    pub chunk_rows: i64,
    pub chunk_cols: i64,
}

impl MapGeometry {
    /// Cell containing a world-space point
    pub fn cell_at_point(&self, point: DVec2) -> CellCoord {
        let local = point - self.pos;
        CellCoord::new(
            (local.x / self.cell_width).floor() as i64,
            (local.y / self.cell_height).floor() as i64,
        )
    }

    /// World rectangle covered by a cell
    pub fn cell_rect(&self, cell: CellCoord) -> Rect {
        Rect::new(
            self.pos.x + cell.x as f64 * self.cell_width,
            self.pos.y + cell.y as f64 * self.cell_height,
            self.cell_width,
            self.cell_height,
        )
    }

    /// World position of a chunk's top-left corner
    pub fn chunk_position(&self, coord: ChunkCoord) -> DVec2 {
        let origin = coord.origin_cell(self.chunk_size);
        self.pos
            + DVec2::new(
                origin.x as f64 * self.cell_width,
                origin.y as f64 * self.cell_height,
            )
    }

    /// Pixel size of one chunk
    pub fn chunk_extent(&self) -> DVec2 {
        DVec2::new(
            self.chunk_size as f64 * self.cell_width,
            self.chunk_size as f64 * self.cell_height,
        )
    }

    /// Construction options for the grid that backs `coord`
    pub fn chunk_options(&self, coord: ChunkCoord) -> GridOptions {
        GridOptions {
            pos: self.chunk_position(coord),
            cols: self.chunk_size as usize,
            rows: self.chunk_size as usize,
            cell_width: self.cell_width,
            cell_height: self.cell_height,
        }
    }
}
