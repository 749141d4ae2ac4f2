use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::ChunkSystemError;
use crate::geometry::MapGeometry;

/// Largest integer a JS number represents exactly (2^53 - 1)
pub const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_991;

/// User-facing configuration of a chunked tile map.
///
/// Field names are camelCase on the wire so the same struct deserializes from
/// a JS options object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileMapConfig {
    /// World x of the map's top-left corner
    #[serde(default)]
    pub x: f64,
    /// World y of the map's top-left corner
    #[serde(default)]
    pub y: f64,
    /// Chunk edge length in cells
    pub chunk_size: i64,
    pub cell_width: f64,
    pub cell_height: f64,
    /// Total rows of cells; must be a multiple of `chunk_size`
    pub rows: i64,
    /// Total columns of cells; must be a multiple of `chunk_size`
    pub cols: i64,
}

fn is_positive_safe_integer(value: i64) -> bool {
    (1..=MAX_SAFE_INTEGER).contains(&value)
}

impl TileMapConfig {
    /// Check the configuration and derive the chunk grid dimensions
    pub fn validate(&self) -> Result<MapGeometry, ChunkSystemError> {
        if !is_positive_safe_integer(self.chunk_size) {
            return Err(ChunkSystemError::InvalidChunkSize(self.chunk_size));
        }
        if !is_positive_safe_integer(self.rows) {
            return Err(ChunkSystemError::InvalidRows(self.rows));
        }
        if !is_positive_safe_integer(self.cols) {
            return Err(ChunkSystemError::InvalidCols(self.cols));
        }
        if self.rows % self.chunk_size != 0 {
            return Err(ChunkSystemError::RowsNotMultiple {
                rows: self.rows,
                chunk_size: self.chunk_size,
            });
        }
        if self.cols % self.chunk_size != 0 {
            return Err(ChunkSystemError::ColsNotMultiple {
                cols: self.cols,
                chunk_size: self.chunk_size,
            });
        }
        let cell_ok = |v: f64| v.is_finite() && v > 0.0;
        if !cell_ok(self.cell_width) || !cell_ok(self.cell_height) {
            return Err(ChunkSystemError::InvalidCellSize {
                width: self.cell_width,
                height: self.cell_height,
            });
        }

        Ok(MapGeometry {
            pos: DVec2::new(self.x, self.y),
            cell_width: self.cell_width,
            cell_height: self.cell_height,
            chunk_size: self.chunk_size,
            rows: self.rows,
            cols: self.cols,
            chunk_rows: self.rows / self.chunk_size,
            chunk_cols: self.cols / self.chunk_size,
        })
    }
}
