use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::coords::{CellRange, ChunkRange};
use crate::geometry::MapGeometry;
use crate::render::Engine;

/// Cells of padding kept around the visible area, so chunks are ready
/// before they scroll into view
pub const VIEWPORT_MARGIN_CELLS: i64 = 2;

/// Chunk ranges derived from one frame's viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportChunks {
    /// Chunks under the padded viewport; may reach outside the map
    pub on_screen: ChunkRange,
    /// `on_screen` clamped to valid chunk coordinates
    pub clamped: ChunkRange,
}

impl ViewportChunks {
    /// Whether any valid chunk is visible at all
    pub fn has_visible_chunks(&self) -> bool {
        self.clamped.intersects(&self.on_screen)
    }
}

/// Padded cell range covered by the world-space rectangle `upper_left..lower_right`
pub fn cell_range(geometry: &MapGeometry, upper_left: DVec2, lower_right: DVec2) -> CellRange {
    let start = geometry.cell_at_point(upper_left);
    let end = geometry.cell_at_point(lower_right);
    CellRange::new(start.x, start.y, end.x, end.y).expand(VIEWPORT_MARGIN_CELLS)
}

/// Map the engine's current viewport to chunk ranges
pub fn viewport_chunks<E: Engine>(geometry: &MapGeometry, engine: &E) -> ViewportChunks {
    let (upper_left, lower_right) = engine.visible_world_bounds();
    let on_screen = cell_range(geometry, upper_left, lower_right).to_chunks(geometry.chunk_size);
    ViewportChunks {
        on_screen,
        clamped: on_screen.clamp(geometry.chunk_cols, geometry.chunk_rows),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TileMapConfig;
    use crate::testing::MockEngine;

    fn geometry(x: f64, y: f64) -> MapGeometry {
        TileMapConfig {
            x,
            y,
            chunk_size: 4,
            cell_width: 10.0,
            cell_height: 10.0,
            rows: 16,
            cols: 16,
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn test_cell_range_has_margin() {
        let range = cell_range(&geometry(0.0, 0.0), DVec2::new(0.0, 0.0), DVec2::new(80.0, 80.0));
        assert_eq!(range, CellRange::new(-2, -2, 10, 10));
    }

    #[test]
    fn test_cell_range_respects_map_anchor() {
        let range = cell_range(
            &geometry(100.0, -40.0),
            DVec2::new(100.0, -40.0),
            DVec2::new(125.0, -15.0),
        );
        assert_eq!(range, CellRange::new(-2, -2, 4, 4));
    }

    #[test]
    fn test_viewport_at_origin() {
        // 55px canvas: cells 0..=5, padded to -2..=7, chunks -1..=1
        let engine = MockEngine::new(DVec2::ZERO, DVec2::new(55.0, 55.0));
        let chunks = viewport_chunks(&geometry(0.0, 0.0), &engine);
        assert_eq!(chunks.on_screen, ChunkRange::new(-1, -1, 1, 1));
        assert_eq!(chunks.clamped, ChunkRange::new(0, 0, 1, 1));
        assert!(chunks.has_visible_chunks());
    }

    #[test]
    fn test_viewport_beyond_map() {
        let engine = MockEngine::new(DVec2::new(1000.0, 0.0), DVec2::new(55.0, 55.0));
        let chunks = viewport_chunks(&geometry(0.0, 0.0), &engine);
        assert_eq!(chunks.on_screen, ChunkRange::new(24, -1, 26, 1));
        assert_eq!(chunks.clamped, ChunkRange::new(3, 0, 3, 1));
        assert!(!chunks.has_visible_chunks());
    }

    #[test]
    fn test_viewport_straddling_edge() {
        let engine = MockEngine::new(DVec2::new(-100.0, 140.0), DVec2::new(120.0, 40.0));
        let chunks = viewport_chunks(&geometry(0.0, 0.0), &engine);
        // cells x -10..=2, y 14..=18 before padding
        assert_eq!(chunks.on_screen, ChunkRange::new(-3, 3, 1, 5));
        assert_eq!(chunks.clamped, ChunkRange::new(0, 3, 1, 3));
        assert!(chunks.has_visible_chunks());
    }

    #[test]
    fn test_zoomed_viewport() {
        let mut engine = MockEngine::new(DVec2::ZERO, DVec2::new(100.0, 100.0));
        engine.zoom = 2.0;
        let chunks = viewport_chunks(&geometry(0.0, 0.0), &engine);
        // world 0..50 -> cells 0..=5
        assert_eq!(chunks.on_screen, ChunkRange::new(-1, -1, 1, 1));
    }
}
