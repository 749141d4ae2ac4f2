use std::rc::Rc;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::render::Engine;

/// Construction options for a fixed-size grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridOptions {
    /// World position of the grid's top-left corner
    pub pos: DVec2,
    pub cols: usize,
    pub rows: usize,
    pub cell_width: f64,
    pub cell_height: f64,
}

/// A fixed-size rectangular grid of cells, used as one chunk of a larger map.
///
/// Cells are addressed by `(col, row)` or by row-major index
/// (`row * cols + col`).
pub trait GridChunk<E: Engine> {
    type Cell: Clone;
    type Sheet;

    /// Build an empty grid
    fn from_options(options: GridOptions) -> Self
    where
        Self: Sized;

    fn pos(&self) -> DVec2;

    fn cols(&self) -> usize;

    fn rows(&self) -> usize;

    fn cell_width(&self) -> f64;

    fn cell_height(&self) -> f64;

    /// Whether `update` restricts drawing to the cells currently on screen
    fn off_screen_culling(&self) -> bool;

    fn set_off_screen_culling(&mut self, enabled: bool);

    fn cell(&self, col: usize, row: usize) -> Option<&Self::Cell>;

    fn cell_mut(&mut self, col: usize, row: usize) -> Option<&mut Self::Cell>;

    fn cell_by_index(&self, index: usize) -> Option<&Self::Cell>;

    /// Replace the cell at a row-major index; out-of-range indices are ignored
    fn set_cell_by_index(&mut self, index: usize, cell: Self::Cell);

    fn register_sprite_sheet(&mut self, key: &str, sheet: Rc<Self::Sheet>);

    /// Per-frame bookkeeping: animation, culling window, dirty state
    fn update(&mut self, engine: &E, elapsed_ms: f64);

    fn draw(&mut self, ctx: &mut E::Context, elapsed_ms: f64);

    fn debug_draw(&mut self, ctx: &mut E::Context);

    fn cell_count(&self) -> usize {
        self.cols() * self.rows()
    }

    /// Size of the whole grid in pixels
    fn pixel_size(&self) -> DVec2 {
        DVec2::new(
            self.cols() as f64 * self.cell_width(),
            self.rows() as f64 * self.cell_height(),
        )
    }
}
