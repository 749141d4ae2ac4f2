//! A plain, fixed-size tile map: the default chunk type.
//!
//! Each cell carries a stack of sprite references resolved against the sprite
//! sheets registered on the map. Off-screen culling restricts drawing to the
//! window of cells the camera saw during the last `update`.

use std::collections::HashMap;
use std::ops::Range;
use std::rc::Rc;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::geometry::Rect;
use crate::grid::{GridChunk, GridOptions};
use crate::render::{Engine, ImageOf, RenderContext};

/// Reference to one sprite of a registered sprite sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteRef {
    pub sheet: String,
    pub index: usize,
}

impl SpriteRef {
    pub fn new(sheet: impl Into<String>, index: usize) -> Self {
        Self {
            sheet: sheet.into(),
            index,
        }
    }
}

/// A single tile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    /// World x of the cell's top-left corner
    pub x: f64,
    /// World y of the cell's top-left corner
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Row-major index within the owning tile map
    pub index: usize,
    #[serde(default)]
    pub solid: bool,
    /// Sprites drawn bottom to top
    #[serde(default)]
    pub graphics: Vec<SpriteRef>,
}

impl Cell {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn add_graphic(&mut self, sprite: SpriteRef) {
        self.graphics.push(sprite);
    }

    pub fn clear_graphics(&mut self) {
        self.graphics.clear();
    }
}

/// An image sliced into sprite rectangles
#[derive(Debug, Clone)]
pub struct SpriteSheet<I> {
    pub image: I,
    /// Source rectangles in image pixels, addressed by sprite index
    pub sprites: Vec<Rect>,
}

impl<I> SpriteSheet<I> {
    pub fn new(image: I, sprites: Vec<Rect>) -> Self {
        Self { image, sprites }
    }

    /// Slice an atlas laid out as `columns × rows` equal sprites, row-major
    pub fn from_grid(
        image: I,
        sprite_width: f64,
        sprite_height: f64,
        columns: usize,
        rows: usize,
    ) -> Self {
        let sprites = (0..rows)
            .flat_map(|row| {
                (0..columns).map(move |col| {
                    Rect::new(
                        col as f64 * sprite_width,
                        row as f64 * sprite_height,
                        sprite_width,
                        sprite_height,
                    )
                })
            })
            .collect();
        Self { image, sprites }
    }

    pub fn sprite(&self, index: usize) -> Option<Rect> {
        self.sprites.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}

/// Fixed-size grid of [`Cell`]s drawn from shared sprite sheets
#[derive(Debug)]
pub struct TileMap<I> {
    pos: DVec2,
    cols: usize,
    rows: usize,
    cell_width: f64,
    cell_height: f64,
    off_screen_culling: bool,
    cells: Vec<Cell>,
    sprite_sheets: HashMap<String, Rc<SpriteSheet<I>>>,
    /// Cells drawn by the next `draw`, as computed by the last `update`
    visible_cols: Range<usize>,
    visible_rows: Range<usize>,
}

impl<I> TileMap<I> {
    pub fn new(options: GridOptions) -> Self {
        let GridOptions {
            pos,
            cols,
            rows,
            cell_width,
            cell_height,
        } = options;

        let cells = (0..rows * cols)
            .map(|index| Cell {
                x: pos.x + (index % cols) as f64 * cell_width,
                y: pos.y + (index / cols) as f64 * cell_height,
                width: cell_width,
                height: cell_height,
                index,
                solid: false,
                graphics: Vec::new(),
            })
            .collect();

        Self {
            pos,
            cols,
            rows,
            cell_width,
            cell_height,
            off_screen_culling: true,
            cells,
            sprite_sheets: HashMap::new(),
            visible_cols: 0..cols,
            visible_rows: 0..rows,
        }
    }

    pub fn pos(&self) -> DVec2 {
        self.pos
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell_width(&self) -> f64 {
        self.cell_width
    }

    pub fn cell_height(&self) -> f64 {
        self.cell_height
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.pos.x,
            self.pos.y,
            self.cols as f64 * self.cell_width,
            self.rows as f64 * self.cell_height,
        )
    }

    pub fn off_screen_culling(&self) -> bool {
        self.off_screen_culling
    }

    pub fn set_off_screen_culling(&mut self, enabled: bool) {
        self.off_screen_culling = enabled;
    }

    pub fn cell(&self, col: usize, row: usize) -> Option<&Cell> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.cells.get(row * self.cols + col)
    }

    pub fn cell_mut(&mut self, col: usize, row: usize) -> Option<&mut Cell> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.cells.get_mut(row * self.cols + col)
    }

    pub fn cell_by_index(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    pub fn set_cell_by_index(&mut self, index: usize, cell: Cell) {
        if let Some(slot) = self.cells.get_mut(index) {
            *slot = cell;
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn register_sprite_sheet(&mut self, key: &str, sheet: Rc<SpriteSheet<I>>) {
        self.sprite_sheets.insert(key.to_string(), sheet);
    }

    pub fn sprite_sheet(&self, key: &str) -> Option<&Rc<SpriteSheet<I>>> {
        self.sprite_sheets.get(key)
    }

    /// Cells drawn by the next `draw` as `(cols, rows)` ranges
    pub fn visible_cells(&self) -> (Range<usize>, Range<usize>) {
        (self.visible_cols.clone(), self.visible_rows.clone())
    }

    /// Recompute the drawn window from the world-space corners of the view
    pub fn update_visible(&mut self, upper_left: DVec2, lower_right: DVec2) {
        if !self.off_screen_culling {
            self.visible_cols = 0..self.cols;
            self.visible_rows = 0..self.rows;
            return;
        }

        let span = |lo: f64, hi: f64, origin: f64, size: f64, count: usize| {
            let start = ((lo - origin) / size).floor().max(0.0) as usize;
            let end = ((hi - origin) / size).ceil().max(0.0) as usize;
            start.min(count)..end.min(count)
        };
        self.visible_cols = span(
            upper_left.x,
            lower_right.x,
            self.pos.x,
            self.cell_width,
            self.cols,
        );
        self.visible_rows = span(
            upper_left.y,
            lower_right.y,
            self.pos.y,
            self.cell_height,
            self.rows,
        );
    }

    /// Draw every graphic of the visible cells
    pub fn draw_into<C>(&self, ctx: &mut C)
    where
        C: RenderContext<Image = I>,
    {
        for row in self.visible_rows.clone() {
            for col in self.visible_cols.clone() {
                let cell = &self.cells[row * self.cols + col];
                for graphic in &cell.graphics {
                    let Some(sheet) = self.sprite_sheets.get(&graphic.sheet) else {
                        continue;
                    };
                    if let Some(src) = sheet.sprite(graphic.index) {
                        ctx.draw_image_region(&sheet.image, src, cell.rect());
                    }
                }
            }
        }
    }

    /// Outline the map and fill its solid cells
    pub fn debug_draw_into<C: RenderContext>(&self, ctx: &mut C) {
        ctx.stroke_rect(self.bounds());
        for cell in self.cells.iter().filter(|c| c.solid) {
            ctx.fill_rect(cell.rect());
        }
    }
}

impl<E: Engine> GridChunk<E> for TileMap<ImageOf<E>> {
    type Cell = Cell;
    type Sheet = SpriteSheet<ImageOf<E>>;

    fn from_options(options: GridOptions) -> Self {
        TileMap::new(options)
    }

    fn pos(&self) -> DVec2 {
        self.pos
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn rows(&self) -> usize {
        self.rows
    }

    fn cell_width(&self) -> f64 {
        self.cell_width
    }

    fn cell_height(&self) -> f64 {
        self.cell_height
    }

    fn off_screen_culling(&self) -> bool {
        self.off_screen_culling
    }

    fn set_off_screen_culling(&mut self, enabled: bool) {
        self.off_screen_culling = enabled;
    }

    fn cell(&self, col: usize, row: usize) -> Option<&Cell> {
        TileMap::cell(self, col, row)
    }

    fn cell_mut(&mut self, col: usize, row: usize) -> Option<&mut Cell> {
        TileMap::cell_mut(self, col, row)
    }

    fn cell_by_index(&self, index: usize) -> Option<&Cell> {
        TileMap::cell_by_index(self, index)
    }

    fn set_cell_by_index(&mut self, index: usize, cell: Cell) {
        TileMap::set_cell_by_index(self, index, cell);
    }

    fn register_sprite_sheet(&mut self, key: &str, sheet: Rc<Self::Sheet>) {
        TileMap::register_sprite_sheet(self, key, sheet);
    }

    fn update(&mut self, engine: &E, _elapsed_ms: f64) {
        let (upper_left, lower_right) = engine.visible_world_bounds();
        self.update_visible(upper_left, lower_right);
    }

    fn draw(&mut self, ctx: &mut E::Context, _elapsed_ms: f64) {
        self.draw_into(ctx);
    }

    fn debug_draw(&mut self, ctx: &mut E::Context) {
        self.debug_draw_into(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{DrawOp, MockEngine, RecordingContext, TestImage};

    fn tile_map(x: f64, y: f64) -> TileMap<TestImage> {
        TileMap::new(GridOptions {
            pos: DVec2::new(x, y),
            cols: 4,
            rows: 4,
            cell_width: 10.0,
            cell_height: 10.0,
        })
    }

    #[test]
    fn test_cells_are_positioned_row_major() {
        let map = tile_map(100.0, 50.0);
        let cell = map.cell(2, 1).unwrap();
        assert_eq!(cell.index, 6);
        assert_eq!((cell.x, cell.y), (120.0, 60.0));
        assert_eq!(map.cell_by_index(6), Some(cell));
        assert!(map.cell(4, 0).is_none());
        assert!(map.cell(0, 4).is_none());
    }

    #[test]
    fn test_set_cell_by_index() {
        let mut map = tile_map(0.0, 0.0);
        let mut cell = map.cell_by_index(3).cloned().unwrap();
        cell.solid = true;
        map.set_cell_by_index(3, cell);
        assert!(map.cell(3, 0).unwrap().solid);

        // out of range is ignored
        let stray = map.cell_by_index(0).cloned().unwrap();
        map.set_cell_by_index(99, stray);
        assert_eq!(map.cells().count(), 16);
    }

    #[test]
    fn test_sprite_sheet_from_grid() {
        let sheet = SpriteSheet::from_grid(TestImage::Atlas(1), 16.0, 8.0, 3, 2);
        assert_eq!(sheet.len(), 6);
        assert_eq!(sheet.sprite(0), Some(Rect::new(0.0, 0.0, 16.0, 8.0)));
        assert_eq!(sheet.sprite(4), Some(Rect::new(16.0, 8.0, 16.0, 8.0)));
        assert_eq!(sheet.sprite(6), None);
    }

    #[test]
    fn test_update_visible_culls_to_view() {
        let mut map = tile_map(0.0, 0.0);
        map.update_visible(DVec2::new(15.0, -20.0), DVec2::new(25.0, 5.0));
        assert_eq!(map.visible_cells(), (1..3, 0..1));

        map.update_visible(DVec2::new(500.0, 500.0), DVec2::new(600.0, 600.0));
        let (cols, rows) = map.visible_cells();
        assert!(cols.is_empty() && rows.is_empty());
    }

    #[test]
    fn test_update_visible_without_culling() {
        let mut map = tile_map(0.0, 0.0);
        map.set_off_screen_culling(false);
        map.update_visible(DVec2::new(500.0, 500.0), DVec2::new(600.0, 600.0));
        assert_eq!(map.visible_cells(), (0..4, 0..4));
    }

    #[test]
    fn test_draw_resolves_sprites() {
        let mut map = tile_map(0.0, 0.0);
        map.register_sprite_sheet(
            "tiles",
            Rc::new(SpriteSheet::from_grid(TestImage::Atlas(7), 10.0, 10.0, 2, 1)),
        );
        map.cell_mut(1, 1).unwrap().add_graphic(SpriteRef::new("tiles", 1));
        map.cell_mut(2, 2).unwrap().add_graphic(SpriteRef::new("missing", 0));
        map.cell_mut(3, 3).unwrap().add_graphic(SpriteRef::new("tiles", 9));

        let engine = MockEngine::new(DVec2::ZERO, DVec2::new(40.0, 40.0));
        GridChunk::<MockEngine>::update(&mut map, &engine, 16.0);

        let mut ctx = RecordingContext::default();
        map.draw_into(&mut ctx);
        assert_eq!(
            ctx.ops,
            vec![DrawOp::Region {
                image: TestImage::Atlas(7),
                src: Rect::new(10.0, 0.0, 10.0, 10.0),
                dest: Rect::new(10.0, 10.0, 10.0, 10.0),
            }]
        );
    }

    #[test]
    fn test_debug_draw_outlines_and_fills_solid() {
        let mut map = tile_map(0.0, 0.0);
        map.cell_mut(0, 0).unwrap().solid = true;

        let mut ctx = RecordingContext::default();
        map.debug_draw_into(&mut ctx);
        assert_eq!(
            ctx.ops,
            vec![
                DrawOp::Stroke(Rect::new(0.0, 0.0, 40.0, 40.0)),
                DrawOp::Fill(Rect::new(0.0, 0.0, 10.0, 10.0)),
            ]
        );
    }

    #[test]
    fn test_cell_serialization() {
        let mut map = tile_map(0.0, 0.0);
        map.cell_mut(0, 0).unwrap().add_graphic(SpriteRef::new("tiles", 2));
        let json = serde_json::to_value(map.cell(0, 0).unwrap()).unwrap();
        assert_eq!(json["graphics"][0]["sheet"], "tiles");
        assert_eq!(json["solid"], false);
    }
}
