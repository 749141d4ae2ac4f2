//! Test doubles shared by the unit tests of this crate.

use std::cell::Cell;
use std::rc::Rc;

use glam::DVec2;

use crate::geometry::Rect;
use crate::grid::{GridChunk, GridOptions};
use crate::render::{Engine, RenderContext};

#[derive(Debug, Clone, PartialEq)]
pub enum TestImage {
    /// A loaded sprite atlas
    Atlas(u32),
    /// Result of rendering into an offscreen surface
    Baked {
        width: u32,
        height: u32,
        ops: Vec<DrawOp>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Save,
    Restore,
    Translate(f64, f64),
    Image { image: TestImage, x: f64, y: f64 },
    Region { image: TestImage, src: Rect, dest: Rect },
    Stroke(Rect),
    Fill(Rect),
}

/// Render context that records every call
#[derive(Debug, Default)]
pub struct RecordingContext {
    pub ops: Vec<DrawOp>,
    pub size: Option<(u32, u32)>,
}

impl RenderContext for RecordingContext {
    type Image = TestImage;

    fn save(&mut self) {
        self.ops.push(DrawOp::Save);
    }

    fn restore(&mut self) {
        self.ops.push(DrawOp::Restore);
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.ops.push(DrawOp::Translate(dx, dy));
    }

    fn draw_image(&mut self, image: &TestImage, x: f64, y: f64) {
        self.ops.push(DrawOp::Image {
            image: image.clone(),
            x,
            y,
        });
    }

    fn draw_image_region(&mut self, image: &TestImage, src: Rect, dest: Rect) {
        self.ops.push(DrawOp::Region {
            image: image.clone(),
            src,
            dest,
        });
    }

    fn stroke_rect(&mut self, rect: Rect) {
        self.ops.push(DrawOp::Stroke(rect));
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.ops.push(DrawOp::Fill(rect));
    }

    fn into_image(self) -> TestImage {
        let (width, height) = self.size.unwrap_or((0, 0));
        TestImage::Baked {
            width,
            height,
            ops: self.ops,
        }
    }
}

/// Camera looking at `camera` (world top-left) through a canvas of `canvas` pixels
#[derive(Debug)]
pub struct MockEngine {
    pub camera: DVec2,
    pub canvas: DVec2,
    pub zoom: f64,
    pub offscreen_available: bool,
    pub offscreens: Cell<usize>,
}

impl MockEngine {
    pub fn new(camera: DVec2, canvas: DVec2) -> Self {
        Self {
            camera,
            canvas,
            zoom: 1.0,
            offscreen_available: true,
            offscreens: Cell::new(0),
        }
    }

    pub fn look_at(&mut self, camera: DVec2) {
        self.camera = camera;
    }
}

impl Engine for MockEngine {
    type Context = RecordingContext;

    fn screen_to_world(&self, screen: DVec2) -> DVec2 {
        self.camera + screen / self.zoom
    }

    fn canvas_size(&self) -> DVec2 {
        self.canvas
    }

    fn create_offscreen(&self, width: u32, height: u32) -> Option<RecordingContext> {
        if !self.offscreen_available {
            return None;
        }
        self.offscreens.set(self.offscreens.get() + 1);
        Some(RecordingContext {
            ops: Vec::new(),
            size: Some((width, height)),
        })
    }
}

/// Chunk that records how the map drives it
#[derive(Debug)]
pub struct StubChunk {
    pub options: GridOptions,
    pub culling: bool,
    pub cells: Vec<i64>,
    pub registered: Vec<(String, Rc<String>)>,
    pub updates: usize,
    pub draws: usize,
    pub debug_draws: usize,
    pub culling_during_draw: Vec<bool>,
}

impl StubChunk {
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.options.pos.x,
            self.options.pos.y,
            self.options.cols as f64 * self.options.cell_width,
            self.options.rows as f64 * self.options.cell_height,
        )
    }

    pub fn registrations_of(&self, key: &str) -> usize {
        self.registered.iter().filter(|(k, _)| k == key).count()
    }
}

impl GridChunk<MockEngine> for StubChunk {
    type Cell = i64;
    type Sheet = String;

    fn from_options(options: GridOptions) -> Self {
        Self {
            options,
            culling: true,
            cells: vec![0; options.cols * options.rows],
            registered: Vec::new(),
            updates: 0,
            draws: 0,
            debug_draws: 0,
            culling_during_draw: Vec::new(),
        }
    }

    fn pos(&self) -> DVec2 {
        self.options.pos
    }

    fn cols(&self) -> usize {
        self.options.cols
    }

    fn rows(&self) -> usize {
        self.options.rows
    }

    fn cell_width(&self) -> f64 {
        self.options.cell_width
    }

    fn cell_height(&self) -> f64 {
        self.options.cell_height
    }

    fn off_screen_culling(&self) -> bool {
        self.culling
    }

    fn set_off_screen_culling(&mut self, enabled: bool) {
        self.culling = enabled;
    }

    fn cell(&self, col: usize, row: usize) -> Option<&i64> {
        if col >= self.options.cols {
            return None;
        }
        self.cells.get(row * self.options.cols + col)
    }

    fn cell_mut(&mut self, col: usize, row: usize) -> Option<&mut i64> {
        if col >= self.options.cols {
            return None;
        }
        self.cells.get_mut(row * self.options.cols + col)
    }

    fn cell_by_index(&self, index: usize) -> Option<&i64> {
        self.cells.get(index)
    }

    fn set_cell_by_index(&mut self, index: usize, cell: i64) {
        if let Some(slot) = self.cells.get_mut(index) {
            *slot = cell;
        }
    }

    fn register_sprite_sheet(&mut self, key: &str, sheet: Rc<String>) {
        self.registered.push((key.to_string(), sheet));
    }

    fn update(&mut self, _engine: &MockEngine, _elapsed_ms: f64) {
        self.updates += 1;
    }

    fn draw(&mut self, ctx: &mut RecordingContext, _elapsed_ms: f64) {
        self.draws += 1;
        self.culling_during_draw.push(self.culling);
        ctx.fill_rect(self.bounds());
    }

    fn debug_draw(&mut self, ctx: &mut RecordingContext) {
        self.debug_draws += 1;
        ctx.stroke_rect(self.bounds());
    }
}
