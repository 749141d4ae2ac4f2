//! A render backend with no surface: it counts what would have been drawn.

use std::cell::Cell;

use glam::DVec2;
use serde::Serialize;
use tilestream_core::{Engine, Rect, RenderContext};

#[derive(Debug, Clone, PartialEq)]
pub enum HeadlessImage {
    /// A sprite atlas of the given pixel size
    Atlas { width: u32, height: u32 },
    /// A finished offscreen surface and the calls it absorbed
    Surface {
        width: u32,
        height: u32,
        draws: DrawCounts,
    },
}

/// Per-kind tally of render calls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawCounts {
    /// Whole-image draws; cached chunks are painted this way
    pub blits: u64,
    /// Sprite draws
    pub sprites: u64,
    pub strokes: u64,
    pub fills: u64,
}

impl DrawCounts {
    pub fn total(&self) -> u64 {
        self.blits + self.sprites + self.strokes + self.fills
    }

    pub fn add(&mut self, other: DrawCounts) {
        self.blits += other.blits;
        self.sprites += other.sprites;
        self.strokes += other.strokes;
        self.fills += other.fills;
    }
}

#[derive(Debug, Default)]
pub struct HeadlessContext {
    size: (u32, u32),
    depth: usize,
    pub draws: DrawCounts,
}

impl HeadlessContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unbalanced `save` calls
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl RenderContext for HeadlessContext {
    type Image = HeadlessImage;

    fn save(&mut self) {
        self.depth += 1;
    }

    fn restore(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn translate(&mut self, _dx: f64, _dy: f64) {}

    fn draw_image(&mut self, _image: &HeadlessImage, _x: f64, _y: f64) {
        self.draws.blits += 1;
    }

    fn draw_image_region(&mut self, _image: &HeadlessImage, _src: Rect, _dest: Rect) {
        self.draws.sprites += 1;
    }

    fn stroke_rect(&mut self, _rect: Rect) {
        self.draws.strokes += 1;
    }

    fn fill_rect(&mut self, _rect: Rect) {
        self.draws.fills += 1;
    }

    fn into_image(self) -> HeadlessImage {
        HeadlessImage::Surface {
            width: self.size.0,
            height: self.size.1,
            draws: self.draws,
        }
    }
}

/// Fixed-size viewport at zoom 1, moved by the simulation
#[derive(Debug)]
pub struct HeadlessEngine {
    camera: DVec2,
    viewport: DVec2,
    offscreens: Cell<u64>,
}

impl HeadlessEngine {
    pub fn new(camera: DVec2, viewport: DVec2) -> Self {
        Self {
            camera,
            viewport,
            offscreens: Cell::new(0),
        }
    }

    pub fn camera(&self) -> DVec2 {
        self.camera
    }

    pub fn look_at(&mut self, camera: DVec2) {
        self.camera = camera;
    }

    /// Offscreen surfaces handed out so far
    pub fn offscreens(&self) -> u64 {
        self.offscreens.get()
    }
}

impl Engine for HeadlessEngine {
    type Context = HeadlessContext;

    fn screen_to_world(&self, screen: DVec2) -> DVec2 {
        self.camera + screen
    }

    fn canvas_size(&self) -> DVec2 {
        self.viewport
    }

    fn create_offscreen(&self, width: u32, height: u32) -> Option<HeadlessContext> {
        self.offscreens.set(self.offscreens.get() + 1);
        Some(HeadlessContext {
            size: (width, height),
            ..HeadlessContext::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_keeps_its_draws() {
        let engine = HeadlessEngine::new(DVec2::ZERO, DVec2::new(100.0, 50.0));
        let mut ctx = engine.create_offscreen(32, 16).unwrap();
        ctx.save();
        ctx.draw_image_region(
            &HeadlessImage::Atlas {
                width: 16,
                height: 16,
            },
            Rect::new(0.0, 0.0, 16.0, 16.0),
            Rect::new(0.0, 0.0, 16.0, 16.0),
        );
        ctx.restore();

        assert_eq!(engine.offscreens(), 1);
        match ctx.into_image() {
            HeadlessImage::Surface {
                width,
                height,
                draws,
            } => {
                assert_eq!((width, height), (32, 16));
                assert_eq!(draws.sprites, 1);
                assert_eq!(draws.total(), 1);
            }
            other => panic!("unexpected image {other:?}"),
        }
    }

    #[test]
    fn test_visible_bounds_follow_camera() {
        let mut engine = HeadlessEngine::new(DVec2::ZERO, DVec2::new(100.0, 50.0));
        engine.look_at(DVec2::new(-10.0, 20.0));
        assert_eq!(
            engine.visible_world_bounds(),
            (DVec2::new(-10.0, 20.0), DVec2::new(90.0, 70.0))
        );
    }

    #[test]
    fn test_restore_never_underflows() {
        let mut ctx = HeadlessContext::new();
        ctx.restore();
        ctx.save();
        assert_eq!(ctx.depth(), 1);
    }
}
