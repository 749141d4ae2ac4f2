//! Seams between the tile map and the host engine.
//!
//! The map never talks to a canvas directly. A backend implements
//! [`RenderContext`] for its drawing surface and [`Engine`] for viewport
//! queries and offscreen allocation; everything above this module is generic
//! over those two traits.

use glam::DVec2;

use crate::geometry::Rect;

/// A drawing surface.
pub trait RenderContext {
    /// Anything that can be drawn: loaded images and rasterised offscreen surfaces
    type Image;

    fn save(&mut self);

    fn restore(&mut self);

    /// Shift the origin of subsequent draws
    fn translate(&mut self, dx: f64, dy: f64);

    /// Draw a whole image with its top-left corner at `(x, y)`
    fn draw_image(&mut self, image: &Self::Image, x: f64, y: f64);

    /// Draw the `src` region of an image scaled into `dest`
    fn draw_image_region(&mut self, image: &Self::Image, src: Rect, dest: Rect);

    /// Outline a rectangle (debug drawing)
    fn stroke_rect(&mut self, rect: Rect);

    /// Fill a rectangle (debug drawing)
    fn fill_rect(&mut self, rect: Rect);

    /// Finish an offscreen surface and turn it into a drawable image
    fn into_image(self) -> Self::Image
    where
        Self: Sized;
}

/// Viewport and surface services the engine exposes to tile maps.
pub trait Engine {
    type Context: RenderContext;

    /// Convert a point in canvas pixels to world coordinates
    fn screen_to_world(&self, screen: DVec2) -> DVec2;

    /// Client size of the canvas in pixels
    fn canvas_size(&self) -> DVec2;

    /// Allocate a blank offscreen surface of `width × height` pixels.
    ///
    /// Returns `None` when the backend cannot provide one.
    fn create_offscreen(&self, width: u32, height: u32) -> Option<Self::Context>;

    /// World-space corners of the visible canvas: upper-left, lower-right
    fn visible_world_bounds(&self) -> (DVec2, DVec2) {
        (
            self.screen_to_world(DVec2::ZERO),
            self.screen_to_world(self.canvas_size()),
        )
    }
}

/// Image type drawn by an engine's render context
pub type ImageOf<E> = <<E as Engine>::Context as RenderContext>::Image;
