//! Canvas 2D backend: the engine and render context the browser build runs on.

use glam::DVec2;
use tilestream_core::{Engine, Rect, RenderContext};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

/// Anything the canvas can draw from
#[derive(Debug, Clone)]
pub enum WebImage {
    Image(HtmlImageElement),
    /// An offscreen canvas, as produced by the rendering cache
    Canvas(HtmlCanvasElement),
}

/// Camera position and zoom; pure math, no DOM access
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// World point shown at the canvas' top-left corner
    pub position: DVec2,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: DVec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Camera {
    pub fn screen_to_world(&self, screen: DVec2) -> DVec2 {
        self.position + screen / self.zoom
    }

    pub fn world_to_screen(&self, world: DVec2) -> DVec2 {
        (world - self.position) * self.zoom
    }
}

fn log_failure(op: &str, result: Result<(), JsValue>) {
    if let Err(err) = result {
        web_sys::console::warn_2(&format!("[Canvas] {op} failed:").into(), &err);
    }
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
    canvas
        .get_context("2d")
        .ok()
        .flatten()?
        .dyn_into::<CanvasRenderingContext2d>()
        .ok()
}

/// A canvas together with its 2D context
pub struct CanvasContext {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasContext {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = context_2d(&canvas)
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?;
        Ok(Self { canvas, ctx })
    }

    fn offscreen(width: u32, height: u32) -> Option<Self> {
        let document = web_sys::window()?.document()?;
        let canvas = document
            .create_element("canvas")
            .ok()?
            .dyn_into::<HtmlCanvasElement>()
            .ok()?;
        canvas.set_width(width);
        canvas.set_height(height);
        let ctx = context_2d(&canvas)?;
        Some(Self { canvas, ctx })
    }

    /// Clear the canvas and apply the camera transform
    pub fn begin_frame(&mut self, camera: &Camera) {
        log_failure(
            "setTransform",
            self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0),
        );
        self.ctx.clear_rect(
            0.0,
            0.0,
            self.canvas.width() as f64,
            self.canvas.height() as f64,
        );
        self.ctx.save();
        log_failure("scale", self.ctx.scale(camera.zoom, camera.zoom));
        log_failure(
            "translate",
            self.ctx.translate(-camera.position.x, -camera.position.y),
        );
    }

    pub fn end_frame(&mut self) {
        self.ctx.restore();
    }
}

impl RenderContext for CanvasContext {
    type Image = WebImage;

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        log_failure("translate", self.ctx.translate(dx, dy));
    }

    fn draw_image(&mut self, image: &WebImage, x: f64, y: f64) {
        let result = match image {
            WebImage::Image(img) => self.ctx.draw_image_with_html_image_element(img, x, y),
            WebImage::Canvas(canvas) => self.ctx.draw_image_with_html_canvas_element(canvas, x, y),
        };
        log_failure("drawImage", result);
    }

    fn draw_image_region(&mut self, image: &WebImage, src: Rect, dest: Rect) {
        let result = match image {
            WebImage::Image(img) => self
                .ctx
                .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                    img,
                    src.x,
                    src.y,
                    src.width,
                    src.height,
                    dest.x,
                    dest.y,
                    dest.width,
                    dest.height,
                ),
            WebImage::Canvas(canvas) => self
                .ctx
                .draw_image_with_html_canvas_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                    canvas,
                    src.x,
                    src.y,
                    src.width,
                    src.height,
                    dest.x,
                    dest.y,
                    dest.width,
                    dest.height,
                ),
        };
        log_failure("drawImage", result);
    }

    fn stroke_rect(&mut self, rect: Rect) {
        self.ctx.stroke_rect(rect.x, rect.y, rect.width, rect.height);
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.ctx.fill_rect(rect.x, rect.y, rect.width, rect.height);
    }

    fn into_image(self) -> WebImage {
        WebImage::Canvas(self.canvas)
    }
}

/// Viewport backed by the on-page canvas
pub struct WebEngine {
    canvas: HtmlCanvasElement,
    pub camera: Camera,
}

impl WebEngine {
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self {
            canvas,
            camera: Camera::default(),
        }
    }
}

impl Engine for WebEngine {
    type Context = CanvasContext;

    fn screen_to_world(&self, screen: DVec2) -> DVec2 {
        self.camera.screen_to_world(screen)
    }

    fn canvas_size(&self) -> DVec2 {
        DVec2::new(
            self.canvas.client_width() as f64,
            self.canvas.client_height() as f64,
        )
    }

    fn create_offscreen(&self, width: u32, height: u32) -> Option<CanvasContext> {
        let ctx = CanvasContext::offscreen(width, height);
        if ctx.is_none() {
            web_sys::console::warn_1(
                &format!("[Canvas] No {width}x{height} offscreen canvas, drawing live").into(),
            );
        }
        ctx
    }
}
