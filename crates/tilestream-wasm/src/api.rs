use std::cell::{Cell as Flag, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use glam::DVec2;
use js_sys::Function;
use serde::{Deserialize, Serialize};
use tilestream_core::{
    cell_builder, Cell, CellCoord, ChunkCoord, ChunkPredicate, ChunkSystemError, ChunkSystemTileMap,
    MapGeometry, SpriteRef, SpriteSheet, Subscription, TileMap, TileMapConfig,
};
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, HtmlImageElement};

use crate::canvas::{CanvasContext, WebEngine, WebImage};

type WebTileMap = TileMap<WebImage>;

/// First exception thrown by a JS callback during the current frame
type CallbackError = Rc<RefCell<Option<JsValue>>>;

/// Chunks whose generation threw during the current frame
type FailedChunks = Rc<RefCell<Vec<ChunkCoord>>>;

fn record(errors: &CallbackError, err: JsValue) {
    let mut slot = errors.borrow_mut();
    if slot.is_none() {
        *slot = Some(err);
    }
}

/// Structured error object for JavaScript
#[derive(Serialize)]
pub struct JsTileStreamError {
    code: String,
    message: String,
}

impl From<ChunkSystemError> for JsTileStreamError {
    fn from(err: ChunkSystemError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

impl JsTileStreamError {
    fn from_error<E: std::fmt::Display>(err: E) -> JsValue {
        let error = Self {
            code: "ERROR".to_string(),
            message: err.to_string(),
        };
        serde_wasm_bindgen::to_value(&error).unwrap_or(JsValue::NULL)
    }
}

fn to_js_error(err: ChunkSystemError) -> JsValue {
    let js_error = JsTileStreamError::from(err);
    serde_wasm_bindgen::to_value(&js_error).unwrap_or(JsValue::NULL)
}

/// Chunk summary handed to JS predicates
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChunkInfo {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub cols: usize,
    pub rows: usize,
}

impl ChunkInfo {
    fn of(chunk: &WebTileMap) -> Self {
        let bounds = chunk.bounds();
        Self {
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
            cols: chunk.cols(),
            rows: chunk.rows(),
        }
    }
}

/// Cell fields JS may set, from a generator or `setCell`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellPatch {
    pub solid: Option<bool>,
    pub graphics: Option<Vec<SpriteRef>>,
}

impl CellPatch {
    fn apply(self, cell: &mut Cell) {
        if let Some(solid) = self.solid {
            cell.solid = solid;
        }
        if let Some(graphics) = self.graphics {
            cell.graphics = graphics;
        }
    }
}

/// Run the JS cell generator for one cell.
///
/// The callback receives `(cell, x, y)` and may return a [`CellPatch`];
/// returning nothing keeps the cell as generated.
fn generate_cell(generator: &Function, cell: &mut Cell, world: CellCoord) -> Result<(), JsValue> {
    let js_cell = serde_wasm_bindgen::to_value(&*cell)?;
    let value = generator.call3(
        &JsValue::NULL,
        &js_cell,
        &JsValue::from_f64(world.x as f64),
        &JsValue::from_f64(world.y as f64),
    )?;
    if value.is_undefined() || value.is_null() {
        return Ok(());
    }
    let patch: CellPatch = serde_wasm_bindgen::from_value(value)?;
    patch.apply(cell);
    Ok(())
}

fn js_predicate(
    predicate: Function,
    errors: CallbackError,
) -> ChunkPredicate<WebEngine, WebTileMap> {
    Box::new(move |chunk: &WebTileMap, _map: &MapGeometry, _engine: &WebEngine| {
        let info = match serde_wasm_bindgen::to_value(&ChunkInfo::of(chunk)) {
            Ok(value) => value,
            Err(err) => {
                record(&errors, err.into());
                return false;
            }
        };
        match predicate.call1(&JsValue::NULL, &info) {
            Ok(value) => value.is_truthy(),
            Err(err) => {
                record(&errors, err);
                false
            }
        }
    })
}

/// Chunked tile map drawn onto a canvas, exposed to JavaScript
#[wasm_bindgen]
pub struct TileStreamMap {
    map: ChunkSystemTileMap<WebEngine, WebTileMap>,
    engine: WebEngine,
    ctx: CanvasContext,
    errors: CallbackError,
    failed_chunks: FailedChunks,
    subscriptions: HashMap<u32, Subscription>,
    next_subscription: u32,
    debug: bool,
}

#[wasm_bindgen]
impl TileStreamMap {
    /// `config` is a `{ x, y, chunkSize, cellWidth, cellHeight, rows, cols }`
    /// object; `cellGenerator(cell, x, y)` fills in each new cell.
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas: HtmlCanvasElement,
        config: JsValue,
        cell_generator: Function,
    ) -> Result<TileStreamMap, JsValue> {
        let config: TileMapConfig =
            serde_wasm_bindgen::from_value(config).map_err(JsTileStreamError::from_error)?;

        let errors = CallbackError::default();
        let failed_chunks = FailedChunks::default();

        // set while the chunk being built has a cell whose generator threw
        let chunk_failed = Rc::new(Flag::new(false));
        let cell_failed = Rc::clone(&chunk_failed);
        let generator_errors = errors.clone();
        let mut build = cell_builder::<WebEngine, WebTileMap, _>(
            move |mut cell: Cell, world: CellCoord, _map: &MapGeometry, _engine: &WebEngine| {
                if cell_failed.get() {
                    return cell;
                }
                if let Err(err) = generate_cell(&cell_generator, &mut cell, world) {
                    cell_failed.set(true);
                    record(&generator_errors, err);
                }
                cell
            },
        );
        let pending = Rc::clone(&failed_chunks);
        let generate = move |coord: ChunkCoord, map: &MapGeometry, engine: &WebEngine| {
            chunk_failed.set(false);
            let chunk = build(coord, map, engine);
            if chunk_failed.get() {
                pending.borrow_mut().push(coord);
            }
            chunk
        };
        let map = ChunkSystemTileMap::new(&config, generate).map_err(to_js_error)?;
        let ctx = CanvasContext::new(canvas.clone())?;

        Ok(Self {
            map,
            engine: WebEngine::new(canvas),
            ctx,
            errors,
            failed_chunks,
            subscriptions: HashMap::new(),
            next_subscription: 0,
            debug: false,
        })
    }

    /// Collect off-screen chunks for which `predicate(chunk)` is truthy;
    /// `undefined` disables collection
    #[wasm_bindgen(js_name = setGarbageCollector)]
    pub fn set_garbage_collector(&mut self, predicate: Option<Function>) {
        let predicate = predicate.map(|f| js_predicate(f, self.errors.clone()));
        self.map.set_garbage_collector(predicate);
    }

    /// Cache chunks for which `predicate(chunk)` is truthy
    #[wasm_bindgen(js_name = setRenderingCache)]
    pub fn set_rendering_cache(&mut self, predicate: Option<Function>) {
        let predicate = predicate.map(|f| js_predicate(f, self.errors.clone()));
        self.map.set_rendering_cache(predicate);
    }

    /// Register an atlas of `columns × rows` equally sized sprites
    #[wasm_bindgen(js_name = registerSpriteSheet)]
    pub fn register_sprite_sheet(
        &mut self,
        key: &str,
        image: HtmlImageElement,
        sprite_width: f64,
        sprite_height: f64,
        columns: usize,
        rows: usize,
    ) {
        let sheet = SpriteSheet::from_grid(
            WebImage::Image(image),
            sprite_width,
            sprite_height,
            columns,
            rows,
        );
        self.map.register_sprite_sheet(key, Rc::new(sheet));
    }

    #[wasm_bindgen(js_name = setCamera)]
    pub fn set_camera(&mut self, x: f64, y: f64, zoom: f64) -> Result<(), JsValue> {
        if !(zoom.is_finite() && zoom > 0.0) {
            return Err(JsTileStreamError::from_error(format!(
                "zoom must be finite and positive, got {zoom}"
            )));
        }
        self.engine.camera.position = DVec2::new(x, y);
        self.engine.camera.zoom = zoom;
        Ok(())
    }

    #[wasm_bindgen(js_name = setDebug)]
    pub fn set_debug(&mut self, enabled: bool) {
        self.debug = enabled;
    }

    /// Update and draw one frame.
    ///
    /// Rethrows the first exception raised by a JS callback during the frame.
    /// Chunks whose generator threw are dropped before drawing and generated
    /// again by a later frame.
    #[wasm_bindgen]
    pub fn frame(&mut self, elapsed_ms: f64) -> Result<(), JsValue> {
        self.ctx.begin_frame(&self.engine.camera);
        self.map.update(&self.engine, elapsed_ms);
        for coord in self.failed_chunks.borrow_mut().drain(..) {
            self.map.remove_chunk(coord);
        }
        self.map.draw(&mut self.ctx, elapsed_ms);
        if self.debug {
            self.map.debug_draw(&mut self.ctx);
        }
        self.ctx.end_frame();

        let error = self.errors.borrow_mut().take();
        match error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Cell at cell coordinates, or `null` if its chunk is not loaded
    #[wasm_bindgen(js_name = getCell)]
    pub fn get_cell(&self, x: f64, y: f64) -> JsValue {
        self.map
            .get_cell(x.floor() as i64, y.floor() as i64)
            .and_then(|cell| serde_wasm_bindgen::to_value(cell).ok())
            .unwrap_or(JsValue::NULL)
    }

    /// Cell under a world point, or `null`
    #[wasm_bindgen(js_name = getCellByPoint)]
    pub fn get_cell_by_point(&self, x: f64, y: f64) -> JsValue {
        self.map
            .get_cell_by_point(DVec2::new(x, y))
            .and_then(|cell| serde_wasm_bindgen::to_value(cell).ok())
            .unwrap_or(JsValue::NULL)
    }

    /// Patch a loaded cell; returns false when its chunk is not loaded.
    ///
    /// Cached chunks keep showing their cached image.
    #[wasm_bindgen(js_name = setCell)]
    pub fn set_cell(&mut self, x: f64, y: f64, patch: JsValue) -> Result<bool, JsValue> {
        let patch: CellPatch =
            serde_wasm_bindgen::from_value(patch).map_err(JsTileStreamError::from_error)?;
        match self.map.get_cell_mut(x.floor() as i64, y.floor() as i64) {
            Some(cell) => {
                patch.apply(cell);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    #[wasm_bindgen]
    pub fn stats(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.map.stats()).unwrap_or(JsValue::NULL)
    }

    /// Subscribe `handler({ type, elapsedMs })` to update and draw
    /// notifications; returns an id for `off`
    #[wasm_bindgen]
    pub fn on(&mut self, handler: Function) -> u32 {
        let errors = self.errors.clone();
        let subscription = self.map.on(move |event| {
            let result = serde_wasm_bindgen::to_value(event)
                .map_err(JsValue::from)
                .and_then(|value| handler.call1(&JsValue::NULL, &value));
            if let Err(err) = result {
                record(&errors, err);
            }
        });

        let id = self.next_subscription;
        self.next_subscription += 1;
        self.subscriptions.insert(id, subscription);
        id
    }

    #[wasm_bindgen]
    pub fn off(&mut self, id: u32) -> bool {
        match self.subscriptions.remove(&id) {
            Some(subscription) => self.map.off(subscription),
            None => false,
        }
    }
}
