//! The chunked tile map itself.
//!
//! [`ChunkSystemTileMap`] owns a sparse [`ChunkMatrix`] of chunks and, once per
//! frame, maps the engine's viewport to a chunk range, collects chunks that
//! left it, generates the ones that entered it and records which chunks the
//! following draw pass should paint.

use std::collections::HashMap;
use std::rc::Rc;

use glam::DVec2;
use serde::Serialize;
use tracing::debug;

use crate::cache::{self, CachedChunk};
use crate::config::TileMapConfig;
use crate::coords::{CellCoord, ChunkCoord};
use crate::error::ChunkSystemError;
use crate::events::{MapEvent, MapEvents, Subscription};
use crate::gc;
use crate::generator::{ChunkGenerator, ChunkPredicate};
use crate::geometry::MapGeometry;
use crate::grid::GridChunk;
use crate::matrix::ChunkMatrix;
use crate::render::Engine;
use crate::viewport::viewport_chunks;

/// Point-in-time counters describing a map
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkSystemStats {
    /// Chunks currently held in the matrix
    pub live_chunks: usize,
    /// Live chunks with a rendering cache
    pub cached_chunks: usize,
    pub matrix_rows: usize,
    pub matrix_cols: usize,
    pub row_offset: i64,
    pub col_offset: i64,
    /// Chunks the next draw pass paints
    pub chunks_to_render: usize,
    /// Generator calls since construction
    pub generated: u64,
    /// Chunks dropped by garbage collection since construction
    pub collected: u64,
}

/// A large tile map streamed in square chunks around the camera.
pub struct ChunkSystemTileMap<E: Engine, C: GridChunk<E>> {
    geometry: MapGeometry,
    matrix: ChunkMatrix<CachedChunk<E, C>>,
    generator: ChunkGenerator<E, C>,
    garbage_collector: Option<ChunkPredicate<E, C>>,
    rendering_cache: Option<ChunkPredicate<E, C>>,
    sprite_sheets: HashMap<String, Rc<C::Sheet>>,
    /// Chunks painted by `draw`/`debug_draw`; rebuilt from scratch by every
    /// `update`, so it only describes the frame of the last update
    chunks_to_render: Vec<ChunkCoord>,
    events: MapEvents,
    generated: u64,
    collected: u64,
}

impl<E: Engine, C: GridChunk<E>> ChunkSystemTileMap<E, C> {
    /// Validate `config` and create an empty map.
    ///
    /// `generator` is called once per chunk coordinate, the first time that
    /// chunk comes into view (or again after it was garbage collected).
    pub fn new<F>(config: &TileMapConfig, generator: F) -> Result<Self, ChunkSystemError>
    where
        F: FnMut(ChunkCoord, &MapGeometry, &E) -> C + 'static,
    {
        let geometry = config.validate()?;
        debug!(
            chunk_cols = geometry.chunk_cols,
            chunk_rows = geometry.chunk_rows,
            chunk_size = geometry.chunk_size,
            "Created chunked tile map"
        );

        Ok(Self {
            geometry,
            matrix: ChunkMatrix::new(),
            generator: Box::new(generator),
            garbage_collector: None,
            rendering_cache: None,
            sprite_sheets: HashMap::new(),
            chunks_to_render: Vec::new(),
            events: MapEvents::new(),
            generated: 0,
            collected: 0,
        })
    }

    /// Drop off-screen chunks for which `predicate` returns true.
    ///
    /// Without a garbage collector every generated chunk lives forever.
    pub fn with_garbage_collector<P>(mut self, predicate: P) -> Self
    where
        P: FnMut(&C, &MapGeometry, &E) -> bool + 'static,
    {
        self.garbage_collector = Some(Box::new(predicate));
        self
    }

    /// Rasterise chunks for which `predicate` returns true into an offscreen
    /// image the first time they are updated.
    pub fn with_rendering_cache<P>(mut self, predicate: P) -> Self
    where
        P: FnMut(&C, &MapGeometry, &E) -> bool + 'static,
    {
        self.rendering_cache = Some(Box::new(predicate));
        self
    }

    pub fn set_garbage_collector(&mut self, predicate: Option<ChunkPredicate<E, C>>) {
        self.garbage_collector = predicate;
    }

    pub fn set_rendering_cache(&mut self, predicate: Option<ChunkPredicate<E, C>>) {
        self.rendering_cache = predicate;
    }

    pub fn geometry(&self) -> &MapGeometry {
        &self.geometry
    }

    pub fn matrix(&self) -> &ChunkMatrix<CachedChunk<E, C>> {
        &self.matrix
    }

    /// Chunks painted by the next draw, in row-major order
    pub fn chunks_to_render(&self) -> &[ChunkCoord] {
        &self.chunks_to_render
    }

    /// Subscribe to update and draw notifications
    pub fn on(&mut self, handler: impl FnMut(&MapEvent) + 'static) -> Subscription {
        self.events.on(handler)
    }

    pub fn off(&mut self, subscription: Subscription) -> bool {
        self.events.off(subscription)
    }

    /// Make `sheet` available under `key` to every live and future chunk
    pub fn register_sprite_sheet(&mut self, key: &str, sheet: Rc<C::Sheet>) {
        for (_, cached) in self.matrix.iter_mut() {
            cached.chunk.register_sprite_sheet(key, Rc::clone(&sheet));
        }
        self.sprite_sheets.insert(key.to_string(), sheet);
    }

    /// Live chunk at a chunk coordinate
    pub fn chunk_at(&self, coord: ChunkCoord) -> Option<&C> {
        self.matrix.get(coord).map(|cached| &cached.chunk)
    }

    /// Live chunks with their coordinates, row-major
    pub fn chunks(&self) -> impl Iterator<Item = (ChunkCoord, &C)> {
        self.matrix.iter().map(|(coord, cached)| (coord, &cached.chunk))
    }

    /// Drop the live chunk at `coord`; it is generated again the next time
    /// an update sees it
    pub fn remove_chunk(&mut self, coord: ChunkCoord) -> Option<C> {
        let cached = self.matrix.remove(coord)?;
        debug!(x = coord.x, y = coord.y, "Removed chunk");
        Some(cached.chunk)
    }

    /// Chunk owning the cell `(cell_x, cell_y)`. Never generates.
    pub fn get_chunk(&self, cell_x: i64, cell_y: i64) -> Option<&C> {
        let coord = CellCoord::new(cell_x, cell_y).chunk(self.geometry.chunk_size);
        self.chunk_at(coord)
    }

    pub fn get_chunk_mut(&mut self, cell_x: i64, cell_y: i64) -> Option<&mut C> {
        let coord = CellCoord::new(cell_x, cell_y).chunk(self.geometry.chunk_size);
        self.matrix.get_mut(coord).map(|cached| &mut cached.chunk)
    }

    /// Cell `(cell_x, cell_y)` of the map, if its chunk is live
    pub fn get_cell(&self, cell_x: i64, cell_y: i64) -> Option<&C::Cell> {
        let (col, row) = CellCoord::new(cell_x, cell_y).local(self.geometry.chunk_size);
        self.get_chunk(cell_x, cell_y)?
            .cell(col as usize, row as usize)
    }

    pub fn get_cell_mut(&mut self, cell_x: i64, cell_y: i64) -> Option<&mut C::Cell> {
        let (col, row) = CellCoord::new(cell_x, cell_y).local(self.geometry.chunk_size);
        self.get_chunk_mut(cell_x, cell_y)?
            .cell_mut(col as usize, row as usize)
    }

    /// Cell under a world-space point
    pub fn get_cell_by_point(&self, point: DVec2) -> Option<&C::Cell> {
        let cell = self.geometry.cell_at_point(point);
        self.get_cell(cell.x, cell.y)
    }

    /// Advance one frame: collect, generate, cache and update the chunks
    /// around the current viewport.
    pub fn update(&mut self, engine: &E, elapsed_ms: f64) {
        self.events.emit(MapEvent::PreUpdate { elapsed_ms });

        let viewport = viewport_chunks(&self.geometry, engine);

        if let Some(predicate) = self.garbage_collector.as_mut() {
            let geometry = &self.geometry;
            let report = gc::collect(&mut self.matrix, &viewport.on_screen, |cached| {
                predicate(&cached.chunk, geometry, engine)
            });
            self.collected += report.removed as u64;
        }

        if self.matrix.is_empty() {
            self.matrix.anchor(viewport.clamped.start());
        }

        self.chunks_to_render.clear();
        if viewport.has_visible_chunks() {
            for coord in viewport.clamped.iter() {
                self.update_chunk(coord, engine, elapsed_ms);
                self.chunks_to_render.push(coord);
            }
        }

        self.events.emit(MapEvent::PostUpdate { elapsed_ms });
    }

    fn update_chunk(&mut self, coord: ChunkCoord, engine: &E, elapsed_ms: f64) {
        let geometry = self.geometry;
        let slot = self.matrix.slot_mut(coord);

        if slot.is_none() {
            let mut chunk = (self.generator)(coord, &geometry, engine);
            for (key, sheet) in &self.sprite_sheets {
                chunk.register_sprite_sheet(key, Rc::clone(sheet));
            }
            self.generated += 1;
            debug!(x = coord.x, y = coord.y, "Generated chunk");
            *slot = Some(CachedChunk::new(chunk));
        }

        let Some(cached) = slot.as_mut() else {
            return;
        };

        let wants_cache = !cached.is_cached()
            && self
                .rendering_cache
                .as_mut()
                .is_some_and(|predicate| predicate(&cached.chunk, &geometry, engine));

        if wants_cache {
            cached.cache = cache::prerender(&mut cached.chunk, engine);
            if cached.is_cached() {
                return;
            }
        }
        cached.chunk.update(engine, elapsed_ms);
    }

    /// Paint the chunks picked by the last `update`
    pub fn draw(&mut self, ctx: &mut E::Context, elapsed_ms: f64) {
        self.events.emit(MapEvent::PreDraw { elapsed_ms });
        for coord in &self.chunks_to_render {
            if let Some(cached) = self.matrix.get_mut(*coord) {
                cached.draw(ctx, elapsed_ms);
            }
        }
        self.events.emit(MapEvent::PostDraw { elapsed_ms });
    }

    pub fn debug_draw(&mut self, ctx: &mut E::Context) {
        self.events.emit(MapEvent::PreDraw { elapsed_ms: 0.0 });
        for coord in &self.chunks_to_render {
            if let Some(cached) = self.matrix.get_mut(*coord) {
                cached.chunk.debug_draw(ctx);
            }
        }
        self.events.emit(MapEvent::PostDraw { elapsed_ms: 0.0 });
    }

    pub fn stats(&self) -> ChunkSystemStats {
        let (live_chunks, cached_chunks) = self
            .matrix
            .iter()
            .fold((0, 0), |(live, cached), (_, chunk)| {
                (live + 1, cached + usize::from(chunk.is_cached()))
            });

        ChunkSystemStats {
            live_chunks,
            cached_chunks,
            matrix_rows: self.matrix.height(),
            matrix_cols: self.matrix.width(),
            row_offset: self.matrix.row_offset(),
            col_offset: self.matrix.col_offset(),
            chunks_to_render: self.chunks_to_render.len(),
            generated: self.generated,
            collected: self.collected,
        }
    }
}
