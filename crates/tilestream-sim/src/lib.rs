//! Headless driver that pans a camera across a streamed tile map and reports
//! how the chunk system behaved.

pub mod config;
pub mod error;
pub mod headless;
pub mod terrain;

use std::cell::Cell as Counter;
use std::rc::Rc;

use glam::DVec2;
use serde::Serialize;
use tilestream_core::{
    cell_builder, Cell, CellCoord, ChunkSystemStats, ChunkSystemTileMap, MapEvent, MapGeometry,
    SpriteRef, SpriteSheet, TileMap,
};
use tracing::{debug, info};

pub use config::SimConfig;
pub use error::SimError;
pub use headless::{DrawCounts, HeadlessContext, HeadlessEngine, HeadlessImage};
pub use terrain::{Terrain, TERRAIN_SHEET};

/// Chunk type the simulation streams
pub type SimChunk = TileMap<HeadlessImage>;

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimReport {
    pub frames: u32,
    pub final_stats: ChunkSystemStats,
    pub peak_live_chunks: usize,
    /// Largest `rows × cols` the chunk matrix reached
    pub peak_matrix_slots: usize,
    pub draws: DrawCounts,
    /// Frames whose viewport showed no part of the map
    pub empty_frames: u32,
    /// Draw passes observed through `postdraw` events
    pub draw_passes: u64,
    pub offscreens: u64,
    pub camera: DVec2,
}

/// Move one axis, reversing direction at the edges of `min..=max`
fn bounce(position: f64, velocity: f64, min: f64, max: f64) -> (f64, f64) {
    let max = max.max(min);
    let next = position + velocity;
    if next < min {
        (min, velocity.abs())
    } else if next > max {
        (max, -velocity.abs())
    } else {
        (next, velocity)
    }
}

fn build_map(config: &SimConfig) -> Result<ChunkSystemTileMap<HeadlessEngine, SimChunk>, SimError> {
    let seed = config.seed;
    let generator = cell_builder::<HeadlessEngine, SimChunk, _>(
        move |mut cell: Cell, world: CellCoord, _: &MapGeometry, _: &HeadlessEngine| {
            let terrain = Terrain::at(seed, world);
            cell.solid = terrain.is_solid();
            cell.graphics = vec![SpriteRef::new(TERRAIN_SHEET, terrain.sprite())];
            cell
        },
    );
    let mut map = ChunkSystemTileMap::new(&config.map, generator)?;

    let atlas = HeadlessImage::Atlas {
        width: (config.map.cell_width * 4.0).ceil() as u32,
        height: config.map.cell_height.ceil() as u32,
    };
    map.register_sprite_sheet(
        TERRAIN_SHEET,
        Rc::new(SpriteSheet::from_grid(
            atlas,
            config.map.cell_width,
            config.map.cell_height,
            4,
            1,
        )),
    );

    if config.garbage_collect {
        map.set_garbage_collector(Some(Box::new(
            |_: &SimChunk, _: &MapGeometry, _: &HeadlessEngine| true,
        )));
    }
    if config.cache {
        map.set_rendering_cache(Some(Box::new(
            |chunk: &SimChunk, _: &MapGeometry, _: &HeadlessEngine| {
                chunk.cells().all(|cell| {
                    cell.graphics.iter().all(|graphic| {
                        Terrain::from_sprite(graphic.index).map_or(true, Terrain::is_cacheable)
                    })
                })
            },
        )));
    }

    Ok(map)
}

/// Run `config.frames` update/draw cycles while panning the camera
pub fn run_simulation(config: &SimConfig) -> Result<SimReport, SimError> {
    let mut map = build_map(config)?;

    let draw_passes = Rc::new(Counter::new(0u64));
    let passes = Rc::clone(&draw_passes);
    map.on(move |event| {
        if let MapEvent::PostDraw { .. } = event {
            passes.set(passes.get() + 1);
        }
    });

    let geometry = *map.geometry();
    let map_size = DVec2::new(
        geometry.cols as f64 * geometry.cell_width,
        geometry.rows as f64 * geometry.cell_height,
    );
    let min = geometry.pos;
    let max = geometry.pos + map_size - config.viewport;

    info!(
        frames = config.frames,
        chunk_cols = geometry.chunk_cols,
        chunk_rows = geometry.chunk_rows,
        garbage_collect = config.garbage_collect,
        cache = config.cache,
        "Starting simulation"
    );

    let mut engine = HeadlessEngine::new(config.start, config.viewport);
    let mut velocity = config.velocity;
    let mut draws = DrawCounts::default();
    let mut peak_live_chunks = 0;
    let mut peak_matrix_slots = 0;
    let mut empty_frames = 0;

    for frame in 0..config.frames {
        map.update(&engine, config.frame_ms);

        let mut ctx = HeadlessContext::new();
        map.draw(&mut ctx, config.frame_ms);
        draws.add(ctx.draws);

        let stats = map.stats();
        peak_live_chunks = peak_live_chunks.max(stats.live_chunks);
        peak_matrix_slots = peak_matrix_slots.max(stats.matrix_rows * stats.matrix_cols);
        if stats.chunks_to_render == 0 {
            empty_frames += 1;
        }
        debug!(
            frame,
            live = stats.live_chunks,
            cached = stats.cached_chunks,
            rendered = stats.chunks_to_render,
            "Frame done"
        );

        let camera = engine.camera();
        let (x, vx) = bounce(camera.x, velocity.x, min.x, max.x);
        let (y, vy) = bounce(camera.y, velocity.y, min.y, max.y);
        velocity = DVec2::new(vx, vy);
        engine.look_at(DVec2::new(x, y));
    }

    let final_stats = map.stats();
    info!(
        generated = final_stats.generated,
        collected = final_stats.collected,
        peak_live_chunks,
        "Simulation finished"
    );

    Ok(SimReport {
        frames: config.frames,
        final_stats,
        peak_live_chunks,
        peak_matrix_slots,
        draws,
        empty_frames,
        draw_passes: draw_passes.get(),
        offscreens: engine.offscreens(),
        camera: engine.camera(),
    })
}
