pub mod cache;
pub mod config;
pub mod coords;
pub mod error;
pub mod events;
pub mod gc;
pub mod generator;
pub mod geometry;
pub mod grid;
pub mod matrix;
pub mod render;
pub mod system;
pub mod tilemap;
pub mod viewport;

#[cfg(test)]
mod testing;

pub use cache::{prerender, CachedChunk};
pub use config::{TileMapConfig, MAX_SAFE_INTEGER};
pub use coords::{CellCoord, CellRange, ChunkCoord, ChunkRange};
pub use error::ChunkSystemError;
pub use events::{EventHandler, MapEvent, MapEvents, Subscription};
pub use gc::GcReport;
pub use generator::{cell_builder, chunk_builder, ChunkGenerator, ChunkPredicate};
pub use geometry::{MapGeometry, Rect};
pub use grid::{GridChunk, GridOptions};
pub use matrix::{ChunkMatrix, Trim};
pub use render::{Engine, ImageOf, RenderContext};
pub use system::{ChunkSystemStats, ChunkSystemTileMap};
pub use tilemap::{Cell, SpriteRef, SpriteSheet, TileMap};
pub use viewport::{ViewportChunks, VIEWPORT_MARGIN_CELLS};
