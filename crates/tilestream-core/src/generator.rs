//! Callback shapes used to produce and judge chunks, plus helpers that adapt
//! simpler per-chunk and per-cell callbacks to the full generator shape.

use crate::coords::{CellCoord, ChunkCoord};
use crate::geometry::MapGeometry;
use crate::grid::GridChunk;
use crate::render::Engine;

/// Produces the chunk for a chunk coordinate
pub type ChunkGenerator<E, C> = Box<dyn FnMut(ChunkCoord, &MapGeometry, &E) -> C>;

/// Yes/no question asked about a live chunk (garbage collection, caching)
pub type ChunkPredicate<E, C> = Box<dyn FnMut(&C, &MapGeometry, &E) -> bool>;

/// Wrap a callback that fills in a freshly built chunk.
///
/// The wrapper constructs the chunk at its world position with
/// `chunk_size × chunk_size` cells and passes it to `build` together with the
/// map-space cell coordinate of its top-left cell. Whatever `build` returns is
/// used, so it may also hand back a different chunk altogether.
pub fn chunk_builder<E, C, F>(mut build: F) -> impl FnMut(ChunkCoord, &MapGeometry, &E) -> C
where
    E: Engine,
    C: GridChunk<E>,
    F: FnMut(C, CellCoord, &MapGeometry, &E) -> C,
{
    move |coord: ChunkCoord, map: &MapGeometry, engine: &E| {
        let chunk = C::from_options(map.chunk_options(coord));
        build(chunk, coord.origin_cell(map.chunk_size), map, engine)
    }
}

/// Wrap a callback that produces one cell at a time.
///
/// Every cell of the freshly built chunk is visited in row-major order;
/// `build` receives the pre-generated cell and its map-space coordinate, and
/// its result is written back at the same index.
pub fn cell_builder<E, C, F>(mut build: F) -> impl FnMut(ChunkCoord, &MapGeometry, &E) -> C
where
    E: Engine,
    C: GridChunk<E>,
    F: FnMut(C::Cell, CellCoord, &MapGeometry, &E) -> C::Cell,
{
    chunk_builder(
        move |mut chunk: C, origin: CellCoord, map: &MapGeometry, engine: &E| {
            let cols = chunk.cols().max(1);
            for index in 0..chunk.cell_count() {
                let Some(cell) = chunk.cell_by_index(index).cloned() else {
                    continue;
                };
                let world = CellCoord::new(
                    origin.x + (index % cols) as i64,
                    origin.y + (index / cols) as i64,
                );
                let cell = build(cell, world, map, engine);
                chunk.set_cell_by_index(index, cell);
            }
            chunk
        },
    )
}

#[cfg(test)]
mod tests {
    use glam::DVec2;

    use super::*;
    use crate::config::TileMapConfig;
    use crate::grid::GridOptions;
    use crate::testing::{MockEngine, StubChunk, TestImage};
    use crate::tilemap::{Cell, SpriteRef, TileMap};

    fn geometry() -> MapGeometry {
        TileMapConfig {
            x: 32.0,
            y: 64.0,
            chunk_size: 4,
            cell_width: 8.0,
            cell_height: 16.0,
            rows: 16,
            cols: 16,
        }
        .validate()
        .unwrap()
    }

    fn engine() -> MockEngine {
        MockEngine::new(DVec2::ZERO, DVec2::new(100.0, 100.0))
    }

    #[test]
    fn test_chunk_builder_positions_chunk() {
        let map = geometry();
        let mut seen = Vec::new();
        let mut generate =
            chunk_builder::<MockEngine, StubChunk, _>(|chunk, origin, _map, _engine| {
                seen.push(origin);
                chunk
            });

        let chunk = generate(ChunkCoord::new(2, 3), &map, &engine());
        drop(generate);

        assert_eq!(chunk.options.pos, DVec2::new(96.0, 256.0));
        assert_eq!(chunk.options.cols, 4);
        assert_eq!(chunk.options.rows, 4);
        assert_eq!(chunk.options.cell_width, 8.0);
        assert_eq!(chunk.options.cell_height, 16.0);
        assert_eq!(seen, vec![CellCoord::new(8, 12)]);
    }

    #[test]
    fn test_chunk_builder_allows_replacement() {
        let map = geometry();
        let mut generate =
            chunk_builder::<MockEngine, StubChunk, _>(|_chunk, _origin, _map, _engine| {
                <StubChunk as GridChunk<MockEngine>>::from_options(GridOptions {
                    pos: DVec2::new(-1.0, -1.0),
                    cols: 1,
                    rows: 1,
                    cell_width: 1.0,
                    cell_height: 1.0,
                })
            });

        let chunk = generate(ChunkCoord::new(0, 0), &map, &engine());
        assert_eq!(chunk.options.pos, DVec2::new(-1.0, -1.0));
        assert_eq!(chunk.cells.len(), 1);
    }

    #[test]
    fn test_cell_builder_visits_row_major() {
        let map = geometry();
        let mut visits = Vec::new();
        let mut generate =
            cell_builder::<MockEngine, StubChunk, _>(|_cell, world, _map, _engine| {
                visits.push(world);
                world.x * 100 + world.y
            });

        let chunk = generate(ChunkCoord::new(1, 2), &map, &engine());
        drop(generate);

        assert_eq!(chunk.cells[0], 4 * 100 + 8);
        assert_eq!(chunk.cells[1], 5 * 100 + 8);
        assert_eq!(chunk.cells[4], 4 * 100 + 9);
        assert_eq!(chunk.cells[15], 7 * 100 + 11);
        assert_eq!(visits.len(), 16);
        assert_eq!(visits[0], CellCoord::new(4, 8));
        assert_eq!(visits[3], CellCoord::new(7, 8));
        assert_eq!(visits[4], CellCoord::new(4, 9));
    }

    #[test]
    fn test_cell_builder_with_tile_map() {
        let map = geometry();
        let mut generate = cell_builder::<MockEngine, TileMap<TestImage>, _>(
            |mut cell: Cell, world, _map, _engine| {
                cell.solid = (world.x + world.y) % 2 == 0;
                cell.add_graphic(SpriteRef::new("terrain", world.x as usize % 3));
                cell
            },
        );

        let chunk = generate(ChunkCoord::new(0, 1), &map, &engine());
        let first = chunk.cell(0, 0).unwrap();
        // world cell (0, 4)
        assert!(first.solid);
        assert_eq!((first.x, first.y), (32.0, 128.0));
        assert!(!chunk.cell(1, 0).unwrap().solid);
        assert_eq!(
            chunk.cell(2, 0).unwrap().graphics,
            vec![SpriteRef::new("terrain", 2)]
        );
    }
}
