//! Deterministic procedural terrain for the simulation.

use serde::Serialize;
use tilestream_core::CellCoord;

/// Key the terrain atlas is registered under
pub const TERRAIN_SHEET: &str = "terrain";

/// Lakes are laid out on a grid of square blocks this many cells wide
const LAKE_BLOCK: i64 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    Grass,
    Dirt,
    Stone,
    Water,
}

impl Terrain {
    /// Terrain of one cell; identical for identical `seed` and `cell`
    pub fn at(seed: u64, cell: CellCoord) -> Self {
        let lake = noise(
            seed ^ 0x5EED,
            cell.x.div_euclid(LAKE_BLOCK),
            cell.y.div_euclid(LAKE_BLOCK),
        );
        if lake % 8 == 0 {
            return Terrain::Water;
        }

        match noise(seed, cell.x, cell.y) % 16 {
            0..=8 => Terrain::Grass,
            9..=12 => Terrain::Dirt,
            _ => Terrain::Stone,
        }
    }

    /// Index into the terrain atlas
    pub fn sprite(self) -> usize {
        match self {
            Terrain::Grass => 0,
            Terrain::Dirt => 1,
            Terrain::Stone => 2,
            Terrain::Water => 3,
        }
    }

    pub fn is_solid(self) -> bool {
        matches!(self, Terrain::Stone | Terrain::Water)
    }

    /// Chunks holding water are drawn live every frame, so a run with
    /// caching enabled still exercises both draw paths
    pub fn is_cacheable(self) -> bool {
        self != Terrain::Water
    }

    pub fn from_sprite(index: usize) -> Option<Self> {
        match index {
            0 => Some(Terrain::Grass),
            1 => Some(Terrain::Dirt),
            2 => Some(Terrain::Stone),
            3 => Some(Terrain::Water),
            _ => None,
        }
    }
}

fn noise(seed: u64, x: i64, y: i64) -> u64 {
    let mut h = seed
        ^ (x as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (y as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    h ^= h >> 33;
    h = h.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    h ^= h >> 33;
    h = h.wrapping_mul(0xC4CE_B9FE_1A85_EC53);
    h ^ (h >> 33)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terrain_is_deterministic() {
        for x in -20..20 {
            let cell = CellCoord::new(x, x * 3);
            assert_eq!(Terrain::at(7, cell), Terrain::at(7, cell));
        }
    }

    #[test]
    fn test_lakes_fill_whole_blocks() {
        let water_block = (0..64)
            .flat_map(|bx| (0..64).map(move |by| (bx, by)))
            .find(|&(bx, by)| {
                Terrain::at(3, CellCoord::new(bx * LAKE_BLOCK, by * LAKE_BLOCK)) == Terrain::Water
            })
            .unwrap();

        let (bx, by) = water_block;
        for dx in [0, 5, LAKE_BLOCK - 1] {
            for dy in [0, 17, LAKE_BLOCK - 1] {
                let cell = CellCoord::new(bx * LAKE_BLOCK + dx, by * LAKE_BLOCK + dy);
                assert_eq!(Terrain::at(3, cell), Terrain::Water);
            }
        }
    }

    #[test]
    fn test_sprite_index_round_trip() {
        for terrain in [Terrain::Grass, Terrain::Dirt, Terrain::Stone, Terrain::Water] {
            assert_eq!(Terrain::from_sprite(terrain.sprite()), Some(terrain));
        }
        assert_eq!(Terrain::from_sprite(9), None);
    }

    #[test]
    fn test_only_water_is_drawn_live() {
        assert!(Terrain::Grass.is_cacheable());
        assert!(Terrain::Dirt.is_cacheable());
        assert!(Terrain::Stone.is_cacheable());
        assert!(!Terrain::Water.is_cacheable());
    }
}
