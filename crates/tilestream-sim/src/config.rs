use std::env;
use std::fmt::Display;
use std::str::FromStr;

use glam::DVec2;
use serde::Serialize;
use tilestream_core::TileMapConfig;

use crate::error::SimError;

/// Simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimConfig {
    pub map: TileMapConfig,
    /// Number of frames to run
    pub frames: u32,
    /// Elapsed time reported to each update
    pub frame_ms: f64,
    /// Canvas size in pixels
    pub viewport: DVec2,
    /// Initial camera position (world top-left of the viewport)
    pub start: DVec2,
    /// Camera movement per frame; reversed when the view leaves the map
    pub velocity: DVec2,
    /// Collect every chunk that leaves the viewport
    pub garbage_collect: bool,
    /// Cache chunks that hold no water
    pub cache: bool,
    /// Terrain seed
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            map: TileMapConfig {
                x: 0.0,
                y: 0.0,
                chunk_size: 16,
                cell_width: 16.0,
                cell_height: 16.0,
                rows: 1024,
                cols: 1024,
            },
            frames: 600,
            frame_ms: 16.0,
            viewport: DVec2::new(800.0, 600.0),
            start: DVec2::ZERO,
            velocity: DVec2::new(24.0, 6.0),
            garbage_collect: true,
            cache: true,
            seed: 1,
        }
    }
}

fn setting<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, SimError>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|err: T::Err| SimError::InvalidSetting {
                name,
                value: raw.clone(),
                reason: err.to_string(),
            }),
    }
}

fn positive(name: &'static str, value: f64) -> Result<f64, SimError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SimError::InvalidSetting {
            name,
            value: value.to_string(),
            reason: "must be finite and positive".to_string(),
        })
    }
}

impl SimConfig {
    /// Load configuration from `TILESTREAM_*` environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self::from_lookup(|name| env::var(name).ok())?)
    }

    /// Load configuration from any variable source, falling back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SimError> {
        let defaults = Self::default();
        let map = TileMapConfig {
            x: setting(&lookup, "TILESTREAM_MAP_X", defaults.map.x)?,
            y: setting(&lookup, "TILESTREAM_MAP_Y", defaults.map.y)?,
            chunk_size: setting(&lookup, "TILESTREAM_CHUNK_SIZE", defaults.map.chunk_size)?,
            cell_width: setting(&lookup, "TILESTREAM_CELL_WIDTH", defaults.map.cell_width)?,
            cell_height: setting(&lookup, "TILESTREAM_CELL_HEIGHT", defaults.map.cell_height)?,
            rows: setting(&lookup, "TILESTREAM_ROWS", defaults.map.rows)?,
            cols: setting(&lookup, "TILESTREAM_COLS", defaults.map.cols)?,
        };

        let viewport = DVec2::new(
            positive(
                "TILESTREAM_VIEWPORT_WIDTH",
                setting(&lookup, "TILESTREAM_VIEWPORT_WIDTH", defaults.viewport.x)?,
            )?,
            positive(
                "TILESTREAM_VIEWPORT_HEIGHT",
                setting(&lookup, "TILESTREAM_VIEWPORT_HEIGHT", defaults.viewport.y)?,
            )?,
        );

        Ok(Self {
            map,
            frames: setting(&lookup, "TILESTREAM_FRAMES", defaults.frames)?,
            frame_ms: setting(&lookup, "TILESTREAM_FRAME_MS", defaults.frame_ms)?,
            viewport,
            start: DVec2::new(
                setting(&lookup, "TILESTREAM_START_X", defaults.start.x)?,
                setting(&lookup, "TILESTREAM_START_Y", defaults.start.y)?,
            ),
            velocity: DVec2::new(
                setting(&lookup, "TILESTREAM_PAN_X", defaults.velocity.x)?,
                setting(&lookup, "TILESTREAM_PAN_Y", defaults.velocity.y)?,
            ),
            garbage_collect: setting(&lookup, "TILESTREAM_GC", defaults.garbage_collect)?,
            cache: setting(&lookup, "TILESTREAM_CACHE", defaults.cache)?,
            seed: setting(&lookup, "TILESTREAM_SEED", defaults.seed)?,
        })
    }
}
