//! Game configuration loaded from TOML.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tile-space coordinate used to describe path waypoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TilePosition {
    /// Zero-based column index.
    pub column: u32,
    /// Zero-based row index.
    pub row: u32,
}

impl TilePosition {
    /// Creates a new tile position.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }
}

/// Tunable parameters for a game session.
///
/// Every field has a default, so a configuration file only needs to list the
/// values it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Number of tile columns in the map.
    pub columns: u32,
    /// Number of tile rows in the map.
    pub rows: u32,
    /// Side length of a tile in world units.
    pub tile_size: f32,
    /// Waypoints enemies walk through, in order. Consecutive waypoints must
    /// share a row or a column.
    pub path: Vec<TilePosition>,
    /// Money available when the level starts.
    pub starting_money: u32,
    /// Enemies that may leak before the level is lost.
    pub starting_lives: u32,
    /// Enemies in the first wave.
    pub wave_base_size: u32,
    /// Additional enemies per subsequent wave.
    pub wave_size_growth: u32,
    /// Fractional enemy health increase per wave after the first.
    pub wave_health_growth: f32,
    /// Seconds between consecutive enemy spawns.
    pub spawn_interval_seconds: f32,
    /// Seed for the wave composition generator.
    pub seed: u64,
    /// Location of the packed texture atlas.
    pub atlas_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            columns: 16,
            rows: 10,
            tile_size: 64.0,
            path: vec![
                TilePosition::new(0, 2),
                TilePosition::new(5, 2),
                TilePosition::new(5, 7),
                TilePosition::new(11, 7),
                TilePosition::new(11, 3),
                TilePosition::new(15, 3),
            ],
            starting_money: 400,
            starting_lives: 20,
            wave_base_size: 6,
            wave_size_growth: 3,
            wave_health_growth: 0.2,
            spawn_interval_seconds: 0.8,
            seed: 0x5eed_7d0f_a11e_0001,
            atlas_path: PathBuf::from("assets/pack.atlas"),
        }
    }
}

impl GameConfig {
    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants the world relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(ConfigError::EmptyMap);
        }
        if !(self.tile_size > 0.0) {
            return Err(ConfigError::InvalidTileSize {
                tile_size: self.tile_size,
            });
        }
        if self.path.len() < 2 {
            return Err(ConfigError::TooFewWaypoints {
                count: self.path.len(),
            });
        }
        if !(self.spawn_interval_seconds > 0.0) {
            return Err(ConfigError::InvalidSpawnInterval {
                seconds: self.spawn_interval_seconds,
            });
        }
        if self.wave_health_growth < 0.0 {
            return Err(ConfigError::NegativeHealthGrowth);
        }
        Ok(())
    }
}

/// Reasons a configuration may be rejected.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML text could not be deserialised.
    #[error("failed to parse game configuration")]
    Parse(#[from] toml::de::Error),
    /// Columns or rows are zero.
    #[error("map must have at least one column and one row")]
    EmptyMap,
    /// Tile size is zero, negative or NaN.
    #[error("tile size must be positive (received {tile_size})")]
    InvalidTileSize {
        /// Rejected tile size.
        tile_size: f32,
    },
    /// The path is missing a start or an end.
    #[error("path needs at least two waypoints (received {count})")]
    TooFewWaypoints {
        /// Number of waypoints supplied.
        count: usize,
    },
    /// Spawn interval is zero, negative or NaN.
    #[error("spawn interval must be positive (received {seconds})")]
    InvalidSpawnInterval {
        /// Rejected interval in seconds.
        seconds: f32,
    },
    /// Health growth would shrink enemies over time.
    #[error("wave health growth must not be negative")]
    NegativeHealthGrowth,
}
