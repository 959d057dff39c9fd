#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tower Defence workspace.
//!
//! This crate defines the vocabulary that connects adapters, the
//! authoritative world, and pure systems: identifiers, defender and enemy
//! kinds with their balance tables, tile classifications, the axis-aligned
//! [`Rect`] used for hitboxes, player actions, configuration and the error
//! enums surfaced by world operations.

pub mod config;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use config::{ConfigError, GameConfig, TilePosition};

/// Title used by windows created for the game.
pub const WINDOW_TITLE: &str = "Tower Defence";

/// Price of a gunner defender.
pub const TOWER_PRICE_GUNNER: u32 = 100;
/// Price of a sniper defender.
pub const TOWER_PRICE_SNIPER: u32 = 150;
/// Price of a bomber defender.
pub const TOWER_PRICE_BOMBER: u32 = 200;

/// Fraction of a defender's price returned when it is sold.
pub const SELL_REFUND_RATIO: f32 = 0.75;

/// Initial cost of a damage upgrade.
pub const DAMAGE_UPGRADE_BASE_COST: u32 = 50;
/// Initial cost of a range upgrade.
pub const RANGE_UPGRADE_BASE_COST: u32 = 40;
/// Initial cost of a speed upgrade.
pub const SPEED_UPGRADE_BASE_COST: u32 = 60;

/// Multiplier applied to damage by a damage upgrade.
pub const DAMAGE_UPGRADE_FACTOR: f32 = 1.25;
/// Multiplier applied to range by a range upgrade.
pub const RANGE_UPGRADE_FACTOR: f32 = 1.15;
/// Multiplier applied to attack speed by a speed upgrade.
pub const SPEED_UPGRADE_FACTOR: f32 = 1.25;

/// Multiplier applied to defender speed while double speed is active.
pub const SPEED_MODE_MULTIPLIER: f32 = 2.0;

/// Computes the refund paid out when selling a defender with the provided price.
///
/// The result is truncated toward zero, so a price of `101.0` refunds `75`.
#[must_use]
pub fn sell_refund(price: f32) -> u32 {
    if price <= 0.0 {
        return 0;
    }
    (price * SELL_REFUND_RATIO) as u32
}

/// Cost of the next purchase of an upgrade whose current cost is `cost`.
///
/// Each purchase raises the cost by half, truncated.
#[must_use]
pub const fn next_upgrade_cost(cost: u32) -> u32 {
    cost.saturating_add(cost / 2)
}

/// Unique identifier assigned to a defender.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DefenderId(u32);

impl DefenderId {
    /// Creates a new defender identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Types of defenders that can be constructed on the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DefenderKind {
    /// Cheap, fast-firing defender with short range.
    Gunner,
    /// Slow, long-range defender with heavy single-target damage.
    Sniper,
    /// Area defender whose shots splash around the target.
    Bomber,
}

impl DefenderKind {
    /// Every constructible defender kind in menu order.
    pub const ALL: [DefenderKind; 3] = [Self::Gunner, Self::Sniper, Self::Bomber];

    /// Build price of the defender.
    #[must_use]
    pub const fn price(self) -> u32 {
        match self {
            Self::Gunner => TOWER_PRICE_GUNNER,
            Self::Sniper => TOWER_PRICE_SNIPER,
            Self::Bomber => TOWER_PRICE_BOMBER,
        }
    }

    /// Damage dealt per shot before upgrades.
    #[must_use]
    pub const fn base_damage(self) -> f32 {
        match self {
            Self::Gunner => 4.0,
            Self::Sniper => 18.0,
            Self::Bomber => 10.0,
        }
    }

    /// Targeting radius in world units before upgrades.
    #[must_use]
    pub const fn base_range(self) -> f32 {
        match self {
            Self::Gunner => 140.0,
            Self::Sniper => 300.0,
            Self::Bomber => 170.0,
        }
    }

    /// Shots per second before upgrades and speed mode.
    #[must_use]
    pub const fn base_speed(self) -> f32 {
        match self {
            Self::Gunner => 2.5,
            Self::Sniper => 0.6,
            Self::Bomber => 0.8,
        }
    }

    /// Radius around the target that also takes damage, zero for single-target kinds.
    #[must_use]
    pub const fn splash_radius(self) -> f32 {
        match self {
            Self::Bomber => 60.0,
            Self::Gunner | Self::Sniper => 0.0,
        }
    }

    /// Atlas region drawn for the defender.
    #[must_use]
    pub const fn region_name(self) -> &'static str {
        match self {
            Self::Gunner => "gunner",
            Self::Sniper => "sniper",
            Self::Bomber => "bomber",
        }
    }

    /// Atlas region drawn for the defender while it is selected.
    #[must_use]
    pub const fn selected_region_name(self) -> &'static str {
        match self {
            Self::Gunner => "gunner_selected",
            Self::Sniper => "sniper_selected",
            Self::Bomber => "bomber_selected",
        }
    }
}

/// Classification of a single map tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridType {
    /// Buildable terrain.
    Ground,
    /// Terrain enemies walk along; defenders cannot be placed here.
    Path,
}

impl GridType {
    /// Atlas region drawn for tiles of this type.
    #[must_use]
    pub const fn region_name(self) -> &'static str {
        match self {
            Self::Ground => "ground",
            Self::Path => "path",
        }
    }
}

/// Types of enemies that walk the path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Fast enemy with little health.
    Scout,
    /// Balanced enemy.
    Grunt,
    /// Slow enemy with a large health pool.
    Brute,
}

impl EnemyKind {
    /// Every enemy kind.
    pub const ALL: [EnemyKind; 3] = [Self::Scout, Self::Grunt, Self::Brute];

    /// Health before wave scaling.
    #[must_use]
    pub const fn base_health(self) -> f32 {
        match self {
            Self::Scout => 12.0,
            Self::Grunt => 30.0,
            Self::Brute => 80.0,
        }
    }

    /// Walking speed in world units per second.
    #[must_use]
    pub const fn speed(self) -> f32 {
        match self {
            Self::Scout => 110.0,
            Self::Grunt => 70.0,
            Self::Brute => 40.0,
        }
    }

    /// Money awarded when the enemy is killed.
    #[must_use]
    pub const fn reward(self) -> u32 {
        match self {
            Self::Scout => 5,
            Self::Grunt => 8,
            Self::Brute => 15,
        }
    }

    /// Atlas region drawn for the enemy.
    #[must_use]
    pub const fn region_name(self) -> &'static str {
        match self {
            Self::Scout => "scout",
            Self::Grunt => "grunt",
            Self::Brute => "brute",
        }
    }
}

/// Axis-aligned rectangle in world units, anchored at its minimum corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Minimum x coordinate.
    pub x: f32,
    /// Minimum y coordinate.
    pub y: f32,
    /// Extent along the x axis.
    pub width: f32,
    /// Extent along the y axis.
    pub height: f32,
}

impl Rect {
    /// Creates a new rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle from a position and a size vector.
    #[must_use]
    pub fn from_position_and_size(position: Vec2, size: Vec2) -> Self {
        Self::new(position.x, position.y, size.x, size.y)
    }

    /// Overwrites every component of the rectangle.
    pub fn set(&mut self, x: f32, y: f32, width: f32, height: f32) {
        *self = Self::new(x, y, width, height);
    }

    /// Reports whether the two rectangles share interior area.
    ///
    /// Rectangles that only touch along an edge do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    /// Reports whether the point lies inside the rectangle, edges included.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        self.x <= point.x
            && self.x + self.width >= point.x
            && self.y <= point.y
            && self.y + self.height >= point.y
    }

    /// Center point of the rectangle.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Immutable view of a defender used by the targeting system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DefenderSnapshot {
    /// Identifier of the defender.
    pub id: DefenderId,
    /// Center of the defender in world units.
    pub center: Vec2,
    /// Targeting radius in world units.
    pub range: f32,
}

/// Immutable view of an enemy used by the targeting system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Identifier of the enemy.
    pub id: EnemyId,
    /// Center of the enemy in world units.
    pub center: Vec2,
    /// Distance the enemy has walked along the path in world units.
    pub progress: f32,
}

/// Assignment of an enemy to the defender that should fire at it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DefenderTarget {
    /// Defender that fires.
    pub defender: DefenderId,
    /// Enemy that is fired at.
    pub enemy: EnemyId,
}

/// Discrete player intents produced by adapters from raw input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerAction {
    /// Arms the build cursor with the provided defender kind.
    SelectTowerType(DefenderKind),
    /// Buys a damage upgrade for the selected defender.
    UpgradeDamage,
    /// Buys a range upgrade for the selected defender.
    UpgradeRange,
    /// Buys a speed upgrade for the selected defender.
    UpgradeSpeed,
    /// Sells the selected defender.
    SellSelected,
    /// Switches between normal and double speed.
    ToggleSpeed,
    /// Launches the next enemy wave.
    StartWave,
    /// Drops both the armed tower type and the selected defender.
    ClearSelection,
}

/// Reasons a money transaction may be rejected by the level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum EconomyError {
    /// The level does not hold enough money for the purchase.
    #[error("insufficient funds: needed {needed}, available {available}")]
    InsufficientFunds {
        /// Amount the purchase costs.
        needed: u32,
        /// Amount currently held.
        available: u32,
    },
}

/// Reasons a tower controller operation may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum TowerError {
    /// The operation needs a selected defender but none is selected.
    #[error("no defender is selected")]
    NoSelection,
    /// The level cannot afford the operation.
    #[error("insufficient funds: needed {needed}, available {available}")]
    InsufficientFunds {
        /// Amount the operation costs.
        needed: u32,
        /// Amount currently held.
        available: u32,
    },
}

impl From<EconomyError> for TowerError {
    fn from(error: EconomyError) -> Self {
        match error {
            EconomyError::InsufficientFunds { needed, available } => {
                Self::InsufficientFunds { needed, available }
            }
        }
    }
}

/// Reasons a map layout may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum MapError {
    /// The map has no columns or no rows.
    #[error("map must have at least one column and one row")]
    Empty,
    /// Tile size must be strictly positive.
    #[error("tile size must be positive")]
    InvalidTileSize,
    /// The path needs a start and an end.
    #[error("path needs at least two waypoints (received {count})")]
    TooFewWaypoints {
        /// Number of waypoints supplied.
        count: usize,
    },
    /// A waypoint lies outside the map.
    #[error("waypoint ({column}, {row}) lies outside the map")]
    WaypointOutOfBounds {
        /// Column of the offending waypoint.
        column: u32,
        /// Row of the offending waypoint.
        row: u32,
    },
    /// Two consecutive waypoints are not on a shared row or column.
    #[error("path segment {index} is not axis aligned")]
    DiagonalSegment {
        /// Index of the segment's first waypoint.
        index: usize,
    },
}
