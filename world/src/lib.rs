#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for Tower Defence.
//!
//! The world owns the level (map, money, lives), the defenders placed by the
//! player and the enemies walking the path. Adapters drive it through
//! [`Game`] and draw it through the [`Render`](tower_defence_rendering::Render)
//! implementations on every entity.

mod defender;
mod enemy;
mod game;
mod game_object;
mod level;
mod map;
mod towers;

pub use defender::Defender;
pub use enemy::{Enemy, EnemyController};
pub use game::{Game, GameSetupError};
pub use game_object::GameObject;
pub use level::Level;
pub use map::{Map, Tile};
pub use towers::TowerController;
