//! Level state: the map plus the player's money, lives and wave counter.

use tower_defence_core::{EconomyError, GameConfig, MapError};

use crate::map::Map;

/// Map and player resources for a single play session.
#[derive(Clone, Debug, PartialEq)]
pub struct Level {
    map: Map,
    money: u32,
    lives: u32,
    wave: u32,
}

impl Level {
    /// Creates a level on the provided map before the first wave.
    #[must_use]
    pub fn new(map: Map, money: u32, lives: u32) -> Self {
        Self {
            map,
            money,
            lives,
            wave: 0,
        }
    }

    /// Creates the level described by a game configuration.
    pub fn from_config(config: &GameConfig) -> Result<Self, MapError> {
        let map = Map::from_config(config)?;
        Ok(Self::new(map, config.starting_money, config.starting_lives))
    }

    /// Map the level is played on.
    #[must_use]
    pub fn map(&self) -> &Map {
        &self.map
    }

    /// Mutable access to the map, used to attach sprites.
    pub fn map_mut(&mut self) -> &mut Map {
        &mut self.map
    }

    /// Money currently available.
    #[must_use]
    pub fn money(&self) -> u32 {
        self.money
    }

    /// Whether the level holds at least `amount`.
    #[must_use]
    pub fn can_afford(&self, amount: u32) -> bool {
        self.money >= amount
    }

    /// Credits money to the player.
    pub fn add_money(&mut self, amount: u32) {
        self.money = self.money.saturating_add(amount);
    }

    /// Debits money from the player, leaving the balance untouched when it is too small.
    pub fn remove_money(&mut self, amount: u32) -> Result<(), EconomyError> {
        if !self.can_afford(amount) {
            return Err(EconomyError::InsufficientFunds {
                needed: amount,
                available: self.money,
            });
        }
        self.money -= amount;
        Ok(())
    }

    /// Lives remaining.
    #[must_use]
    pub fn lives(&self) -> u32 {
        self.lives
    }

    /// Removes a life; does nothing once no lives remain.
    pub fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
    }

    /// Whether every life has been lost.
    #[must_use]
    pub fn is_lost(&self) -> bool {
        self.lives == 0
    }

    /// Number of the most recently started wave, zero before the first.
    #[must_use]
    pub fn wave(&self) -> u32 {
        self.wave
    }

    /// Advances the wave counter and returns the new wave number.
    pub fn advance_wave(&mut self) -> u32 {
        self.wave = self.wave.saturating_add(1);
        self.wave
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(money: u32, lives: u32) -> Level {
        let config = GameConfig {
            starting_money: money,
            starting_lives: lives,
            ..GameConfig::default()
        };
        Level::from_config(&config).expect("default layout is valid")
    }

    #[test]
    fn remove_money_debits_when_affordable() {
        let mut level = level(100, 3);

        level.remove_money(60).expect("affordable");

        assert_eq!(level.money(), 40);
    }

    #[test]
    fn remove_money_rejects_overdraft_without_changes() {
        let mut level = level(50, 3);

        let error = level.remove_money(60).expect_err("not affordable");

        assert_eq!(
            error,
            EconomyError::InsufficientFunds {
                needed: 60,
                available: 50
            }
        );
        assert_eq!(level.money(), 50);
    }

    #[test]
    fn losing_every_life_loses_the_level() {
        let mut level = level(0, 2);

        level.lose_life();
        assert!(!level.is_lost());
        level.lose_life();
        level.lose_life();

        assert_eq!(level.lives(), 0);
        assert!(level.is_lost());
    }

    #[test]
    fn wave_counter_starts_at_zero() {
        let mut level = level(0, 1);

        assert_eq!(level.wave(), 0);
        assert_eq!(level.advance_wave(), 1);
        assert_eq!(level.advance_wave(), 2);
    }
}
