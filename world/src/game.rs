//! Top-level game session wiring the level to both controllers.

use std::time::Duration;

use thiserror::Error;
use tower_defence_core::{
    ConfigError, GameConfig, MapError, PlayerAction, TowerError, SPEED_MODE_MULTIPLIER,
};
use tower_defence_rendering::{AtlasError, AtlasPack, Render, ShapeRenderer, SpriteBatch};
use tracing::{debug, info};

use crate::enemy::EnemyController;
use crate::level::Level;
use crate::towers::TowerController;

/// Reasons a game session could not be created.
#[derive(Debug, Error)]
pub enum GameSetupError {
    /// The configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The configured path does not describe a valid map.
    #[error(transparent)]
    Map(#[from] MapError),
}

/// A single play session.
#[derive(Debug)]
pub struct Game {
    level: Level,
    towers: TowerController,
    enemies: EnemyController,
}

impl Game {
    /// Creates a session from a validated configuration.
    pub fn new(config: &GameConfig) -> Result<Self, GameSetupError> {
        config.validate()?;
        let level = Level::from_config(config)?;
        info!(
            columns = config.columns,
            rows = config.rows,
            money = level.money(),
            lives = level.lives(),
            "game_created"
        );
        Ok(Self {
            level,
            towers: TowerController::new(),
            enemies: EnemyController::new(config),
        })
    }

    /// Attaches atlas sprites to the map, defenders and enemies.
    pub fn initialize_sprites(&mut self, atlas: &AtlasPack) -> Result<(), AtlasError> {
        self.level.map_mut().initialize_sprites(atlas)?;
        self.towers.initialize_sprites(atlas)?;
        self.enemies.initialize_sprites(atlas)
    }

    /// Handles a primary click at the world-space point.
    ///
    /// With a tower type armed the click builds there; when nothing is built
    /// the click selects the defender under the cursor, or clears the
    /// selection.
    pub fn click(&mut self, x: f32, y: f32) {
        if self.towers.is_tower_selected() {
            if let Some(kind) = self.towers.selected_tower_type() {
                if self.towers.build_tower(&mut self.level, x, y, kind) > 0 {
                    return;
                }
            }
        }
        let _ = self.towers.select_defender_at(x, y);
    }

    /// Applies a discrete player action.
    pub fn apply(&mut self, action: PlayerAction) -> Result<(), TowerError> {
        match action {
            PlayerAction::SelectTowerType(kind) => self.towers.set_tower_selected(kind),
            PlayerAction::UpgradeDamage => {
                let _ = self.towers.upgrade_damage(&mut self.level)?;
            }
            PlayerAction::UpgradeRange => {
                let _ = self.towers.upgrade_range(&mut self.level)?;
            }
            PlayerAction::UpgradeSpeed => {
                let _ = self.towers.upgrade_speed(&mut self.level)?;
            }
            PlayerAction::SellSelected => {
                let _ = self.towers.sell_selected_defender(&mut self.level)?;
            }
            PlayerAction::ToggleSpeed => {
                if self.towers.is_speed_mode() {
                    self.towers.normal_speed_clicked();
                } else {
                    self.towers.double_speed_clicked();
                }
            }
            PlayerAction::StartWave => self.start_wave(),
            PlayerAction::ClearSelection => self.towers.clear_selected_tower(),
        }
        Ok(())
    }

    fn start_wave(&mut self) {
        if self.level.is_lost() {
            debug!("wave_rejected_level_lost");
            return;
        }
        if self.enemies.is_wave_active() {
            debug!(wave = self.level.wave(), "wave_in_progress");
            return;
        }
        let _ = self.enemies.start_wave(&mut self.level);
    }

    /// Advances enemies and then defenders by the elapsed frame time.
    ///
    /// Nothing moves once the level is lost.
    pub fn update(&mut self, elapsed: Duration) {
        if self.level.is_lost() {
            return;
        }
        let multiplier = if self.towers.is_speed_mode() {
            SPEED_MODE_MULTIPLIER
        } else {
            1.0
        };
        self.enemies.set_speed_multiplier(multiplier);
        self.enemies.update(elapsed, &mut self.level);
        self.towers.update(elapsed, self.enemies.enemy_list_mut());

        if self.level.is_lost() {
            info!(wave = self.level.wave(), "level_lost");
        }
    }

    /// Level state.
    #[must_use]
    pub fn level(&self) -> &Level {
        &self.level
    }

    /// Tower controller.
    #[must_use]
    pub fn towers(&self) -> &TowerController {
        &self.towers
    }

    /// Enemy controller.
    #[must_use]
    pub fn enemies(&self) -> &EnemyController {
        &self.enemies
    }

    /// Whether every life has been lost.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.level.is_lost()
    }
}

impl Render for Game {
    fn render_shapes(&self, shapes: &mut dyn ShapeRenderer) {
        self.level.map().render_shapes(shapes);
        self.towers.render_shapes(shapes);
        self.enemies.render_shapes(shapes);
    }

    fn render_sprites(&self, batch: &mut dyn SpriteBatch) {
        self.level.map().render_sprites(batch);
        self.towers.render_sprites(batch);
        self.enemies.render_sprites(batch);
    }
}
