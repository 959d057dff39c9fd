//! Tower controller: placement, upgrades, selling, speed mode and firing.

use std::collections::HashMap;
use std::time::Duration;

use glam::Vec2;
use tower_defence_core::{
    sell_refund, DefenderId, DefenderKind, DefenderSnapshot, DefenderTarget, EnemySnapshot,
    GridType, TowerError, SPEED_MODE_MULTIPLIER,
};
use tower_defence_rendering::{AtlasError, AtlasPack, Render, ShapeRenderer, Sprite, SpriteBatch};
use tower_defence_system_targeting::DefenderTargeting;
use tracing::{debug, info};

use crate::defender::Defender;
use crate::enemy::Enemy;
use crate::level::Level;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Upgrade {
    Damage,
    Range,
    Speed,
}

impl Upgrade {
    fn cost(self, defender: &Defender) -> u32 {
        match self {
            Self::Damage => defender.attack_cost(),
            Self::Range => defender.range_price(),
            Self::Speed => defender.speed_price(),
        }
    }

    fn apply(self, defender: &mut Defender) {
        match self {
            Self::Damage => defender.damage_upgrade(),
            Self::Range => defender.range_upgrade(),
            Self::Speed => defender.speed_upgrade(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Damage => "damage",
            Self::Range => "range",
            Self::Speed => "speed",
        }
    }
}

/// Owns every defender on the map together with the player's selection state.
///
/// The level is passed into each operation that touches money or the map
/// rather than being stored, so the controller never outlives or aliases it.
#[derive(Debug, Default)]
pub struct TowerController {
    defenders: Vec<Defender>,
    next_defender_id: u32,
    selected_tower_type: Option<DefenderKind>,
    tower_selected: bool,
    selected_defender: Option<DefenderId>,
    speed_mode: bool,
    targeting: DefenderTargeting,
    defender_snapshots: Vec<DefenderSnapshot>,
    enemy_snapshots: Vec<EnemySnapshot>,
    targets: Vec<DefenderTarget>,
    sprites: HashMap<DefenderKind, (Sprite, Sprite)>,
}

impl TowerController {
    /// Creates a controller with no defenders, nothing selected and normal speed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves the normal and selected sprites of every defender kind.
    pub fn initialize_sprites(&mut self, atlas: &AtlasPack) -> Result<(), AtlasError> {
        let mut sprites = HashMap::new();
        for kind in DefenderKind::ALL {
            let sprite = atlas.create_sprite(kind.region_name())?;
            let selected = atlas.create_sprite(kind.selected_region_name())?;
            let _ = sprites.insert(kind, (sprite, selected));
        }
        for defender in &mut self.defenders {
            if let Some(&(sprite, selected)) = sprites.get(&defender.kind()) {
                defender.set_sprites(sprite, selected);
            }
        }
        self.sprites = sprites;
        Ok(())
    }

    /// Reports whether a defender may be placed on the tile under `(x, y)`.
    ///
    /// The tile must exist and be ground, and its bounds must not overlap the
    /// hitbox of any existing defender.
    #[must_use]
    pub fn legal_placement(&self, level: &Level, x: f32, y: f32) -> bool {
        let Some(tile) = level.map().selected_tile(x, y) else {
            return false;
        };
        if tile.grid_type() != GridType::Ground {
            return false;
        }
        let candidate = tile.bounds();
        !self
            .defenders
            .iter()
            .any(|defender| defender.hit_box().overlaps(&candidate))
    }

    /// Builds a defender of `kind` on the tile under `(x, y)`.
    ///
    /// Returns the amount debited from the level: the kind's price on
    /// success, `0` when the placement is illegal or unaffordable.
    pub fn build_tower(&mut self, level: &mut Level, x: f32, y: f32, kind: DefenderKind) -> u32 {
        if !self.legal_placement(level, x, y) {
            debug!(x, y, kind = ?kind, "placement_rejected");
            return 0;
        }
        let Some(area) = level.map().selected_tile(x, y).map(|tile| tile.bounds()) else {
            return 0;
        };
        let price = kind.price();
        if let Err(error) = level.remove_money(price) {
            debug!(%error, kind = ?kind, "build_unaffordable");
            return 0;
        }

        let id = DefenderId::new(self.next_defender_id);
        self.next_defender_id = self.next_defender_id.wrapping_add(1);
        let mut defender = Defender::new(id, kind, area);
        if self.speed_mode {
            defender.set_speed(defender.speed() * SPEED_MODE_MULTIPLIER);
        }
        if let Some(&(sprite, selected)) = self.sprites.get(&kind) {
            defender.set_sprites(sprite, selected);
        }
        self.defenders.push(defender);

        info!(
            defender = id.get(),
            kind = ?kind,
            price,
            x = area.x,
            y = area.y,
            "defender_built"
        );
        price
    }

    /// Buys a damage upgrade for the selected defender and returns its cost.
    pub fn upgrade_damage(&mut self, level: &mut Level) -> Result<u32, TowerError> {
        self.purchase_upgrade(level, Upgrade::Damage)
    }

    /// Buys a range upgrade for the selected defender and returns its cost.
    pub fn upgrade_range(&mut self, level: &mut Level) -> Result<u32, TowerError> {
        self.purchase_upgrade(level, Upgrade::Range)
    }

    /// Buys a speed upgrade for the selected defender and returns its cost.
    pub fn upgrade_speed(&mut self, level: &mut Level) -> Result<u32, TowerError> {
        self.purchase_upgrade(level, Upgrade::Speed)
    }

    fn purchase_upgrade(&mut self, level: &mut Level, upgrade: Upgrade) -> Result<u32, TowerError> {
        let index = self.selected_index().ok_or(TowerError::NoSelection)?;
        let defender = &mut self.defenders[index];
        let cost = upgrade.cost(defender);
        level.remove_money(cost)?;
        upgrade.apply(defender);

        info!(
            defender = defender.id().get(),
            upgrade = upgrade.name(),
            cost,
            "defender_upgraded"
        );
        Ok(cost)
    }

    /// Sells the selected defender, refunding three quarters of its price.
    ///
    /// The defender is removed and the selection cleared. Returns the refund.
    pub fn sell_selected_defender(&mut self, level: &mut Level) -> Result<u32, TowerError> {
        let index = self.selected_index().ok_or(TowerError::NoSelection)?;
        let defender = self.defenders.remove(index);
        let refund = sell_refund(defender.price() as f32);
        level.add_money(refund);
        self.selected_defender = None;

        info!(
            defender = defender.id().get(),
            price = defender.price(),
            refund,
            "defender_sold"
        );
        Ok(refund)
    }

    /// Enters speed mode, doubling the speed of every defender.
    ///
    /// Each call doubles again; callers toggling speed mode should check
    /// [`is_speed_mode`](Self::is_speed_mode) first.
    pub fn double_speed_clicked(&mut self) {
        for defender in &mut self.defenders {
            defender.set_speed(defender.speed() * SPEED_MODE_MULTIPLIER);
        }
        self.speed_mode = true;
        info!(defenders = self.defenders.len(), "speed_mode_enabled");
    }

    /// Leaves speed mode, halving the speed of every defender.
    ///
    /// Halves unconditionally, even when speed mode is not active.
    pub fn normal_speed_clicked(&mut self) {
        for defender in &mut self.defenders {
            defender.set_speed(defender.speed() / SPEED_MODE_MULTIPLIER);
        }
        self.speed_mode = false;
        info!(defenders = self.defenders.len(), "speed_mode_disabled");
    }

    /// Whether double speed is active.
    #[must_use]
    pub fn is_speed_mode(&self) -> bool {
        self.speed_mode
    }

    /// Arms the build cursor with `kind`.
    pub fn set_tower_selected(&mut self, kind: DefenderKind) {
        self.selected_tower_type = Some(kind);
        self.tower_selected = true;
    }

    /// Most recently armed defender kind.
    ///
    /// The kind is remembered after [`clear_selected_tower`](Self::clear_selected_tower);
    /// use [`is_tower_selected`](Self::is_tower_selected) to tell whether it is armed.
    #[must_use]
    pub fn selected_tower_type(&self) -> Option<DefenderKind> {
        self.selected_tower_type
    }

    /// Whether a defender kind is armed for building.
    #[must_use]
    pub fn is_tower_selected(&self) -> bool {
        self.tower_selected
    }

    /// Selects the defender with `id` as the target of upgrades and selling.
    ///
    /// Returns `false` and clears the selection when no such defender exists.
    pub fn set_selected_tower_upgrade(&mut self, id: DefenderId) -> bool {
        let found = self.defenders.iter().any(|defender| defender.id() == id);
        self.selected_defender = found.then_some(id);
        for defender in &mut self.defenders {
            let selected = found && defender.id() == id;
            defender.object_mut().set_selected(selected);
        }
        found
    }

    /// Defender currently selected for upgrades.
    #[must_use]
    pub fn selected_defender_upgrade(&self) -> Option<&Defender> {
        let id = self.selected_defender?;
        self.defenders.iter().find(|defender| defender.id() == id)
    }

    /// Selects the defender whose hitbox contains `(x, y)`, or clears the
    /// selection when there is none.
    pub fn select_defender_at(&mut self, x: f32, y: f32) -> Option<DefenderId> {
        let point = Vec2::new(x, y);
        let hit = self
            .defenders
            .iter()
            .find(|defender| defender.hit_box().contains(point))
            .map(Defender::id);
        match hit {
            Some(id) => {
                let _ = self.set_selected_tower_upgrade(id);
            }
            None => self.clear_selected_defender(),
        }
        hit
    }

    /// Drops both the selected defender and the armed tower type.
    pub fn clear_selected_tower(&mut self) {
        self.clear_selected_defender();
        self.tower_selected = false;
    }

    fn clear_selected_defender(&mut self) {
        self.selected_defender = None;
        for defender in &mut self.defenders {
            defender.object_mut().set_selected(false);
        }
    }

    /// Every defender on the map, in build order.
    #[must_use]
    pub fn defender_list(&self) -> &[Defender] {
        &self.defenders
    }

    /// Mutable access to the defenders.
    pub fn defender_list_mut(&mut self) -> &mut [Defender] {
        &mut self.defenders
    }

    /// Reloads every defender and fires the ready ones at their targets.
    ///
    /// Bombers also damage every other enemy within their splash radius of
    /// the target.
    pub fn update(&mut self, elapsed: Duration, enemies: &mut [Enemy]) {
        self.defender_snapshots.clear();
        for defender in &mut self.defenders {
            if defender.tick(elapsed) {
                self.defender_snapshots.push(defender.snapshot());
            }
        }
        self.enemy_snapshots.clear();
        self.enemy_snapshots.extend(
            enemies
                .iter()
                .filter(|enemy| !enemy.is_dead())
                .map(Enemy::snapshot),
        );
        self.targeting.handle(
            &self.defender_snapshots,
            &self.enemy_snapshots,
            &mut self.targets,
        );

        for target in &self.targets {
            let Some(defender) = self
                .defenders
                .iter_mut()
                .find(|defender| defender.id() == target.defender)
            else {
                continue;
            };
            let Some(enemy) = enemies
                .iter_mut()
                .find(|enemy| enemy.id() == target.enemy && !enemy.is_dead())
            else {
                continue;
            };
            let impact = enemy.center();
            let _ = enemy.apply_damage(defender.damage());

            let splash = defender.kind().splash_radius();
            if splash > 0.0 {
                for other in enemies.iter_mut() {
                    if other.id() != target.enemy && other.center().distance(impact) <= splash {
                        let _ = other.apply_damage(defender.damage());
                    }
                }
            }
            defender.reload();
        }
    }

    fn selected_index(&self) -> Option<usize> {
        let id = self.selected_defender?;
        self.defenders.iter().position(|defender| defender.id() == id)
    }
}

impl Render for TowerController {
    fn render_shapes(&self, shapes: &mut dyn ShapeRenderer) {
        for defender in &self.defenders {
            defender.render_shapes(shapes);
        }
    }

    fn render_sprites(&self, batch: &mut dyn SpriteBatch) {
        for defender in &self.defenders {
            defender.render_sprites(batch);
        }
    }
}
