//! Enemies walking the path and the controller that runs waves of them.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tower_defence_core::{EnemyId, EnemyKind, EnemySnapshot, GameConfig};
use tower_defence_rendering::{
    AtlasError, AtlasPack, Color, Render, ShapeRenderer, Sprite, SpriteBatch,
};
use tracing::{debug, info};

use crate::game_object::GameObject;
use crate::level::Level;

const ENEMY_SIZE_RATIO: f32 = 0.5;
const HEALTH_BAR_HEIGHT: f32 = 4.0;
const HEALTH_BAR_BACKGROUND: Color = Color::from_rgb_u8(0x80, 0x10, 0x10);
const HEALTH_BAR_FOREGROUND: Color = Color::from_rgb_u8(0x30, 0xd0, 0x30);

/// Enemy following the path towards the exit.
#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    id: EnemyId,
    kind: EnemyKind,
    object: GameObject,
    health: f32,
    max_health: f32,
    speed: f32,
    reward: u32,
    next_waypoint: usize,
    progress: f32,
    leaked: bool,
}

impl Enemy {
    /// Creates an enemy centered on the first path point.
    #[must_use]
    pub fn new(id: EnemyId, kind: EnemyKind, health: f32, spawn: Vec2, size: f32) -> Self {
        let half = size / 2.0;
        Self {
            id,
            kind,
            object: GameObject::new(spawn.x - half, spawn.y - half, size, size),
            health,
            max_health: health,
            speed: kind.speed(),
            reward: kind.reward(),
            next_waypoint: 1,
            progress: 0.0,
            leaked: false,
        }
    }

    /// Identifier allocated by the enemy controller.
    #[must_use]
    pub fn id(&self) -> EnemyId {
        self.id
    }

    /// Kind of enemy.
    #[must_use]
    pub fn kind(&self) -> EnemyKind {
        self.kind
    }

    /// Underlying game object.
    #[must_use]
    pub fn object(&self) -> &GameObject {
        &self.object
    }

    /// Center of the enemy in world units.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.object.center()
    }

    /// Remaining health.
    #[must_use]
    pub fn health(&self) -> f32 {
        self.health
    }

    /// Health the enemy spawned with.
    #[must_use]
    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    /// Money paid out when the enemy is killed.
    #[must_use]
    pub fn reward(&self) -> u32 {
        self.reward
    }

    /// Distance walked along the path in world units.
    #[must_use]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Whether the enemy has run out of health.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    /// Whether the enemy has reached the end of the path.
    #[must_use]
    pub fn has_leaked(&self) -> bool {
        self.leaked
    }

    /// Walks the enemy along `path` for the elapsed time.
    ///
    /// Reaching the final point marks the enemy as leaked.
    pub fn advance(&mut self, elapsed: Duration, speed_multiplier: f32, path: &[Vec2]) {
        if self.leaked || self.is_dead() {
            return;
        }
        let mut center = self.object.center();
        let mut remaining = self.speed * speed_multiplier * elapsed.as_secs_f32();

        while remaining > 0.0 {
            let Some(&target) = path.get(self.next_waypoint) else {
                break;
            };
            let distance = center.distance(target);
            if distance <= remaining {
                center = target;
                remaining -= distance;
                self.progress += distance;
                self.next_waypoint += 1;
            } else {
                center += (target - center) / distance * remaining;
                self.progress += remaining;
                remaining = 0.0;
            }
        }
        if self.next_waypoint >= path.len() {
            self.leaked = true;
        }

        let size = self.object.size();
        self.object.set_position(center - size / 2.0);
    }

    /// Subtracts health and reports whether the hit killed the enemy.
    pub fn apply_damage(&mut self, amount: f32) -> bool {
        if self.is_dead() {
            return false;
        }
        self.health -= amount.max(0.0);
        self.is_dead()
    }

    /// Targeting view of the enemy.
    #[must_use]
    pub fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            center: self.center(),
            progress: self.progress,
        }
    }
}

impl Render for Enemy {
    fn render_shapes(&self, shapes: &mut dyn ShapeRenderer) {
        if !self.object.is_visible() {
            return;
        }
        let position = self.object.position();
        let width = self.object.size().x;
        let fraction = (self.health / self.max_health).clamp(0.0, 1.0);
        let bar_y = position.y - HEALTH_BAR_HEIGHT * 2.0;

        shapes.set_color(HEALTH_BAR_BACKGROUND);
        shapes.filled_rect(position.x, bar_y, width, HEALTH_BAR_HEIGHT);
        shapes.set_color(HEALTH_BAR_FOREGROUND);
        shapes.filled_rect(position.x, bar_y, width * fraction, HEALTH_BAR_HEIGHT);
        self.object.render_shapes(shapes);
    }

    fn render_sprites(&self, batch: &mut dyn SpriteBatch) {
        self.object.render_sprites(batch);
    }
}

/// Spawns waves of enemies and walks them along the level's path.
#[derive(Debug)]
pub struct EnemyController {
    enemies: Vec<Enemy>,
    queue: VecDeque<EnemyKind>,
    rng: ChaCha8Rng,
    next_enemy_id: EnemyId,
    spawn_interval: f32,
    spawn_timer: f32,
    speed_multiplier: f32,
    wave_base_size: u32,
    wave_size_growth: u32,
    wave_health_growth: f32,
    health_scale: f32,
    sprites: HashMap<EnemyKind, Sprite>,
}

impl EnemyController {
    /// Creates an idle controller using the wave settings from `config`.
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        Self {
            enemies: Vec::new(),
            queue: VecDeque::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            next_enemy_id: EnemyId::new(0),
            spawn_interval: config.spawn_interval_seconds,
            spawn_timer: 0.0,
            speed_multiplier: 1.0,
            wave_base_size: config.wave_base_size,
            wave_size_growth: config.wave_size_growth,
            wave_health_growth: config.wave_health_growth,
            health_scale: 1.0,
            sprites: HashMap::new(),
        }
    }

    /// Resolves the sprite of every enemy kind.
    pub fn initialize_sprites(&mut self, atlas: &AtlasPack) -> Result<(), AtlasError> {
        self.sprites = EnemyKind::ALL
            .iter()
            .map(|&kind| atlas.create_sprite(kind.region_name()).map(|sprite| (kind, sprite)))
            .collect::<Result<_, _>>()?;
        for enemy in &mut self.enemies {
            let sprite = self.sprites.get(&enemy.kind).copied();
            enemy.object.set_sprites(sprite, sprite);
        }
        Ok(())
    }

    /// Queues the next wave and returns the number of enemies in it.
    ///
    /// Wave `n` holds `base + growth * (n - 1)` enemies. Scouts appear from the
    /// first wave, grunts from the second and brutes from the third.
    pub fn start_wave(&mut self, level: &mut Level) -> u32 {
        let wave = level.advance_wave();
        let count = self
            .wave_base_size
            .saturating_add(self.wave_size_growth.saturating_mul(wave - 1));
        self.health_scale = 1.0 + self.wave_health_growth * (wave - 1) as f32;

        let unlocked = EnemyKind::ALL.len().min(wave as usize);
        for _ in 0..count {
            let kind = EnemyKind::ALL[self.rng.gen_range(0..unlocked)];
            self.queue.push_back(kind);
        }
        if self.enemies.is_empty() {
            self.spawn_timer = 0.0;
        }

        info!(wave, enemies = count, "wave_started");
        count
    }

    /// Whether enemies are still queued or walking.
    #[must_use]
    pub fn is_wave_active(&self) -> bool {
        !self.queue.is_empty() || !self.enemies.is_empty()
    }

    /// Number of enemies waiting to spawn.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Spawns due enemies, moves every enemy and settles kills and leaks.
    ///
    /// Killed enemies pay their reward into the level; leaked enemies cost a
    /// life. Both are removed.
    pub fn update(&mut self, elapsed: Duration, level: &mut Level) {
        let path = level.map().path_points();
        let tile_size = level.map().tile_size();

        if !self.queue.is_empty() {
            self.spawn_timer -= elapsed.as_secs_f32() * self.speed_multiplier;
            while self.spawn_timer <= 0.0 {
                let Some(kind) = self.queue.pop_front() else {
                    break;
                };
                let id = self.allocate_id();
                let mut enemy = Enemy::new(
                    id,
                    kind,
                    kind.base_health() * self.health_scale,
                    path[0],
                    tile_size * ENEMY_SIZE_RATIO,
                );
                let sprite = self.sprites.get(&kind).copied();
                enemy.object.set_sprites(sprite, sprite);
                debug!(enemy = id.get(), kind = ?kind, "enemy_spawned");
                self.enemies.push(enemy);
                self.spawn_timer += self.spawn_interval;
            }
        }

        for enemy in &mut self.enemies {
            enemy.advance(elapsed, self.speed_multiplier, path);
        }

        let mut rewards = 0;
        let mut leaks = 0;
        self.enemies.retain(|enemy| {
            if enemy.is_dead() {
                rewards += enemy.reward;
                debug!(enemy = enemy.id.get(), reward = enemy.reward, "enemy_killed");
                false
            } else if enemy.leaked {
                leaks += 1;
                info!(enemy = enemy.id.get(), kind = ?enemy.kind, "enemy_leaked");
                false
            } else {
                true
            }
        });

        level.add_money(rewards);
        for _ in 0..leaks {
            level.lose_life();
        }
    }

    /// Enemies currently on the map, in spawn order.
    #[must_use]
    pub fn enemy_list(&self) -> &[Enemy] {
        &self.enemies
    }

    /// Mutable access to the enemies on the map.
    pub fn enemy_list_mut(&mut self) -> &mut [Enemy] {
        &mut self.enemies
    }

    /// Multiplier applied to walking speed and spawn timing.
    #[must_use]
    pub fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    /// Sets the multiplier applied to walking speed and spawn timing.
    pub fn set_speed_multiplier(&mut self, multiplier: f32) {
        self.speed_multiplier = multiplier;
    }

    fn allocate_id(&mut self) -> EnemyId {
        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().wrapping_add(1));
        id
    }
}

impl Render for EnemyController {
    fn render_shapes(&self, shapes: &mut dyn ShapeRenderer) {
        for enemy in &self.enemies {
            enemy.render_shapes(shapes);
        }
    }

    fn render_sprites(&self, batch: &mut dyn SpriteBatch) {
        for enemy in &self.enemies {
            enemy.render_sprites(batch);
        }
    }
}
