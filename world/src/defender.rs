//! Placeable defenders and their upgrade bookkeeping.

use std::time::Duration;

use glam::Vec2;
use tower_defence_core::{
    next_upgrade_cost, DefenderId, DefenderKind, DefenderSnapshot, Rect, DAMAGE_UPGRADE_BASE_COST,
    DAMAGE_UPGRADE_FACTOR, RANGE_UPGRADE_BASE_COST, RANGE_UPGRADE_FACTOR, SPEED_UPGRADE_BASE_COST,
    SPEED_UPGRADE_FACTOR,
};
use tower_defence_rendering::{Color, Render, ShapeRenderer, Sprite, SpriteBatch};

use crate::game_object::GameObject;

const RANGE_COLOR: Color = Color::from_rgb_u8(0xf0, 0xe0, 0x60);
const OUTLINE_COLOR: Color = Color::from_rgb_u8(0x20, 0x20, 0x20);

/// Defender placed on a ground tile.
///
/// `price` starts at the build price and grows by every upgrade cost paid, so
/// it always reflects the total spent on the defender.
#[derive(Clone, Debug, PartialEq)]
pub struct Defender {
    id: DefenderId,
    kind: DefenderKind,
    object: GameObject,
    damage: f32,
    range: f32,
    speed: f32,
    price: u32,
    attack_cost: u32,
    range_price: u32,
    speed_price: u32,
    damage_level: u32,
    range_level: u32,
    speed_level: u32,
    cooldown: f32,
}

impl Defender {
    /// Creates a defender of `kind` occupying the provided rectangle.
    #[must_use]
    pub fn new(id: DefenderId, kind: DefenderKind, area: Rect) -> Self {
        Self {
            id,
            kind,
            object: GameObject::new(area.x, area.y, area.width, area.height),
            damage: kind.base_damage(),
            range: kind.base_range(),
            speed: kind.base_speed(),
            price: kind.price(),
            attack_cost: DAMAGE_UPGRADE_BASE_COST,
            range_price: RANGE_UPGRADE_BASE_COST,
            speed_price: SPEED_UPGRADE_BASE_COST,
            damage_level: 0,
            range_level: 0,
            speed_level: 0,
            cooldown: 0.0,
        }
    }

    /// Identifier allocated by the tower controller.
    #[must_use]
    pub fn id(&self) -> DefenderId {
        self.id
    }

    /// Kind the defender was built as.
    #[must_use]
    pub fn kind(&self) -> DefenderKind {
        self.kind
    }

    /// Underlying game object.
    #[must_use]
    pub fn object(&self) -> &GameObject {
        &self.object
    }

    /// Mutable access to the underlying game object.
    pub fn object_mut(&mut self) -> &mut GameObject {
        &mut self.object
    }

    /// Collision rectangle used for placement checks.
    #[must_use]
    pub fn hit_box(&self) -> Rect {
        self.object.bounds()
    }

    /// Center of the defender in world units.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.object.center()
    }

    /// Damage dealt per shot.
    #[must_use]
    pub fn damage(&self) -> f32 {
        self.damage
    }

    /// Targeting radius in world units.
    #[must_use]
    pub fn range(&self) -> f32 {
        self.range
    }

    /// Shots per second, including the speed mode multiplier.
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Overwrites the attack speed.
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    /// Total money spent on the defender.
    #[must_use]
    pub fn price(&self) -> u32 {
        self.price
    }

    /// Cost of the next damage upgrade.
    #[must_use]
    pub fn attack_cost(&self) -> u32 {
        self.attack_cost
    }

    /// Cost of the next range upgrade.
    #[must_use]
    pub fn range_price(&self) -> u32 {
        self.range_price
    }

    /// Cost of the next speed upgrade.
    #[must_use]
    pub fn speed_price(&self) -> u32 {
        self.speed_price
    }

    /// Number of damage upgrades bought.
    #[must_use]
    pub fn damage_level(&self) -> u32 {
        self.damage_level
    }

    /// Number of range upgrades bought.
    #[must_use]
    pub fn range_level(&self) -> u32 {
        self.range_level
    }

    /// Number of speed upgrades bought.
    #[must_use]
    pub fn speed_level(&self) -> u32 {
        self.speed_level
    }

    /// Applies a damage upgrade that has already been paid for.
    pub fn damage_upgrade(&mut self) {
        self.damage *= DAMAGE_UPGRADE_FACTOR;
        self.price = self.price.saturating_add(self.attack_cost);
        self.attack_cost = next_upgrade_cost(self.attack_cost);
        self.damage_level += 1;
    }

    /// Applies a range upgrade that has already been paid for.
    pub fn range_upgrade(&mut self) {
        self.range *= RANGE_UPGRADE_FACTOR;
        self.price = self.price.saturating_add(self.range_price);
        self.range_price = next_upgrade_cost(self.range_price);
        self.range_level += 1;
    }

    /// Applies a speed upgrade that has already been paid for.
    pub fn speed_upgrade(&mut self) {
        self.speed *= SPEED_UPGRADE_FACTOR;
        self.price = self.price.saturating_add(self.speed_price);
        self.speed_price = next_upgrade_cost(self.speed_price);
        self.speed_level += 1;
    }

    /// Advances the reload timer and reports whether the defender may fire.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        self.object.update(elapsed);
        self.cooldown = (self.cooldown - elapsed.as_secs_f32()).max(0.0);
        self.cooldown <= 0.0
    }

    /// Starts the reload timer after a shot.
    pub fn reload(&mut self) {
        self.cooldown = if self.speed > 0.0 {
            1.0 / self.speed
        } else {
            f32::INFINITY
        };
    }

    /// Targeting view of the defender.
    #[must_use]
    pub fn snapshot(&self) -> DefenderSnapshot {
        DefenderSnapshot {
            id: self.id,
            center: self.center(),
            range: self.range,
        }
    }

    pub(crate) fn set_sprites(&mut self, sprite: Sprite, sprite_selected: Sprite) {
        self.object.set_sprites(Some(sprite), Some(sprite_selected));
    }
}

impl Render for Defender {
    fn render_shapes(&self, shapes: &mut dyn ShapeRenderer) {
        if !self.object.is_visible() {
            return;
        }
        shapes.set_color(OUTLINE_COLOR);
        self.object.render_shapes(shapes);
        if self.object.is_selected() {
            let center = self.center();
            shapes.set_color(RANGE_COLOR);
            shapes.circle(center.x, center.y, self.range);
        }
    }

    fn render_sprites(&self, batch: &mut dyn SpriteBatch) {
        self.object.render_sprites(batch);
    }
}
