//! Base entity shared by tiles, defenders and enemies.

use std::time::Duration;

use glam::Vec2;
use tower_defence_core::Rect;
use tower_defence_rendering::{AtlasError, AtlasPack, Render, ShapeRenderer, Sprite, SpriteBatch};

/// Positioned, sized object with optional normal and selected sprites.
///
/// `center` and `bounds` are derived from `position` and `size`. They are
/// recomputed whenever either input changes and on every [`update`](Self::update),
/// and cannot be written directly.
#[derive(Clone, Debug, PartialEq)]
pub struct GameObject {
    position: Vec2,
    size: Vec2,
    center: Vec2,
    bounds: Rect,
    sprite: Option<Sprite>,
    sprite_selected: Option<Sprite>,
    visible: bool,
    selected: bool,
}

impl GameObject {
    /// Creates a visible, unselected object without sprites.
    #[must_use]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        let position = Vec2::new(x, y);
        let size = Vec2::new(width, height);
        Self {
            position,
            size,
            center: position + size / 2.0,
            bounds: Rect::from_position_and_size(position, size),
            sprite: None,
            sprite_selected: None,
            visible: true,
            selected: false,
        }
    }

    /// Resolves the two named atlas regions and stores them as the object's
    /// normal and selected sprites.
    ///
    /// Both regions are resolved before anything is stored, so a missing
    /// region leaves the previous sprites in place.
    pub fn initialize_sprites(
        &mut self,
        atlas: &AtlasPack,
        regular_region: &str,
        selected_region: &str,
    ) -> Result<(), AtlasError> {
        let sprite = atlas.create_sprite(regular_region)?;
        let sprite_selected = atlas.create_sprite(selected_region)?;
        self.sprite = Some(sprite);
        self.sprite_selected = Some(sprite_selected);
        Ok(())
    }

    /// Replaces both sprites.
    pub fn set_sprites(&mut self, sprite: Option<Sprite>, sprite_selected: Option<Sprite>) {
        self.sprite = sprite;
        self.sprite_selected = sprite_selected;
    }

    /// Recomputes the derived center and bounds from the current position and size.
    pub fn update(&mut self, _elapsed: Duration) {
        self.sync_derived();
    }

    /// Upper-left corner in world units.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Moves the object so its upper-left corner sits at `position`.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.sync_derived();
    }

    /// Width and height in world units.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Resizes the object.
    pub fn set_size(&mut self, size: Vec2) {
        self.size = size;
        self.sync_derived();
    }

    /// Center point derived from position and size.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.center
    }

    /// Bounds rectangle derived from position and size, used for collisions.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Whether the object is drawn.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Shows or hides the object.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Whether the object is drawn with its selected sprite.
    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Marks the object as selected or not.
    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    /// Sprite drawn while unselected.
    #[must_use]
    pub fn sprite(&self) -> Option<&Sprite> {
        self.sprite.as_ref()
    }

    /// Sprite drawn while selected.
    #[must_use]
    pub fn sprite_selected(&self) -> Option<&Sprite> {
        self.sprite_selected.as_ref()
    }

    fn sync_derived(&mut self) {
        self.bounds.set(
            self.position.x,
            self.position.y,
            self.size.x,
            self.size.y,
        );
        self.center = self.position + self.size / 2.0;
    }
}

impl Render for GameObject {
    /// Outlines the bounds rectangle while visible.
    fn render_shapes(&self, shapes: &mut dyn ShapeRenderer) {
        if self.visible {
            shapes.rect(self.position.x, self.position.y, self.size.x, self.size.y);
        }
    }

    /// Draws the selected or normal sprite while visible.
    fn render_sprites(&self, batch: &mut dyn SpriteBatch) {
        if !self.visible {
            return;
        }
        let to_draw = if self.selected {
            self.sprite_selected.as_ref()
        } else {
            self.sprite.as_ref()
        };
        if let Some(sprite) = to_draw {
            batch.draw(
                sprite,
                self.position.x,
                self.position.y,
                self.size.x,
                self.size.y,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tower_defence_rendering::Color;

    #[derive(Default)]
    struct RecordingShapes {
        rects: Vec<Rect>,
    }

    impl ShapeRenderer for RecordingShapes {
        fn set_color(&mut self, _color: Color) {}

        fn rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
            self.rects.push(Rect::new(x, y, width, height));
        }

        fn filled_rect(&mut self, _x: f32, _y: f32, _width: f32, _height: f32) {}

        fn circle(&mut self, _x: f32, _y: f32, _radius: f32) {}
    }

    #[derive(Default)]
    struct RecordingBatch {
        draws: Vec<(Sprite, Rect)>,
    }

    impl SpriteBatch for RecordingBatch {
        fn draw(&mut self, sprite: &Sprite, x: f32, y: f32, width: f32, height: f32) {
            self.draws.push((*sprite, Rect::new(x, y, width, height)));
        }
    }

    fn atlas() -> AtlasPack {
        AtlasPack::parse(
            "pack.png\nsize: 64, 32\nidle\n  xy: 0, 0\n  size: 32, 32\nhover\n  xy: 32, 0\n  size: 32, 32\n",
            Path::new(""),
        )
        .expect("test atlas parses")
    }

    #[test]
    fn construction_derives_center_and_bounds() {
        let object = GameObject::new(10.0, 20.0, 30.0, 40.0);

        assert_eq!(object.center(), Vec2::new(25.0, 40.0));
        assert_eq!(object.bounds(), Rect::new(10.0, 20.0, 30.0, 40.0));
        assert!(object.is_visible());
        assert!(!object.is_selected());
    }

    #[test]
    fn moving_and_resizing_keep_derived_state_in_sync() {
        let mut object = GameObject::new(0.0, 0.0, 10.0, 10.0);

        object.set_position(Vec2::new(100.0, 50.0));
        object.set_size(Vec2::new(20.0, 8.0));
        object.update(Duration::from_millis(16));

        assert_eq!(object.position(), Vec2::new(100.0, 50.0));
        assert_eq!(object.center(), Vec2::new(110.0, 54.0));
        assert_eq!(object.bounds(), Rect::new(100.0, 50.0, 20.0, 8.0));
    }

    #[test]
    fn shape_render_outlines_bounds_only_while_visible() {
        let mut object = GameObject::new(1.0, 2.0, 3.0, 4.0);
        let mut shapes = RecordingShapes::default();

        object.render_shapes(&mut shapes);
        object.set_visible(false);
        object.render_shapes(&mut shapes);

        assert_eq!(shapes.rects, vec![Rect::new(1.0, 2.0, 3.0, 4.0)]);
    }

    #[test]
    fn sprite_render_picks_sprite_by_selection() {
        let atlas = atlas();
        let mut object = GameObject::new(5.0, 5.0, 64.0, 64.0);
        object
            .initialize_sprites(&atlas, "idle", "hover")
            .expect("both regions exist");
        let mut batch = RecordingBatch::default();

        object.render_sprites(&mut batch);
        object.set_selected(true);
        object.render_sprites(&mut batch);

        assert_eq!(batch.draws.len(), 2);
        assert_eq!(batch.draws[0].0.source, Rect::new(0.0, 0.0, 32.0, 32.0));
        assert_eq!(batch.draws[1].0.source, Rect::new(32.0, 0.0, 32.0, 32.0));
        assert_eq!(batch.draws[1].1, Rect::new(5.0, 5.0, 64.0, 64.0));
    }

    #[test]
    fn sprite_render_skips_missing_sprites_and_hidden_objects() {
        let mut object = GameObject::new(0.0, 0.0, 8.0, 8.0);
        let mut batch = RecordingBatch::default();

        object.render_sprites(&mut batch);
        assert!(batch.draws.is_empty(), "no sprite assigned yet");

        object
            .initialize_sprites(&atlas(), "idle", "hover")
            .expect("both regions exist");
        object.set_visible(false);
        object.render_sprites(&mut batch);
        assert!(batch.draws.is_empty(), "hidden objects draw nothing");
    }

    #[test]
    fn missing_region_leaves_sprites_untouched() {
        let atlas = atlas();
        let mut object = GameObject::new(0.0, 0.0, 8.0, 8.0);

        let error = object
            .initialize_sprites(&atlas, "idle", "absent")
            .expect_err("selected region is missing");

        assert!(matches!(error, AtlasError::MissingRegion { name } if name == "absent"));
        assert!(object.sprite().is_none());
        assert!(object.sprite_selected().is_none());
    }
}
