#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Tower Defence adapters.
//!
//! Game objects draw themselves through two narrow renderer traits:
//! [`ShapeRenderer`] for outlines (hitboxes, ranges, health bars) and
//! [`SpriteBatch`] for textured quads cut from a packed [`atlas`]. Backends
//! implement both traits and hand them to the game once per frame through a
//! [`Canvas`].

pub mod atlas;

use anyhow::Result as AnyResult;
use glam::Vec2;
use std::time::Duration;
use tower_defence_core::{PlayerAction, Rect};

pub use atlas::{AtlasError, AtlasPack, AtlasPage, AtlasRegion, TextureFilter};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Drawable image cut out of an atlas page.
///
/// Sprites are plain data: the page index and source rectangle are resolved
/// against loaded textures by the backend's [`SpriteBatch`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sprite {
    /// Index of the atlas page that holds the image.
    pub page: usize,
    /// Pixel rectangle occupied by the image on its page.
    pub source: Rect,
    /// Whether the packer stored the image rotated by 90 degrees.
    pub rotated: bool,
}

impl Sprite {
    /// Creates a sprite from an atlas page index and source rectangle.
    #[must_use]
    pub const fn new(page: usize, source: Rect, rotated: bool) -> Self {
        Self {
            page,
            source,
            rotated,
        }
    }
}

/// Draws untextured outlines and fills.
pub trait ShapeRenderer {
    /// Sets the color used by subsequent shapes.
    fn set_color(&mut self, color: Color);

    /// Outlines an axis-aligned rectangle.
    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32);

    /// Fills an axis-aligned rectangle.
    fn filled_rect(&mut self, x: f32, y: f32, width: f32, height: f32);

    /// Outlines a circle.
    fn circle(&mut self, x: f32, y: f32, radius: f32);
}

/// Draws atlas sprites.
pub trait SpriteBatch {
    /// Draws the sprite stretched over the provided rectangle.
    fn draw(&mut self, sprite: &Sprite, x: f32, y: f32, width: f32, height: f32);
}

/// Something that knows how to present itself through both renderer kinds.
pub trait Render {
    /// Draws outlines through the shape renderer.
    fn render_shapes(&self, shapes: &mut dyn ShapeRenderer);

    /// Draws textures through the sprite batch.
    fn render_sprites(&self, batch: &mut dyn SpriteBatch);
}

/// Per-frame drawing surface handed to the game by a backend.
pub trait Canvas {
    /// Shape renderer bound to the current frame.
    fn shapes(&mut self) -> &mut dyn ShapeRenderer;

    /// Sprite batch bound to the current frame.
    fn sprites(&mut self) -> &mut dyn SpriteBatch;

    /// Draws a line of text with its baseline at `(x, y)`.
    fn text(&mut self, text: &str, x: f32, y: f32, font_size: f32, color: Color);
}

/// Input snapshot gathered by adapters before updating the game.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Cursor position expressed in world units, if the cursor is over the map.
    pub cursor_world_space: Option<Vec2>,
    /// Whether the primary mouse button was pressed on this frame.
    pub primary_click: bool,
    /// Discrete actions requested on this frame, in the order they were observed.
    pub actions: Vec<PlayerAction>,
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Width and height of the playable area in world units.
    pub world_size: Vec2,
    /// Height reserved below the playable area for the control panel.
    pub panel_height: f32,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, world_size: Vec2, panel_height: f32) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            world_size,
            panel_height,
        }
    }
}

/// Rendering backend capable of running the game loop.
pub trait RenderingBackend {
    /// Runs the backend until it is requested to exit.
    ///
    /// The provided `frame` closure receives the elapsed frame time, the input
    /// captured by the adapter, and the canvas it should draw onto. It returns
    /// `false` to request shutdown.
    fn run<F>(self, presentation: Presentation, frame: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut dyn Canvas) -> bool + 'static;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lighten_moves_channels_toward_white() {
        let color = Color::new(0.0, 0.5, 1.0, 0.25).lighten(0.5);

        assert_eq!(color, Color::new(0.5, 0.75, 1.0, 0.25));
    }

    #[test]
    fn lighten_clamps_amount() {
        let color = Color::from_rgb_u8(0, 0, 0).lighten(4.0);

        assert_eq!(color, Color::WHITE);
    }

    #[test]
    fn presentation_accepts_owned_and_borrowed_titles() {
        let borrowed = Presentation::new("Title", Color::WHITE, Vec2::new(10.0, 20.0), 5.0);
        let owned = Presentation::new(
            String::from("Title"),
            Color::WHITE,
            Vec2::new(10.0, 20.0),
            5.0,
        );

        assert_eq!(borrowed, owned);
    }
}
