#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Tower Defence.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! The adapter scales the world to fit the window, reserves a strip below it
//! for the control panel, and implements the shape and sprite renderers on
//! top of macroquad's immediate-mode drawing calls. All UI-specific calls live
//! inside the local `ui` module.

mod atlas;
mod ui;

use self::ui::{draw_control_panel_ui, ControlPanelUiContext, ControlPanelUiResult};
use anyhow::{Context, Result};
use glam::Vec2;
use macroquad::math::{Rect as MacroquadRect, Vec2 as MacroquadVec2};
use macroquad::{
    input::{is_key_pressed, is_mouse_button_pressed, mouse_position, KeyCode, MouseButton},
    shapes::{draw_circle_lines, draw_rectangle, draw_rectangle_lines},
    text::draw_text,
    texture::{draw_texture_ex, DrawTextureParams},
};
use std::{f32::consts::FRAC_PI_2, mem, sync::mpsc, time::Duration};
use tower_defence_core::{DefenderKind, PlayerAction};
use tower_defence_rendering::{
    AtlasPack, Canvas, Color, FrameInput, Presentation, RenderingBackend, ShapeRenderer, Sprite,
    SpriteBatch,
};
use tracing::info;

pub use self::atlas::{GameAtlas, DEFAULT_ATLAS_PATH};

const DEFAULT_WINDOW_WIDTH: i32 = 1024;
const DEFAULT_WINDOW_HEIGHT: i32 = 768;
const PANEL_BACKGROUND: Color = Color::from_rgb_u8(0x24, 0x24, 0x2c);

/// Keys that map directly onto player actions.
const ACTION_KEYS: [(KeyCode, PlayerAction); 10] = [
    (KeyCode::Key1, PlayerAction::SelectTowerType(DefenderKind::Gunner)),
    (KeyCode::Key2, PlayerAction::SelectTowerType(DefenderKind::Sniper)),
    (KeyCode::Key3, PlayerAction::SelectTowerType(DefenderKind::Bomber)),
    (KeyCode::D, PlayerAction::UpgradeDamage),
    (KeyCode::R, PlayerAction::UpgradeRange),
    (KeyCode::S, PlayerAction::UpgradeSpeed),
    (KeyCode::X, PlayerAction::SellSelected),
    (KeyCode::F, PlayerAction::ToggleSpeed),
    (KeyCode::Enter, PlayerAction::StartWave),
    (KeyCode::Escape, PlayerAction::ClearSelection),
];

/// Tracks UI-sourced interactions so they can be merged with physical input on the next frame.
#[doc(hidden)]
#[derive(Clone, Debug, Default)]
pub struct ControlPanelInputState {
    latched: Vec<PlayerAction>,
}

impl ControlPanelInputState {
    /// Returns the actions latched by control-panel buttons and clears the
    /// latch so each press fires only once.
    pub fn take_actions(&mut self) -> Vec<PlayerAction> {
        mem::take(&mut self.latched)
    }

    /// Records that a control-panel button requested `action` this frame.
    pub fn register(&mut self, action: PlayerAction) {
        self.latched.push(action);
    }
}

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Debug, Default)]
struct KeyboardShortcuts {
    /// `Q` quits the game loop.
    quit_requested: bool,
    /// Actions bound to keys pressed this frame, in binding order.
    actions: Vec<PlayerAction>,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        Self::from_pressed(is_key_pressed)
    }

    fn from_pressed(mut pressed: impl FnMut(KeyCode) -> bool) -> Self {
        let quit_requested = pressed(KeyCode::Q);
        let actions = ACTION_KEYS
            .iter()
            .filter(|(key, _)| pressed(*key))
            .map(|(_, action)| *action)
            .collect();

        Self {
            quit_requested,
            actions,
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    window_size: (i32, i32),
    atlas: Option<AtlasPack>,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            window_size: (DEFAULT_WINDOW_WIDTH, DEFAULT_WINDOW_HEIGHT),
            atlas: None,
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval
    /// and draws outlines only.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures the initial window size in pixels.
    #[must_use]
    pub fn with_window_size(mut self, width: i32, height: i32) -> Self {
        self.window_size = (width, height);
        self
    }

    /// Configures the atlas whose page textures are loaded once the window exists.
    ///
    /// Without an atlas sprite draws are skipped and only outlines appear.
    #[must_use]
    pub fn with_atlas(mut self, atlas: Option<AtlasPack>) -> Self {
        self.atlas = atlas;
        self
    }
}

/// Uniform scale and offset mapping world units onto the window.
#[derive(Clone, Copy, Debug, PartialEq)]
struct ScreenTransform {
    scale: f32,
    offset: Vec2,
}

impl ScreenTransform {
    /// Fits the world plus the panel strip below it into the screen, centred.
    fn fit(world_size: Vec2, panel_height: f32, screen: Vec2) -> Self {
        let total = Vec2::new(world_size.x, world_size.y + panel_height.max(0.0));
        if total.x <= 0.0 || total.y <= 0.0 {
            return Self {
                scale: 1.0,
                offset: Vec2::ZERO,
            };
        }
        let scale = (screen.x / total.x).min(screen.y / total.y).max(f32::EPSILON);
        let offset = (screen - total * scale) / 2.0;
        Self { scale, offset }
    }

    fn to_screen(self, world: Vec2) -> Vec2 {
        world * self.scale + self.offset
    }

    fn to_world(self, screen: Vec2) -> Vec2 {
        (screen - self.offset) / self.scale
    }

    fn length(self, world_length: f32) -> f32 {
        world_length * self.scale
    }

    /// World position of the cursor when it lies over the playable area.
    fn cursor_over_world(self, screen: Vec2, world_size: Vec2) -> Option<Vec2> {
        let world = self.to_world(screen);
        let inside = world.x >= 0.0
            && world.y >= 0.0
            && world.x < world_size.x
            && world.y < world_size.y;
        inside.then_some(world)
    }
}

struct MacroquadShapes {
    transform: ScreenTransform,
    color: macroquad::color::Color,
}

impl ShapeRenderer for MacroquadShapes {
    fn set_color(&mut self, color: Color) {
        self.color = to_macroquad_color(color);
    }

    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let origin = self.transform.to_screen(Vec2::new(x, y));
        draw_rectangle_lines(
            origin.x,
            origin.y,
            self.transform.length(width),
            self.transform.length(height),
            1.0,
            self.color,
        );
    }

    fn filled_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let origin = self.transform.to_screen(Vec2::new(x, y));
        draw_rectangle(
            origin.x,
            origin.y,
            self.transform.length(width),
            self.transform.length(height),
            self.color,
        );
    }

    fn circle(&mut self, x: f32, y: f32, radius: f32) {
        let center = self.transform.to_screen(Vec2::new(x, y));
        draw_circle_lines(
            center.x,
            center.y,
            self.transform.length(radius),
            1.5,
            self.color,
        );
    }
}

struct MacroquadSprites<'a> {
    transform: ScreenTransform,
    atlas: Option<&'a GameAtlas>,
}

impl SpriteBatch for MacroquadSprites<'_> {
    fn draw(&mut self, sprite: &Sprite, x: f32, y: f32, width: f32, height: f32) {
        let Some(texture) = self.atlas.and_then(|atlas| atlas.page(sprite.page)) else {
            return;
        };
        let origin = self.transform.to_screen(Vec2::new(x, y));
        let size = Vec2::new(self.transform.length(width), self.transform.length(height));
        let source = MacroquadRect::new(
            sprite.source.x,
            sprite.source.y,
            sprite.source.width,
            sprite.source.height,
        );

        // Rotated regions are stored a quarter turn clockwise on the page.
        let (position, dest_size, rotation) = if sprite.rotated {
            let center = origin + size / 2.0;
            let swapped = Vec2::new(size.y, size.x);
            (center - swapped / 2.0, swapped, -FRAC_PI_2)
        } else {
            (origin, size, 0.0)
        };

        draw_texture_ex(
            texture,
            position.x,
            position.y,
            macroquad::color::WHITE,
            DrawTextureParams {
                dest_size: Some(MacroquadVec2::new(dest_size.x, dest_size.y)),
                source: Some(source),
                rotation,
                ..DrawTextureParams::default()
            },
        );
    }
}

struct MacroquadCanvas<'a> {
    transform: ScreenTransform,
    shapes: MacroquadShapes,
    sprites: MacroquadSprites<'a>,
}

impl<'a> MacroquadCanvas<'a> {
    fn new(transform: ScreenTransform, atlas: Option<&'a GameAtlas>) -> Self {
        Self {
            transform,
            shapes: MacroquadShapes {
                transform,
                color: macroquad::color::WHITE,
            },
            sprites: MacroquadSprites { transform, atlas },
        }
    }
}

impl Canvas for MacroquadCanvas<'_> {
    fn shapes(&mut self) -> &mut dyn ShapeRenderer {
        &mut self.shapes
    }

    fn sprites(&mut self) -> &mut dyn SpriteBatch {
        &mut self.sprites
    }

    fn text(&mut self, text: &str, x: f32, y: f32, font_size: f32, color: Color) {
        let position = self.transform.to_screen(Vec2::new(x, y));
        draw_text(
            text,
            position.x,
            position.y,
            self.transform.length(font_size),
            to_macroquad_color(color),
        );
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut frame: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut dyn Canvas) -> bool + 'static,
    {
        let Self {
            swap_interval,
            window_size,
            atlas,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            world_size,
            panel_height,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: window_size.0,
            window_height: window_size.1,
            window_resizable: true,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        let (atlas_init_sender, atlas_init_receiver) = mpsc::channel::<Result<()>>();

        macroquad::Window::from_config(config, async move {
            let game_atlas = match atlas.as_ref().map(GameAtlas::init).transpose() {
                Ok(game_atlas) => game_atlas,
                Err(error) => {
                    let _ = atlas_init_sender.send(Err(error.context("failed to initialise atlas")));
                    return;
                }
            };
            if let Some(game_atlas) = &game_atlas {
                info!(pages = game_atlas.page_count(), "atlas_loaded");
            }
            let _ = atlas_init_sender.send(Ok(()));

            let background = to_macroquad_color(clear_color);
            let panel_background = to_macroquad_color(PANEL_BACKGROUND);
            let mut control_panel_input = ControlPanelInputState::default();

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    info!(reason = "quit_key", "shutdown_requested");
                    break;
                }

                macroquad::window::clear_background(background);

                let screen = Vec2::new(
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                let transform = ScreenTransform::fit(world_size, panel_height, screen);

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let frame_input = gather_frame_input(
                    transform,
                    world_size,
                    keyboard,
                    control_panel_input.take_actions(),
                );

                let mut canvas = MacroquadCanvas::new(transform, game_atlas.as_ref());
                let keep_running = frame(frame_dt, frame_input, &mut canvas);

                let panel_origin = transform.to_screen(Vec2::new(world_size.x / 2.0, world_size.y));
                let panel_size = Vec2::new(
                    transform.length(world_size.x / 2.0),
                    transform.length(panel_height),
                );
                let ControlPanelUiResult { actions } = draw_control_panel_ui(
                    &mut macroquad::ui::root_ui(),
                    ControlPanelUiContext {
                        origin: MacroquadVec2::new(panel_origin.x, panel_origin.y),
                        size: MacroquadVec2::new(panel_size.x, panel_size.y),
                        background: panel_background,
                    },
                );
                for action in actions {
                    control_panel_input.register(action);
                }

                if !keep_running {
                    info!(reason = "game_requested", "shutdown_requested");
                    break;
                }

                macroquad::window::next_frame().await;
            }

            if let Some(game_atlas) = game_atlas {
                game_atlas.dispose();
            }
        });

        atlas_init_receiver
            .recv()
            .unwrap_or_else(|_| Ok(()))
            .context("macroquad backend failed to start")?;

        Ok(())
    }
}

fn gather_frame_input(
    transform: ScreenTransform,
    world_size: Vec2,
    keyboard: KeyboardShortcuts,
    panel_actions: Vec<PlayerAction>,
) -> FrameInput {
    let (mouse_x, mouse_y) = mouse_position();
    let cursor_world_space = transform.cursor_over_world(Vec2::new(mouse_x, mouse_y), world_size);
    let primary_click =
        cursor_world_space.is_some() && is_mouse_button_pressed(MouseButton::Left);

    let mut actions = panel_actions;
    actions.extend(keyboard.actions);

    FrameInput {
        cursor_world_space,
        primary_click,
        actions,
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
