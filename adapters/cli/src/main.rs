#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Tower Defence experience.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tower_defence_core::{GameConfig, WINDOW_TITLE};
use tower_defence_rendering::{
    AtlasPack, Canvas, Color, FrameInput, Presentation, Render, RenderingBackend,
};
use tower_defence_rendering_macroquad::MacroquadBackend;
use tower_defence_world::Game;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const PANEL_HEIGHT: f32 = 96.0;
const HUD_FONT_SIZE: f32 = 22.0;
const CLEAR_COLOR: Color = Color::from_rgb_u8(0x1b, 0x1b, 0x20);
const HUD_COLOR: Color = Color::from_rgb_u8(0xf0, 0xf0, 0xf0);
const GAME_OVER_COLOR: Color = Color::from_rgb_u8(0xe0, 0x40, 0x40);

/// Command-line arguments accepted by the Tower Defence binary.
#[derive(Debug, Parser)]
#[command(name = "tower-defence", about = "Defend the path against waves of enemies")]
struct CliArgs {
    /// TOML file overriding the built-in game configuration.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Packed atlas to load instead of the configured one.
    #[arg(long, value_name = "PATH")]
    atlas: Option<PathBuf>,

    /// Synchronise presentation with the display refresh rate.
    #[arg(long, value_name = "BOOL", default_value_t = true, action = ArgAction::Set)]
    vsync: bool,

    /// Skip the atlas and draw outlines only.
    #[arg(long)]
    no_sprites: bool,
}

/// Entry point for the Tower Defence command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = CliArgs::parse();

    let config = load_config(args.config.as_deref())?;
    let mut game = Game::new(&config).context("invalid game configuration")?;

    let atlas = if args.no_sprites {
        None
    } else {
        load_atlas(args.atlas.as_deref(), &config.atlas_path)?
    };
    if let Some(atlas) = &atlas {
        game.initialize_sprites(atlas)
            .context("atlas is missing sprites required by the game")?;
    }

    let presentation = presentation_for(&game);
    let backend = MacroquadBackend::new()
        .with_vsync(args.vsync)
        .with_atlas(atlas);

    info!(vsync = args.vsync, "starting_game_loop");
    backend.run(presentation, move |elapsed, input, canvas| {
        run_frame(&mut game, elapsed, input, canvas);
        true
    })
}

fn presentation_for(game: &Game) -> Presentation {
    Presentation::new(
        WINDOW_TITLE,
        CLEAR_COLOR,
        game.level().map().world_size(),
        PANEL_HEIGHT,
    )
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration at {}", path.display()))?;
    let config = GameConfig::from_toml_str(&contents)
        .with_context(|| format!("failed to parse configuration at {}", path.display()))?;
    info!(path = %path.display(), "config_loaded");
    Ok(config)
}

/// Loads the atlas named on the command line, falling back to the configured
/// one. A missing configured atlas degrades to outline rendering.
fn load_atlas(explicit: Option<&Path>, configured: &Path) -> Result<Option<AtlasPack>> {
    if let Some(path) = explicit {
        let pack = AtlasPack::from_path(path)
            .with_context(|| format!("failed to load atlas at {}", path.display()))?;
        return Ok(Some(pack));
    }
    if !configured.exists() {
        warn!(path = %configured.display(), "atlas_missing");
        return Ok(None);
    }
    let pack = AtlasPack::from_path(configured)
        .with_context(|| format!("failed to load atlas at {}", configured.display()))?;
    Ok(Some(pack))
}

fn run_frame(game: &mut Game, elapsed: Duration, input: FrameInput, canvas: &mut dyn Canvas) {
    for action in input.actions {
        if let Err(error) = game.apply(action) {
            debug!(?action, %error, "action_refused");
        }
    }
    if input.primary_click {
        if let Some(cursor) = input.cursor_world_space {
            game.click(cursor.x, cursor.y);
        }
    }

    game.update(elapsed);

    game.render_sprites(canvas.sprites());
    game.render_shapes(canvas.shapes());

    let top = game.level().map().world_size().y;
    for (index, line) in hud_lines(game).iter().enumerate() {
        let baseline = top + HUD_FONT_SIZE * (index as f32 + 1.0);
        canvas.text(line, 8.0, baseline, HUD_FONT_SIZE, HUD_COLOR);
    }
    if game.is_over() {
        let size = game.level().map().world_size();
        canvas.text(
            "GAME OVER",
            size.x / 2.0 - 3.0 * HUD_FONT_SIZE,
            size.y / 2.0,
            HUD_FONT_SIZE * 2.0,
            GAME_OVER_COLOR,
        );
    }
}

fn hud_lines(game: &Game) -> [String; 3] {
    let level = game.level();
    let towers = game.towers();

    let armed = match (towers.is_tower_selected(), towers.selected_tower_type()) {
        (true, Some(kind)) => format!("{kind:?}"),
        _ => String::from("none"),
    };
    let speed = if towers.is_speed_mode() { "x2" } else { "x1" };
    let selected = towers
        .selected_defender_upgrade()
        .map(|defender| {
            format!(
                "{:?} dmg {:.1} rng {:.0} spd {:.2}",
                defender.kind(),
                defender.damage(),
                defender.range(),
                defender.speed()
            )
        })
        .unwrap_or_else(|| String::from("no defender selected"));

    [
        format!(
            "Money {}  Lives {}  Wave {}",
            level.money(),
            level.lives(),
            level.wave()
        ),
        format!("Building {armed}  Speed {speed}"),
        selected,
    ]
}
