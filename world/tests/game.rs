use std::time::Duration;

use tower_defence_core::{
    DefenderKind, EnemyKind, GameConfig, PlayerAction, TilePosition, TowerError,
};
use tower_defence_world::{EnemyController, Game, GameSetupError, Level};

/// Four tiles wide with a straight 30 unit path along the top row.
fn short_path_config() -> GameConfig {
    GameConfig {
        columns: 4,
        rows: 2,
        tile_size: 10.0,
        path: vec![TilePosition::new(0, 0), TilePosition::new(3, 0)],
        starting_money: 100,
        starting_lives: 3,
        wave_base_size: 2,
        wave_size_growth: 1,
        spawn_interval_seconds: 0.5,
        ..GameConfig::default()
    }
}

/// Same layout stretched so that enemies need seconds to reach the exit.
fn long_path_config() -> GameConfig {
    GameConfig {
        tile_size: 100.0,
        ..short_path_config()
    }
}

#[test]
fn waves_grow_by_the_configured_amount() {
    let config = short_path_config();
    let mut level = Level::from_config(&config).expect("valid layout");
    let mut enemies = EnemyController::new(&config);

    assert_eq!(enemies.start_wave(&mut level), 2);
    assert_eq!(enemies.start_wave(&mut level), 3);
    assert_eq!(enemies.start_wave(&mut level), 4);
    assert_eq!(level.wave(), 3);
    assert_eq!(enemies.queued(), 9);
}

#[test]
fn first_wave_contains_only_scouts_at_base_health() {
    let config = short_path_config();
    let mut level = Level::from_config(&config).expect("valid layout");
    let mut enemies = EnemyController::new(&config);
    let _ = enemies.start_wave(&mut level);

    enemies.update(Duration::ZERO, &mut level);

    assert_eq!(enemies.enemy_list().len(), 1, "one enemy spawns immediately");
    let enemy = &enemies.enemy_list()[0];
    assert_eq!(enemy.kind(), EnemyKind::Scout);
    assert_eq!(enemy.health(), EnemyKind::Scout.base_health());
    assert_eq!(enemy.center(), level.map().path_points()[0]);
}

#[test]
fn enemies_spawn_at_the_configured_interval() {
    let config = long_path_config();
    let mut level = Level::from_config(&config).expect("valid layout");
    let mut enemies = EnemyController::new(&config);
    let _ = enemies.start_wave(&mut level);

    enemies.update(Duration::ZERO, &mut level);
    enemies.update(Duration::from_millis(100), &mut level);
    assert_eq!(enemies.enemy_list().len(), 1);
    assert_eq!(enemies.queued(), 1);

    enemies.update(Duration::from_millis(100), &mut level);
    assert_eq!(enemies.enemy_list().len(), 1);

    enemies.update(Duration::from_millis(400), &mut level);
    assert_eq!(enemies.enemy_list().len(), 2);
    assert_eq!(enemies.queued(), 0);
}

#[test]
fn same_seed_produces_the_same_waves() {
    let config = long_path_config();
    let kinds = |config: &GameConfig| -> Vec<EnemyKind> {
        let mut level = Level::from_config(config).expect("valid layout");
        let mut enemies = EnemyController::new(config);
        for _ in 0..4 {
            let _ = enemies.start_wave(&mut level);
        }
        let mut spawned = Vec::new();
        while enemies.queued() > 0 {
            enemies.update(Duration::from_millis(500), &mut level);
            spawned.extend(enemies.enemy_list().iter().map(|enemy| enemy.kind()));
            for enemy in enemies.enemy_list_mut() {
                let _ = enemy.apply_damage(f32::MAX);
            }
        }
        spawned
    };

    let first = kinds(&config);
    let second = kinds(&config);

    assert_eq!(first.len(), 2 + 3 + 4 + 5);
    assert_eq!(first, second);
}

#[test]
fn leaked_enemies_cost_lives() {
    let config = short_path_config();
    let mut level = Level::from_config(&config).expect("valid layout");
    let mut enemies = EnemyController::new(&config);
    let _ = enemies.start_wave(&mut level);

    enemies.update(Duration::from_secs(1), &mut level);

    assert!(
        enemies.enemy_list().is_empty(),
        "scouts walk 30 units in well under a second"
    );
    assert_eq!(enemies.queued(), 0);
    assert_eq!(level.lives(), 1);
    assert!(!enemies.is_wave_active());
}

#[test]
fn killed_enemies_pay_their_reward() {
    let config = short_path_config();
    let mut level = Level::from_config(&config).expect("valid layout");
    let mut enemies = EnemyController::new(&config);
    let _ = enemies.start_wave(&mut level);
    enemies.update(Duration::ZERO, &mut level);

    let _ = enemies.enemy_list_mut()[0].apply_damage(1000.0);
    enemies.update(Duration::ZERO, &mut level);

    assert_eq!(level.money(), 100 + EnemyKind::Scout.reward());
    assert_eq!(level.lives(), 3);
}

#[test]
fn speed_multiplier_speeds_up_enemies() {
    let config = GameConfig {
        path: vec![TilePosition::new(0, 0), TilePosition::new(3, 0)],
        columns: 4,
        rows: 1,
        tile_size: 1000.0,
        ..short_path_config()
    };
    let mut level = Level::from_config(&config).expect("valid layout");
    let mut normal = EnemyController::new(&config);
    let mut fast = EnemyController::new(&config);
    fast.set_speed_multiplier(2.0);
    let mut fast_level = level.clone();
    let _ = normal.start_wave(&mut level);
    let _ = fast.start_wave(&mut fast_level);

    normal.update(Duration::ZERO, &mut level);
    fast.update(Duration::ZERO, &mut fast_level);
    normal.update(Duration::from_millis(100), &mut level);
    fast.update(Duration::from_millis(100), &mut fast_level);

    let normal_progress = normal.enemy_list()[0].progress();
    let fast_progress = fast.enemy_list()[0].progress();
    assert!((fast_progress - 2.0 * normal_progress).abs() < 1e-3);
}

#[test]
fn game_rejects_invalid_configuration() {
    let config = GameConfig {
        spawn_interval_seconds: 0.0,
        ..GameConfig::default()
    };
    assert!(matches!(Game::new(&config), Err(GameSetupError::Config(_))));

    let config = GameConfig {
        path: vec![TilePosition::new(0, 0), TilePosition::new(3, 3)],
        ..GameConfig::default()
    };
    assert!(matches!(Game::new(&config), Err(GameSetupError::Map(_))));
}

#[test]
fn click_builds_with_armed_tower_and_otherwise_selects() {
    let mut game = Game::new(&GameConfig::default()).expect("defaults are valid");
    let money = game.level().money();

    game.click(10.0, 10.0);
    assert!(game.towers().defender_list().is_empty(), "nothing armed yet");

    game.apply(PlayerAction::SelectTowerType(DefenderKind::Gunner))
        .expect("arming never fails");
    game.click(10.0, 10.0);
    assert_eq!(game.towers().defender_list().len(), 1);
    assert_eq!(game.level().money(), money - DefenderKind::Gunner.price());

    game.click(20.0, 20.0);
    assert_eq!(game.towers().defender_list().len(), 1, "tile is occupied");
    assert!(game.towers().selected_defender_upgrade().is_some());
}

#[test]
fn actions_drive_upgrades_and_selling() {
    let mut game = Game::new(&GameConfig::default()).expect("defaults are valid");
    let money = game.level().money();

    assert_eq!(
        game.apply(PlayerAction::UpgradeRange),
        Err(TowerError::NoSelection)
    );

    game.apply(PlayerAction::SelectTowerType(DefenderKind::Gunner))
        .expect("arming never fails");
    game.click(10.0, 10.0);
    game.apply(PlayerAction::ClearSelection)
        .expect("clearing never fails");
    game.click(10.0, 10.0);
    game.apply(PlayerAction::UpgradeDamage)
        .expect("affordable upgrade");
    game.apply(PlayerAction::SellSelected)
        .expect("defender is selected");

    assert!(game.towers().defender_list().is_empty());
    assert_eq!(game.level().money(), money - 100 - 50 + 112);
}

#[test]
fn toggling_speed_is_mirrored_onto_enemies() {
    let mut game = Game::new(&GameConfig::default()).expect("defaults are valid");

    game.apply(PlayerAction::ToggleSpeed).expect("toggle never fails");
    game.update(Duration::ZERO);
    assert!(game.towers().is_speed_mode());
    assert_eq!(game.enemies().speed_multiplier(), 2.0);

    game.apply(PlayerAction::ToggleSpeed).expect("toggle never fails");
    game.update(Duration::ZERO);
    assert!(!game.towers().is_speed_mode());
    assert_eq!(game.enemies().speed_multiplier(), 1.0);
}

#[test]
fn repeated_toggles_never_compound_defender_speed() {
    let mut game = Game::new(&GameConfig::default()).expect("defaults are valid");
    game.apply(PlayerAction::SelectTowerType(DefenderKind::Gunner))
        .expect("arming never fails");
    game.click(10.0, 10.0);
    let base = game.towers().defender_list()[0].speed();

    game.apply(PlayerAction::ToggleSpeed).expect("toggle never fails");
    assert_eq!(game.towers().defender_list()[0].speed(), base * 2.0);

    game.apply(PlayerAction::ToggleSpeed).expect("toggle never fails");
    game.apply(PlayerAction::ToggleSpeed).expect("toggle never fails");
    game.apply(PlayerAction::ToggleSpeed).expect("toggle never fails");
    assert_eq!(game.towers().defender_list()[0].speed(), base);
    assert!(!game.towers().is_speed_mode());
}

#[test]
fn a_new_wave_waits_for_the_current_one() {
    let mut game = Game::new(&GameConfig::default()).expect("defaults are valid");

    game.apply(PlayerAction::StartWave).expect("wave starts");
    game.apply(PlayerAction::StartWave).expect("ignored while active");

    assert_eq!(game.level().wave(), 1);
    assert!(game.enemies().is_wave_active());
}

#[test]
fn losing_every_life_ends_the_game() {
    let config = GameConfig {
        starting_lives: 1,
        ..short_path_config()
    };
    let mut game = Game::new(&config).expect("valid configuration");

    game.apply(PlayerAction::StartWave).expect("wave starts");
    game.update(Duration::from_secs(1));

    assert!(game.is_over());
    game.apply(PlayerAction::StartWave).expect("ignored once lost");
    assert_eq!(game.level().wave(), 1);
}
