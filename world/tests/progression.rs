use std::time::Duration;

use keris_warrior_core::{
    keys, Achievement, BonusRoundDefinition, ClothStyle, Command, Event, GameConfig,
    GridFormation, KerisStyle, LevelCatalog, LevelDefinition, LevelIndex, MemoryStore,
    MissingReference, PowerUpKind, PrefabRef, SettingsStore, StoreError, WaveKind, WavePhase,
};
use keris_warrior_world::{self as world, query, World};

fn catalog(levels: usize) -> LevelCatalog {
    let grid = GridFormation {
        rows: 1,
        columns: 2,
        prefab: Some(PrefabRef::new("grunt")),
        ..GridFormation::default()
    };
    LevelCatalog::new(
        (0..levels)
            .map(|index| LevelDefinition::with_grid(format!("Level {}", index + 1), grid.clone()))
            .collect(),
    )
    .expect("catalog")
}

fn bonus() -> BonusRoundDefinition {
    BonusRoundDefinition {
        prefab: Some(PrefabRef::new("bonus")),
        ..BonusRoundDefinition::default()
    }
}

fn started_with<S: SettingsStore>(levels: usize, store: S) -> (World<S>, Vec<Event>) {
    let mut world =
        World::new(GameConfig::default(), catalog(levels), bonus(), store).expect("world");
    let mut events = Vec::new();
    world::apply(&mut world, Command::StartGame, &mut events);
    (world, events)
}

fn started(levels: usize) -> (World<MemoryStore>, Vec<Event>) {
    started_with(levels, MemoryStore::new())
}

fn run<S: SettingsStore>(world: &mut World<S>, commands: Vec<Command>) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn tick_secs(seconds: u64) -> Vec<Command> {
    (0..seconds)
        .map(|_| Command::Tick {
            dt: Duration::from_secs(1),
        })
        .collect()
}

fn index_of(events: &[Event], wanted: &Event) -> usize {
    events
        .iter()
        .position(|event| event == wanted)
        .unwrap_or_else(|| panic!("{wanted:?} missing from {events:?}"))
}

fn unlocked(events: &[Event]) -> Vec<Achievement> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::AchievementUnlocked { achievement } => Some(*achievement),
            _ => None,
        })
        .collect()
}

#[test]
fn start_announces_loadout_and_first_level() {
    let (world, events) = started(2);

    assert!(events.contains(&Event::LoadoutEquipped {
        keris: KerisStyle::Default,
        cloth: ClothStyle::Default,
    }));
    assert!(events.contains(&Event::LevelStarted {
        level: LevelIndex::FIRST,
        name: "Level 1".to_owned(),
    }));
    let spawned = events.iter().find_map(|event| match event {
        Event::EnemiesSpawned { wave, orders } => Some((*wave, orders.len())),
        _ => None,
    });
    assert_eq!(spawned, Some((WaveKind::Level(LevelIndex::FIRST), 2)));

    assert_eq!(query::current_level_name(&world), "Level 1");
    assert_eq!(query::phase(&world), Some(WavePhase::NormalWave));
    assert_eq!(
        query::store(&world).string(keys::CURRENT_KERIS, ""),
        "defaultKeris"
    );
}

#[test]
fn bonus_timeout_advances_to_second_level() {
    let (mut world, _) = started(2);

    let events = run(&mut world, vec![Command::ReportWaveCleared]);
    assert_eq!(query::phase(&world), Some(WavePhase::BonusRound));
    assert!(events.contains(&Event::BonusRoundStarted {
        duration: Duration::from_secs(15)
    }));
    assert!(events.iter().any(|event| matches!(
        event,
        Event::EnemiesSpawned {
            wave: WaveKind::Bonus,
            orders
        } if orders.len() == 12
    )));
    assert_eq!(
        query::bonus_countdown_display(&world).as_deref(),
        Some("Bonus Time: 15s")
    );

    let events = run(&mut world, tick_secs(15));

    assert_eq!(query::phase(&world), Some(WavePhase::NormalWave));
    assert_eq!(query::level_index(&world), LevelIndex::new(1));
    assert_eq!(query::current_level_name(&world), "Level 2");
    assert_eq!(query::bonus_countdown_display(&world), None);
    let despawned = index_of(&events, &Event::BonusSurvivorsDespawned);
    let ended = index_of(&events, &Event::BonusRoundEnded { cleared: false });
    assert!(despawned < ended);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::PlayerHealthRestored { .. })));
}

#[test]
fn heart_lost_on_final_level_wins() {
    let (mut world, _) = started(1);

    let events = run(
        &mut world,
        vec![Command::ReportHealth { health: 2 }, Command::ReportWaveCleared],
    );

    assert_eq!(query::phase(&world), Some(WavePhase::Won));
    assert!(query::is_game_over(&world));
    assert!(events.contains(&Event::GameConcluded {
        final_score: 0,
        won: true
    }));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::LevelStarted { .. })));
}

#[test]
fn heart_loss_advances_and_restores_health() {
    let (mut world, _) = started(3);

    let events = run(
        &mut world,
        vec![Command::ReportHealth { health: 1 }, Command::ReportWaveCleared],
    );

    assert_eq!(query::level_index(&world), LevelIndex::new(1));
    assert_eq!(query::health(&world), 3);
    assert!(events.contains(&Event::PlayerHealthRestored { health: 3 }));
    let state = query::game_state(&world).expect("game in progress");
    assert!(!state.heart_lost_during_current_level());
    assert!(state.health_lost_this_game());
}

#[test]
fn health_regained_within_level_still_counts_as_lost_heart() {
    let (mut world, _) = started(2);

    let _ = run(
        &mut world,
        vec![
            Command::ReportHealth { health: 2 },
            Command::ReportHealth { health: 3 },
            Command::ReportWaveCleared,
        ],
    );

    assert_eq!(query::phase(&world), Some(WavePhase::NormalWave));
    assert_eq!(query::level_index(&world), LevelIndex::new(1));
}

#[test]
fn bonus_round_and_double_score_do_not_stack() {
    let (mut world, _) = started(2);
    let _ = run(
        &mut world,
        vec![
            Command::ReportWaveCleared,
            Command::GrantPowerUp {
                kind: PowerUpKind::DoubleScore,
            },
        ],
    );
    assert_eq!(query::score_multiplier(&world), 2);

    let events = run(&mut world, vec![Command::ReportEnemyDestroyed { points: 10 }]);

    assert_eq!(query::score(&world), 20);
    assert!(events.contains(&Event::ScoreChanged { score: 20, coins: 2 }));
}

#[test]
fn multiplier_drops_when_bonus_round_ends() {
    let (mut world, _) = started(2);
    let _ = run(&mut world, vec![Command::ReportWaveCleared]);
    let _ = run(&mut world, vec![Command::ReportEnemyDestroyed { points: 10 }]);
    let _ = run(&mut world, tick_secs(15));

    let _ = run(&mut world, vec![Command::ReportEnemyDestroyed { points: 10 }]);

    assert_eq!(query::score(&world), 30);
    assert_eq!(query::score_multiplier(&world), 1);
}

#[test]
fn destroyed_bonus_wave_waits_for_grace_period() {
    let (mut world, _) = started(2);
    let _ = run(&mut world, vec![Command::ReportWaveCleared]);

    let events = run(&mut world, vec![Command::ReportWaveCleared]);
    assert_eq!(events, vec![Event::BonusEnemiesDefeated]);
    assert_eq!(
        query::bonus_countdown_display(&world).as_deref(),
        Some("All Bonus Enemies Defeated!")
    );

    let events = run(&mut world, tick_secs(2));

    assert!(events.contains(&Event::BonusRoundEnded { cleared: true }));
    assert_eq!(query::level_index(&world), LevelIndex::new(1));
}

#[test]
fn bonus_countdown_is_evaluated_before_power_up_timers() {
    let (mut world, _) = started(2);
    let _ = run(&mut world, vec![Command::ReportWaveCleared]);
    let _ = run(&mut world, tick_secs(10));
    let _ = run(
        &mut world,
        vec![Command::GrantPowerUp {
            kind: PowerUpKind::FastShooting,
        }],
    );

    let events = run(
        &mut world,
        vec![Command::Tick {
            dt: Duration::from_secs(5),
        }],
    );

    let ended = index_of(&events, &Event::BonusRoundEnded { cleared: false });
    let expired = index_of(
        &events,
        &Event::PowerUpExpired {
            kind: PowerUpKind::FastShooting,
        },
    );
    assert!(ended < expired);
    assert_eq!(query::shoot_cooldown(&world), Duration::from_millis(500));
}

#[test]
fn conclusion_settles_coins_and_unlocks_final_achievements() {
    let (mut world, _) = started(1);
    let mut commands: Vec<Command> = (0..5)
        .map(|_| Command::GrantPowerUp {
            kind: PowerUpKind::DoubleBullets,
        })
        .collect();
    commands.extend((0..100).map(|_| Command::ReportEnemyDestroyed { points: 10 }));
    commands.push(Command::ReportPlayerDied);

    let events = run(&mut world, commands);

    let concluded = index_of(
        &events,
        &Event::GameConcluded {
            final_score: 1_000,
            won: false,
        },
    );
    assert_eq!(
        &events[concluded + 1..],
        &[
            Event::LeaderboardSubmissionRequested {
                player_name: "Unknown Player".to_owned(),
                score: 1_000,
            },
            Event::AchievementUnlocked {
                achievement: Achievement::Untouchable
            },
            Event::AchievementUnlocked {
                achievement: Achievement::BonusHunter
            },
            Event::CoinsSettled {
                earned: 100,
                total: 100
            },
        ]
    );
    assert_eq!(
        unlocked(&events[..concluded]),
        vec![Achievement::RookieHero, Achievement::MasterHero]
    );
    assert_eq!(query::store(&world).int(keys::TOTAL_COINS, 0), 100);
}

#[test]
fn zero_health_ends_game_and_freezes_state() {
    let mut store = MemoryStore::new();
    store.set_string(keys::PLAYER_NAME, "Tuah");
    let (mut world, _) = started_with(2, store);

    let events = run(&mut world, vec![Command::ReportHealth { health: 0 }]);
    assert_eq!(query::phase(&world), Some(WavePhase::GameOver));
    assert!(events.contains(&Event::LeaderboardSubmissionRequested {
        player_name: "Tuah".to_owned(),
        score: 0,
    }));
    assert!(unlocked(&events).is_empty());

    let events = run(
        &mut world,
        vec![
            Command::ReportEnemyDestroyed { points: 10 },
            Command::ReportWaveCleared,
            Command::RequestPowerUp,
            Command::Tick {
                dt: Duration::from_secs(30),
            },
        ],
    );
    assert!(events.is_empty());
    assert_eq!(query::score(&world), 0);
}

#[test]
fn conclusion_winds_down_active_power_ups() {
    let (mut world, _) = started(2);
    let _ = run(
        &mut world,
        vec![Command::GrantPowerUp {
            kind: PowerUpKind::FastShooting,
        }],
    );
    assert_eq!(query::shoot_cooldown(&world), Duration::from_millis(100));

    let events = run(&mut world, vec![Command::ReportPlayerDied]);

    let reverted = index_of(
        &events,
        &Event::ShootCooldownChanged {
            cooldown: Duration::from_millis(500),
        },
    );
    let cleared = index_of(&events, &Event::PowerUpStatusCleared);
    let concluded = index_of(
        &events,
        &Event::GameConcluded {
            final_score: 0,
            won: false,
        },
    );
    assert!(reverted < cleared && cleared < concluded);
    assert_eq!(query::power_up_status_display(&world), None);
    assert_eq!(query::shoot_cooldown(&world), Duration::from_millis(500));

    let events = run(&mut world, tick_secs(10));
    assert!(events.is_empty());
    assert_eq!(query::power_up_status_display(&world), None);
}

#[test]
fn restarting_mid_game_reverts_active_power_ups() {
    let (mut world, _) = started(2);
    let _ = run(
        &mut world,
        vec![Command::GrantPowerUp {
            kind: PowerUpKind::EnemySlowdown,
        }],
    );
    assert_eq!(query::enemy_speed_multiplier(&world), 0.5);

    let events = run(&mut world, vec![Command::StartGame]);

    let reverted = index_of(
        &events,
        &Event::EnemySpeedMultiplierChanged { multiplier: 1.0 },
    );
    let cleared = index_of(&events, &Event::PowerUpStatusCleared);
    let started = events
        .iter()
        .position(|event| matches!(event, Event::LoadoutEquipped { .. }))
        .expect("new game announced");
    assert!(reverted < cleared && cleared < started);
    assert_eq!(query::enemy_speed_multiplier(&world), 1.0);
    assert_eq!(query::power_up_status_display(&world), None);
    assert_eq!(query::level_index(&world), LevelIndex::FIRST);
}

#[test]
fn milestones_fire_once_across_games() {
    let (mut world, _) = started(1);
    let first = run(
        &mut world,
        (0..10)
            .map(|_| Command::ReportEnemyDestroyed { points: 10 })
            .collect(),
    );
    assert_eq!(unlocked(&first), vec![Achievement::RookieHero]);

    let mut commands = vec![Command::ReportPlayerDied, Command::StartGame];
    commands.extend((0..10).map(|_| Command::ReportEnemyDestroyed { points: 10 }));
    let second = run(&mut world, commands);

    assert!(!unlocked(&second).contains(&Achievement::RookieHero));
    assert_eq!(query::score(&world), 100);
    assert!(!query::is_game_over(&world));
}

#[test]
fn missing_bonus_prefab_is_reported_and_skipped() {
    let mut world = World::new(
        GameConfig::default(),
        catalog(2),
        BonusRoundDefinition::default(),
        MemoryStore::new(),
    )
    .expect("world");
    let mut events = Vec::new();
    world::apply(&mut world, Command::StartGame, &mut events);

    let events = run(&mut world, vec![Command::ReportWaveCleared]);

    assert!(events.contains(&Event::SpawnSkipped {
        missing: MissingReference::BonusPrefab
    }));
    assert!(events.contains(&Event::EnemiesSpawned {
        wave: WaveKind::Bonus,
        orders: Vec::new(),
    }));
    assert_eq!(query::phase(&world), Some(WavePhase::BonusRound));
}

#[test]
fn double_bullets_fire_two_projectiles_until_spent() {
    let (mut world, _) = started(1);
    let mut commands = vec![Command::GrantPowerUp {
        kind: PowerUpKind::DoubleBullets,
    }];
    commands.extend((0..6).map(|_| Command::FireShot));

    let events = run(&mut world, commands);

    let projectiles: Vec<u8> = events
        .iter()
        .filter_map(|event| match event {
            Event::ShotFired { projectiles } => Some(*projectiles),
            _ => None,
        })
        .collect();
    assert_eq!(projectiles, vec![2, 2, 2, 2, 2, 1]);
    assert!(events.contains(&Event::PowerUpStatusCleared));
    assert_eq!(query::remaining_powered_shots(&world), 0);
    assert_eq!(query::power_up_status_display(&world), None);
}

#[test]
fn random_power_up_counts_toward_collection() {
    let (mut world, _) = started(1);

    let events = run(&mut world, vec![Command::RequestPowerUp]);

    assert!(events
        .iter()
        .any(|event| matches!(event, Event::PowerUpActivated { .. })));
    assert_eq!(
        query::game_state(&world).map(|state| state.power_ups_collected()),
        Some(1)
    );
    assert!(query::power_up_status_display(&world).is_some());
}

#[test]
fn invalid_configuration_is_rejected() {
    let config = GameConfig {
        coins_per_point: 0,
        ..GameConfig::default()
    };

    let result = World::new(config, catalog(1), bonus(), MemoryStore::new());

    assert!(result.is_err());
}

struct UnsavableStore(MemoryStore);

impl SettingsStore for UnsavableStore {
    fn int(&self, key: &str, default: i64) -> i64 {
        self.0.int(key, default)
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.0.set_int(key, value);
    }

    fn string(&self, key: &str, default: &str) -> String {
        self.0.string(key, default)
    }

    fn set_string(&mut self, key: &str, value: &str) {
        self.0.set_string(key, value);
    }

    fn has_key(&self, key: &str) -> bool {
        self.0.has_key(key)
    }

    fn save(&mut self) -> Result<(), StoreError> {
        Err(StoreError::new("disk full"))
    }
}

#[test]
fn persistence_failures_are_surfaced_and_play_continues() {
    let (mut world, start_events) = started_with(1, UnsavableStore(MemoryStore::new()));
    assert!(start_events
        .iter()
        .any(|event| matches!(event, Event::PersistenceFailed { .. })));

    let events = run(&mut world, vec![Command::ReportPlayerDied]);

    assert!(events.contains(&Event::PersistenceFailed {
        reason: "failed to persist settings: disk full".to_owned(),
    }));
    assert!(events.contains(&Event::CoinsSettled {
        earned: 0,
        total: 0
    }));
}
