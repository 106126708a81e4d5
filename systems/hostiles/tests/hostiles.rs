use std::time::Duration;

use keris_warrior_core::{
    Command, Event, LevelIndex, Position, PrefabRef, ShootInterval, SpawnOrder, WaveKind,
};
use keris_warrior_system_hostiles::{EntityKind, Roster};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn orders(count: usize, interval: ShootInterval) -> Vec<SpawnOrder> {
    (0..count)
        .map(|slot| SpawnOrder {
            prefab: PrefabRef::new("grunt"),
            position: Position::new(slot as f32 * 2.0 - 4.0, 0.5, 5.0),
            speed: 2.0,
            shoot_interval: interval,
        })
        .collect()
}

fn spawned(wave: WaveKind, count: usize, interval: ShootInterval) -> Event {
    Event::EnemiesSpawned {
        wave,
        orders: orders(count, interval),
    }
}

#[test]
fn destroying_last_wave_member_reports_cleared() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut roster = Roster::new(10);
    let mut commands = Vec::new();
    roster.handle(
        &[spawned(WaveKind::Level(LevelIndex::FIRST), 2, ShootInterval::default())],
        &mut rng,
        &mut commands,
    );
    assert!(commands.is_empty());

    while let Some(id) = roster.first_of(EntityKind::Grunt) {
        assert!(roster.hit(id, &mut commands));
    }

    assert_eq!(
        commands,
        vec![
            Command::ReportEnemyDestroyed { points: 10 },
            Command::ReportEnemyDestroyed { points: 10 },
            Command::ReportWaveCleared,
        ]
    );
}

#[test]
fn ufo_hit_requests_power_up_and_does_not_clear_wave() {
    let mut rng = ChaCha8Rng::seed_from_u64(6);
    let mut roster = Roster::new(10);
    let mut commands = Vec::new();
    roster.handle(
        &[
            spawned(WaveKind::Level(LevelIndex::FIRST), 1, ShootInterval::default()),
            Event::BonusUfoSpawnRequested,
        ],
        &mut rng,
        &mut commands,
    );

    let ufo = roster.first_of(EntityKind::BonusUfo).expect("ufo spawned");
    assert!(roster.hit(ufo, &mut commands));
    assert!(!roster.hit(ufo, &mut commands));

    assert_eq!(commands, vec![Command::RequestPowerUp]);
    assert_eq!(roster.wave_members(), 1);
}

#[test]
fn empty_wave_is_cleared_immediately() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut roster = Roster::new(10);
    let mut commands = Vec::new();

    roster.handle(
        &[spawned(WaveKind::Bonus, 0, ShootInterval::DORMANT)],
        &mut rng,
        &mut commands,
    );

    assert_eq!(commands, vec![Command::ReportWaveCleared]);
}

#[test]
fn speed_multiplier_is_recomputed_from_base_speed() {
    let mut rng = ChaCha8Rng::seed_from_u64(8);
    let mut roster = Roster::new(10);
    let mut commands = Vec::new();
    roster.handle(
        &[spawned(WaveKind::Level(LevelIndex::FIRST), 3, ShootInterval::default())],
        &mut rng,
        &mut commands,
    );

    for _ in 0..3 {
        roster.handle(
            &[Event::EnemySpeedMultiplierChanged { multiplier: 0.5 }],
            &mut rng,
            &mut commands,
        );
    }
    assert!(roster
        .iter()
        .all(|(_, hostile)| (hostile.speed() - 1.0).abs() < f32::EPSILON));

    roster.handle(
        &[
            Event::EnemySpeedMultiplierChanged { multiplier: 1.0 },
            spawned(WaveKind::Level(LevelIndex::FIRST), 1, ShootInterval::default()),
        ],
        &mut rng,
        &mut commands,
    );
    assert!(roster
        .iter()
        .all(|(_, hostile)| (hostile.speed() - 2.0).abs() < f32::EPSILON));
}

#[test]
fn bonus_survivors_are_despawned_without_clearing() {
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let mut roster = Roster::new(10);
    let mut commands = Vec::new();
    roster.handle(
        &[
            spawned(WaveKind::Bonus, 4, ShootInterval::DORMANT),
            Event::BonusUfoSpawnRequested,
        ],
        &mut rng,
        &mut commands,
    );

    roster.handle(&[Event::BonusSurvivorsDespawned], &mut rng, &mut commands);

    assert!(commands.is_empty());
    assert_eq!(roster.wave_members(), 0);
    assert_eq!(roster.iter().count(), 1);
}

#[test]
fn grunts_fire_within_their_interval() {
    let mut rng = ChaCha8Rng::seed_from_u64(10);
    let mut roster = Roster::new(10);
    let mut commands = Vec::new();
    roster.handle(
        &[spawned(
            WaveKind::Level(LevelIndex::FIRST),
            2,
            ShootInterval::new(1.0, 2.0),
        )],
        &mut rng,
        &mut commands,
    );

    let mut shots = 0;
    for _ in 0..30 {
        shots += roster
            .advance(Duration::from_millis(100), &mut rng, &mut commands)
            .shots_fired;
    }

    assert!((2..=6).contains(&shots), "unexpected shot count {shots}");
    assert!(commands.is_empty());
}

#[test]
fn hostile_reaching_player_line_ends_game() {
    let mut rng = ChaCha8Rng::seed_from_u64(12);
    let mut roster = Roster::new(10);
    let mut commands = Vec::new();
    roster.handle(
        &[Event::EnemiesSpawned {
            wave: WaveKind::Level(LevelIndex::FIRST),
            orders: vec![SpawnOrder {
                prefab: PrefabRef::new("grunt"),
                position: Position::new(9.9, 0.5, -7.5),
                speed: 2.0,
                shoot_interval: ShootInterval::DORMANT,
            }],
        }],
        &mut rng,
        &mut commands,
    );

    let _ = roster.advance(Duration::from_millis(100), &mut rng, &mut commands);

    assert_eq!(commands, vec![Command::ReportPlayerDied]);
}
