//! Headless driver that plays a full game against the progression core.
//!
//! The autopilot stands in for the engine: it owns the hostile roster, ticks
//! the world at a fixed frame rate, fires whenever the weapon is ready and
//! resolves hits with configurable accuracy.

use std::{mem, time::Duration};

use keris_warrior_core::{Achievement, Command, Event, SettingsStore};
use keris_warrior_system_hostiles::{EntityKind, HostileId, Roster};
use keris_warrior_world::{self as world, query, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const FRAME: Duration = Duration::from_nanos(16_666_667);

/// Knobs controlling a single autopilot run.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Options {
    /// Seed for the autopilot's own random draws.
    pub(crate) seed: u64,
    /// Probability that a player projectile hits its target.
    pub(crate) accuracy: f64,
    /// Probability that an enemy shot hits the player.
    pub(crate) enemy_accuracy: f64,
    /// Simulated time after which the run is abandoned.
    pub(crate) max_duration: Duration,
}

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    Won,
    GameOver,
    TimedOut,
}

/// Results reported once a run ends.
#[derive(Clone, Debug)]
pub(crate) struct Summary {
    pub(crate) outcome: Outcome,
    pub(crate) level: String,
    pub(crate) score: u64,
    pub(crate) coins_earned: u64,
    pub(crate) coins_total: Option<u64>,
    pub(crate) achievements: Vec<Achievement>,
    pub(crate) power_ups: u32,
    pub(crate) elapsed: Duration,
}

/// Plays one game to completion or until the time limit elapses.
pub(crate) fn run<S: SettingsStore>(world: &mut World<S>, options: Options) -> Summary {
    let mut pilot = Autopilot {
        roster: Roster::new(query::config(world).enemy_points),
        rng: ChaCha8Rng::seed_from_u64(options.seed),
        options,
        concluded: None,
        coins_total: None,
        achievements: Vec::new(),
    };

    let mut pending = vec![Command::StartGame];
    pilot.drain(world, &mut pending);

    let mut elapsed = Duration::ZERO;
    let mut cooldown = Duration::ZERO;
    while pilot.concluded.is_none() && elapsed < options.max_duration {
        elapsed += FRAME;
        pending.push(Command::Tick { dt: FRAME });

        cooldown = cooldown.saturating_sub(FRAME);
        if cooldown.is_zero() {
            pending.push(Command::FireShot);
            cooldown = query::shoot_cooldown(world);
        }

        let advance = pilot.roster.advance(FRAME, &mut pilot.rng, &mut pending);
        let mut health = query::health(world);
        for _ in 0..advance.shots_fired {
            if health > 0 && pilot.rng.gen_bool(options.enemy_accuracy) {
                health -= 1;
                pending.push(Command::ReportHealth { health });
            }
        }

        pilot.drain(world, &mut pending);
    }

    let outcome = match pilot.concluded {
        Some(true) => Outcome::Won,
        Some(false) => Outcome::GameOver,
        None => Outcome::TimedOut,
    };
    Summary {
        outcome,
        level: query::current_level_name(world).to_owned(),
        score: query::score(world),
        coins_earned: query::coins(world),
        coins_total: pilot.coins_total,
        achievements: pilot.achievements,
        power_ups: query::game_state(world).map_or(0, |state| state.power_ups_collected()),
        elapsed,
    }
}

struct Autopilot {
    roster: Roster,
    rng: ChaCha8Rng,
    options: Options,
    concluded: Option<bool>,
    coins_total: Option<u64>,
    achievements: Vec<Achievement>,
}

impl Autopilot {
    fn drain<S: SettingsStore>(&mut self, world: &mut World<S>, pending: &mut Vec<Command>) {
        while !pending.is_empty() {
            for command in mem::take(pending) {
                let mut events = Vec::new();
                world::apply(world, command, &mut events);
                self.roster.handle(&events, &mut self.rng, pending);
                for event in &events {
                    self.observe(event, pending);
                }
            }
        }
    }

    fn observe(&mut self, event: &Event, pending: &mut Vec<Command>) {
        match event {
            Event::ShotFired { projectiles } => {
                for _ in 0..*projectiles {
                    if !self.rng.gen_bool(self.options.accuracy) {
                        continue;
                    }
                    if let Some(target) = self.target() {
                        let _ = self.roster.hit(target, pending);
                    }
                }
            }
            Event::LevelStarted { name, .. } => log::info!("{name} started"),
            Event::BonusRoundStarted { duration } => {
                log::info!("bonus round started, {}s on the clock", duration.as_secs());
            }
            Event::BonusRoundEnded { cleared } => log::info!("bonus round ended, cleared: {cleared}"),
            Event::PowerUpActivated { kind } => log::info!("{} activated", kind.label()),
            Event::AchievementUnlocked { achievement } => {
                log::info!("achievement unlocked: {}", achievement.title());
                self.achievements.push(*achievement);
            }
            Event::CoinsSettled { total, .. } => self.coins_total = Some(*total),
            Event::GameConcluded { won, .. } => self.concluded = Some(*won),
            Event::SpawnSkipped { missing } => log::warn!("spawn skipped: {missing}"),
            Event::PersistenceFailed { reason } => log::warn!("{reason}"),
            Event::InvariantViolated { violation } => log::error!("{violation}"),
            other => log::trace!("{other:?}"),
        }
    }

    fn target(&self) -> Option<HostileId> {
        self.roster
            .first_of(EntityKind::BonusUfo)
            .or_else(|| self.roster.first_of(EntityKind::BonusGrunt))
            .or_else(|| self.roster.first_of(EntityKind::Grunt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Manifest;
    use keris_warrior_core::{keys, MemoryStore};

    fn world() -> World<MemoryStore> {
        let manifest = Manifest::load(None).expect("built-in manifest");
        World::new(
            manifest.config,
            manifest.catalog,
            manifest.bonus,
            MemoryStore::new(),
        )
        .expect("world")
    }

    #[test]
    fn sharpshooter_wins_and_settles_coins() {
        let mut world = world();
        let summary = run(
            &mut world,
            Options {
                seed: 7,
                accuracy: 1.0,
                enemy_accuracy: 0.0,
                max_duration: Duration::from_secs(600),
            },
        );

        assert_eq!(summary.outcome, Outcome::Won);
        assert!(summary.score > 0);
        assert!(summary.achievements.contains(&Achievement::Untouchable));
        assert_eq!(
            summary.coins_total,
            Some(summary.coins_earned),
            "fresh store should hold exactly the earned coins"
        );
        let stored = query::store(&world).int(keys::TOTAL_COINS, 0);
        assert_eq!(u64::try_from(stored).ok(), summary.coins_total);
    }

    #[test]
    fn defenceless_player_loses() {
        let mut world = world();
        let summary = run(
            &mut world,
            Options {
                seed: 7,
                accuracy: 0.0,
                enemy_accuracy: 1.0,
                max_duration: Duration::from_secs(600),
            },
        );

        assert_eq!(summary.outcome, Outcome::GameOver);
        assert_eq!(summary.score, 0);
        assert_eq!(summary.level, "Level 1");
    }

    #[test]
    fn time_limit_abandons_the_run() {
        let mut world = world();
        let summary = run(
            &mut world,
            Options {
                seed: 7,
                accuracy: 0.0,
                enemy_accuracy: 0.0,
                max_duration: Duration::from_secs(1),
            },
        );

        assert_eq!(summary.outcome, Outcome::TimedOut);
        assert!(summary.coins_total.is_none());
    }
}
