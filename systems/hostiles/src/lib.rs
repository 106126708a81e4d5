#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless stand-in for the engine's hostile entities.
//!
//! The [`Roster`] listens to world events (spawn orders, speed edges, bonus
//! survivor removal), moves hostiles with their [`Behavior`], and converts
//! hits into the commands the world expects from the engine.

use std::{collections::BTreeMap, time::Duration};

use keris_warrior_core::{Command, Event, WaveKind};
use rand::RngCore;

mod behavior;

pub use behavior::{Action, Behavior, EntityKind, HitOutcome, Hostile};

/// Speed of the bonus UFO in units per second.
const UFO_SPEED: f32 = 5.0;

/// Stable identifier of a hostile inside a roster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostileId(u32);

impl HostileId {
    /// Retrieves the underlying identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Result of advancing the roster by one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Advance {
    /// Projectiles fired at the player.
    pub shots_fired: u32,
    /// Hostiles that left the field unharmed.
    pub escaped: u32,
}

/// Every live hostile, keyed by spawn order.
#[derive(Clone, Debug)]
pub struct Roster {
    hostiles: BTreeMap<HostileId, Hostile>,
    next_id: u32,
    enemy_points: u32,
    speed_multiplier: f32,
}

impl Roster {
    /// Creates an empty roster awarding `enemy_points` per destroyed wave member.
    #[must_use]
    pub fn new(enemy_points: u32) -> Self {
        Self {
            hostiles: BTreeMap::new(),
            next_id: 0,
            enemy_points,
            speed_multiplier: 1.0,
        }
    }

    /// Reacts to world events.
    ///
    /// A wave whose spawn orders all failed to resolve leaves the field empty,
    /// which is reported as cleared right away.
    pub fn handle(&mut self, events: &[Event], rng: &mut dyn RngCore, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::EnemiesSpawned { wave, orders } => {
                    let kind = match wave {
                        WaveKind::Level(_) => EntityKind::Grunt,
                        WaveKind::Bonus => EntityKind::BonusGrunt,
                    };
                    for order in orders {
                        let mut hostile = Hostile::from_order(kind, order, rng);
                        hostile.set_speed_multiplier(self.speed_multiplier);
                        self.insert(hostile);
                    }
                    if self.wave_members() == 0 {
                        log::warn!("wave {wave:?} spawned no hostiles");
                        out.push(Command::ReportWaveCleared);
                    }
                }
                Event::EnemySpeedMultiplierChanged { multiplier } => {
                    self.speed_multiplier = *multiplier;
                    for hostile in self.hostiles.values_mut() {
                        hostile.set_speed_multiplier(*multiplier);
                    }
                }
                Event::BonusSurvivorsDespawned => {
                    self.hostiles
                        .retain(|_, hostile| hostile.kind() != EntityKind::BonusGrunt);
                }
                Event::BonusUfoSpawnRequested => self.insert(Hostile::ufo(UFO_SPEED)),
                Event::GameConcluded { .. } => {
                    self.hostiles.clear();
                    self.speed_multiplier = 1.0;
                }
                _ => {}
            }
        }
    }

    /// Moves every hostile by `dt`.
    ///
    /// Escaped hostiles are removed. A hostile reaching the player line ends
    /// the game, reported once per frame.
    pub fn advance(
        &mut self,
        dt: Duration,
        rng: &mut dyn RngCore,
        out: &mut Vec<Command>,
    ) -> Advance {
        let mut advance = Advance::default();
        let mut reached_player = false;

        self.hostiles.retain(|_, hostile| match hostile.update(dt, rng) {
            Some(Action::Fired) => {
                advance.shots_fired += 1;
                true
            }
            Some(Action::Escaped) => {
                advance.escaped += 1;
                false
            }
            Some(Action::ReachedPlayer) => {
                reached_player = true;
                true
            }
            None => true,
        });

        if reached_player {
            out.push(Command::ReportPlayerDied);
        }
        advance
    }

    /// Resolves a player projectile hitting `id`. Returns whether it hit anything.
    ///
    /// Destroying the last wave member reports the wave as cleared.
    pub fn hit(&mut self, id: HostileId, out: &mut Vec<Command>) -> bool {
        let Some(hostile) = self.hostiles.remove(&id) else {
            return false;
        };

        match hostile.on_hit() {
            HitOutcome::Destroyed => {
                out.push(Command::ReportEnemyDestroyed {
                    points: self.enemy_points,
                });
                if self.wave_members() == 0 {
                    out.push(Command::ReportWaveCleared);
                }
            }
            HitOutcome::GrantsPowerUp => out.push(Command::RequestPowerUp),
        }
        true
    }

    /// Live hostiles in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = (HostileId, &Hostile)> {
        self.hostiles.iter().map(|(id, hostile)| (*id, hostile))
    }

    /// First live hostile of `kind`, in spawn order.
    #[must_use]
    pub fn first_of(&self, kind: EntityKind) -> Option<HostileId> {
        self.iter()
            .find(|(_, hostile)| hostile.kind() == kind)
            .map(|(id, _)| id)
    }

    /// Number of live hostiles counting toward the current wave.
    #[must_use]
    pub fn wave_members(&self) -> usize {
        self.hostiles
            .values()
            .filter(|hostile| hostile.kind().is_wave_member())
            .count()
    }

    fn insert(&mut self, hostile: Hostile) {
        let id = HostileId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        let _ = self.hostiles.insert(id, hostile);
    }
}
