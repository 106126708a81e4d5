#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Power-up state: one timed modifier at a time plus an independent shot-counted modifier.
//!
//! Effects are reported as [`Event`] values on activation and expiry edges
//! only, so consumers never re-apply a multiplier every frame.

use std::time::Duration;

use keris_warrior_core::{ceil_seconds, ConfigurationError, Event, PowerUpKind, PowerUpTuning};
use rand::Rng;

mod schedule;

pub use schedule::UfoSchedule;

/// Configuration parameters required to construct the power-up engine.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    duration: Duration,
    double_bullet_shots: u32,
    base_shoot_cooldown: Duration,
    fast_shoot_cooldown: Duration,
    slowdown_factor: f32,
}

impl Config {
    /// Resolves the serialisable tuning into engine parameters.
    pub fn from_tuning(tuning: &PowerUpTuning) -> Result<Self, ConfigurationError> {
        tuning.validate()?;
        Ok(Self {
            duration: tuning.duration()?,
            double_bullet_shots: tuning.double_bullet_shots,
            base_shoot_cooldown: tuning.base_shoot_cooldown()?,
            fast_shoot_cooldown: tuning.fast_shoot_cooldown()?,
            slowdown_factor: tuning.enemy_slowdown_factor,
        })
    }
}

/// Picks one of the four power-ups with equal probability.
pub fn choose_random<R: Rng + ?Sized>(rng: &mut R) -> PowerUpKind {
    PowerUpKind::ALL[rng.gen_range(0..PowerUpKind::ALL.len())]
}

#[derive(Clone, Copy, Debug)]
struct ActiveTimed {
    kind: PowerUpKind,
    remaining: Duration,
}

/// Tracks active power-ups and derives the multipliers they imply.
#[derive(Clone, Debug)]
pub struct PowerUpEngine {
    config: Config,
    timed: Option<ActiveTimed>,
    powered_shots: u32,
    bonus_round_double_score: bool,
}

impl PowerUpEngine {
    /// Creates an engine with nothing active.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            timed: None,
            powered_shots: 0,
            bonus_round_double_score: false,
        }
    }

    /// Activates `kind`.
    ///
    /// A timed power-up preempts any other active timed power-up: the
    /// previous effect is reverted before the new one is applied, within this
    /// call. Re-activating the kind that is already running only refreshes its
    /// timer. Double bullets reset the powered shot count and leave timed
    /// power-ups untouched.
    pub fn activate(&mut self, kind: PowerUpKind, out: &mut Vec<Event>) {
        log::info!("power-up activated: {}", kind.label());

        if !kind.is_timed() {
            self.powered_shots = self.config.double_bullet_shots;
            out.push(Event::PowerUpActivated { kind });
            return;
        }

        match self.timed.take() {
            Some(previous) if previous.kind == kind => {}
            Some(previous) => {
                self.revert(previous.kind, out);
                out.push(Event::PowerUpReplaced {
                    previous: previous.kind,
                    next: kind,
                });
                self.apply(kind, out);
            }
            None => self.apply(kind, out),
        }

        self.timed = Some(ActiveTimed {
            kind,
            remaining: self.config.duration,
        });
        out.push(Event::PowerUpActivated { kind });
    }

    /// Advances the timed power-up, reverting it exactly once when it runs out.
    pub fn tick(&mut self, dt: Duration, out: &mut Vec<Event>) {
        let Some(active) = self.timed.as_mut() else {
            return;
        };

        active.remaining = active.remaining.saturating_sub(dt);
        if !active.remaining.is_zero() {
            return;
        }

        let kind = active.kind;
        self.timed = None;
        self.revert(kind, out);
        out.push(Event::PowerUpExpired { kind });
        self.clear_status_if_idle(out);
    }

    /// Consumes one shot and returns the number of projectiles it releases.
    pub fn consume_shot(&mut self, out: &mut Vec<Event>) -> u8 {
        if self.powered_shots == 0 {
            return 1;
        }

        self.powered_shots -= 1;
        if self.powered_shots == 0 {
            out.push(Event::PowerUpExpired {
                kind: PowerUpKind::DoubleBullets,
            });
            self.clear_status_if_idle(out);
        }
        2
    }

    /// Raises or lowers the bonus-round double-score flag.
    pub fn set_bonus_round_double_score(&mut self, active: bool) {
        self.bonus_round_double_score = active;
    }

    /// Drops every active power-up, reverting timed effects.
    ///
    /// The status text is cleared when anything was active; an idle engine
    /// emits nothing.
    pub fn clear(&mut self, out: &mut Vec<Event>) {
        let was_active = self.status_display().is_some();
        if let Some(active) = self.timed.take() {
            self.revert(active.kind, out);
        }
        self.powered_shots = 0;
        self.bonus_round_double_score = false;
        if was_active {
            out.push(Event::PowerUpStatusCleared);
        }
    }

    /// Factor applied to scored points.
    ///
    /// The bonus round and the double-score power-up are independent sources
    /// that do not stack: either or both yield 2.
    #[must_use]
    pub fn score_multiplier(&self) -> u32 {
        if self.bonus_round_double_score || self.is_active(PowerUpKind::DoubleScore) {
            2
        } else {
            1
        }
    }

    /// Factor applied to enemy speed.
    #[must_use]
    pub fn enemy_speed_multiplier(&self) -> f32 {
        if self.is_active(PowerUpKind::EnemySlowdown) {
            self.config.slowdown_factor
        } else {
            1.0
        }
    }

    /// Cooldown the player's weapon currently uses.
    #[must_use]
    pub fn shoot_cooldown(&self) -> Duration {
        if self.is_active(PowerUpKind::FastShooting) {
            self.config.fast_shoot_cooldown
        } else {
            self.config.base_shoot_cooldown
        }
    }

    /// Active timed power-up, if any.
    #[must_use]
    pub fn active_timed(&self) -> Option<PowerUpKind> {
        self.timed.map(|active| active.kind)
    }

    /// Time left on the active timed power-up.
    #[must_use]
    pub fn timed_remaining(&self) -> Option<Duration> {
        self.timed.map(|active| active.remaining)
    }

    /// Powered shots left on the double-bullets power-up.
    #[must_use]
    pub const fn remaining_powered_shots(&self) -> u32 {
        self.powered_shots
    }

    /// Reports whether the double-bullets power-up is active.
    #[must_use]
    pub const fn is_shot_based_active(&self) -> bool {
        self.powered_shots > 0
    }

    /// Text for the power-up status label, or `None` when it should be blank.
    #[must_use]
    pub fn status_display(&self) -> Option<String> {
        if let Some(active) = self.timed {
            return Some(format!(
                "{}: {}s",
                active.kind.label(),
                ceil_seconds(active.remaining)
            ));
        }
        if self.powered_shots > 0 {
            return Some(format!("{} Active!", PowerUpKind::DoubleBullets.label()));
        }
        None
    }

    fn is_active(&self, kind: PowerUpKind) -> bool {
        self.active_timed() == Some(kind)
    }

    fn apply(&self, kind: PowerUpKind, out: &mut Vec<Event>) {
        match kind {
            PowerUpKind::FastShooting => out.push(Event::ShootCooldownChanged {
                cooldown: self.config.fast_shoot_cooldown,
            }),
            PowerUpKind::EnemySlowdown => out.push(Event::EnemySpeedMultiplierChanged {
                multiplier: self.config.slowdown_factor,
            }),
            PowerUpKind::DoubleScore | PowerUpKind::DoubleBullets => {}
        }
    }

    fn revert(&self, kind: PowerUpKind, out: &mut Vec<Event>) {
        match kind {
            PowerUpKind::FastShooting => out.push(Event::ShootCooldownChanged {
                cooldown: self.config.base_shoot_cooldown,
            }),
            PowerUpKind::EnemySlowdown => {
                out.push(Event::EnemySpeedMultiplierChanged { multiplier: 1.0 })
            }
            PowerUpKind::DoubleScore | PowerUpKind::DoubleBullets => {}
        }
    }

    fn clear_status_if_idle(&self, out: &mut Vec<Event>) {
        if self.status_display().is_none() {
            out.push(Event::PowerUpStatusCleared);
        }
    }
}
