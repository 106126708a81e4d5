//! Tuning knobs loaded alongside the level catalog.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigurationError;

/// Aggregated tuning knobs controlling every adjustable aspect of a game session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Health the player starts each game with; also the value restored on level advance.
    pub starting_health: u32,
    /// Score points required per coin when settling currency.
    pub coins_per_point: u32,
    /// Base points awarded for destroying a single enemy.
    pub enemy_points: u32,
    /// How long the "defeated" message stays up after a bonus wave is wiped out.
    pub bonus_defeated_grace_secs: f64,
    /// Range the delay between two bonus UFO launches is drawn from.
    pub ufo_interval: IntervalSecs,
    /// Seed for every random draw made by the session.
    pub rng_seed: u64,
    /// Power-up durations, shot counts, and effect strengths.
    pub power_ups: PowerUpTuning,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_health: 3,
            coins_per_point: 10,
            enemy_points: 10,
            bonus_defeated_grace_secs: 2.0,
            ufo_interval: IntervalSecs {
                min: 10.0,
                max: 20.0,
            },
            rng_seed: 0x6b65_7269_735f_7761,
            power_ups: PowerUpTuning::default(),
        }
    }
}

impl GameConfig {
    /// Checks every field, reporting the first problem found.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.coins_per_point == 0 {
            return Err(ConfigurationError::ZeroCoinRate);
        }
        let _ = self.bonus_defeated_grace()?;
        let _ = self.ufo_interval.resolve("ufo_interval")?;
        self.power_ups.validate()
    }

    /// Grace period shown after the bonus wave is wiped out.
    pub fn bonus_defeated_grace(&self) -> Result<Duration, ConfigurationError> {
        seconds("bonus_defeated_grace_secs", self.bonus_defeated_grace_secs)
    }
}

/// Closed range of seconds a random delay is drawn from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntervalSecs {
    /// Shortest delay.
    pub min: f64,
    /// Longest delay.
    pub max: f64,
}

impl IntervalSecs {
    /// Converts the range to durations, rejecting negative or inverted bounds.
    pub fn resolve(&self, field: &'static str) -> Result<(Duration, Duration), ConfigurationError> {
        let min = seconds(field, self.min)?;
        let max = seconds(field, self.max)?;
        if min > max {
            return Err(ConfigurationError::InvertedInterval { field });
        }
        Ok((min, max))
    }
}

/// Power-up parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerUpTuning {
    /// Lifetime of every timed power-up.
    pub duration_secs: f64,
    /// Shots granted by the double-bullets power-up.
    pub double_bullet_shots: u32,
    /// Shot cooldown outside of fast shooting.
    pub base_shoot_cooldown_secs: f64,
    /// Shot cooldown while fast shooting is active.
    pub fast_shoot_cooldown_secs: f64,
    /// Factor applied to enemy speed while the slowdown is active.
    pub enemy_slowdown_factor: f32,
}

impl Default for PowerUpTuning {
    fn default() -> Self {
        Self {
            duration_secs: 5.0,
            double_bullet_shots: 5,
            base_shoot_cooldown_secs: 0.5,
            fast_shoot_cooldown_secs: 0.1,
            enemy_slowdown_factor: 0.5,
        }
    }
}

impl PowerUpTuning {
    /// Checks every field, reporting the first problem found.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let _ = self.duration()?;
        let _ = self.base_shoot_cooldown()?;
        let _ = self.fast_shoot_cooldown()?;
        if !self.enemy_slowdown_factor.is_finite() || self.enemy_slowdown_factor <= 0.0 {
            return Err(ConfigurationError::InvalidDuration {
                field: "enemy_slowdown_factor",
                value: f64::from(self.enemy_slowdown_factor),
            });
        }
        Ok(())
    }

    /// Lifetime of every timed power-up.
    pub fn duration(&self) -> Result<Duration, ConfigurationError> {
        seconds("power_ups.duration_secs", self.duration_secs)
    }

    /// Shot cooldown outside of fast shooting.
    pub fn base_shoot_cooldown(&self) -> Result<Duration, ConfigurationError> {
        seconds(
            "power_ups.base_shoot_cooldown_secs",
            self.base_shoot_cooldown_secs,
        )
    }

    /// Shot cooldown while fast shooting is active.
    pub fn fast_shoot_cooldown(&self) -> Result<Duration, ConfigurationError> {
        seconds(
            "power_ups.fast_shoot_cooldown_secs",
            self.fast_shoot_cooldown_secs,
        )
    }
}

pub(crate) fn seconds(field: &'static str, value: f64) -> Result<Duration, ConfigurationError> {
    Duration::try_from_secs_f64(value)
        .map_err(|_| ConfigurationError::InvalidDuration { field, value })
}
