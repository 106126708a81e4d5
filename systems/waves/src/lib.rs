#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave state machine deciding between the next level, the bonus round, and the end of the game.
//!
//! The controller never spawns anything itself. It reports [`Transition`]
//! values that the coordinator turns into spawn orders, health restores, and
//! end-of-game settlement.

use std::time::Duration;

use keris_warrior_core::{ceil_seconds, LevelIndex, WavePhase};

/// Configuration parameters required to construct the wave controller.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    last_level: LevelIndex,
    bonus_duration: Duration,
    defeated_grace: Duration,
}

impl Config {
    /// Creates a new configuration.
    ///
    /// `defeated_grace` is how long the "defeated" message lingers after the
    /// bonus wave is wiped out before the round concludes.
    #[must_use]
    pub const fn new(last_level: LevelIndex, bonus_duration: Duration, defeated_grace: Duration) -> Self {
        Self {
            last_level,
            bonus_duration,
            defeated_grace,
        }
    }
}

/// State changes reported by the controller, in the order they happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// The bonus round began with a full countdown.
    BonusRoundStarted {
        /// Countdown length.
        duration: Duration,
    },
    /// The whole seconds shown on the bonus countdown changed.
    BonusCountdownChanged {
        /// Ceiling-rounded seconds remaining.
        seconds: u32,
    },
    /// Every bonus enemy was destroyed; the grace period started.
    BonusEnemiesDefeated,
    /// The countdown expired with bonus enemies still alive; they must be removed.
    BonusSurvivorsDespawned,
    /// The bonus round concluded.
    BonusRoundEnded {
        /// Whether every bonus enemy was destroyed.
        cleared: bool,
    },
    /// The next level became active.
    LevelAdvanced {
        /// Level that became active.
        level: LevelIndex,
        /// Whether the player's health should be refilled.
        restore_health: bool,
    },
    /// The final wave was cleared.
    Won,
    /// The player died.
    GameOver,
}

#[derive(Clone, Copy, Debug)]
struct BonusRound {
    remaining: Duration,
    grace: Option<Duration>,
    displayed_seconds: u32,
}

/// Level progression and bonus-round lifecycle.
#[derive(Clone, Debug)]
pub struct WaveController {
    phase: WavePhase,
    level: LevelIndex,
    last_level: LevelIndex,
    bonus_duration: Duration,
    defeated_grace: Duration,
    bonus: Option<BonusRound>,
}

impl WaveController {
    /// Creates a controller in `NormalWave` at the first level.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            phase: WavePhase::NormalWave,
            level: LevelIndex::FIRST,
            last_level: config.last_level,
            bonus_duration: config.bonus_duration,
            defeated_grace: config.defeated_grace,
            bonus: None,
        }
    }

    /// Current phase of the state machine.
    #[must_use]
    pub const fn phase(&self) -> WavePhase {
        self.phase
    }

    /// Index of the active level.
    #[must_use]
    pub const fn level(&self) -> LevelIndex {
        self.level
    }

    /// Reports whether the bonus round is in progress.
    #[must_use]
    pub fn is_bonus_round_active(&self) -> bool {
        self.phase == WavePhase::BonusRound
    }

    /// Countdown left in the bonus round, frozen while the defeated message shows.
    #[must_use]
    pub fn bonus_time_remaining(&self) -> Option<Duration> {
        self.bonus.map(|bonus| bonus.remaining)
    }

    /// Text for the bonus countdown label, or `None` when it should be blank.
    #[must_use]
    pub fn countdown_display(&self) -> Option<String> {
        let bonus = self.bonus?;
        if bonus.grace.is_some() {
            return Some("All Bonus Enemies Defeated!".to_owned());
        }
        Some(format!("Bonus Time: {}s", ceil_seconds(bonus.remaining)))
    }

    /// Reacts to the field running out of hostile wave members.
    ///
    /// In `NormalWave` this starts the bonus round when no heart was lost
    /// during the level, and otherwise advances or wins. In `BonusRound` it
    /// starts the defeated grace period. Terminal phases ignore it.
    pub fn handle_wave_cleared(&mut self, heart_lost: bool, out: &mut Vec<Transition>) {
        match self.phase {
            WavePhase::NormalWave => {
                if heart_lost {
                    self.advance(true, out);
                } else {
                    self.start_bonus_round(out);
                }
            }
            WavePhase::BonusRound => self.begin_grace(out),
            WavePhase::GameOver | WavePhase::Won => {}
        }
    }

    /// Advances the bonus countdown or grace period by `dt`.
    pub fn tick(&mut self, dt: Duration, out: &mut Vec<Transition>) {
        let Some(bonus) = self.bonus.as_mut() else {
            return;
        };

        if let Some(grace) = bonus.grace.as_mut() {
            *grace = grace.saturating_sub(dt);
            if grace.is_zero() {
                self.conclude_bonus_round(true, out);
            }
            return;
        }

        bonus.remaining = bonus.remaining.saturating_sub(dt);
        let seconds = ceil_seconds(bonus.remaining);
        if seconds != bonus.displayed_seconds {
            bonus.displayed_seconds = seconds;
            out.push(Transition::BonusCountdownChanged { seconds });
        }

        if bonus.remaining.is_zero() {
            out.push(Transition::BonusSurvivorsDespawned);
            self.conclude_bonus_round(false, out);
        }
    }

    /// Forces `GameOver` from any non-terminal phase.
    pub fn end_game(&mut self, out: &mut Vec<Transition>) {
        if self.phase.is_terminal() {
            return;
        }
        self.bonus = None;
        self.phase = WavePhase::GameOver;
        out.push(Transition::GameOver);
    }

    /// Forces `Won` from any non-terminal phase.
    ///
    /// Used when a level that should exist cannot be loaded, so progression
    /// ends safely instead of stalling.
    pub fn declare_won(&mut self, out: &mut Vec<Transition>) {
        if self.phase.is_terminal() {
            return;
        }
        self.bonus = None;
        self.phase = WavePhase::Won;
        out.push(Transition::Won);
    }

    fn start_bonus_round(&mut self, out: &mut Vec<Transition>) {
        self.phase = WavePhase::BonusRound;
        self.bonus = Some(BonusRound {
            remaining: self.bonus_duration,
            grace: None,
            displayed_seconds: ceil_seconds(self.bonus_duration),
        });
        log::info!("bonus round started after level {}", self.level.get());
        out.push(Transition::BonusRoundStarted {
            duration: self.bonus_duration,
        });

        if self.bonus_duration.is_zero() {
            out.push(Transition::BonusSurvivorsDespawned);
            self.conclude_bonus_round(false, out);
        }
    }

    fn begin_grace(&mut self, out: &mut Vec<Transition>) {
        let Some(bonus) = self.bonus.as_mut() else {
            return;
        };
        if bonus.grace.is_some() {
            return;
        }
        bonus.grace = Some(self.defeated_grace);
        out.push(Transition::BonusEnemiesDefeated);

        if self.defeated_grace.is_zero() {
            self.conclude_bonus_round(true, out);
        }
    }

    fn conclude_bonus_round(&mut self, cleared: bool, out: &mut Vec<Transition>) {
        self.bonus = None;
        out.push(Transition::BonusRoundEnded { cleared });
        self.advance(false, out);
    }

    fn advance(&mut self, restore_health: bool, out: &mut Vec<Transition>) {
        if self.level < self.last_level {
            self.level = self.level.next();
            self.phase = WavePhase::NormalWave;
            log::info!("advancing to level {}", self.level.get());
            out.push(Transition::LevelAdvanced {
                level: self.level,
                restore_health,
            });
        } else {
            self.phase = WavePhase::Won;
            out.push(Transition::Won);
        }
    }
}
