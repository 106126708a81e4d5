#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Keris Warrior progression engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing things that happened in the engine (a wave was cleared, the
//! player lost health, a clock tick elapsed), the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! that display, audio, and engine layers react to. Nothing in this crate
//! performs I/O; persisted state is only reachable through [`SettingsStore`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

mod config;
mod definitions;
mod errors;
mod store;

pub use config::{GameConfig, IntervalSecs, PowerUpTuning};
pub use definitions::{
    BonusRoundDefinition, EnemySpawn, GridFormation, LevelCatalog, LevelDefinition, Position,
    PrefabRef, ShootInterval, SpawnOrder, SpawnPlan,
};
pub use errors::{ConfigurationError, InvariantViolation, MissingReference, StoreError};
pub use store::{keys, MemoryStore, SettingsStore, StoredValue};

/// Commands that express everything the engine can report to the progression core.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Starts a fresh game, discarding any previous session state.
    StartGame,
    /// Advances every countdown by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Reports that no hostile wave members remain on the field.
    ReportWaveCleared,
    /// Reports the player's health after a change.
    ReportHealth {
        /// Health value after the change was applied.
        health: u32,
    },
    /// Reports that a single enemy was destroyed. Sent exactly once per kill.
    ReportEnemyDestroyed {
        /// Base points awarded before multipliers apply.
        points: u32,
    },
    /// Reports that the player died.
    ReportPlayerDied,
    /// Requests activation of a uniformly chosen power-up.
    RequestPowerUp,
    /// Requests activation of a specific power-up.
    GrantPowerUp {
        /// Power-up that should be activated.
        kind: PowerUpKind,
    },
    /// Reports that the player pulled the trigger once.
    FireShot,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that a level wave became active.
    LevelStarted {
        /// Index of the level inside the catalog.
        level: LevelIndex,
        /// Display name shown in the level text.
        name: String,
    },
    /// Requests that the engine instantiate the provided enemies.
    EnemiesSpawned {
        /// Wave the enemies belong to.
        wave: WaveKind,
        /// Concrete spawn instructions in deterministic order.
        orders: Vec<SpawnOrder>,
    },
    /// Reports that a spawn was skipped because a reference was missing.
    SpawnSkipped {
        /// Reference that could not be resolved.
        missing: MissingReference,
    },
    /// Requests that the player's health be restored to its maximum.
    PlayerHealthRestored {
        /// Health value the player should hold afterwards.
        health: u32,
    },
    /// Announces that the bonus round began.
    BonusRoundStarted {
        /// Time available to clear the bonus wave.
        duration: Duration,
    },
    /// Reports a change of the whole seconds shown on the bonus countdown.
    BonusCountdownChanged {
        /// Ceiling-rounded seconds remaining.
        seconds: u32,
    },
    /// Announces that every bonus enemy was destroyed before time ran out.
    BonusEnemiesDefeated,
    /// Requests removal of bonus enemies still alive when the countdown expired.
    BonusSurvivorsDespawned,
    /// Announces that the bonus round concluded.
    BonusRoundEnded {
        /// Whether every bonus enemy was destroyed.
        cleared: bool,
    },
    /// Announces that a power-up became active.
    PowerUpActivated {
        /// Power-up that became active.
        kind: PowerUpKind,
    },
    /// Announces that an active timed power-up was preempted by another.
    PowerUpReplaced {
        /// Timed power-up whose effect was reverted.
        previous: PowerUpKind,
        /// Timed power-up that took its place.
        next: PowerUpKind,
    },
    /// Announces that a power-up ran out.
    PowerUpExpired {
        /// Power-up that ran out.
        kind: PowerUpKind,
    },
    /// Requests that the player's weapon use a new shot cooldown.
    ShootCooldownChanged {
        /// Minimum time between two shots.
        cooldown: Duration,
    },
    /// Requests that hostile speeds be recomputed from their base speed.
    EnemySpeedMultiplierChanged {
        /// Factor applied to each hostile's configured speed.
        multiplier: f32,
    },
    /// Requests that the power-up status text be cleared.
    PowerUpStatusCleared,
    /// Confirms a shot and the number of projectiles it releases.
    ShotFired {
        /// Projectiles the engine should instantiate.
        projectiles: u8,
    },
    /// Reports the running score after a scoring event.
    ScoreChanged {
        /// Total score accumulated in the current game.
        score: u64,
        /// Currency derived from the score.
        coins: u64,
    },
    /// Announces that an achievement was unlocked for the first time.
    AchievementUnlocked {
        /// Achievement that was unlocked.
        achievement: Achievement,
    },
    /// Announces that the game reached a terminal state.
    GameConcluded {
        /// Score at the moment the game ended.
        final_score: u64,
        /// Whether the player cleared the final wave.
        won: bool,
    },
    /// Requests submission of the final score to the leaderboard collaborator.
    LeaderboardSubmissionRequested {
        /// Name the score should be filed under.
        player_name: String,
        /// Score to submit.
        score: u64,
    },
    /// Confirms that the game's coins were added to the persisted total.
    CoinsSettled {
        /// Coins earned during the concluded game.
        earned: u64,
        /// Persisted coin balance after settlement.
        total: u64,
    },
    /// Announces the loadout the player starts the game with.
    LoadoutEquipped {
        /// Projectile style selected in the shop.
        keris: KerisStyle,
        /// Player model selected in the shop.
        cloth: ClothStyle,
    },
    /// Requests that the engine launch a bonus UFO.
    BonusUfoSpawnRequested,
    /// Reports that persisted state could not be saved.
    PersistenceFailed {
        /// Human readable description of the failure.
        reason: String,
    },
    /// Reports that an internal invariant was violated and recovered from.
    InvariantViolated {
        /// Description of the violated invariant.
        violation: InvariantViolation,
    },
}

/// Zero-based index of a level inside the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LevelIndex(u32);

impl LevelIndex {
    /// Index of the first level.
    pub const FIRST: Self = Self(0);

    /// Creates a new level index wrapper.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the underlying index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Returns the index of the following level.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Identifies the wave a group of enemies belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaveKind {
    /// Regular wave defined by a level.
    Level(LevelIndex),
    /// Timed bonus wave between levels.
    Bonus,
}

/// Phase of the wave state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WavePhase {
    /// A regular level wave is in progress.
    NormalWave,
    /// The timed bonus round is in progress.
    BonusRound,
    /// The player died. Terminal.
    GameOver,
    /// The final wave was cleared. Terminal.
    Won,
}

impl WavePhase {
    /// Reports whether no further transitions can occur.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::GameOver | Self::Won)
    }
}

/// Power-ups granted by shooting the bonus UFO.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Fires two projectiles per shot for a fixed number of shots.
    DoubleBullets,
    /// Shortens the shot cooldown for a fixed duration.
    FastShooting,
    /// Halves enemy speed for a fixed duration.
    EnemySlowdown,
    /// Doubles scored points for a fixed duration.
    DoubleScore,
}

impl PowerUpKind {
    /// Every power-up in selection order.
    pub const ALL: [Self; 4] = [
        Self::DoubleBullets,
        Self::FastShooting,
        Self::EnemySlowdown,
        Self::DoubleScore,
    ];

    /// Reports whether the power-up expires after elapsed time rather than shots.
    #[must_use]
    pub const fn is_timed(self) -> bool {
        !matches!(self, Self::DoubleBullets)
    }

    /// Name shown in the power-up status text.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::DoubleBullets => "Double Bullets",
            Self::FastShooting => "Fast Shooting",
            Self::EnemySlowdown => "Enemy Slowdown",
            Self::DoubleScore => "Double Score",
        }
    }
}

/// Permanently persisted one-time unlocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Achievement {
    /// Score 100 points.
    RookieHero,
    /// Score 1000 points.
    MasterHero,
    /// Score 2000 points.
    HangTuah,
    /// Finish a game without losing health.
    Untouchable,
    /// Collect five power-ups in a single game.
    BonusHunter,
}

impl Achievement {
    /// Every achievement in display order.
    pub const ALL: [Self; 5] = [
        Self::RookieHero,
        Self::MasterHero,
        Self::HangTuah,
        Self::Untouchable,
        Self::BonusHunter,
    ];

    /// Achievements unlocked by crossing a score threshold.
    pub const SCORE_MILESTONES: [Self; 3] = [Self::RookieHero, Self::MasterHero, Self::HangTuah];

    /// Score required to unlock the achievement, if it is score based.
    #[must_use]
    pub const fn score_threshold(self) -> Option<u64> {
        match self {
            Self::RookieHero => Some(100),
            Self::MasterHero => Some(1_000),
            Self::HangTuah => Some(2_000),
            Self::Untouchable | Self::BonusHunter => None,
        }
    }

    /// Key of the persisted unlock flag.
    #[must_use]
    pub const fn store_key(self) -> &'static str {
        match self {
            Self::RookieHero => "Achievement_RookieHero",
            Self::MasterHero => "Achievement_MasterHero",
            Self::HangTuah => "Achievement_HangTuah",
            Self::Untouchable => "Achievement_Untouchable",
            Self::BonusHunter => "Achievement_BonusHunter",
        }
    }

    /// Title shown to the player.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::RookieHero => "Rookie Hero",
            Self::MasterHero => "Master Hero",
            Self::HangTuah => "Hang Tuah himself",
            Self::Untouchable => "Untouchable",
            Self::BonusHunter => "Bonus Hunter",
        }
    }

    /// Short description of the unlock condition.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::RookieHero => "Score 100 points",
            Self::MasterHero => "Score 1000 points",
            Self::HangTuah => "Score 2000 points",
            Self::Untouchable => "Complete game without losing health",
            Self::BonusHunter => "Get 5 powerups in a single game",
        }
    }
}

/// Projectile style selected through the shop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KerisStyle {
    /// Stock projectile.
    Default,
    /// Red keris sold in the shop.
    Red,
}

impl KerisStyle {
    /// Resolves a persisted item id, falling back to the stock style.
    #[must_use]
    pub fn from_item_id(id: &str) -> Self {
        match id {
            "kerisRed" => Self::Red,
            _ => Self::Default,
        }
    }

    /// Persisted item id of the style.
    #[must_use]
    pub const fn item_id(self) -> &'static str {
        match self {
            Self::Default => "defaultKeris",
            Self::Red => "kerisRed",
        }
    }
}

/// Player model selected through the shop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClothStyle {
    /// Stock player model.
    Default,
    /// Red warrior outfit sold in the shop.
    WarriorRed,
    /// Green warrior outfit sold in the shop.
    WarriorGreen,
}

impl ClothStyle {
    /// Resolves a persisted item id, falling back to the stock model.
    #[must_use]
    pub fn from_item_id(id: &str) -> Self {
        match id {
            "warriorRed" => Self::WarriorRed,
            "warriorGreen" => Self::WarriorGreen,
            _ => Self::Default,
        }
    }

    /// Persisted item id of the style.
    #[must_use]
    pub const fn item_id(self) -> &'static str {
        match self {
            Self::Default => "defaultCloth",
            Self::WarriorRed => "warriorRed",
            Self::WarriorGreen => "warriorGreen",
        }
    }
}

/// Rounds a duration up to whole seconds for countdown displays.
#[must_use]
pub fn ceil_seconds(duration: Duration) -> u32 {
    let whole = duration.as_secs();
    let rounded = if duration.subsec_nanos() > 0 {
        whole.saturating_add(1)
    } else {
        whole
    };
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ceil_seconds_rounds_partial_seconds_up() {
        assert_eq!(ceil_seconds(Duration::from_millis(14_001)), 15);
        assert_eq!(ceil_seconds(Duration::from_secs(15)), 15);
        assert_eq!(ceil_seconds(Duration::from_millis(1)), 1);
        assert_eq!(ceil_seconds(Duration::ZERO), 0);
    }

    #[test]
    fn only_double_bullets_is_shot_based() {
        let shot_based: Vec<_> = PowerUpKind::ALL
            .iter()
            .filter(|kind| !kind.is_timed())
            .collect();
        assert_eq!(shot_based, vec![&PowerUpKind::DoubleBullets]);
    }

    #[test]
    fn score_milestones_are_ordered_by_threshold() {
        let thresholds: Vec<u64> = Achievement::SCORE_MILESTONES
            .iter()
            .filter_map(|achievement| achievement.score_threshold())
            .collect();
        assert_eq!(thresholds, vec![100, 1_000, 2_000]);
        assert_eq!(Achievement::Untouchable.score_threshold(), None);
    }

    #[test]
    fn unknown_item_ids_fall_back_to_defaults() {
        assert_eq!(KerisStyle::from_item_id("kerisRed"), KerisStyle::Red);
        assert_eq!(KerisStyle::from_item_id("bogus"), KerisStyle::Default);
        assert_eq!(ClothStyle::from_item_id("warriorGreen"), ClothStyle::WarriorGreen);
        assert_eq!(ClothStyle::from_item_id(""), ClothStyle::Default);
    }

    #[test]
    fn level_index_advances_by_one() {
        assert_eq!(LevelIndex::FIRST.next(), LevelIndex::new(1));
        assert_eq!(LevelIndex::new(u32::MAX).next(), LevelIndex::new(u32::MAX));
    }
}
