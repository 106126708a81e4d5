#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Score accumulation, derived currency, and persisted achievement unlocks.

use keris_warrior_core::{keys, Achievement, Event, SettingsStore};

/// Coins earned by a concluded game and the persisted balance afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settlement {
    /// Coins derived from the game's score.
    pub earned: u64,
    /// Persisted coin balance after the earned coins were added.
    pub total: u64,
}

/// Running score of the current game.
#[derive(Clone, Debug)]
pub struct ScoreLedger {
    score: u64,
    coins_per_point: u64,
}

impl ScoreLedger {
    /// Creates an empty ledger. A zero `coins_per_point` is treated as one.
    #[must_use]
    pub fn new(coins_per_point: u32) -> Self {
        Self {
            score: 0,
            coins_per_point: u64::from(coins_per_point.max(1)),
        }
    }

    /// Total score accumulated so far.
    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// Currency derived from the score, rounded down.
    #[must_use]
    pub const fn coins(&self) -> u64 {
        self.score / self.coins_per_point
    }

    /// Adds `base_points * multiplier` to the score and returns the amount added.
    ///
    /// Must be called exactly once per scoring event.
    pub fn add_score(&mut self, base_points: u32, multiplier: u32) -> u64 {
        let effective = u64::from(base_points).saturating_mul(u64::from(multiplier));
        self.score = self.score.saturating_add(effective);
        effective
    }

    /// Unlocks every score milestone the current score has reached.
    ///
    /// Unlock flags live in `store`, so each milestone fires at most once for
    /// the lifetime of the store no matter how often it is re-crossed. Returns
    /// whether any flag was written.
    pub fn check_milestones<S: SettingsStore + ?Sized>(
        &self,
        store: &mut S,
        out: &mut Vec<Event>,
    ) -> bool {
        let mut unlocked = false;
        for achievement in Achievement::SCORE_MILESTONES {
            let reached = achievement
                .score_threshold()
                .is_some_and(|threshold| self.score >= threshold);
            if reached {
                unlocked |= unlock(store, achievement, out);
            }
        }
        unlocked
    }

    /// Adds the coins derived from the score to the persisted balance.
    ///
    /// The store is not saved; callers persist it once the game has been
    /// fully concluded.
    pub fn settle_currency<S: SettingsStore + ?Sized>(&self, store: &mut S) -> Settlement {
        let earned = self.coins();
        let previous = u64::try_from(store.int(keys::TOTAL_COINS, 0)).unwrap_or(0);
        let total = previous.saturating_add(earned);
        store.set_int(keys::TOTAL_COINS, i64::try_from(total).unwrap_or(i64::MAX));
        log::info!("settled {earned} coins, balance is now {total}");
        Settlement { earned, total }
    }
}

/// Sets the persisted flag of `achievement` if it is not already set.
///
/// Emits [`Event::AchievementUnlocked`] and returns `true` only on the first
/// unlock.
pub fn unlock<S: SettingsStore + ?Sized>(
    store: &mut S,
    achievement: Achievement,
    out: &mut Vec<Event>,
) -> bool {
    if is_unlocked(store, achievement) {
        return false;
    }
    store.set_int(achievement.store_key(), 1);
    log::info!("achievement unlocked: {}", achievement.title());
    out.push(Event::AchievementUnlocked { achievement });
    true
}

/// Reports whether the persisted flag of `achievement` is set.
pub fn is_unlocked<S: SettingsStore + ?Sized>(store: &S, achievement: Achievement) -> bool {
    store.int(achievement.store_key(), 0) == 1
}
