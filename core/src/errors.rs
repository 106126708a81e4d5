//! Error taxonomy shared by the progression crates.

use std::error::Error;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::LevelIndex;

/// Fatal configuration problems that prevent progression from starting.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigurationError {
    /// The level catalog contains no levels.
    #[error("no levels configured")]
    NoLevelsConfigured,
    /// A level index lies outside the configured catalog.
    #[error("level {} exceeds the {count} configured levels", index.get())]
    LevelOutOfRange {
        /// Index that was requested.
        index: LevelIndex,
        /// Number of levels in the catalog.
        count: usize,
    },
    /// A duration field holds a negative or non-finite number of seconds.
    #[error("`{field}` must be a finite, non-negative number of seconds (got {value})")]
    InvalidDuration {
        /// Name of the offending field.
        field: &'static str,
        /// Value found in the configuration.
        value: f64,
    },
    /// A random interval has a minimum above its maximum.
    #[error("`{field}` has a minimum above its maximum")]
    InvertedInterval {
        /// Name of the offending field.
        field: &'static str,
    },
    /// The coin conversion rate is zero.
    #[error("coins_per_point must be at least 1")]
    ZeroCoinRate,
}

/// References that must resolve before enemies can be spawned.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum MissingReference {
    /// A level enables grid spawning but names no grid prefab.
    #[error("level {} has a grid formation without an enemy prefab", level.get())]
    GridPrefab {
        /// Level that declared the grid.
        level: LevelIndex,
    },
    /// A custom enemy slot names no prefab.
    #[error("custom enemy {slot} of level {} has no prefab", level.get())]
    CustomPrefab {
        /// Level that declared the custom enemy.
        level: LevelIndex,
        /// Position of the enemy inside the level's custom list.
        slot: usize,
    },
    /// The bonus round names no enemy prefab.
    #[error("bonus round has no enemy prefab")]
    BonusPrefab,
}

/// Internal invariants that must hold but are checked defensively.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Error)]
pub enum InvariantViolation {
    /// Progression tried to move past the final level without winning.
    #[error("level {} lies past the final level {}", attempted.get(), last.get())]
    LevelPastCatalog {
        /// Level that was about to load.
        attempted: LevelIndex,
        /// Final level in the catalog.
        last: LevelIndex,
    },
}

/// Failure reported by a settings store backend.
#[derive(Debug, Error)]
#[error("failed to persist settings: {message}")]
pub struct StoreError {
    message: String,
    #[source]
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
}

impl StoreError {
    /// Creates an error carrying only a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an error that wraps the backend failure that caused it.
    #[must_use]
    pub fn with_source(
        message: impl Into<String>,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
