//! Immutable wave definitions loaded from the game manifest.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::seconds;
use crate::{ConfigurationError, LevelIndex, MissingReference};

/// Height at which level grid enemies hover.
const LEVEL_GRID_HEIGHT: f32 = 0.5;
/// Depth of the first level grid row.
const LEVEL_GRID_DEPTH: f32 = 5.0;
/// Horizontal offset of the first bonus grid column.
const BONUS_GRID_LEFT: f32 = -5.0;
/// Depth of the first bonus grid row.
const BONUS_GRID_DEPTH: f32 = 7.0;
/// Shoot interval long enough that bonus enemies never fire in practice.
const DORMANT_SHOOT_SECS: f64 = 999.0;

/// Opaque handle naming an engine prefab.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrefabRef(String);

impl PrefabRef {
    /// Wraps the provided prefab name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Name of the referenced prefab.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// World-space position of a spawned entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal offset; positive is to the player's right.
    pub x: f32,
    /// Height above the play field.
    pub y: f32,
    /// Depth; enemies start at positive depth and descend toward the player.
    pub z: f32,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Range the delay between two enemy shots is drawn from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShootInterval {
    /// Shortest delay in seconds.
    pub min_secs: f64,
    /// Longest delay in seconds.
    pub max_secs: f64,
}

impl ShootInterval {
    /// Interval used by enemies that should never fire.
    pub const DORMANT: Self = Self {
        min_secs: DORMANT_SHOOT_SECS,
        max_secs: DORMANT_SHOOT_SECS,
    };

    /// Creates a new interval.
    #[must_use]
    pub const fn new(min_secs: f64, max_secs: f64) -> Self {
        Self { min_secs, max_secs }
    }

    /// Reports whether the interval belongs to an enemy that never fires.
    #[must_use]
    pub fn is_dormant(&self) -> bool {
        self.min_secs >= DORMANT_SHOOT_SECS
    }

    /// Converts the interval to durations, rejecting negative or inverted bounds.
    pub fn resolve(&self, field: &'static str) -> Result<(Duration, Duration), ConfigurationError> {
        let min = seconds(field, self.min_secs)?;
        let max = seconds(field, self.max_secs)?;
        if min > max {
            return Err(ConfigurationError::InvertedInterval { field });
        }
        Ok((min, max))
    }
}

impl Default for ShootInterval {
    fn default() -> Self {
        Self::new(5.0, 10.0)
    }
}

/// Uniform rows-by-columns block of identical enemies.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridFormation {
    /// Number of rows, stacked away from the player.
    pub rows: u32,
    /// Number of enemies per row.
    pub columns: u32,
    /// Distance between neighbouring enemies on both axes.
    pub spacing: f32,
    /// Prefab instantiated for every cell.
    pub prefab: Option<PrefabRef>,
    /// Movement speed assigned to every enemy.
    pub speed: f32,
    /// Shoot interval assigned to every enemy.
    pub shoot_interval: ShootInterval,
}

impl Default for GridFormation {
    fn default() -> Self {
        Self {
            rows: 3,
            columns: 5,
            spacing: 2.0,
            prefab: None,
            speed: 2.0,
            shoot_interval: ShootInterval::default(),
        }
    }
}

/// Explicitly placed enemy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemySpawn {
    /// Prefab to instantiate.
    pub prefab: Option<PrefabRef>,
    /// Spawn position.
    pub position: Position,
    /// Movement speed.
    pub speed: f32,
    /// Shoot interval.
    pub shoot_interval: ShootInterval,
}

impl Default for EnemySpawn {
    fn default() -> Self {
        Self {
            prefab: None,
            position: Position::default(),
            speed: 2.0,
            shoot_interval: ShootInterval::default(),
        }
    }
}

/// Wave of enemies making up one level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelDefinition {
    /// Name shown in the level text.
    pub name: String,
    /// Optional uniform grid of enemies.
    #[serde(default)]
    pub grid: Option<GridFormation>,
    /// Explicitly placed enemies spawned after the grid.
    #[serde(default)]
    pub custom: Vec<EnemySpawn>,
}

impl LevelDefinition {
    /// Creates a level made of a single grid formation.
    #[must_use]
    pub fn with_grid(name: impl Into<String>, grid: GridFormation) -> Self {
        Self {
            name: name.into(),
            grid: Some(grid),
            custom: Vec::new(),
        }
    }

    /// Resolves the level into concrete spawn orders.
    ///
    /// Grid cells are centred on the horizontal axis. Entries whose prefab is
    /// missing are skipped and reported in [`SpawnPlan::missing`].
    #[must_use]
    pub fn spawn_plan(&self, level: LevelIndex) -> SpawnPlan {
        let mut plan = SpawnPlan::default();

        if let Some(grid) = &self.grid {
            match &grid.prefab {
                Some(prefab) => {
                    let half_width = grid.columns.saturating_sub(1) as f32 * 0.5;
                    for row in 0..grid.rows {
                        for column in 0..grid.columns {
                            let position = Position::new(
                                (column as f32 - half_width) * grid.spacing,
                                LEVEL_GRID_HEIGHT,
                                LEVEL_GRID_DEPTH + row as f32 * grid.spacing,
                            );
                            plan.orders.push(SpawnOrder {
                                prefab: prefab.clone(),
                                position,
                                speed: grid.speed,
                                shoot_interval: grid.shoot_interval,
                            });
                        }
                    }
                }
                None => plan.missing.push(MissingReference::GridPrefab { level }),
            }
        }

        for (slot, enemy) in self.custom.iter().enumerate() {
            let Some(prefab) = &enemy.prefab else {
                plan.missing.push(MissingReference::CustomPrefab { level, slot });
                continue;
            };
            plan.orders.push(SpawnOrder {
                prefab: prefab.clone(),
                position: enemy.position,
                speed: enemy.speed,
                shoot_interval: enemy.shoot_interval,
            });
        }

        plan
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        if let Some(grid) = &self.grid {
            let _ = grid.shoot_interval.resolve("grid.shoot_interval")?;
        }
        for enemy in &self.custom {
            let _ = enemy.shoot_interval.resolve("custom.shoot_interval")?;
        }
        Ok(())
    }
}

/// Configuration of the timed bonus round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BonusRoundDefinition {
    /// Prefab instantiated for every bonus enemy.
    pub prefab: Option<PrefabRef>,
    /// Number of rows.
    pub rows: u32,
    /// Number of enemies per row.
    pub columns: u32,
    /// Distance between neighbouring enemies on both axes.
    pub spacing: f32,
    /// Movement speed of bonus enemies.
    pub speed: f32,
    /// Time available to clear the bonus wave.
    pub duration_secs: f64,
}

impl Default for BonusRoundDefinition {
    fn default() -> Self {
        Self {
            prefab: None,
            rows: 2,
            columns: 6,
            spacing: 2.0,
            speed: 5.0,
            duration_secs: 15.0,
        }
    }
}

impl BonusRoundDefinition {
    /// Time available to clear the bonus wave.
    pub fn duration(&self) -> Result<Duration, ConfigurationError> {
        seconds("bonus_round.duration_secs", self.duration_secs)
    }

    /// Resolves the bonus wave into spawn orders. Bonus enemies never fire.
    #[must_use]
    pub fn spawn_plan(&self) -> SpawnPlan {
        let mut plan = SpawnPlan::default();
        let Some(prefab) = &self.prefab else {
            plan.missing.push(MissingReference::BonusPrefab);
            return plan;
        };

        for row in 0..self.rows {
            for column in 0..self.columns {
                plan.orders.push(SpawnOrder {
                    prefab: prefab.clone(),
                    position: Position::new(
                        BONUS_GRID_LEFT + column as f32 * self.spacing,
                        0.0,
                        BONUS_GRID_DEPTH + row as f32 * self.spacing,
                    ),
                    speed: self.speed,
                    shoot_interval: ShootInterval::DORMANT,
                });
            }
        }
        plan
    }
}

/// Concrete instruction to instantiate one enemy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnOrder {
    /// Prefab to instantiate.
    pub prefab: PrefabRef,
    /// Spawn position.
    pub position: Position,
    /// Movement speed before multipliers.
    pub speed: f32,
    /// Shoot interval.
    pub shoot_interval: ShootInterval,
}

/// Spawn orders resolved from a definition, plus the references that were missing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpawnPlan {
    /// Enemies to instantiate.
    pub orders: Vec<SpawnOrder>,
    /// References that could not be resolved; their spawns were skipped.
    pub missing: Vec<MissingReference>,
}

/// Ordered, validated list of levels.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelCatalog {
    levels: Vec<LevelDefinition>,
}

impl LevelCatalog {
    /// Validates and wraps the provided levels.
    pub fn new(levels: Vec<LevelDefinition>) -> Result<Self, ConfigurationError> {
        if levels.is_empty() {
            return Err(ConfigurationError::NoLevelsConfigured);
        }
        for level in &levels {
            level.validate()?;
        }
        Ok(Self { levels })
    }

    /// Number of configured levels. Always at least one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Always false; a catalog cannot be constructed without levels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Index of the final level.
    #[must_use]
    pub fn last_index(&self) -> LevelIndex {
        let last = self.levels.len().saturating_sub(1);
        LevelIndex::new(u32::try_from(last).unwrap_or(u32::MAX))
    }

    /// Looks up a level by index.
    pub fn level(&self, index: LevelIndex) -> Result<&LevelDefinition, ConfigurationError> {
        usize::try_from(index.get())
            .ok()
            .and_then(|slot| self.levels.get(slot))
            .ok_or(ConfigurationError::LevelOutOfRange {
                index,
                count: self.levels.len(),
            })
    }

    /// Iterator over the levels in play order.
    pub fn iter(&self) -> impl Iterator<Item = &LevelDefinition> {
        self.levels.iter()
    }
}
