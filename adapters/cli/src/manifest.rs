use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use keris_warrior_core::{BonusRoundDefinition, GameConfig, LevelCatalog, LevelDefinition};
use serde::Deserialize;

const SUPPORTED_MANIFEST_VERSION: u32 = 1;
const BUILTIN_MANIFEST: &str = include_str!("../assets/manifest.toml");

/// Validated contents of a game manifest.
#[derive(Debug)]
pub(crate) struct Manifest {
    /// Tuning knobs.
    pub(crate) config: GameConfig,
    /// Levels in play order.
    pub(crate) catalog: LevelCatalog,
    /// Bonus round between levels.
    pub(crate) bonus: BonusRoundDefinition,
}

impl Manifest {
    /// Loads the manifest at `path`, or the built-in one when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return parse(BUILTIN_MANIFEST).context("built-in manifest is invalid");
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read game manifest at {}", path.display()))?;
        parse(&contents).with_context(|| format!("invalid game manifest at {}", path.display()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestFile {
    version: u32,
    #[serde(default)]
    config: GameConfig,
    #[serde(default)]
    bonus_round: BonusRoundDefinition,
    #[serde(default)]
    levels: Vec<LevelDefinition>,
}

fn parse(contents: &str) -> Result<Manifest> {
    let manifest: ManifestFile =
        toml::from_str(contents).context("failed to parse game manifest toml contents")?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        bail!(
            "unsupported game manifest version {}; expected {}",
            manifest.version,
            SUPPORTED_MANIFEST_VERSION
        );
    }

    manifest.config.validate().context("invalid [config] section")?;
    let _ = manifest
        .bonus_round
        .duration()
        .context("invalid [bonus_round] section")?;
    let catalog = LevelCatalog::new(manifest.levels).context("invalid [[levels]] entries")?;

    Ok(Manifest {
        config: manifest.config,
        catalog,
        bonus: manifest.bonus_round,
    })
}
