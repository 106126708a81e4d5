use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use keris_warrior_core::{MemoryStore, SettingsStore, StoreError};

/// Settings store persisted as a flat TOML table.
#[derive(Debug)]
pub(crate) struct SettingsFile {
    path: PathBuf,
    values: MemoryStore,
}

impl SettingsFile {
    /// Opens the settings at `path`; a missing file yields empty settings.
    pub(crate) fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings at {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("failed to parse settings at {}", path.display()))?
        } else {
            log::debug!("no settings at {}, starting fresh", path.display());
            MemoryStore::new()
        };
        Ok(Self { path, values })
    }

    /// Location the settings are written to.
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for SettingsFile {
    fn int(&self, key: &str, default: i64) -> i64 {
        self.values.int(key, default)
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.values.set_int(key, value);
    }

    fn string(&self, key: &str, default: &str) -> String {
        self.values.string(key, default)
    }

    fn set_string(&mut self, key: &str, value: &str) {
        self.values.set_string(key, value);
    }

    fn has_key(&self, key: &str) -> bool {
        self.values.has_key(key)
    }

    fn save(&mut self) -> Result<(), StoreError> {
        let contents = toml::to_string(&self.values)
            .map_err(|error| StoreError::with_source("failed to encode settings", error))?;
        fs::write(&self.path, contents).map_err(|error| {
            StoreError::with_source(format!("failed to write {}", self.path.display()), error)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keris_warrior_core::keys;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "keris-warrior-{name}-{}.toml",
            std::process::id()
        ))
    }

    #[test]
    fn missing_file_opens_empty() {
        let path = scratch_path("missing");
        let _ = fs::remove_file(&path);

        let settings = SettingsFile::open(&path).expect("opens");

        assert_eq!(settings.int(keys::TOTAL_COINS, 0), 0);
        assert_eq!(settings.path(), path.as_path());
    }

    #[test]
    fn saved_values_survive_reopen() {
        let path = scratch_path("reopen");
        let mut settings = SettingsFile::open(&path).expect("opens");
        settings.set_int(keys::TOTAL_COINS, 140);
        settings.set_string(keys::PLAYER_NAME, "Jebat");
        settings.save().expect("saves");

        let reopened = SettingsFile::open(&path).expect("reopens");
        let _ = fs::remove_file(&path);

        assert_eq!(reopened.int(keys::TOTAL_COINS, 0), 140);
        assert_eq!(reopened.string(keys::PLAYER_NAME, ""), "Jebat");
    }

    #[test]
    fn corrupt_file_is_reported() {
        let path = scratch_path("corrupt");
        fs::write(&path, "TotalCoins = [").expect("writes scratch file");

        let result = SettingsFile::open(&path);
        let _ = fs::remove_file(&path);

        assert!(result.is_err());
    }
}
