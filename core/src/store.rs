//! Abstract key-value store holding state that outlives a single game.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::StoreError;

/// Well-known keys of persisted values.
pub mod keys {
    /// Coin balance accumulated over every settled game.
    pub const TOTAL_COINS: &str = "TotalCoins";
    /// Item id of the selected projectile style.
    pub const CURRENT_KERIS: &str = "CurrentKeris";
    /// Item id of the selected player model.
    pub const CURRENT_CLOTH: &str = "CurrentCloth";
    /// Prefix of the per-item ownership flags.
    pub const OWNED_ITEM_PREFIX: &str = "OwnedItem_";
    /// Name leaderboard entries are filed under.
    pub const PLAYER_NAME: &str = "PlayerName";
    /// Leaderboard name used when none was chosen.
    pub const DEFAULT_PLAYER_NAME: &str = "Unknown Player";

    /// Builds the ownership flag key for the provided shop item.
    #[must_use]
    pub fn owned_item(item_id: &str) -> String {
        format!("{OWNED_ITEM_PREFIX}{item_id}")
    }
}

/// Get/set-with-default access to persisted settings.
///
/// Writes are staged by the implementation and made durable by [`save`].
/// The progression core never assumes a concrete file format.
///
/// [`save`]: SettingsStore::save
pub trait SettingsStore {
    /// Reads an integer, returning `default` when the key is absent or not an integer.
    fn int(&self, key: &str, default: i64) -> i64;

    /// Stages an integer value.
    fn set_int(&mut self, key: &str, value: i64);

    /// Reads a string, returning `default` when the key is absent or not a string.
    fn string(&self, key: &str, default: &str) -> String;

    /// Stages a string value.
    fn set_string(&mut self, key: &str, value: &str);

    /// Reports whether any value is stored under the key.
    fn has_key(&self, key: &str) -> bool;

    /// Makes every staged value durable.
    fn save(&mut self) -> Result<(), StoreError>;
}

/// Value held by a [`MemoryStore`] entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredValue {
    /// Integer entry.
    Int(i64),
    /// String entry.
    Text(String),
}

/// In-memory settings store whose contents serialise as a flat table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryStore {
    values: BTreeMap<String, StoredValue>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn int(&self, key: &str, default: i64) -> i64 {
        match self.values.get(key) {
            Some(StoredValue::Int(value)) => *value,
            _ => default,
        }
    }

    fn set_int(&mut self, key: &str, value: i64) {
        let _ = self.values.insert(key.to_owned(), StoredValue::Int(value));
    }

    fn string(&self, key: &str, default: &str) -> String {
        match self.values.get(key) {
            Some(StoredValue::Text(value)) => value.clone(),
            _ => default.to_owned(),
        }
    }

    fn set_string(&mut self, key: &str, value: &str) {
        let _ = self
            .values
            .insert(key.to_owned(), StoredValue::Text(value.to_owned()));
    }

    fn has_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    fn save(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}
