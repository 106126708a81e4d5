#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Coin shop and the loadout a game starts with.
//!
//! Everything here reads and writes through [`SettingsStore`]: coin balance,
//! ownership flags, and the two equipped selections.

use keris_warrior_core::{keys, ClothStyle, KerisStyle, SettingsStore, StoreError};
use thiserror::Error;

/// Slot an item occupies once equipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// Projectile style.
    Keris,
    /// Player model.
    Cloth,
}

impl ItemKind {
    fn selection_key(self) -> &'static str {
        match self {
            Self::Keris => keys::CURRENT_KERIS,
            Self::Cloth => keys::CURRENT_CLOTH,
        }
    }
}

/// Item offered by the shop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShopItem {
    /// Display name.
    pub name: String,
    /// Persisted identifier.
    pub id: String,
    /// Price in coins.
    pub price: u64,
    /// Slot the item is equipped into.
    pub kind: ItemKind,
}

impl ShopItem {
    /// Creates a new item.
    #[must_use]
    pub fn new(name: impl Into<String>, id: impl Into<String>, price: u64, kind: ItemKind) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            price,
            kind,
        }
    }
}

/// Availability of an item for the current balance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Availability {
    /// Already purchased.
    Owned,
    /// Can be bought right now.
    Affordable,
    /// Costs more than the current balance.
    TooExpensive,
}

/// Reasons a purchase was rejected.
#[derive(Debug, Error)]
pub enum PurchaseError {
    /// No item exists at the requested index.
    #[error("no shop item at index {index}")]
    UnknownItem {
        /// Index that was requested.
        index: usize,
    },
    /// The item was bought before.
    #[error("{name} is already owned")]
    AlreadyOwned {
        /// Display name of the item.
        name: String,
    },
    /// The balance does not cover the price.
    #[error("not enough coins: need {price}, have {balance}")]
    InsufficientCoins {
        /// Price of the item.
        price: u64,
        /// Current balance.
        balance: u64,
    },
    /// The purchase was applied but could not be persisted.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of a successful purchase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    /// Item that was bought and equipped.
    pub item: ShopItem,
    /// Balance after the price was deducted.
    pub balance: u64,
}

/// Ordered list of purchasable items.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shop {
    items: Vec<ShopItem>,
}

impl Default for Shop {
    fn default() -> Self {
        Self::new(vec![
            ShopItem::new("Red Keris", KerisStyle::Red.item_id(), 100, ItemKind::Keris),
            ShopItem::new(
                "Red Warrior",
                ClothStyle::WarriorRed.item_id(),
                150,
                ItemKind::Cloth,
            ),
            ShopItem::new(
                "Green Warrior",
                ClothStyle::WarriorGreen.item_id(),
                150,
                ItemKind::Cloth,
            ),
        ])
    }
}

impl Shop {
    /// Creates a shop offering `items` in order.
    #[must_use]
    pub fn new(items: Vec<ShopItem>) -> Self {
        Self { items }
    }

    /// Items in display order.
    #[must_use]
    pub fn items(&self) -> &[ShopItem] {
        &self.items
    }

    /// Whether the item at `index` can be bought with the persisted balance.
    #[must_use]
    pub fn availability<S: SettingsStore + ?Sized>(
        &self,
        store: &S,
        index: usize,
    ) -> Option<Availability> {
        let item = self.items.get(index)?;
        Some(if is_owned(store, &item.id) {
            Availability::Owned
        } else if balance(store) >= item.price {
            Availability::Affordable
        } else {
            Availability::TooExpensive
        })
    }

    /// Buys and equips the item at `index`, then saves the store.
    pub fn purchase<S: SettingsStore + ?Sized>(
        &self,
        store: &mut S,
        index: usize,
    ) -> Result<Receipt, PurchaseError> {
        let item = self
            .items
            .get(index)
            .ok_or(PurchaseError::UnknownItem { index })?;
        if is_owned(store, &item.id) {
            return Err(PurchaseError::AlreadyOwned {
                name: item.name.clone(),
            });
        }
        let coins = balance(store);
        if coins < item.price {
            return Err(PurchaseError::InsufficientCoins {
                price: item.price,
                balance: coins,
            });
        }

        let remaining = coins - item.price;
        store.set_int(&keys::owned_item(&item.id), 1);
        store.set_string(item.kind.selection_key(), &item.id);
        store.set_int(keys::TOTAL_COINS, i64::try_from(remaining).unwrap_or(i64::MAX));
        store.save()?;

        log::info!("purchased and equipped {}", item.name);
        Ok(Receipt {
            item: item.clone(),
            balance: remaining,
        })
    }
}

/// Persisted coin balance; negative values read as zero.
pub fn balance<S: SettingsStore + ?Sized>(store: &S) -> u64 {
    u64::try_from(store.int(keys::TOTAL_COINS, 0)).unwrap_or(0)
}

/// Reports whether the item with `item_id` was purchased.
pub fn is_owned<S: SettingsStore + ?Sized>(store: &S, item_id: &str) -> bool {
    store.int(&keys::owned_item(item_id), 0) == 1
}

/// Writes the stock selections when none were made yet.
///
/// Returns whether anything was written; the store is saved only in that case.
pub fn ensure_defaults<S: SettingsStore + ?Sized>(store: &mut S) -> Result<bool, StoreError> {
    let mut written = false;
    for (key, default) in [
        (keys::CURRENT_KERIS, KerisStyle::Default.item_id()),
        (keys::CURRENT_CLOTH, ClothStyle::Default.item_id()),
    ] {
        if store.string(key, "").is_empty() {
            store.set_string(key, default);
            written = true;
        }
    }
    if written {
        store.save()?;
    }
    Ok(written)
}

/// Equipped selections resolved to styles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Loadout {
    /// Projectile style.
    pub keris: KerisStyle,
    /// Player model.
    pub cloth: ClothStyle,
}

impl Loadout {
    /// Reads both selections, falling back to stock styles for unknown ids.
    pub fn load<S: SettingsStore + ?Sized>(store: &S) -> Self {
        Self {
            keris: KerisStyle::from_item_id(
                &store.string(keys::CURRENT_KERIS, KerisStyle::Default.item_id()),
            ),
            cloth: ClothStyle::from_item_id(
                &store.string(keys::CURRENT_CLOTH, ClothStyle::Default.item_id()),
            ),
        }
    }
}
