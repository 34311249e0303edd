//! Save/load through a key-value store.
//!
//! ## Layout
//!
//! | key                   | value                                   |
//! |-----------------------|-----------------------------------------|
//! | `score`               | integer string                          |
//! | `cookiesPerSecond`    | integer string (informational)          |
//! | `upgrade_<id>`        | JSON `{"level", "cost", "boost"}`       |
//! | `achievements`        | JSON map id → bool                      |
//! | `shop`                | JSON map id → bool                      |
//! | `productionMultiplier`| integer string                          |
//! | `bakeryName`          | plain string                            |
//!
//! Every save rewrites all keys. Derived values (`cookiesPerSecond`, `cost`)
//! are written for inspection only; the session rebuilds them from levels
//! and boosts. Missing JSON fields fall back to defaults and unknown fields
//! are ignored. Anything unparsable discards the whole save.

use std::collections::{BTreeMap, HashMap};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::catalog;
use super::error::SnapshotError;
use super::progress;
use super::shop;
use super::upgrade::MAX_LEVEL;
use super::Cookies;

pub const SCORE_KEY: &str = "score";
pub const CPS_KEY: &str = "cookiesPerSecond";
pub const UPGRADE_KEY_PREFIX: &str = "upgrade_";
pub const ACHIEVEMENTS_KEY: &str = "achievements";
pub const SHOP_KEY: &str = "shop";
pub const PRODUCTION_MULTIPLIER_KEY: &str = "productionMultiplier";
pub const BAKERY_NAME_KEY: &str = "bakeryName";

/// The only seam to durable storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), SnapshotError>;
    fn remove(&mut self, key: &str);
}

/// In-process store for native builds and tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SnapshotError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Browser `localStorage`. Acts as an empty, write-failing store when the
/// page has no storage (private mode, sandboxed iframe).
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage {
    storage: Option<web_sys::Storage>,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    pub fn open() -> Self {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        if storage.is_none() {
            log::warn!("localStorage unavailable; progress will not persist");
        }
        Self { storage }
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SnapshotError> {
        let storage = self.storage.as_ref().ok_or_else(|| SnapshotError::Write {
            key: key.to_string(),
            reason: "no localStorage".into(),
        })?;
        storage.set_item(key, value).map_err(|e| SnapshotError::Write {
            key: key.to_string(),
            reason: format!("{e:?}"),
        })
    }

    fn remove(&mut self, key: &str) {
        if let Some(storage) = &self.storage {
            let _ = storage.remove_item(key);
        }
    }
}

/// Persisted form of one producer.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct UpgradeRecord {
    pub level: u32,
    pub cost: Cookies,
    pub boost: u64,
}

impl Default for UpgradeRecord {
    fn default() -> Self {
        Self {
            level: 0,
            cost: 0,
            boost: 1,
        }
    }
}

/// Everything written to and read from storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersistedSnapshot {
    pub score: Cookies,
    pub cookies_per_second: Cookies,
    /// Keyed by producer id.
    pub upgrades: BTreeMap<String, UpgradeRecord>,
    pub achievements: BTreeMap<String, bool>,
    pub shop: BTreeMap<String, bool>,
    pub production_multiplier: u64,
    pub bakery_name: String,
}

impl Default for PersistedSnapshot {
    /// Fresh game: every producer at level 0 and base cost, nothing unlocked.
    fn default() -> Self {
        Self {
            score: 0,
            cookies_per_second: 0,
            upgrades: catalog::catalog()
                .iter()
                .map(|d| {
                    (
                        d.id.to_string(),
                        UpgradeRecord {
                            cost: d.base_cost,
                            ..UpgradeRecord::default()
                        },
                    )
                })
                .collect(),
            achievements: progress::achievements()
                .iter()
                .map(|a| (a.id.to_string(), false))
                .collect(),
            shop: shop::shop_items()
                .iter()
                .map(|i| (i.id.to_string(), false))
                .collect(),
            production_multiplier: 1,
            bakery_name: String::new(),
        }
    }
}

fn upgrade_key(id: &str) -> String {
    format!("{UPGRADE_KEY_PREFIX}{id}")
}

/// Every key this game may have written.
fn all_keys() -> Vec<String> {
    let mut keys: Vec<String> = [
        SCORE_KEY,
        CPS_KEY,
        ACHIEVEMENTS_KEY,
        SHOP_KEY,
        PRODUCTION_MULTIPLIER_KEY,
        BAKERY_NAME_KEY,
    ]
    .iter()
    .map(|k| k.to_string())
    .collect();
    keys.extend(catalog::catalog().iter().map(|d| upgrade_key(d.id)));
    keys
}

fn parse_number(key: &str, raw: &str) -> Result<u64, SnapshotError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|source| SnapshotError::CorruptNumber {
            key: key.to_string(),
            source,
        })
}

fn parse_json<T: DeserializeOwned>(key: &str, raw: &str) -> Result<T, SnapshotError> {
    serde_json::from_str(raw).map_err(|source| SnapshotError::CorruptSnapshot {
        key: key.to_string(),
        source,
    })
}

/// Overlay persisted flags onto a full default map; unknown ids are dropped.
fn overlay_flags(base: &mut BTreeMap<String, bool>, stored: BTreeMap<String, bool>) {
    for (id, flag) in stored {
        if let Some(slot) = base.get_mut(&id) {
            *slot = flag;
        }
    }
}

/// Owns all reads and writes of the persisted snapshot.
pub struct SaveGateway<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> SaveGateway<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[cfg(test)]
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Read the saved snapshot. Never fails: no data or corrupt data yields
    /// the default snapshot, and corrupt data is removed.
    pub fn load_snapshot(&mut self) -> PersistedSnapshot {
        match self.read_snapshot() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => PersistedSnapshot::default(),
            Err(e) => {
                log::warn!("discarding saved game: {e}");
                self.clear();
                PersistedSnapshot::default()
            }
        }
    }

    fn read_snapshot(&self) -> Result<Option<PersistedSnapshot>, SnapshotError> {
        let Some(raw_score) = self.store.get(SCORE_KEY) else {
            return Ok(None);
        };

        let mut snapshot = PersistedSnapshot {
            score: parse_number(SCORE_KEY, &raw_score)?,
            ..PersistedSnapshot::default()
        };

        if let Some(raw) = self.store.get(CPS_KEY) {
            snapshot.cookies_per_second = parse_number(CPS_KEY, &raw)?;
        }
        if let Some(raw) = self.store.get(PRODUCTION_MULTIPLIER_KEY) {
            snapshot.production_multiplier = parse_number(PRODUCTION_MULTIPLIER_KEY, &raw)?;
        }
        for (id, record) in snapshot.upgrades.iter_mut() {
            let key = upgrade_key(id);
            if let Some(raw) = self.store.get(&key) {
                let parsed: UpgradeRecord = parse_json(&key, &raw)?;
                if parsed.level > MAX_LEVEL {
                    return Err(SnapshotError::LevelOutOfRange {
                        key,
                        level: parsed.level,
                        max: MAX_LEVEL,
                    });
                }
                *record = parsed;
            }
        }
        if let Some(raw) = self.store.get(ACHIEVEMENTS_KEY) {
            overlay_flags(&mut snapshot.achievements, parse_json(ACHIEVEMENTS_KEY, &raw)?);
        }
        if let Some(raw) = self.store.get(SHOP_KEY) {
            overlay_flags(&mut snapshot.shop, parse_json(SHOP_KEY, &raw)?);
        }
        if let Some(name) = self.store.get(BAKERY_NAME_KEY) {
            snapshot.bakery_name = name;
        }

        Ok(Some(snapshot))
    }

    /// Overwrite the stored snapshot. Failures are logged, never raised.
    pub fn save_snapshot(&mut self, snapshot: &PersistedSnapshot) {
        if let Err(e) = self.write_snapshot(snapshot) {
            log::warn!("save failed: {e}");
        }
    }

    fn write_snapshot(&mut self, snapshot: &PersistedSnapshot) -> Result<(), SnapshotError> {
        self.store.set(SCORE_KEY, &snapshot.score.to_string())?;
        self.store
            .set(CPS_KEY, &snapshot.cookies_per_second.to_string())?;
        self.store.set(
            PRODUCTION_MULTIPLIER_KEY,
            &snapshot.production_multiplier.to_string(),
        )?;
        for (id, record) in &snapshot.upgrades {
            self.store
                .set(&upgrade_key(id), &serde_json::to_string(record)?)?;
        }
        self.store.set(
            ACHIEVEMENTS_KEY,
            &serde_json::to_string(&snapshot.achievements)?,
        )?;
        self.store
            .set(SHOP_KEY, &serde_json::to_string(&snapshot.shop)?)?;
        self.store.set(BAKERY_NAME_KEY, &snapshot.bakery_name)?;
        Ok(())
    }

    /// Remove every key this game owns.
    pub fn clear(&mut self) {
        for key in all_keys() {
            self.store.remove(&key);
        }
    }
}
