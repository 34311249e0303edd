//! Game session: owns the economy, achievements, shop and save gateway,
//! and turns UI intents into mutations.
//!
//! Every mutating intent runs to completion: mutate, evaluate achievements,
//! persist, then queue notifications for the presentation layer.

use super::catalog;
use super::economy::{Economy, PurchaseReceipt};
use super::error::{EconomyError, EconomyResult};
use super::progress::{self, ProgressTracker};
use super::save::{KeyValueStore, PersistedSnapshot, SaveGateway, UpgradeRecord};
use super::shop::{Shop, ShopItem};
use super::upgrade::UpgradeInstance;
use super::Cookies;

/// Maximum number of log lines kept for display.
const LOG_CAPACITY: usize = 50;

/// Longest accepted bakery name, in characters.
pub const MAX_NAME_LEN: usize = 24;

/// State changes reported to the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    ScoreChanged(Cookies),
    YieldChanged(Cookies),
    UpgradePurchased {
        id: &'static str,
        level: u32,
        cost: Cookies,
    },
    /// A purchase was refused; the UI decides how to tell the player.
    PurchaseRejected(EconomyError),
    AchievementUnlocked(&'static str),
    GameReset,
}

#[derive(Clone, Debug)]
pub struct LogEntry {
    pub text: String,
    pub is_important: bool,
}

pub struct GameSession<S: KeyValueStore> {
    economy: Economy,
    progress: ProgressTracker,
    shop: Shop,
    bakery_name: String,
    gateway: SaveGateway<S>,
    outbox: Vec<Notification>,
    log: Vec<LogEntry>,
}

impl<S: KeyValueStore> GameSession<S> {
    /// Load the saved game (or a fresh one) from `store`.
    pub fn start(store: S) -> Self {
        let mut gateway = SaveGateway::new(store);
        let snapshot = gateway.load_snapshot();
        let mut session = Self {
            economy: restore_economy(&snapshot),
            progress: ProgressTracker::from_map(&snapshot.achievements),
            shop: Shop::from_map(&snapshot.shop),
            bakery_name: snapshot.bakery_name,
            gateway,
            outbox: Vec::new(),
            log: Vec::new(),
        };
        if snapshot.score > 0 || session.economy.upgrades().iter().any(|u| u.level > 0) {
            session.add_log("Welcome back! Your bakery was restored.", true);
            log::info!(
                "session: restored {} cookies, {}/tick",
                session.economy.cookies(),
                session.economy.total_yield_per_tick()
            );
        } else {
            session.add_log("Welcome to your bakery!", true);
        }
        session
    }

    pub fn economy(&self) -> &Economy {
        &self.economy
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    pub fn shop(&self) -> &Shop {
        &self.shop
    }

    pub fn bakery_name(&self) -> &str {
        &self.bakery_name
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    #[cfg(test)]
    pub fn gateway(&self) -> &SaveGateway<S> {
        &self.gateway
    }

    /// Take all queued notifications.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.outbox)
    }

    pub fn on_cookie_click(&mut self) {
        let yield_before = self.economy.total_yield_per_tick();
        self.economy.record_click();
        self.commit(yield_before);
    }

    /// One fixed interval of passive income.
    pub fn tick(&mut self) {
        let yield_before = self.economy.total_yield_per_tick();
        self.economy.tick();
        self.commit(yield_before);
    }

    /// Run `tick()` once per elapsed interval.
    pub fn advance(&mut self, delta_ticks: u32) {
        for _ in 0..delta_ticks {
            self.tick();
        }
    }

    pub fn on_purchase(&mut self, id: &str) -> EconomyResult<PurchaseReceipt> {
        let yield_before = self.economy.total_yield_per_tick();
        match self.economy.purchase(id) {
            Ok(receipt) => {
                let name = catalog::find(receipt.id).map_or(receipt.id, |d| d.name);
                self.add_log(
                    &format!("Bought {} (level {})", name, receipt.new_level),
                    false,
                );
                self.outbox.push(Notification::UpgradePurchased {
                    id: receipt.id,
                    level: receipt.new_level,
                    cost: receipt.new_cost,
                });
                self.commit(yield_before);
                Ok(receipt)
            }
            Err(e) => Err(self.reject(e)),
        }
    }

    pub fn on_shop_purchase(&mut self, id: &str) -> EconomyResult<&'static ShopItem> {
        let yield_before = self.economy.total_yield_per_tick();
        match self.shop.buy(id, &mut self.economy) {
            Ok(item) => {
                self.add_log(&format!("Shop: {} ({})", item.name, item.description), true);
                self.commit(yield_before);
                Ok(item)
            }
            Err(e) => Err(self.reject(e)),
        }
    }

    /// Wipe all progress. Confirmation is the caller's job.
    pub fn on_reset_confirmed(&mut self) {
        self.economy.reset_all();
        self.progress.reset();
        self.shop.reset();
        self.bakery_name.clear();
        self.gateway.clear();
        self.persist();
        self.log.clear();
        self.add_log("Progress reset. Fresh dough!", true);
        log::info!("session: reset");
        self.outbox.push(Notification::GameReset);
        self.outbox.push(Notification::ScoreChanged(0));
        self.outbox.push(Notification::YieldChanged(0));
    }

    pub fn on_save_requested(&mut self) {
        self.persist();
        self.add_log("Game saved.", false);
    }

    /// Cosmetic; trimmed and capped at `MAX_NAME_LEN` characters.
    pub fn set_bakery_name(&mut self, name: &str) {
        let name: String = name.trim().chars().take(MAX_NAME_LEN).collect();
        if name == self.bakery_name {
            return;
        }
        self.bakery_name = name;
        self.persist();
    }

    /// Current state in persisted form.
    pub fn snapshot(&self) -> PersistedSnapshot {
        PersistedSnapshot {
            score: self.economy.cookies(),
            cookies_per_second: self.economy.total_yield_per_tick(),
            upgrades: self
                .economy
                .upgrades()
                .iter()
                .map(|u| {
                    (
                        u.id().to_string(),
                        UpgradeRecord {
                            level: u.level,
                            cost: u.current_cost,
                            boost: u.boost,
                        },
                    )
                })
                .collect(),
            achievements: self.progress.to_map(),
            shop: self.shop.to_map(),
            production_multiplier: self.economy.global_multiplier(),
            bakery_name: self.bakery_name.clone(),
        }
    }

    fn reject(&mut self, e: EconomyError) -> EconomyError {
        log::debug!("session: rejected: {e}");
        self.outbox.push(Notification::PurchaseRejected(e.clone()));
        e
    }

    /// Post-mutation bookkeeping shared by every intent.
    fn commit(&mut self, yield_before: Cookies) {
        let state = self.economy.state();
        for id in self.progress.evaluate(&state, self.economy.upgrades()) {
            let name = progress::find(id).map_or(id, |a| a.name);
            self.add_log(&format!("Achievement unlocked: {name}"), true);
            log::info!("achievement: {id}");
            self.outbox.push(Notification::AchievementUnlocked(id));
        }
        self.persist();
        self.outbox.push(Notification::ScoreChanged(state.total_currency));
        if state.total_yield_per_tick != yield_before {
            self.outbox
                .push(Notification::YieldChanged(state.total_yield_per_tick));
        }
    }

    fn persist(&mut self) {
        let snapshot = self.snapshot();
        self.gateway.save_snapshot(&snapshot);
    }

    fn add_log(&mut self, text: &str, is_important: bool) {
        self.log.push(LogEntry {
            text: text.to_string(),
            is_important,
        });
        if self.log.len() > LOG_CAPACITY {
            self.log.remove(0);
        }
    }
}

/// Rebuild producers by replaying saved levels; stored costs are ignored.
fn restore_economy(snapshot: &PersistedSnapshot) -> Economy {
    let upgrades = catalog::catalog()
        .iter()
        .map(|def| {
            let record = snapshot.upgrades.get(def.id).copied().unwrap_or_default();
            let mut inst = UpgradeInstance::at_level(def, record.level);
            inst.apply_boost(record.boost.max(1));
            if record.level > 0 && record.cost != inst.current_cost {
                log::debug!(
                    "restore: {} stored cost {} differs from {}; using recomputed",
                    def.id,
                    record.cost,
                    inst.current_cost
                );
            }
            inst
        })
        .collect();
    Economy::from_parts(
        snapshot.score,
        upgrades,
        snapshot.production_multiplier,
    )
}
