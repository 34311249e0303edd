//! Achievement tracking.
//!
//! Predicates are plain threshold checks over the economy. They are checked
//! in table order, so several unlocks crossing in one step are always
//! reported in the same order.

use std::collections::BTreeMap;

use super::economy::EconomyState;
use super::upgrade::UpgradeInstance;
use super::Cookies;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AchievementCondition {
    CookiesAtLeast(Cookies),
    AnyProducerOwned,
    ProducerLevelAtLeast { id: &'static str, level: u32 },
    YieldAtLeast(Cookies),
}

impl AchievementCondition {
    pub fn is_met(&self, state: &EconomyState, upgrades: &[UpgradeInstance]) -> bool {
        match self {
            AchievementCondition::CookiesAtLeast(n) => state.total_currency >= *n,
            AchievementCondition::AnyProducerOwned => upgrades.iter().any(|u| u.level > 0),
            AchievementCondition::ProducerLevelAtLeast { id, level } => upgrades
                .iter()
                .any(|u| u.id() == *id && u.level >= *level),
            AchievementCondition::YieldAtLeast(n) => state.total_yield_per_tick >= *n,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AchievementDef {
    pub id: &'static str,
    pub name: &'static str,
    pub condition: AchievementCondition,
}

static ACHIEVEMENTS: &[AchievementDef] = &[
    AchievementDef {
        id: "first_cookie",
        name: "First Bite",
        condition: AchievementCondition::CookiesAtLeast(1),
    },
    AchievementDef {
        id: "100",
        name: "Snack Stash",
        condition: AchievementCondition::CookiesAtLeast(100),
    },
    AchievementDef {
        id: "1k",
        name: "Cookie Jar",
        condition: AchievementCondition::CookiesAtLeast(1_000),
    },
    AchievementDef {
        id: "10k",
        name: "Bakery Shelf",
        condition: AchievementCondition::CookiesAtLeast(10_000),
    },
    AchievementDef {
        id: "100k",
        name: "Cookie Vault",
        condition: AchievementCondition::CookiesAtLeast(100_000),
    },
    AchievementDef {
        id: "1m",
        name: "Cookie Tycoon",
        condition: AchievementCondition::CookiesAtLeast(1_000_000),
    },
    AchievementDef {
        id: "first_upgrade",
        name: "Automation",
        condition: AchievementCondition::AnyProducerOwned,
    },
    AchievementDef {
        id: "factory_owner",
        name: "Industrialist",
        condition: AchievementCondition::ProducerLevelAtLeast {
            id: "factory",
            level: 1,
        },
    },
    AchievementDef {
        id: "cps_100",
        name: "Hundred a Second",
        condition: AchievementCondition::YieldAtLeast(100),
    },
];

/// All achievements in evaluation order.
pub fn achievements() -> &'static [AchievementDef] {
    ACHIEVEMENTS
}

pub fn find(id: &str) -> Option<&'static AchievementDef> {
    ACHIEVEMENTS.iter().find(|a| a.id == id)
}

/// Unlock flags, index-aligned with `achievements()`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressTracker {
    unlocked: Vec<bool>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            unlocked: vec![false; ACHIEVEMENTS.len()],
        }
    }

    /// Restore from a persisted id→flag map. Unknown ids are ignored.
    pub fn from_map(map: &BTreeMap<String, bool>) -> Self {
        let unlocked = ACHIEVEMENTS
            .iter()
            .map(|a| map.get(a.id).copied().unwrap_or(false))
            .collect();
        Self { unlocked }
    }

    pub fn to_map(&self) -> BTreeMap<String, bool> {
        ACHIEVEMENTS
            .iter()
            .zip(&self.unlocked)
            .map(|(a, &u)| (a.id.to_string(), u))
            .collect()
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        ACHIEVEMENTS
            .iter()
            .position(|a| a.id == id)
            .map(|i| self.unlocked[i])
            .unwrap_or(false)
    }

    pub fn unlocked_count(&self) -> usize {
        self.unlocked.iter().filter(|&&u| u).count()
    }

    /// Ids that would unlock for this state, without recording them.
    pub fn newly_unlocked(
        &self,
        state: &EconomyState,
        upgrades: &[UpgradeInstance],
    ) -> Vec<&'static str> {
        ACHIEVEMENTS
            .iter()
            .zip(&self.unlocked)
            .filter(|&(a, &done)| !done && a.condition.is_met(state, upgrades))
            .map(|(a, _)| a.id)
            .collect()
    }

    /// Record and return new unlocks. Flags never revert here.
    pub fn evaluate(
        &mut self,
        state: &EconomyState,
        upgrades: &[UpgradeInstance],
    ) -> Vec<&'static str> {
        let fresh = self.newly_unlocked(state, upgrades);
        for (flag, a) in self.unlocked.iter_mut().zip(ACHIEVEMENTS) {
            if fresh.contains(&a.id) {
                *flag = true;
            }
        }
        fresh
    }

    pub fn reset(&mut self) {
        self.unlocked.iter_mut().for_each(|u| *u = false);
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bakery::economy::Economy;

    fn state(cookies: Cookies, yield_per_tick: Cookies) -> EconomyState {
        EconomyState {
            total_currency: cookies,
            total_yield_per_tick: yield_per_tick,
        }
    }

    #[test]
    fn one_k_unlocks_exactly_at_threshold() {
        let eco = Economy::new();
        let mut tracker = ProgressTracker::new();
        tracker.evaluate(&state(999, 0), eco.upgrades());
        assert!(!tracker.is_unlocked("1k"));
        let fresh = tracker.evaluate(&state(1_000, 0), eco.upgrades());
        assert_eq!(fresh, vec!["1k"]);
        assert!(tracker.is_unlocked("1k"));
    }

    #[test]
    fn unlock_survives_spending() {
        let eco = Economy::new();
        let mut tracker = ProgressTracker::new();
        tracker.evaluate(&state(1_500, 0), eco.upgrades());
        let fresh = tracker.evaluate(&state(20, 0), eco.upgrades());
        assert!(fresh.is_empty());
        assert!(tracker.is_unlocked("1k"));
    }

    #[test]
    fn multiple_unlocks_follow_table_order() {
        let eco = Economy::new();
        let mut tracker = ProgressTracker::new();
        let fresh = tracker.evaluate(&state(10_000, 0), eco.upgrades());
        assert_eq!(fresh, vec!["first_cookie", "100", "1k", "10k"]);
    }

    #[test]
    fn each_unlock_reported_once() {
        let eco = Economy::new();
        let mut tracker = ProgressTracker::new();
        assert_eq!(tracker.evaluate(&state(5, 0), eco.upgrades()).len(), 1);
        assert!(tracker.evaluate(&state(5, 0), eco.upgrades()).is_empty());
    }

    #[test]
    fn producer_achievements() {
        let mut eco = Economy::from_parts(25_000, Economy::new().upgrades().to_vec(), 1);
        eco.purchase("factory").unwrap();
        let mut tracker = ProgressTracker::new();
        let fresh = tracker.evaluate(&eco.state(), eco.upgrades());
        assert!(fresh.contains(&"first_upgrade"));
        assert!(fresh.contains(&"factory_owner"));
        assert!(fresh.contains(&"cps_100"));
    }

    #[test]
    fn newly_unlocked_is_pure() {
        let eco = Economy::new();
        let tracker = ProgressTracker::new();
        let a = tracker.newly_unlocked(&state(100, 0), eco.upgrades());
        let b = tracker.newly_unlocked(&state(100, 0), eco.upgrades());
        assert_eq!(a, b);
        assert_eq!(tracker.unlocked_count(), 0);
    }

    #[test]
    fn map_roundtrip_ignores_unknown_ids() {
        let mut map = BTreeMap::new();
        map.insert("1k".to_string(), true);
        map.insert("retired".to_string(), true);
        let tracker = ProgressTracker::from_map(&map);
        assert!(tracker.is_unlocked("1k"));
        assert_eq!(tracker.unlocked_count(), 1);
        let out = tracker.to_map();
        assert_eq!(out.len(), achievements().len());
        assert!(!out.contains_key("retired"));
    }

    #[test]
    fn reset_clears_flags() {
        let eco = Economy::new();
        let mut tracker = ProgressTracker::new();
        tracker.evaluate(&state(1_000_000, 0), eco.upgrades());
        tracker.reset();
        assert_eq!(tracker, ProgressTracker::new());
    }

    #[test]
    fn ids_unique_and_findable() {
        for a in achievements() {
            assert_eq!(find(a.id).map(|f| f.name), Some(a.name));
        }
    }
}
