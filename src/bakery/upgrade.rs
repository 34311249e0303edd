//! Runtime state of one catalog producer.

use super::catalog::UpgradeDefinition;
use super::Cookies;

/// Highest level a producer can hold. Every catalog price saturates at
/// `Cookies::MAX` well below this, so only tampered saves exceed it.
pub const MAX_LEVEL: u32 = 400;

/// Mutable state for a single producer.
///
/// Cost and marginal yield are advanced incrementally, one floor-rounded
/// multiplication per level, so restoring a level replays the same steps a
/// player's purchases did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpgradeInstance {
    pub def: &'static UpgradeDefinition,
    pub level: u32,
    /// Price of the next level.
    pub current_cost: Cookies,
    /// Yield the next purchased level will add.
    pub next_unit_yield: Cookies,
    /// Sum of the unit yields of all owned levels, before boosts.
    pub owned_yield: Cookies,
    /// Product of every efficiency boost applied to this producer.
    pub boost: u64,
}

impl UpgradeInstance {
    pub fn new(def: &'static UpgradeDefinition) -> Self {
        Self {
            def,
            level: 0,
            current_cost: def.base_cost,
            next_unit_yield: def.base_yield,
            owned_yield: 0,
            boost: 1,
        }
    }

    /// Rebuild an instance at `level` by replaying each level-up.
    pub fn at_level(def: &'static UpgradeDefinition, level: u32) -> Self {
        let mut inst = Self::new(def);
        for _ in 0..level {
            inst.level_up();
        }
        inst
    }

    pub fn id(&self) -> &'static str {
        self.def.id
    }

    /// No further level can be bought: the price is pinned at
    /// `Cookies::MAX` or the level cap is reached.
    pub fn is_maxed(&self) -> bool {
        self.level >= MAX_LEVEL || self.current_cost == Cookies::MAX
    }

    /// Per-tick yield of this producer including boosts.
    pub fn current_yield(&self) -> Cookies {
        self.owned_yield.saturating_mul(self.boost)
    }

    /// Yield gained by buying the next level, including boosts.
    pub fn next_level_gain(&self) -> Cookies {
        self.next_unit_yield.saturating_mul(self.boost)
    }

    /// Ticks until the next level pays for itself. None while it adds nothing.
    pub fn payback_ticks(&self) -> Option<Cookies> {
        let gain = self.next_level_gain();
        if gain > 0 {
            Some(self.current_cost.div_ceil(gain))
        } else {
            None
        }
    }

    /// Advance one level. Does not touch currency; the engine charges first.
    pub(crate) fn level_up(&mut self) {
        self.owned_yield = self.owned_yield.saturating_add(self.next_unit_yield);
        self.level = self.level.saturating_add(1);
        self.current_cost = self.def.cost_growth.apply(self.current_cost);
        self.next_unit_yield = self.def.yield_growth.apply(self.next_unit_yield);
    }

    pub(crate) fn apply_boost(&mut self, multiplier: u64) {
        self.boost = self.boost.saturating_mul(multiplier);
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::new(self.def);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bakery::catalog::{self, Ratio};

    fn clicker() -> &'static UpgradeDefinition {
        catalog::find("clicker").unwrap()
    }

    #[test]
    fn new_instance_yields_nothing() {
        let inst = UpgradeInstance::new(clicker());
        assert_eq!(inst.level, 0);
        assert_eq!(inst.current_cost, 50);
        assert_eq!(inst.current_yield(), 0);
    }

    #[test]
    fn level_up_floors_cost_each_step() {
        let mut inst = UpgradeInstance::new(clicker());
        inst.level_up();
        assert_eq!(inst.current_cost, 57); // floor(50 * 1.15)
        inst.level_up();
        assert_eq!(inst.current_cost, 65); // floor(57 * 1.15)
        assert_eq!(inst.level, 2);
    }

    #[test]
    fn flat_yield_growth_adds_base_yield_per_level() {
        let mut inst = UpgradeInstance::new(catalog::find("big_clicker").unwrap());
        for _ in 0..3 {
            inst.level_up();
        }
        assert_eq!(inst.current_yield(), 15);
    }

    #[test]
    fn growing_yield_compounds_marginal_unit() {
        static DEF: UpgradeDefinition = UpgradeDefinition {
            id: "test",
            name: "Test",
            base_cost: 10,
            base_yield: 10,
            cost_growth: Ratio::new(2, 1),
            yield_growth: Ratio::new(3, 2),
            key: 't',
        };
        let inst = UpgradeInstance::at_level(&DEF, 3);
        // 10 + 15 + 22
        assert_eq!(inst.owned_yield, 47);
        assert_eq!(inst.next_unit_yield, 33);
        assert_eq!(inst.current_cost, 80);
    }

    #[test]
    fn at_level_matches_repeated_level_up() {
        let mut bought = UpgradeInstance::new(clicker());
        for _ in 0..25 {
            bought.level_up();
        }
        assert_eq!(UpgradeInstance::at_level(clicker(), 25), bought);
    }

    #[test]
    fn boost_multiplies_yield() {
        let mut inst = UpgradeInstance::at_level(clicker(), 4);
        inst.apply_boost(2);
        assert_eq!(inst.current_yield(), 8);
        inst.apply_boost(2);
        assert_eq!(inst.current_yield(), 16);
        assert_eq!(inst.next_level_gain(), 4);
    }

    #[test]
    fn reset_restores_base_values() {
        let mut inst = UpgradeInstance::at_level(clicker(), 7);
        inst.apply_boost(3);
        inst.reset();
        assert_eq!(inst, UpgradeInstance::new(clicker()));
    }

    #[test]
    fn every_price_saturates_before_the_cap() {
        for def in catalog::catalog() {
            let inst = UpgradeInstance::at_level(def, MAX_LEVEL);
            assert_eq!(inst.current_cost, Cookies::MAX, "{}", def.id);
            assert!(inst.is_maxed());
        }
        assert!(!UpgradeInstance::at_level(clicker(), 100).is_maxed());
    }

    #[test]
    fn payback_ticks_rounds_up() {
        let inst = UpgradeInstance::new(catalog::find("big_clicker").unwrap());
        assert_eq!(inst.payback_ticks(), Some(40)); // 200 / 5
        let inst = UpgradeInstance::at_level(clicker(), 1);
        assert_eq!(inst.payback_ticks(), Some(57));
    }
}
