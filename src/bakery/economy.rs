//! Economy engine: currency, producers, and passive yield.
//!
//! The engine is pure state plus arithmetic. It never touches storage and
//! never talks to the UI; the session persists and notifies after each
//! mutation.

use super::catalog;
use super::error::{EconomyError, EconomyResult};
use super::upgrade::UpgradeInstance;
use super::Cookies;

/// Cookies granted per manual click.
pub const CLICK_VALUE: Cookies = 1;

/// Read-only view of the aggregate economy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EconomyState {
    pub total_currency: Cookies,
    pub total_yield_per_tick: Cookies,
}

/// Result of a successful producer purchase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PurchaseReceipt {
    pub id: &'static str,
    pub spent: Cookies,
    pub new_level: u32,
    pub new_cost: Cookies,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Economy {
    cookies: Cookies,
    upgrades: Vec<UpgradeInstance>,
    /// Compounded production boost applied on top of the summed yields.
    global_multiplier: u64,
}

impl Economy {
    /// Fresh economy with one level-0 instance per catalog entry.
    pub fn new() -> Self {
        Self {
            cookies: 0,
            upgrades: catalog::catalog().iter().map(UpgradeInstance::new).collect(),
            global_multiplier: 1,
        }
    }

    /// Rebuild from restored parts. A zero multiplier is treated as 1.
    pub fn from_parts(
        cookies: Cookies,
        upgrades: Vec<UpgradeInstance>,
        global_multiplier: u64,
    ) -> Self {
        Self {
            cookies,
            upgrades,
            global_multiplier: global_multiplier.max(1),
        }
    }

    pub fn cookies(&self) -> Cookies {
        self.cookies
    }

    pub fn upgrades(&self) -> &[UpgradeInstance] {
        &self.upgrades
    }

    #[cfg(test)]
    pub fn upgrade(&self, id: &str) -> Option<&UpgradeInstance> {
        self.upgrades.iter().find(|u| u.id() == id)
    }

    pub fn global_multiplier(&self) -> u64 {
        self.global_multiplier
    }

    /// Sum of every producer's yield times the global multiplier.
    /// Always derived, never cached.
    pub fn total_yield_per_tick(&self) -> Cookies {
        self.upgrades
            .iter()
            .fold(0, |acc: Cookies, u| acc.saturating_add(u.current_yield()))
            .saturating_mul(self.global_multiplier)
    }

    pub fn state(&self) -> EconomyState {
        EconomyState {
            total_currency: self.cookies,
            total_yield_per_tick: self.total_yield_per_tick(),
        }
    }

    /// Manual click: exactly `CLICK_VALUE` cookies.
    pub fn record_click(&mut self) {
        self.cookies = self.cookies.saturating_add(CLICK_VALUE);
    }

    /// One fixed interval of passive income. Returns the amount produced.
    /// Callers must invoke this once per elapsed interval.
    pub fn tick(&mut self) -> Cookies {
        let produced = self.total_yield_per_tick();
        self.cookies = self.cookies.saturating_add(produced);
        produced
    }

    /// Buy the next level of a producer.
    pub fn purchase(&mut self, id: &str) -> EconomyResult<PurchaseReceipt> {
        let idx = self.index_of(id)?;
        if self.upgrades[idx].is_maxed() {
            return Err(EconomyError::MaxLevel { id: id.to_string() });
        }
        let cost = self.upgrades[idx].current_cost;
        self.spend(cost)?;

        let inst = &mut self.upgrades[idx];
        inst.level_up();
        log::debug!(
            "purchase: {} -> level {} (spent {}, next cost {})",
            inst.id(),
            inst.level,
            cost,
            inst.current_cost
        );
        Ok(PurchaseReceipt {
            id: inst.id(),
            spent: cost,
            new_level: inst.level,
            new_cost: inst.current_cost,
        })
    }

    /// Efficiency boost: multiply one producer's yield.
    pub fn apply_boost(&mut self, target_id: &str, multiplier: u64) -> EconomyResult<()> {
        if multiplier == 0 {
            return Err(EconomyError::InvalidMultiplier);
        }
        let idx = self.index_of(target_id).inspect_err(|e| {
            log::warn!("boost rejected: {e}");
        })?;
        self.upgrades[idx].apply_boost(multiplier);
        Ok(())
    }

    /// Production boost: compounds into the global multiplier.
    pub fn apply_global_boost(&mut self, multiplier: u64) -> EconomyResult<()> {
        if multiplier == 0 {
            return Err(EconomyError::InvalidMultiplier);
        }
        self.global_multiplier = self.global_multiplier.saturating_mul(multiplier);
        Ok(())
    }

    /// Deduct `amount` or fail without touching the balance.
    pub fn spend(&mut self, amount: Cookies) -> EconomyResult<()> {
        if self.cookies < amount {
            return Err(EconomyError::InsufficientFunds {
                cost: amount,
                available: self.cookies,
            });
        }
        self.cookies -= amount;
        Ok(())
    }

    /// Zero currency, level-0 producers, no boosts.
    pub fn reset_all(&mut self) {
        self.cookies = 0;
        for u in &mut self.upgrades {
            u.reset();
        }
        self.global_multiplier = 1;
    }

    fn index_of(&self, id: &str) -> EconomyResult<usize> {
        self.upgrades
            .iter()
            .position(|u| u.id() == id)
            .ok_or_else(|| EconomyError::UnknownTarget { id: id.to_string() })
    }
}

impl Default for Economy {
    fn default() -> Self {
        Self::new()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Clone, Debug)]
    enum Op {
        Click,
        Tick,
        Buy(usize),
        Boost(usize, u64),
        Global(u64),
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        let n = catalog::catalog().len();
        prop_oneof![
            4 => Just(Op::Click),
            2 => Just(Op::Tick),
            3 => (0..n).prop_map(Op::Buy),
            1 => (0..n, 1u64..4).prop_map(|(i, m)| Op::Boost(i, m)),
            1 => (1u64..4).prop_map(Op::Global),
        ]
    }

    fn apply(eco: &mut Economy, op: &Op) {
        let ids: Vec<&str> = catalog::catalog().iter().map(|d| d.id).collect();
        match op {
            Op::Click => eco.record_click(),
            Op::Tick => {
                eco.tick();
            }
            Op::Buy(i) => {
                let _ = eco.purchase(ids[*i]);
            }
            Op::Boost(i, m) => eco.apply_boost(ids[*i], *m).unwrap(),
            Op::Global(m) => eco.apply_global_boost(*m).unwrap(),
        }
    }

    proptest! {
        #[test]
        fn prop_n_clicks_add_n(n in 0u64..500, start in 0u64..1_000_000) {
            let mut eco = Economy::from_parts(start, Economy::new().upgrades().to_vec(), 1);
            for _ in 0..n {
                eco.record_click();
            }
            prop_assert_eq!(eco.cookies(), start + n);
        }

        #[test]
        fn prop_yield_is_sum_times_multiplier(ops in prop::collection::vec(arb_op(), 0..200)) {
            let mut eco = Economy::from_parts(100_000, Economy::new().upgrades().to_vec(), 1);
            for op in &ops {
                apply(&mut eco, op);
                let sum = eco
                    .upgrades()
                    .iter()
                    .fold(0u64, |acc, u| acc.saturating_add(u.current_yield()));
                prop_assert_eq!(
                    eco.total_yield_per_tick(),
                    sum.saturating_mul(eco.global_multiplier())
                );
            }
        }

        #[test]
        fn prop_successful_purchase_raises_cost_and_level(
            idx in 0usize..5,
            cookies in 0u64..100_000,
        ) {
            let id = catalog::catalog()[idx].id;
            let mut eco = Economy::from_parts(cookies, Economy::new().upgrades().to_vec(), 1);
            let before = eco.upgrade(id).unwrap().clone();
            match eco.purchase(id) {
                Ok(_) => {
                    let after = eco.upgrade(id).unwrap();
                    prop_assert_eq!(after.level, before.level + 1);
                    prop_assert!(after.current_cost > before.current_cost);
                    prop_assert_eq!(eco.cookies(), cookies - before.current_cost);
                }
                Err(e) => {
                    prop_assert!(cookies < before.current_cost);
                    let is_funds = matches!(e, EconomyError::InsufficientFunds { .. });
                    prop_assert!(is_funds);
                    prop_assert_eq!(eco.cookies(), cookies);
                    prop_assert_eq!(eco.upgrade(id).unwrap(), &before);
                }
            }
        }

        #[test]
        fn prop_cost_strictly_increases_over_many_levels(idx in 0usize..5, levels in 1u32..120) {
            let def = &catalog::catalog()[idx];
            let mut inst = UpgradeInstance::new(def);
            for _ in 0..levels {
                let before = inst.current_cost;
                inst.level_up();
                prop_assert!(inst.current_cost > before);
            }
        }
    }
}
