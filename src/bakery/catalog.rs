//! Static producer catalog.
//!
//! Every producer is pure data: a base cost, a base yield, and the rational
//! factors both grow by per purchased level. There is no per-producer
//! behaviour, so one `UpgradeDefinition` table covers all of them.

use super::Cookies;

/// A rational factor `num / den` applied with a single floor rounding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ratio {
    pub num: u64,
    pub den: u64,
}

impl Ratio {
    pub const ONE: Ratio = Ratio { num: 1, den: 1 };

    pub const fn new(num: u64, den: u64) -> Self {
        Self { num, den }
    }

    /// `floor(amount * num / den)`, saturating at `Cookies::MAX`.
    pub fn apply(self, amount: Cookies) -> Cookies {
        if self.den == 0 {
            return Cookies::MAX;
        }
        let scaled = amount as u128 * self.num as u128 / self.den as u128;
        Cookies::try_from(scaled).unwrap_or(Cookies::MAX)
    }

    /// True when the factor never shrinks an amount.
    #[cfg(test)]
    pub fn is_growth(self) -> bool {
        self.den > 0 && self.num >= self.den
    }
}

/// Immutable definition of a purchasable producer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpgradeDefinition {
    /// Stable id, also used in the persisted `upgrade_<id>` key.
    pub id: &'static str,
    pub name: &'static str,
    pub base_cost: Cookies,
    pub base_yield: Cookies,
    pub cost_growth: Ratio,
    pub yield_growth: Ratio,
    /// Keyboard shortcut in the shop list.
    pub key: char,
}

/// Conventional clicker price scaling: +15% per owned unit.
const PRICE_GROWTH: Ratio = Ratio::new(115, 100);

static CATALOG: &[UpgradeDefinition] = &[
    UpgradeDefinition {
        id: "clicker",
        name: "Small Auto-Clicker",
        base_cost: 50,
        base_yield: 1,
        cost_growth: PRICE_GROWTH,
        yield_growth: Ratio::ONE,
        key: '1',
    },
    UpgradeDefinition {
        id: "big_clicker",
        name: "Big Auto-Clicker",
        base_cost: 200,
        base_yield: 5,
        cost_growth: PRICE_GROWTH,
        yield_growth: Ratio::ONE,
        key: '2',
    },
    UpgradeDefinition {
        id: "mega_clicker",
        name: "Mega Auto-Clicker",
        base_cost: 1_000,
        base_yield: 20,
        cost_growth: PRICE_GROWTH,
        yield_growth: Ratio::ONE,
        key: '3',
    },
    UpgradeDefinition {
        id: "golden",
        name: "Golden Cookie",
        base_cost: 5_000,
        base_yield: 100,
        cost_growth: PRICE_GROWTH,
        yield_growth: Ratio::ONE,
        key: '4',
    },
    UpgradeDefinition {
        id: "factory",
        name: "Cookie Factory",
        base_cost: 20_000,
        base_yield: 500,
        cost_growth: PRICE_GROWTH,
        yield_growth: Ratio::ONE,
        key: '5',
    },
];

/// All producers in display order.
pub fn catalog() -> &'static [UpgradeDefinition] {
    CATALOG
}

/// Look up a producer definition by id.
pub fn find(id: &str) -> Option<&'static UpgradeDefinition> {
    CATALOG.iter().find(|d| d.id == id)
}
