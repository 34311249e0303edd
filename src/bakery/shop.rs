//! One-time meta-upgrades that boost producers.

use std::collections::BTreeMap;

use super::economy::Economy;
use super::error::{EconomyError, EconomyResult};
use super::Cookies;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShopEffect {
    /// Multiplies one producer's yield.
    Efficiency { target: &'static str, multiplier: u64 },
    /// Multiplies total yield.
    Production { multiplier: u64 },
}

#[derive(Clone, Debug)]
pub struct ShopItem {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub cost: Cookies,
    pub effect: ShopEffect,
}

static SHOP: &[ShopItem] = &[
    ShopItem {
        id: "clicker_x2",
        name: "Reinforced Fingers",
        description: "Small Auto-Clicker x2",
        cost: 500,
        effect: ShopEffect::Efficiency {
            target: "clicker",
            multiplier: 2,
        },
    },
    ShopItem {
        id: "big_clicker_x2",
        name: "Oiled Gears",
        description: "Big Auto-Clicker x2",
        cost: 2_000,
        effect: ShopEffect::Efficiency {
            target: "big_clicker",
            multiplier: 2,
        },
    },
    ShopItem {
        id: "mega_clicker_x2",
        name: "Turbo Switches",
        description: "Mega Auto-Clicker x2",
        cost: 10_000,
        effect: ShopEffect::Efficiency {
            target: "mega_clicker",
            multiplier: 2,
        },
    },
    ShopItem {
        id: "golden_x2",
        name: "Gilded Trays",
        description: "Golden Cookie x2",
        cost: 50_000,
        effect: ShopEffect::Efficiency {
            target: "golden",
            multiplier: 2,
        },
    },
    ShopItem {
        id: "factory_x2",
        name: "Conveyor Belts",
        description: "Cookie Factory x2",
        cost: 200_000,
        effect: ShopEffect::Efficiency {
            target: "factory",
            multiplier: 2,
        },
    },
    ShopItem {
        id: "production_line",
        name: "Production Line",
        description: "All production x2",
        cost: 100_000,
        effect: ShopEffect::Production { multiplier: 2 },
    },
    ShopItem {
        id: "assembly_robots",
        name: "Assembly Robots",
        description: "All production x2",
        cost: 1_000_000,
        effect: ShopEffect::Production { multiplier: 2 },
    },
];

/// All shop items in display order.
pub fn shop_items() -> &'static [ShopItem] {
    SHOP
}

/// Purchased flags, index-aligned with `shop_items()`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shop {
    purchased: Vec<bool>,
}

impl Shop {
    pub fn new() -> Self {
        Self {
            purchased: vec![false; SHOP.len()],
        }
    }

    pub fn from_map(map: &BTreeMap<String, bool>) -> Self {
        let purchased = SHOP
            .iter()
            .map(|i| map.get(i.id).copied().unwrap_or(false))
            .collect();
        Self { purchased }
    }

    pub fn to_map(&self) -> BTreeMap<String, bool> {
        SHOP.iter()
            .zip(&self.purchased)
            .map(|(i, &p)| (i.id.to_string(), p))
            .collect()
    }

    #[cfg(test)]
    pub fn is_purchased(&self, id: &str) -> bool {
        SHOP.iter()
            .position(|i| i.id == id)
            .map(|idx| self.purchased[idx])
            .unwrap_or(false)
    }

    /// Items still for sale, with their index in `shop_items()`.
    pub fn available(&self) -> impl Iterator<Item = (usize, &'static ShopItem)> + '_ {
        SHOP.iter()
            .enumerate()
            .filter(move |(idx, _)| !self.purchased[*idx])
    }

    /// Charge for an item and apply its boost. Nothing changes on failure.
    pub fn buy(&mut self, id: &str, economy: &mut Economy) -> EconomyResult<&'static ShopItem> {
        let idx = SHOP
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| EconomyError::UnknownShopItem { id: id.to_string() })?;
        let item = &SHOP[idx];
        if self.purchased[idx] {
            return Err(EconomyError::AlreadyPurchased { id: id.to_string() });
        }
        if economy.cookies() < item.cost {
            return Err(EconomyError::InsufficientFunds {
                cost: item.cost,
                available: economy.cookies(),
            });
        }

        match &item.effect {
            ShopEffect::Efficiency { target, multiplier } => {
                economy.apply_boost(target, *multiplier)?
            }
            ShopEffect::Production { multiplier } => economy.apply_global_boost(*multiplier)?,
        }
        economy.spend(item.cost)?;
        self.purchased[idx] = true;
        log::info!("shop: bought {} for {}", item.id, item.cost);
        Ok(item)
    }

    pub fn reset(&mut self) {
        self.purchased.iter_mut().for_each(|p| *p = false);
    }
}

impl Default for Shop {
    fn default() -> Self {
        Self::new()
    }
}
