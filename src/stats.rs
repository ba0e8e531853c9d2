use std::collections::BTreeMap;

use serde::Serialize;

use crate::constants::{
    BASE_ATTACK_SPEED, BASE_CRIT_CHANCE, BASE_CRIT_DAMAGE, BASE_DAMAGE, BASE_PICKUP_RANGE,
    BASE_SPEED, MAX_DAMAGE_REDUCTION, PLAYER_BASE_MAX_HP,
};
use crate::types::{InventoryEntry, ItemId};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub damage: f32,
    pub speed: f32,
    pub attack_speed: f32,
    pub crit_chance: f32,
    pub crit_damage: f32,
    pub damage_reduction: f32,
    pub cooldown_reduction: f32,
    pub luck: f32,
    pub echo_duration_mult: f32,
    pub pickup_range: f32,
}

impl Stats {
    pub fn base() -> Self {
        Self {
            damage: BASE_DAMAGE,
            speed: BASE_SPEED,
            attack_speed: BASE_ATTACK_SPEED,
            crit_chance: BASE_CRIT_CHANCE,
            crit_damage: BASE_CRIT_DAMAGE,
            damage_reduction: 0.0,
            cooldown_reduction: 0.0,
            luck: 0.0,
            echo_duration_mult: 1.0,
            pickup_range: BASE_PICKUP_RANGE,
        }
    }

    pub fn from_inventory(inventory: &Inventory) -> Self {
        let mut stats = Self::base();
        let n = |item: ItemId| inventory.stacks(item) as f32;

        stats.damage += 3.0 * n(ItemId::Whetstone);
        stats.speed += 0.3 * n(ItemId::SwiftBoots);
        stats.attack_speed += 0.1 * n(ItemId::Quickdraw);
        stats.luck += n(ItemId::Clover);
        stats.crit_chance = (stats.crit_chance + 0.05 * n(ItemId::Scope)).min(1.0);
        stats.crit_damage += 0.25 * n(ItemId::Razor);
        stats.damage_reduction = (0.05 * n(ItemId::Plating)).min(MAX_DAMAGE_REDUCTION);
        stats.cooldown_reduction += 0.1 * n(ItemId::Hourglass);
        stats.echo_duration_mult += 0.25 * n(ItemId::Resonator);
        stats.pickup_range += 20.0 * n(ItemId::Magnet);
        stats
    }
}

pub fn max_hp_for(inventory: &Inventory) -> f32 {
    PLAYER_BASE_MAX_HP + 20.0 * inventory.stacks(ItemId::Vitality) as f32
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Inventory {
    stacks: BTreeMap<ItemId, u32>,
}

impl Inventory {
    pub fn stacks(&self, item: ItemId) -> u32 {
        self.stacks.get(&item).copied().unwrap_or(0)
    }

    pub fn has(&self, item: ItemId) -> bool {
        self.stacks(item) > 0
    }

    pub fn add(&mut self, item: ItemId) -> u32 {
        let entry = self.stacks.entry(item).or_insert(0);
        *entry = entry.saturating_add(1);
        *entry
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    pub fn entries(&self) -> Vec<InventoryEntry> {
        self.stacks
            .iter()
            .map(|(item, stacks)| InventoryEntry {
                item: *item,
                stacks: *stacks,
            })
            .collect()
    }
}
