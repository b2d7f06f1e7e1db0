//! Level-up stat upgrades and permanent (between-run) upgrades

use serde::{Deserialize, Serialize};

/// Player stats that level-up choices can raise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    MaxHp,
    HpRegen,
    Speed,
    Damage,
    Armor,
    Luck,
    XpGain,
    PickupRange,
    OrbitalSpeed,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatUpgrade {
    pub stat: StatKind,
    pub amount: f32,
    /// Multiplicative (`× (1 + amount)`) instead of additive
    pub pct: bool,
}

pub fn default_stat_upgrades() -> Vec<StatUpgrade> {
    use StatKind::*;
    [
        (MaxHp, 15.0, false),
        (HpRegen, 0.3, false),
        (Speed, 0.08, true),
        (Damage, 0.10, true),
        (Armor, 3.0, false),
        (Luck, 0.08, true),
        (XpGain, 0.10, true),
        (PickupRange, 0.12, true),
        (OrbitalSpeed, 0.08, true),
    ]
    .into_iter()
    .map(|(stat, amount, pct)| StatUpgrade { stat, amount, pct })
    .collect()
}

/// Permanent upgrades bought with stardust
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermUpgradeKind {
    MaxHp,
    Damage,
    Speed,
    Luck,
    Regen,
    XpGain,
    Pickup,
    OrbitalSpeed,
    StartLevel,
    ExtraSlot,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PermUpgradeDef {
    pub kind: PermUpgradeKind,
    pub max_level: u32,
    pub base_cost: u32,
    pub cost_mult: f32,
    /// Bonus per level
    pub effect: f32,
}

impl PermUpgradeDef {
    /// Stardust price of the next level when `level` are owned
    pub fn cost(&self, level: u32) -> u32 {
        (self.base_cost as f32 * self.cost_mult.powi(level as i32)).floor() as u32
    }
}

pub fn default_perm_upgrades() -> Vec<PermUpgradeDef> {
    use PermUpgradeKind::*;
    [
        (MaxHp, 20, 10, 1.5, 0.05),
        (Damage, 20, 10, 1.5, 0.05),
        (Speed, 15, 12, 1.5, 0.03),
        (Luck, 20, 15, 1.6, 0.05),
        (Regen, 15, 12, 1.5, 0.08),
        (XpGain, 15, 15, 1.6, 0.05),
        (Pickup, 10, 8, 1.4, 0.08),
        (OrbitalSpeed, 10, 12, 1.5, 0.04),
        (StartLevel, 5, 50, 2.0, 1.0),
        (ExtraSlot, 4, 80, 2.5, 1.0),
    ]
    .into_iter()
    .map(|(kind, max_level, base_cost, cost_mult, effect)| PermUpgradeDef {
        kind,
        max_level,
        base_cost,
        cost_mult,
        effect,
    })
    .collect()
}
