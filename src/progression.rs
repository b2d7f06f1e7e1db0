//! Persistent progression across runs
//!
//! The simulation never touches storage. Callers load a `ProgressRecord`,
//! derive `PermBonuses` for the next run, and fold the `RunSummary` back in.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::{GameData, OrbitalKind, PermUpgradeKind, Rarity};
use crate::error::{ConfigError, PurchaseError};
use crate::sim::player::PermBonuses;
use crate::sim::state::RunSummary;

/// Stash entry kept between runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StashedPetal {
    #[serde(alias = "type")]
    pub kind: OrbitalKind,
    pub rarity: Rarity,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressRecord {
    pub stardust: u32,
    pub total_stardust: u64,
    pub total_kills: u64,
    pub total_runs: u32,
    pub total_play_time: f32,
    pub best_wave: u32,
    pub best_level: u32,
    pub best_kills: u32,
    /// Owned level per permanent upgrade; missing means 0
    pub upgrades: BTreeMap<PermUpgradeKind, u32>,
    /// At most one entry per (kind, rarity)
    pub stash: Vec<StashedPetal>,
}

impl ProgressRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a saved record; duplicate stash entries are dropped
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut record: ProgressRecord = serde_json::from_str(json)?;
        record.dedup_stash();
        Ok(record)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a record from disk, starting fresh when the file is missing
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let record = Self::from_json(&contents)?;
                log::info!(
                    "Loaded progress: {} runs, {} stardust",
                    record.total_runs,
                    record.stardust
                );
                Ok(record)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No progress at {}, starting fresh", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(ConfigError::io(path, e)),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_json()?).map_err(|e| ConfigError::io(path, e))?;
        log::info!("Progress saved to {}", path.display());
        Ok(())
    }

    fn dedup_stash(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.stash.retain(|p| seen.insert(*p));
    }

    pub fn upgrade_level(&self, kind: PermUpgradeKind) -> u32 {
        self.upgrades.get(&kind).copied().unwrap_or(0)
    }

    /// Buy one level of a permanent upgrade. Returns the new level.
    pub fn buy_upgrade(
        &mut self,
        kind: PermUpgradeKind,
        data: &GameData,
    ) -> Result<u32, PurchaseError> {
        let def = data
            .perm_upgrade(kind)
            .ok_or(PurchaseError::UnknownUpgrade(kind))?;
        let level = self.upgrade_level(kind);
        if level >= def.max_level {
            return Err(PurchaseError::MaxLevel(kind));
        }
        let cost = def.cost(level);
        if self.stardust < cost {
            return Err(PurchaseError::NotEnoughStardust {
                cost,
                have: self.stardust,
            });
        }
        self.stardust -= cost;
        self.upgrades.insert(kind, level + 1);
        Ok(level + 1)
    }

    /// Bonuses the next run starts with
    pub fn bonuses(&self, data: &GameData) -> PermBonuses {
        let mut bonuses = PermBonuses::default();
        for def in &data.perm_upgrades {
            let level = self.upgrade_level(def.kind).min(def.max_level);
            let total = level as f32 * def.effect;
            match def.kind {
                PermUpgradeKind::MaxHp => bonuses.max_hp += total,
                PermUpgradeKind::Damage => bonuses.damage += total,
                PermUpgradeKind::Speed => bonuses.speed += total,
                PermUpgradeKind::Luck => bonuses.luck += total,
                PermUpgradeKind::Regen => bonuses.regen += total,
                PermUpgradeKind::XpGain => bonuses.xp_gain += total,
                PermUpgradeKind::Pickup => bonuses.pickup += total,
                PermUpgradeKind::OrbitalSpeed => bonuses.orbital_speed += total,
                PermUpgradeKind::StartLevel => bonuses.start_level += total.round() as u32,
                PermUpgradeKind::ExtraSlot => bonuses.extra_slots += total.round() as u32,
            }
        }
        bonuses
    }

    pub fn has_petal(&self, kind: OrbitalKind, rarity: Rarity) -> bool {
        self.stash.contains(&StashedPetal { kind, rarity })
    }

    /// Keep a petal for future runs. Returns false when it is already owned.
    pub fn keep_petal(&mut self, kind: OrbitalKind, rarity: Rarity) -> bool {
        if self.has_petal(kind, rarity) {
            return false;
        }
        self.stash.push(StashedPetal { kind, rarity });
        true
    }

    /// Fold a finished run into the cumulative counters
    pub fn record_run(&mut self, summary: &RunSummary) {
        self.total_runs += 1;
        self.total_kills += u64::from(summary.kills);
        self.total_play_time += summary.time;
        self.stardust = self.stardust.saturating_add(summary.stardust);
        self.total_stardust += u64::from(summary.stardust);
        self.best_wave = self.best_wave.max(summary.wave);
        self.best_level = self.best_level.max(summary.level);
        self.best_kills = self.best_kills.max(summary.kills);
    }

    /// Highest-rarity petal of a run, the one a headless run keeps
    pub fn best_petal(summary: &RunSummary) -> Option<(OrbitalKind, Rarity)> {
        summary.petals.iter().copied().max_by_key(|&(_, rarity)| rarity)
    }
}
