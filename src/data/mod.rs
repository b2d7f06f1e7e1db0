//! Immutable game definition tables
//!
//! Loaded once (compiled-in defaults, optionally overridden from JSON) and
//! shared by `Arc`. The simulation only ever reads these.

pub mod enemies;
pub mod orbitals;
pub mod rarity;
pub mod upgrades;
pub mod zones;

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use enemies::{
    AbilityConfig, AreaConfig, BodyStats, BossDef, BurstConfig, DashConfig, EnemyDef, EnemyKind,
    HealConfig, PhaseConfig, ShieldConfig, ShootConfig, SpawnerConfig, SpiralConfig,
    TeleportConfig,
};
pub use orbitals::{AttackStyle, HitEffect, OrbitalDef, OrbitalKind};
pub use rarity::{CapBreakpoint, Rarity, RarityTable, RarityTier};
pub use upgrades::{PermUpgradeDef, PermUpgradeKind, StatKind, StatUpgrade};
pub use zones::{ArenaZoneDef, ZoneDef, zone_index};

use crate::error::ConfigError;

/// Player base stats before bonuses
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerBase {
    pub radius: f32,
    pub speed: f32,
    pub max_hp: f32,
    pub pickup_range: f32,
    pub orbital_speed: f32,
    pub slots: usize,
    /// Fraction of max HP regenerated per second
    pub regen_fraction: f32,
    /// Max HP growth per level
    pub hp_per_level: f32,
    pub dash_cooldown: f32,
    pub dash_duration: f32,
    pub dash_speed_mult: f32,
    pub dash_invuln: f32,
    pub orbit_extend: f32,
    pub orbit_retract: f32,
    /// Easing rate of the orbit multiplier toward its target
    pub orbit_ease: f32,
}

impl Default for PlayerBase {
    fn default() -> Self {
        Self {
            radius: 18.0,
            speed: 220.0,
            max_hp: 200.0,
            pickup_range: 80.0,
            orbital_speed: 2.5,
            slots: 5,
            regen_fraction: 0.01,
            hp_per_level: 0.03,
            dash_cooldown: 0.3,
            dash_duration: 0.075,
            dash_speed_mult: 4.0,
            dash_invuln: 0.1,
            orbit_extend: 2.5,
            orbit_retract: 0.35,
            orbit_ease: 10.0,
        }
    }
}

/// Wave pacing constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveTuning {
    pub initial_delay: f32,
    pub between_waves: f32,
    pub boss_interval: u32,
    /// Fraction of the budget dispatched before the boss may appear
    pub boss_threshold: f32,
    pub spawn_min_dist: f32,
    pub spawn_max_dist: f32,
    /// Extra enemy scale per zone index
    pub zone_scale: f32,
    /// Boss stat growth per elapsed boss interval
    pub boss_scale_step: f32,
    /// Loot this many waves old is cleared at wave start
    pub loot_lifetime_waves: u32,
}

impl Default for WaveTuning {
    fn default() -> Self {
        Self {
            initial_delay: 3.0,
            between_waves: 3.0,
            boss_interval: 5,
            boss_threshold: 0.5,
            spawn_min_dist: 500.0,
            spawn_max_dist: 800.0,
            zone_scale: 0.3,
            boss_scale_step: 0.5,
            loot_lifetime_waves: 2,
        }
    }
}

/// Drop chances and pickup radii
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LootTuning {
    pub base_chance: f32,
    pub chance_per_zone: f32,
    pub boss_chance: f32,
    pub boss_luck_mult: f32,
    pub streak_bonus_per_kill: f32,
    pub streak_bonus_cap: f32,
    pub pickup_radius: f32,
    pub gem_magnet_speed: f32,
    pub split_child_scale: f32,
    pub split_radius_mult: f32,
    pub split_hp_mult: f32,
    pub split_xp_mult: f32,
    pub split_distance: f32,
}

impl Default for LootTuning {
    fn default() -> Self {
        Self {
            base_chance: 0.015,
            chance_per_zone: 0.005,
            boss_chance: 0.7,
            boss_luck_mult: 8.0,
            streak_bonus_per_kill: 0.0005,
            streak_bonus_cap: 0.03,
            pickup_radius: 60.0,
            gem_magnet_speed: 600.0,
            split_child_scale: 0.5,
            split_radius_mult: 0.5,
            split_hp_mult: 0.3,
            split_xp_mult: 0.3,
            split_distance: 30.0,
        }
    }
}

/// Empirically tuned combat fractions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    /// Enemy contact damage = template damage × scale × this
    pub enemy_damage_scale: f32,
    pub contact_cooldown: f32,
    pub melee_cooldown: f32,
    /// Petal recoil from its own melee hit, fraction of enemy contact damage
    pub melee_recoil: f32,
    /// Petal damage when an enemy body runs into it
    pub body_recoil: f32,
    /// Distance added to enemy radius for body-vs-petal contact
    pub petal_body_radius: f32,
    /// Distance added to projectile size for projectile-vs-petal contact
    pub petal_projectile_radius: f32,
    pub shield_block_cap: f32,
    pub shield_block_per_level: f32,
    /// Damage taken by a shielded enemy
    pub shielded_damage_taken: f32,
    pub slow_factor: f32,
    pub slow_duration: f32,
    pub petal_base_hp: f32,
    pub petal_hp_per_level: f32,
    pub petal_damage_per_level: f32,
    pub petal_reload: f32,
    pub petal_respawn_grace: f32,
    pub projectile_speed_keep: f32,
    pub projectile_scatter: f32,
    pub projectile_min_size: f32,
    pub chain_damage_scale: f32,
    pub chain_hop_scale: f32,
    pub laser_damage_scale: f32,
    /// Phase duration for enemies that can phase out
    pub phased_duration: f32,
    pub dash_burst: f32,
    pub dash_crawl: f32,
    pub spiral_turn_rate: f32,
    pub burst_spread: f32,
    pub pet_contact_scale: f32,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            enemy_damage_scale: 0.4,
            contact_cooldown: 0.5,
            melee_cooldown: 0.3,
            melee_recoil: 0.15,
            body_recoil: 0.2,
            petal_body_radius: 10.0,
            petal_projectile_radius: 12.0,
            shield_block_cap: 0.75,
            shield_block_per_level: 0.15,
            shielded_damage_taken: 0.15,
            slow_factor: 0.4,
            slow_duration: 1.5,
            petal_base_hp: 10.0,
            petal_hp_per_level: 0.3,
            petal_damage_per_level: 0.2,
            petal_reload: 0.75,
            petal_respawn_grace: 0.5,
            projectile_speed_keep: 0.7,
            projectile_scatter: 0.4,
            projectile_min_size: 2.0,
            chain_damage_scale: 0.2,
            chain_hop_scale: 0.3,
            laser_damage_scale: 0.05,
            phased_duration: 1.5,
            dash_burst: 0.3,
            dash_crawl: 0.3,
            spiral_turn_rate: 1.5,
            burst_spread: 0.6 * std::f32::consts::PI,
            pet_contact_scale: 0.3,
        }
    }
}

/// Companion constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PetTuning {
    pub radius: f32,
    /// Max HP as a fraction of the player's
    pub hp_fraction: f32,
    pub heal_interval: f32,
    pub heal_fraction: f32,
    pub heal_per_level: f32,
    pub pellet_speed: f32,
    pub pellet_turn_rate: f32,
    pub pellet_life: f32,
    pub pellet_size: f32,
    pub revive_time: f32,
    pub regen_fraction: f32,
    pub min_follow: f32,
    pub max_follow: f32,
    pub snap_dist: f32,
    pub snap_to: f32,
}

impl Default for PetTuning {
    fn default() -> Self {
        Self {
            radius: 10.0,
            hp_fraction: 0.5,
            heal_interval: 1.5,
            heal_fraction: 0.05,
            heal_per_level: 0.02,
            pellet_speed: 350.0,
            pellet_turn_rate: 5.0,
            pellet_life: 2.0,
            pellet_size: 4.0,
            revive_time: 5.0,
            regen_fraction: 0.01,
            min_follow: 35.0,
            max_follow: 80.0,
            snap_dist: 200.0,
            snap_to: 120.0,
        }
    }
}

/// Every definition table the simulation reads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameData {
    pub rarity: RarityTable,
    pub orbitals: Vec<OrbitalDef>,
    pub enemies: Vec<EnemyDef>,
    pub bosses: Vec<BossDef>,
    pub zones: Vec<ZoneDef>,
    pub arena_zones: Vec<ArenaZoneDef>,
    pub stat_upgrades: Vec<StatUpgrade>,
    pub perm_upgrades: Vec<PermUpgradeDef>,
    pub player: PlayerBase,
    pub waves: WaveTuning,
    pub loot: LootTuning,
    pub combat: CombatTuning,
    pub pet: PetTuning,
}

impl Default for GameData {
    fn default() -> Self {
        Self {
            rarity: RarityTable::default(),
            orbitals: orbitals::default_orbitals(),
            enemies: enemies::default_enemies(),
            bosses: enemies::default_bosses(),
            zones: zones::default_zones(),
            arena_zones: zones::default_arena_zones(),
            stat_upgrades: upgrades::default_stat_upgrades(),
            perm_upgrades: upgrades::default_perm_upgrades(),
            player: PlayerBase::default(),
            waves: WaveTuning::default(),
            loot: LootTuning::default(),
            combat: CombatTuning::default(),
            pet: PetTuning::default(),
        }
    }
}

impl GameData {
    /// Compiled-in tables behind a shared handle
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Parse tables from JSON. Missing sections keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let data: GameData = serde_json::from_str(json)?;
        data.validate()?;
        Ok(data)
    }

    /// Load tables from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let data = Self::from_json(&contents)?;
        log::info!(
            "Loaded game data from {}: {} enemies, {} bosses, {} orbitals",
            path.display(),
            data.enemies.len(),
            data.bosses.len(),
            data.orbitals.len()
        );
        Ok(data)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.enemies.is_empty() {
            return Err(ConfigError::Invalid("enemy table is empty".to_string()));
        }
        if self.zones.is_empty() {
            return Err(ConfigError::Invalid("zone table is empty".to_string()));
        }
        if self.rarity.breakpoints.is_empty() {
            return Err(ConfigError::Invalid(
                "rarity table needs at least one breakpoint".to_string(),
            ));
        }
        if self.waves.boss_interval == 0 {
            return Err(ConfigError::Invalid(
                "waves.boss_interval must be at least 1".to_string(),
            ));
        }
        if !self
            .rarity
            .breakpoints
            .windows(2)
            .all(|w| w[0].wave < w[1].wave)
        {
            return Err(ConfigError::Invalid(
                "rarity breakpoints must be sorted by wave".to_string(),
            ));
        }
        Ok(())
    }

    pub fn orbital(&self, kind: OrbitalKind) -> Option<&OrbitalDef> {
        self.orbitals.iter().find(|d| d.kind == kind)
    }

    pub fn enemy(&self, kind: EnemyKind) -> Option<&EnemyDef> {
        self.enemies.iter().find(|d| d.kind == kind)
    }

    pub fn perm_upgrade(&self, kind: PermUpgradeKind) -> Option<&PermUpgradeDef> {
        self.perm_upgrades.iter().find(|d| d.kind == kind)
    }

    /// Zone index at a world position
    pub fn zone_at(&self, pos: glam::Vec2) -> usize {
        zone_index(&self.zones, pos.distance(crate::world_center()))
    }

    /// Drop bonus for a zone index, 1.0 when unknown
    pub fn drop_bonus(&self, zone: usize) -> f32 {
        self.zones.get(zone).map(|z| z.drop_bonus).unwrap_or(1.0)
    }
}
