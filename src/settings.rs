//! Headless run settings
//!
//! Loaded from a JSON file; every field is optional and falls back to its
//! default. Command-line flags override what the file says.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_DT, SIM_DT};
use crate::data::{GameData, OrbitalKind, Rarity};
use crate::error::ConfigError;
use crate::sim::player::PermBonuses;
use crate::sim::state::RunOptions;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    // === Simulation ===
    /// RNG seed; identical seeds replay identical runs
    pub seed: u64,
    /// Fixed simulation step in seconds
    pub timestep: f32,
    /// Stop once this wave has started (0 = until death)
    pub max_waves: u32,
    /// Stop after this many simulated seconds
    pub max_duration: f32,

    // === Content ===
    /// JSON tables overriding the compiled-in defaults
    pub data_path: Option<PathBuf>,
    /// Arena zone whose rarity rules gate equips
    pub arena_zone: Option<u32>,
    pub starting_petal: Option<(OrbitalKind, Rarity)>,

    // === Autopilot ===
    /// Take the first offered choice at each upgrade level
    pub auto_choose: bool,
    /// Equip or stash loot in reach without a request
    pub auto_loot: bool,
    /// Steer away from the nearest enemy instead of standing still
    pub kite: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            seed: 1,
            timestep: SIM_DT,
            max_waves: 0,
            max_duration: 600.0,

            data_path: None,
            arena_zone: None,
            starting_petal: None,

            auto_choose: true,
            auto_loot: true,
            kite: true,
        }
    }
}

impl RunSettings {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: RunSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let settings = Self::from_json(&contents)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.timestep > 0.0 && self.timestep <= MAX_DT) {
            return Err(ConfigError::Invalid(format!(
                "timestep must be in (0, {MAX_DT}], got {}",
                self.timestep
            )));
        }
        if !(self.max_duration > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "max_duration must be positive, got {}",
                self.max_duration
            )));
        }
        Ok(())
    }

    /// Data tables for this run
    pub fn game_data(&self) -> Result<GameData, ConfigError> {
        match &self.data_path {
            Some(path) => GameData::load(path),
            None => Ok(GameData::default()),
        }
    }

    /// Simulation options, with permanent bonuses from saved progress
    pub fn run_options(
        &self,
        data: &GameData,
        perm: PermBonuses,
    ) -> Result<RunOptions, ConfigError> {
        let allowed_rarities = match self.arena_zone {
            Some(id) => {
                let zone = data
                    .arena_zones
                    .iter()
                    .find(|z| z.id == id)
                    .ok_or_else(|| ConfigError::Invalid(format!("no arena zone {id}")))?;
                Some(zone.allowed_rarities.clone())
            }
            None => None,
        };

        Ok(RunOptions {
            seed: self.seed,
            perm,
            starting_petal: self.starting_petal,
            auto_choose: self.auto_choose,
            auto_loot: self.auto_loot,
            allowed_rarities,
        })
    }

    /// Whether the run should stop at this wave and time
    pub fn finished(&self, wave: u32, time: f32) -> bool {
        (self.max_waves > 0 && wave >= self.max_waves) || time >= self.max_duration
    }
}
