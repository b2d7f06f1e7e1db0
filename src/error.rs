//! Error types surfaced at the crate boundary

use std::path::PathBuf;

use thiserror::Error;

use crate::data::{OrbitalKind, PermUpgradeKind, Rarity};

/// Rejected loadout or stash request. No state changes when one is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InventoryError {
    #[error("no stash item with id {0}")]
    UnknownItem(u32),
    #[error("no equipped orbital in slot {0}")]
    EmptySlot(usize),
    #[error("all {0} orbital slots are in use")]
    SlotsFull(usize),
    #[error("need 3 {rarity:?} {kind:?} to merge, have {have}")]
    NotEnoughToMerge {
        kind: OrbitalKind,
        rarity: Rarity,
        have: usize,
    },
    #[error("{0:?} is the highest rarity and cannot be merged")]
    TopTier(Rarity),
    #[error("{0:?} is not allowed in this zone")]
    RarityNotAllowed(Rarity),
    #[error("no loot within reach")]
    NothingToPickUp,
}

/// Rejected permanent upgrade purchase
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PurchaseError {
    #[error("no permanent upgrade {0:?}")]
    UnknownUpgrade(PermUpgradeKind),
    #[error("{0:?} is already at max level")]
    MaxLevel(PermUpgradeKind),
    #[error("costs {cost} stardust, have {have}")]
    NotEnoughStardust { cost: u32, have: u32 },
}

/// Failure loading settings or data tables
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Malformed arena message
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("failed to encode message: {0}")]
    Encode(serde_json::Error),
}

impl ConfigError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
