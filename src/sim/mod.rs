//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Timers advance by the step `dt` only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or I/O

pub mod abilities;
pub mod collision;
pub mod combat;
pub mod enemy;
pub mod events;
pub mod inventory;
pub mod loot;
pub mod orbital;
pub mod pet;
pub mod player;
pub mod progress;
pub mod projectile;
pub mod rarity;
pub mod state;
pub mod tick;
pub mod wave;

pub use enemy::Enemy;
pub use events::{DamageEvent, DeathEvent, GameEvent, SpawnEvent, Spawned, StepEffects, Target};
pub use inventory::{Inventory, Item};
pub use orbital::{Orbital, PetalState};
pub use player::{PermBonuses, Player};
pub use progress::UpgradeChoice;
pub use projectile::{Owner, Projectile};
pub use rarity::roll_rarity;
pub use state::{RunOptions, RunSummary, World};
pub use tick::{Request, TickInput, step};
pub use wave::{enemy_count, wave_scale};
