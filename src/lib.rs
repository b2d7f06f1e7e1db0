//! Orbitron - an orbiting-petal survival arena
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, abilities, combat, waves, loot)
//! - `data`: Immutable definition tables shared by reference
//! - `net`: Arena wire contract, snapshot interpolation, reconnect policy
//! - `progression`: Persistent record consumed by the simulation
//! - `settings`: Headless run configuration

pub mod data;
pub mod error;
pub mod net;
pub mod progression;
pub mod settings;
pub mod sim;

pub use data::GameData;
pub use error::{ConfigError, InventoryError, ProtocolError, PurchaseError};
pub use progression::ProgressRecord;
pub use settings::RunSettings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Largest step accepted by `step`; longer frames are clamped
    pub const MAX_DT: f32 = 0.05;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// World is a square of this side length
    pub const WORLD_SIZE: f32 = 12_000.0;
    /// Hard cap on live enemies
    pub const MAX_ENEMIES: usize = 600;

    /// Kill streak resets after this many seconds without a kill
    pub const STREAK_TIMEOUT: f32 = 3.0;

    /// XP curve: xp_to_next = floor(BASE * MULT^(level-1))
    pub const XP_CURVE_BASE: f32 = 30.0;
    pub const XP_CURVE_MULT: f32 = 1.18;
    /// Level-up upgrade choice cadence
    pub const UPGRADE_CHOICE_EVERY: u32 = 5;

    /// Orbital level range
    pub const MAX_ORBITAL_LEVEL: u32 = 10;
    /// Level-up slot upgrades stop here
    pub const MAX_SLOTS: usize = 10;

    /// Stardust awarded at the end of a run
    pub const STARDUST_PER_WAVE: u32 = 2;
    pub const STARDUST_PER_LEVEL: u32 = 1;
    pub const STARDUST_BOSS_BONUS: u32 = 15;
}

/// Centre of the world
#[inline]
pub fn world_center() -> Vec2 {
    Vec2::splat(consts::WORLD_SIZE / 2.0)
}

/// Keep a circle of `radius` fully inside the world square
#[inline]
pub fn clamp_to_world(pos: Vec2, radius: f32) -> Vec2 {
    let max = consts::WORLD_SIZE - radius;
    Vec2::new(pos.x.clamp(radius, max), pos.y.clamp(radius, max))
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Heading of a vector in radians
#[inline]
pub fn heading(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normalize_angle_wraps() {
        use std::f32::consts::PI;
        assert_relative_eq!(normalize_angle(3.0 * PI), -PI, epsilon = 1e-5);
        assert_relative_eq!(normalize_angle(-PI / 2.0), -PI / 2.0);
    }

    #[test]
    fn test_clamp_to_world() {
        let p = clamp_to_world(Vec2::new(-50.0, consts::WORLD_SIZE + 10.0), 18.0);
        assert_eq!(p, Vec2::new(18.0, consts::WORLD_SIZE - 18.0));
    }
}
