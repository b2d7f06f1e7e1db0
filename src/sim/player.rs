//! The player mover: derived stats, movement, dash and damage intake

use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::combat::mitigate;
use super::orbital::{Orbital, OwnerFrame};
use crate::clamp_to_world;
use crate::data::{CombatTuning, GameData, PlayerBase, StatKind, StatUpgrade};

/// Fractional bonuses from permanent upgrades (0.1 = +10 %)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermBonuses {
    pub max_hp: f32,
    pub damage: f32,
    pub speed: f32,
    pub luck: f32,
    pub regen: f32,
    pub xp_gain: f32,
    pub pickup: f32,
    pub orbital_speed: f32,
    pub start_level: u32,
    pub extra_slots: u32,
}

/// In-run bonuses collected from level-up choices
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatBonuses {
    pub max_hp: f32,
    pub hp_regen: f32,
    pub armor: f32,
    pub speed: f32,
    pub damage: f32,
    pub luck: f32,
    pub xp_gain: f32,
    pub pickup_range: f32,
    pub orbital_speed: f32,
}

impl Default for StatBonuses {
    fn default() -> Self {
        Self {
            max_hp: 0.0,
            hp_regen: 0.0,
            armor: 0.0,
            speed: 1.0,
            damage: 1.0,
            luck: 1.0,
            xp_gain: 1.0,
            pickup_range: 1.0,
            orbital_speed: 1.0,
        }
    }
}

impl StatBonuses {
    /// Percentage upgrades multiply, flat ones add
    pub fn apply(&mut self, up: &StatUpgrade) {
        let slot = match up.stat {
            StatKind::MaxHp => &mut self.max_hp,
            StatKind::HpRegen => &mut self.hp_regen,
            StatKind::Armor => &mut self.armor,
            StatKind::Speed => &mut self.speed,
            StatKind::Damage => &mut self.damage,
            StatKind::Luck => &mut self.luck,
            StatKind::XpGain => &mut self.xp_gain,
            StatKind::PickupRange => &mut self.pickup_range,
            StatKind::OrbitalSpeed => &mut self.orbital_speed,
        };
        if up.pct {
            *slot *= 1.0 + up.amount;
        } else {
            *slot += up.amount;
        }
    }
}

/// Derived stats, recomputed whenever an input changes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub max_hp: f32,
    /// Health per second
    pub regen: f32,
    pub speed: f32,
    pub damage_mult: f32,
    pub armor: f32,
    pub luck: f32,
    pub xp_gain: f32,
    pub pickup_range: f32,
    pub orbital_speed: f32,
}

impl Stats {
    pub fn derive(base: &PlayerBase, level: u32, bonus: &StatBonuses, perm: &PermBonuses) -> Self {
        let level_growth = 1.0 + level.saturating_sub(1) as f32 * base.hp_per_level;
        let max_hp = (base.max_hp + bonus.max_hp) * level_growth * (1.0 + perm.max_hp);
        Self {
            max_hp,
            regen: max_hp * base.regen_fraction * (1.0 + perm.regen) + bonus.hp_regen,
            speed: base.speed * bonus.speed * (1.0 + perm.speed),
            damage_mult: bonus.damage * (1.0 + perm.damage),
            armor: bonus.armor,
            luck: bonus.luck * (1.0 + perm.luck),
            xp_gain: bonus.xp_gain * (1.0 + perm.xp_gain),
            pickup_range: base.pickup_range * bonus.pickup_range * (1.0 + perm.pickup),
            orbital_speed: base.orbital_speed * bonus.orbital_speed * (1.0 + perm.orbital_speed),
        }
    }
}

/// Movement intent for one step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveIntent {
    pub dir: Vec2,
    pub dash: bool,
    pub extend: bool,
    pub retract: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub hp: f32,
    pub level: u32,
    pub xp: f32,
    pub xp_to_next: f32,
    pub perm: PermBonuses,
    pub bonus: StatBonuses,
    pub stats: Stats,
    /// Orbital slot capacity
    pub slots: usize,
    pub orbitals: Vec<Orbital>,
    pub dash_cooldown: f32,
    pub dash_time: f32,
    pub dash_dir: Vec2,
    pub invulnerable: f32,
    pub orbit_mult: f32,
    pub orbit_phase: f32,
}

impl Player {
    pub fn new(base: &PlayerBase, perm: PermBonuses, pos: Vec2) -> Self {
        let level = 1 + perm.start_level;
        let bonus = StatBonuses::default();
        let stats = Stats::derive(base, level, &bonus, &perm);
        Self {
            pos,
            vel: Vec2::ZERO,
            radius: base.radius,
            hp: stats.max_hp,
            level,
            xp: 0.0,
            xp_to_next: super::progress::xp_to_next(level),
            perm,
            bonus,
            stats,
            slots: base.slots + perm.extra_slots as usize,
            orbitals: Vec::new(),
            dash_cooldown: 0.0,
            dash_time: 0.0,
            dash_dir: Vec2::ZERO,
            invulnerable: 0.0,
            orbit_mult: 1.0,
            orbit_phase: 0.0,
        }
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.hp <= 0.0
    }

    pub fn free_slots(&self) -> usize {
        self.slots.saturating_sub(self.orbitals.len())
    }

    /// Re-derive stats, keeping health within the new maximum
    pub fn refresh_stats(&mut self, base: &PlayerBase) {
        self.stats = Stats::derive(base, self.level, &self.bonus, &self.perm);
        self.hp = self.hp.clamp(0.0, self.stats.max_hp);
    }

    pub fn heal(&mut self, amount: f32) {
        if !self.is_dead() && amount > 0.0 {
            self.hp = (self.hp + amount).min(self.stats.max_hp);
        }
    }

    pub fn full_heal(&mut self) {
        self.hp = self.stats.max_hp;
    }

    /// Summed block of active shield petals; the cap is applied on use
    pub fn shield_block(&self, data: &GameData) -> f32 {
        self.orbitals.iter().map(|o| o.block(data)).sum()
    }

    /// Contact or projectile hit: armor, then shield block
    pub fn take_hit(&mut self, raw: f32, data: &GameData) -> f32 {
        if self.invulnerable > 0.0 || self.is_dead() {
            return 0.0;
        }
        let tuning: &CombatTuning = &data.combat;
        let amount = mitigate(raw, self.stats.armor, self.shield_block(data), tuning.shield_block_cap);
        self.lose_health(amount)
    }

    /// Hazard damage ignores armor
    pub fn take_hazard(&mut self, raw: f32, data: &GameData) -> f32 {
        if self.invulnerable > 0.0 || self.is_dead() || raw <= 0.0 {
            return 0.0;
        }
        let block = self
            .shield_block(data)
            .clamp(0.0, data.combat.shield_block_cap);
        self.lose_health(raw * (1.0 - block))
    }

    fn lose_health(&mut self, amount: f32) -> f32 {
        let before = self.hp;
        self.hp = (self.hp - amount).clamp(0.0, self.stats.max_hp);
        before - self.hp
    }

    /// Move, dash, ease the orbit radius and regenerate
    pub fn update(&mut self, intent: &MoveIntent, base: &PlayerBase, dt: f32) {
        self.dash_cooldown = (self.dash_cooldown - dt).max(0.0);
        self.invulnerable = (self.invulnerable - dt).max(0.0);

        let dir = if intent.dir.length_squared() > 1.0 {
            intent.dir.normalize()
        } else {
            intent.dir
        };

        if intent.dash && self.dash_cooldown <= 0.0 && dir != Vec2::ZERO {
            self.dash_time = base.dash_duration;
            self.dash_cooldown = base.dash_cooldown;
            self.invulnerable = base.dash_invuln;
            self.dash_dir = dir.normalize_or_zero();
        }

        self.vel = if self.dash_time > 0.0 {
            self.dash_time = (self.dash_time - dt).max(0.0);
            self.dash_dir * self.stats.speed * base.dash_speed_mult
        } else {
            dir * self.stats.speed
        };
        self.pos = clamp_to_world(self.pos + self.vel * dt, self.radius);

        let target = if intent.extend {
            base.orbit_extend
        } else if intent.retract {
            base.orbit_retract
        } else {
            1.0
        };
        self.orbit_mult += (target - self.orbit_mult) * (base.orbit_ease * dt).min(1.0);
        self.orbit_phase = (self.orbit_phase + self.stats.orbital_speed * dt) % TAU;

        self.heal(self.stats.regen * dt);
    }

    pub fn frame(&self) -> OwnerFrame {
        OwnerFrame {
            pos: self.pos,
            radius: self.radius,
            orbit_mult: self.orbit_mult,
            orbit_phase: self.orbit_phase,
            damage_mult: self.stats.damage_mult,
        }
    }
}
