//! Enemy bodies, status effects and the death transition

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::abilities::Abilities;
use crate::data::{BossDef, CombatTuning, EnemyDef, EnemyKind, HitEffect};

/// Regular template or boss variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyRole {
    Regular(EnemyKind),
    Boss { index: usize },
}

/// Timed debuffs from petal hits
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusEffects {
    pub slow: f32,
    pub burn: f32,
    pub burn_dps: f32,
}

/// Outcome of a damage application
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DamageResult {
    /// Health actually removed
    pub dealt: f32,
    /// This hit performed the death transition
    pub killed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub role: EnemyRole,
    pub pos: Vec2,
    pub radius: f32,
    pub hp: f32,
    pub max_hp: f32,
    /// Contact damage per hit
    pub damage: f32,
    pub speed: f32,
    pub xp: f32,
    pub split_count: u32,
    pub contact_timer: f32,
    /// Body-vs-petal cooldown, kept apart from player contact
    pub petal_contact_timer: f32,
    pub status: StatusEffects,
    pub abilities: Abilities,
    /// Set once by the death transition
    pub dead: bool,
}

impl Enemy {
    /// Build a regular enemy scaled for the current wave and zone
    pub fn from_def(id: u32, def: &EnemyDef, pos: Vec2, scale: f32, tuning: &CombatTuning) -> Self {
        let b = &def.body;
        let max_hp = b.hp * scale;
        Self {
            id,
            role: EnemyRole::Regular(def.kind),
            pos,
            radius: b.radius,
            hp: max_hp,
            max_hp,
            damage: b.damage * scale * tuning.enemy_damage_scale,
            speed: b.speed,
            xp: b.xp * scale,
            split_count: def.split_count,
            contact_timer: 0.0,
            petal_contact_timer: 0.0,
            status: StatusEffects::default(),
            abilities: Abilities::from_config(&def.abilities),
            dead: false,
        }
    }

    /// Build a boss; `scale` multiplies health, damage and XP once
    pub fn boss(
        id: u32,
        index: usize,
        def: &BossDef,
        pos: Vec2,
        scale: f32,
        tuning: &CombatTuning,
    ) -> Self {
        let b = &def.body;
        let max_hp = b.hp * scale;
        Self {
            id,
            role: EnemyRole::Boss { index },
            pos,
            radius: b.radius,
            hp: max_hp,
            max_hp,
            damage: b.damage * scale * tuning.enemy_damage_scale,
            speed: b.speed,
            xp: b.xp * scale,
            split_count: 0,
            contact_timer: 0.0,
            petal_contact_timer: 0.0,
            status: StatusEffects::default(),
            abilities: Abilities::from_config(&def.abilities),
            dead: false,
        }
    }

    #[inline]
    pub fn is_boss(&self) -> bool {
        matches!(self.role, EnemyRole::Boss { .. })
    }

    #[inline]
    pub fn is_phased(&self) -> bool {
        self.abilities.phase.as_ref().is_some_and(|p| p.phased)
    }

    #[inline]
    pub fn is_shielded(&self) -> bool {
        self.abilities.shield.as_ref().is_some_and(|s| s.active)
    }

    /// Alive and not phased out
    #[inline]
    pub fn targetable(&self) -> bool {
        !self.dead && !self.is_phased()
    }

    /// Incoming hit. Phased enemies ignore it, shielded ones take a fraction.
    pub fn take_damage(&mut self, amount: f32, tuning: &CombatTuning) -> DamageResult {
        if !self.targetable() || amount <= 0.0 {
            return DamageResult::default();
        }
        let amount = if self.is_shielded() {
            amount * tuning.shielded_damage_taken
        } else {
            amount
        };
        self.lose_health(amount)
    }

    /// Remove health directly, clamping at zero and dying at most once
    pub fn lose_health(&mut self, amount: f32) -> DamageResult {
        if self.dead || amount <= 0.0 {
            return DamageResult::default();
        }
        let before = self.hp;
        self.hp = (self.hp - amount).max(0.0);
        let killed = self.hp <= 0.0;
        if killed {
            self.dead = true;
        }
        DamageResult {
            dealt: before - self.hp,
            killed,
        }
    }

    pub fn heal(&mut self, amount: f32) {
        if !self.dead {
            self.hp = (self.hp + amount).min(self.max_hp);
        }
    }

    /// Apply a petal's on-hit status
    pub fn apply_hit_effect(&mut self, effect: HitEffect, rarity_mult: f32, tuning: &CombatTuning) {
        match effect {
            HitEffect::Slow => {
                self.status.slow = self.status.slow.max(tuning.slow_duration);
            }
            HitEffect::Burn { dps, duration } => {
                self.status.burn = duration;
                self.status.burn_dps = dps * rarity_mult;
            }
            // Lifesteal heals the owner, not a status on the enemy
            HitEffect::LifeSteal { .. } => {}
        }
    }

    /// Advance status timers. Returns the speed multiplier for this step and
    /// the burn damage dealt.
    pub fn tick_status(&mut self, dt: f32, tuning: &CombatTuning) -> (f32, DamageResult) {
        let mut speed_mult = 1.0;
        if self.status.slow > 0.0 {
            speed_mult = tuning.slow_factor;
            self.status.slow = (self.status.slow - dt).max(0.0);
        }

        let mut burn = DamageResult::default();
        if self.status.burn > 0.0 {
            self.status.burn = (self.status.burn - dt).max(0.0);
            burn = self.lose_health(self.status.burn_dps * dt);
        }
        (speed_mult, burn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::GameData;
    use approx::assert_relative_eq;

    fn blob(scale: f32) -> Enemy {
        let data = GameData::default();
        let def = data.enemy(EnemyKind::Blob).unwrap();
        Enemy::from_def(1, def, Vec2::ZERO, scale, &data.combat)
    }

    #[test]
    fn test_scaled_construction() {
        let e = blob(2.0);
        assert_relative_eq!(e.max_hp, 30.0);
        assert_relative_eq!(e.damage, 14.0 * 2.0 * 0.4);
        assert_relative_eq!(e.xp, 20.0);
    }

    #[test]
    fn test_death_transition_happens_once() {
        let tuning = CombatTuning::default();
        let mut e = blob(1.0);
        let first = e.take_damage(100.0, &tuning);
        assert!(first.killed);
        assert_relative_eq!(first.dealt, 15.0);
        assert_eq!(e.hp, 0.0);

        let second = e.take_damage(100.0, &tuning);
        assert!(!second.killed);
        assert_eq!(second.dealt, 0.0);
        assert_eq!(e.hp, 0.0);
    }

    #[test]
    fn test_shielded_takes_fraction() {
        let data = GameData::default();
        let mut boss = Enemy::boss(9, 1, &data.bosses[1], Vec2::ZERO, 1.0, &data.combat);
        boss.abilities.shield.as_mut().unwrap().active = true;
        let r = boss.take_damage(100.0, &data.combat);
        assert_relative_eq!(r.dealt, 15.0);
    }

    #[test]
    fn test_phased_ignores_damage() {
        let data = GameData::default();
        let def = data.enemy(EnemyKind::Wraith).unwrap();
        let mut e = Enemy::from_def(2, def, Vec2::ZERO, 1.0, &data.combat);
        e.abilities.phase.as_mut().unwrap().phased = true;
        assert_eq!(e.take_damage(50.0, &data.combat), DamageResult::default());
        assert!(!e.targetable());
    }

    #[test]
    fn test_burn_and_slow() {
        let tuning = CombatTuning::default();
        let mut e = blob(1.0);
        e.apply_hit_effect(HitEffect::Burn { dps: 5.0, duration: 3.0 }, 2.0, &tuning);
        e.apply_hit_effect(HitEffect::Slow, 1.0, &tuning);
        let (speed_mult, burn) = e.tick_status(0.5, &tuning);
        assert_relative_eq!(speed_mult, 0.4);
        assert_relative_eq!(burn.dealt, 5.0);
        assert_relative_eq!(e.status.burn, 2.5);
    }

    #[test]
    fn test_heal_caps_at_max() {
        let tuning = CombatTuning::default();
        let mut e = blob(1.0);
        e.take_damage(10.0, &tuning);
        e.heal(100.0);
        assert_eq!(e.hp, e.max_hp);
    }
}
