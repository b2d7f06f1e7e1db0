//! Orbiting petals: kinematics, petal health and attack dispatch
//!
//! A petal is either Active or Reloading. Reloading petals keep their slot
//! but are skipped by every attack and collision check until the reload
//! timer runs out, at which point they come back at full health with a
//! short grace window before their first attack.

use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{circles_overlap, offset};
use super::combat::{area_targets, beam_targets, chain_damage, chain_path, nearest_enemy};
use super::enemy::Enemy;
use super::events::{GameEvent, Spawned, StepEffects, Target};
use super::projectile::{Owner, Projectile};
use super::state::IdAllocator;
use crate::consts::MAX_ORBITAL_LEVEL;
use crate::data::{AttackStyle, CombatTuning, GameData, OrbitalDef, OrbitalKind, Rarity};
use crate::{heading, normalize_angle};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PetalState {
    Active,
    Reloading { remaining: f32 },
}

/// What a damage application did to a petal
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PetalHit {
    pub dealt: f32,
    /// This hit sent the petal into reload
    pub broke: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Orbital {
    pub id: u32,
    pub kind: OrbitalKind,
    pub rarity: Rarity,
    pub level: u32,
    pub hp: f32,
    pub max_hp: f32,
    pub state: PetalState,
    /// Seconds before a restored petal may attack
    pub grace: f32,
    pub attack_timer: f32,
    /// Even-spacing offset, eased toward its slot angle
    pub spacing: f32,
    /// World position from the last layout pass
    pub pos: Vec2,
    /// Aim of the last laser beam, for presentation
    pub beam: Option<f32>,
}

impl Orbital {
    pub fn new(
        id: u32,
        kind: OrbitalKind,
        rarity: Rarity,
        level: u32,
        data: &GameData,
    ) -> Self {
        let level = level.clamp(1, MAX_ORBITAL_LEVEL);
        let max_hp = petal_max_hp(data, rarity, level);
        Self {
            id,
            kind,
            rarity,
            level,
            hp: max_hp,
            max_hp,
            state: PetalState::Active,
            grace: 0.0,
            attack_timer: 0.0,
            spacing: 0.0,
            pos: Vec2::ZERO,
            beam: None,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self.state, PetalState::Active)
    }

    #[inline]
    pub fn can_attack(&self) -> bool {
        self.is_active() && self.grace <= 0.0
    }

    /// Damage the petal; reaching zero starts the reload exactly once
    pub fn take_damage(&mut self, amount: f32, tuning: &CombatTuning) -> PetalHit {
        if !self.is_active() || amount <= 0.0 {
            return PetalHit::default();
        }
        let before = self.hp;
        self.hp = (self.hp - amount).max(0.0);
        let broke = self.hp <= 0.0;
        if broke {
            self.state = PetalState::Reloading {
                remaining: tuning.petal_reload,
            };
            self.beam = None;
        }
        PetalHit {
            dealt: before - self.hp,
            broke,
        }
    }

    /// Advance reload and grace timers. Returns true on the tick the petal
    /// comes back.
    pub fn tick_timers(&mut self, dt: f32, tuning: &CombatTuning) -> bool {
        self.grace = (self.grace - dt).max(0.0);
        self.attack_timer = (self.attack_timer - dt).max(0.0);
        if let PetalState::Reloading { remaining } = &mut self.state {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.state = PetalState::Active;
                self.hp = self.max_hp;
                self.grace = tuning.petal_respawn_grace;
                return true;
            }
        }
        false
    }

    /// Damage per attack before style scaling
    pub fn damage(&self, data: &GameData, owner_mult: f32) -> f32 {
        let Some(def) = data.orbital(self.kind) else {
            return 0.0;
        };
        def.damage
            * data.rarity.mult(self.rarity)
            * (1.0 + (self.level - 1) as f32 * data.combat.petal_damage_per_level)
            * owner_mult
    }

    /// Block fraction this petal contributes while active
    pub fn block(&self, data: &GameData) -> f32 {
        if !self.is_active() {
            return 0.0;
        }
        match data.orbital(self.kind).map(|d| d.style) {
            Some(AttackStyle::Shield { block }) => {
                block
                    * data.rarity.mult(self.rarity)
                    * (1.0 + (self.level - 1) as f32 * data.combat.shield_block_per_level)
            }
            _ => 0.0,
        }
    }

    /// Raise the level by one, keeping the missing health unchanged
    pub fn level_up(&mut self, data: &GameData) -> bool {
        if self.level >= MAX_ORBITAL_LEVEL {
            return false;
        }
        self.level += 1;
        let max_hp = petal_max_hp(data, self.rarity, self.level);
        if self.is_active() {
            self.hp = (self.hp + max_hp - self.max_hp).clamp(0.0, max_hp);
        }
        self.max_hp = max_hp;
        true
    }
}

/// floor(base × rarity mult × level growth)
pub fn petal_max_hp(data: &GameData, rarity: Rarity, level: u32) -> f32 {
    let c = &data.combat;
    (c.petal_base_hp * data.rarity.mult(rarity) * (1.0 + (level.max(1) - 1) as f32 * c.petal_hp_per_level))
        .floor()
}

/// Owner state the petals need, copied out so the owner can be mutated
/// after the petal pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OwnerFrame {
    pub pos: Vec2,
    pub radius: f32,
    pub orbit_mult: f32,
    pub orbit_phase: f32,
    pub damage_mult: f32,
}

/// Starting spacing for a petal added at `index`
pub fn initial_spacing(index: usize) -> f32 {
    index as f32 / 8.0 * TAU
}

/// Place every petal around its owner. Spacing offsets ease toward an even
/// distribution so a change in petal count does not snap.
pub fn layout(orbitals: &mut [Orbital], frame: &OwnerFrame, data: &GameData, dt: f32) {
    let count = orbitals.len().max(1) as f32;
    let ease = (data.player.orbit_ease * dt).min(1.0);
    for (i, o) in orbitals.iter_mut().enumerate() {
        let target = i as f32 / count * TAU;
        let delta = normalize_angle(target - o.spacing);
        o.spacing = normalize_angle(o.spacing + delta * ease);

        let orbit_dist = data.orbital(o.kind).map(|d| d.orbit_dist).unwrap_or(50.0);
        let angle = frame.orbit_phase + o.spacing;
        o.pos = offset(frame.pos, angle, (orbit_dist + frame.radius) * frame.orbit_mult);
    }
}

/// Writable world state for the attack pass
pub struct OrbitalContext<'a> {
    pub data: &'a GameData,
    pub enemies: &'a mut [Enemy],
    pub projectiles: &'a mut Vec<Projectile>,
    pub ids: &'a mut IdAllocator,
    pub effects: &'a mut StepEffects,
}

/// Result of the attack pass that the owner applies afterwards
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrbitalOutcome {
    pub lifesteal: f32,
}

/// Advance timers and resolve one attack per ready petal
pub fn update_orbitals(
    orbitals: &mut [Orbital],
    frame: &OwnerFrame,
    dt: f32,
    ctx: &mut OrbitalContext<'_>,
) -> OrbitalOutcome {
    let mut outcome = OrbitalOutcome::default();
    let tuning = ctx.data.combat;

    for o in orbitals.iter_mut() {
        if o.tick_timers(dt, &tuning) {
            ctx.effects.event(GameEvent::PetalRestored { id: o.id });
        }
        if !o.can_attack() {
            continue;
        }
        let Some(def) = ctx.data.orbital(o.kind) else {
            continue;
        };
        let damage = o.damage(ctx.data, frame.damage_mult);

        match def.style {
            AttackStyle::Melee | AttackStyle::Shield { .. } => {
                melee(o, def, damage, &mut outcome, ctx);
            }
            AttackStyle::Ranged {
                proj_speed,
                proj_size,
            } => {
                if o.attack_timer > 0.0 {
                    continue;
                }
                let Some(target) = nearest_enemy(ctx.enemies, o.pos, def.range, &[]) else {
                    continue;
                };
                let angle = heading(ctx.enemies[target].pos - o.pos);
                let id = ctx.ids.next();
                ctx.projectiles.push(Projectile::new(
                    id,
                    Owner::Player,
                    o.pos,
                    angle,
                    proj_speed,
                    damage,
                    proj_size * (1.0 + (o.level - 1) as f32 * 0.1),
                    def.range * 1.5,
                ));
                ctx.effects.spawn(id, Spawned::PlayerProjectile, o.pos);
                o.attack_timer = leveled_interval(def, o.level);
            }
            AttackStyle::Area => {
                if o.attack_timer > 0.0 {
                    continue;
                }
                o.attack_timer = leveled_interval(def, o.level);
                let range = def.range * (1.0 + (o.level - 1) as f32 * 0.08);
                for i in area_targets(ctx.enemies, o.pos, range) {
                    hit_enemy(&mut ctx.enemies[i], damage, def, o.rarity, &mut outcome, ctx.data, ctx.effects);
                }
            }
            AttackStyle::Chain {
                bounces,
                bounce_range,
            } => {
                if o.attack_timer > 0.0 {
                    continue;
                }
                let Some(first) = nearest_enemy(ctx.enemies, o.pos, def.range, &[]) else {
                    continue;
                };
                o.attack_timer = def.attack_interval;
                let hops = bounces + o.level / 3;
                for (hop, i) in chain_path(ctx.enemies, first, hops, bounce_range)
                    .into_iter()
                    .enumerate()
                {
                    let amount = chain_damage(damage, hop, &tuning);
                    hit_enemy(&mut ctx.enemies[i], amount, def, o.rarity, &mut outcome, ctx.data, ctx.effects);
                }
            }
            AttackStyle::Laser { beam_width } => {
                if o.attack_timer > 0.0 {
                    continue;
                }
                let growth = (o.level - 1) as f32;
                let range = def.range * (1.0 + growth * 0.05);
                let Some(target) = nearest_enemy(ctx.enemies, o.pos, range, &[]) else {
                    o.beam = None;
                    continue;
                };
                o.attack_timer = leveled_interval(def, o.level);
                let angle = heading(ctx.enemies[target].pos - o.pos);
                o.beam = Some(angle);
                let width = beam_width * (1.0 + growth * 0.1);
                let amount = damage * tuning.laser_damage_scale;
                for i in beam_targets(ctx.enemies, o.pos, angle, range, width) {
                    hit_enemy(&mut ctx.enemies[i], amount, def, o.rarity, &mut outcome, ctx.data, ctx.effects);
                }
            }
        }
    }

    outcome
}

/// Attack interval shortened by level
fn leveled_interval(def: &OrbitalDef, level: u32) -> f32 {
    def.attack_interval / (1.0 + (level - 1) as f32 * 0.1)
}

/// Contact strike on the nearest touching enemy. The petal pays recoil.
fn melee(
    o: &mut Orbital,
    def: &OrbitalDef,
    damage: f32,
    outcome: &mut OrbitalOutcome,
    ctx: &mut OrbitalContext<'_>,
) {
    if o.attack_timer > 0.0 {
        return;
    }
    let data = ctx.data;
    let tuning = &data.combat;
    let reach = tuning.petal_body_radius;
    let Some(target) = ctx
        .enemies
        .iter()
        .enumerate()
        .filter(|(_, e)| e.targetable() && circles_overlap(o.pos, reach, e.pos, e.radius))
        .min_by(|a, b| {
            a.1.pos
                .distance_squared(o.pos)
                .total_cmp(&b.1.pos.distance_squared(o.pos))
        })
        .map(|(i, _)| i)
    else {
        return;
    };

    o.attack_timer = tuning.melee_cooldown;
    let enemy = &mut ctx.enemies[target];
    let recoil = enemy.damage * tuning.melee_recoil;
    hit_enemy(enemy, damage, def, o.rarity, outcome, data, ctx.effects);

    let hit = o.take_damage(recoil, tuning);
    ctx.effects.damage(Target::Petal(o.id), hit.dealt, o.pos);
    if hit.broke {
        ctx.effects.event(GameEvent::PetalReloading { id: o.id });
    }
}

/// Apply petal damage plus its on-hit effect
fn hit_enemy(
    enemy: &mut Enemy,
    amount: f32,
    def: &OrbitalDef,
    rarity: Rarity,
    outcome: &mut OrbitalOutcome,
    data: &GameData,
    effects: &mut StepEffects,
) {
    let result = enemy.take_damage(amount, &data.combat);
    if result.dealt <= 0.0 {
        return;
    }
    effects.damage(Target::Enemy(enemy.id), result.dealt, enemy.pos);
    if let Some(effect) = def.effect {
        if let crate::data::HitEffect::LifeSteal { fraction } = effect {
            outcome.lifesteal += result.dealt * fraction;
        }
        if !enemy.dead {
            enemy.apply_hit_effect(effect, data.rarity.mult(rarity), &data.combat);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::EnemyKind;
    use approx::assert_relative_eq;

    fn frame(pos: Vec2) -> OwnerFrame {
        OwnerFrame {
            pos,
            radius: 18.0,
            orbit_mult: 1.0,
            orbit_phase: 0.0,
            damage_mult: 1.0,
        }
    }

    struct Arena {
        data: GameData,
        enemies: Vec<Enemy>,
        projectiles: Vec<Projectile>,
        ids: IdAllocator,
        effects: StepEffects,
    }

    impl Arena {
        fn new() -> Self {
            Self {
                data: GameData::default(),
                enemies: Vec::new(),
                projectiles: Vec::new(),
                ids: IdAllocator::default(),
                effects: StepEffects::default(),
            }
        }

        fn add_enemy(&mut self, kind: EnemyKind, pos: Vec2) {
            let def = self.data.enemy(kind).unwrap();
            let id = self.ids.next();
            self.enemies
                .push(Enemy::from_def(id, def, pos, 1.0, &self.data.combat));
        }

        fn step(&mut self, orbitals: &mut [Orbital], frame: &OwnerFrame, dt: f32) -> OrbitalOutcome {
            layout(orbitals, frame, &self.data, dt);
            let mut ctx = OrbitalContext {
                data: &self.data,
                enemies: &mut self.enemies,
                projectiles: &mut self.projectiles,
                ids: &mut self.ids,
                effects: &mut self.effects,
            };
            update_orbitals(orbitals, frame, dt, &mut ctx)
        }
    }

    #[test]
    fn test_petal_hp_scales_with_rarity_and_level() {
        let data = GameData::default();
        assert_eq!(petal_max_hp(&data, Rarity::Common, 1), 10.0);
        // 10 × 2.2 × 1.6 = 35.2
        assert_eq!(petal_max_hp(&data, Rarity::Rare, 3), 35.0);
    }

    #[test]
    fn test_reload_cycle() {
        let data = GameData::default();
        let tuning = data.combat;
        let mut o = Orbital::new(1, OrbitalKind::Blade, Rarity::Common, 1, &data);

        let hit = o.take_damage(50.0, &tuning);
        assert!(hit.broke);
        assert_eq!(o.hp, 0.0);
        assert!(!o.is_active());

        // Already reloading: no second transition
        assert_eq!(o.take_damage(5.0, &tuning), PetalHit::default());

        assert!(!o.tick_timers(0.5, &tuning));
        assert!(o.tick_timers(0.3, &tuning));
        assert!(o.is_active());
        assert_eq!(o.hp, o.max_hp);
        assert!(!o.can_attack());
        o.tick_timers(0.5, &tuning);
        assert!(o.can_attack());
    }

    #[test]
    fn test_layout_spreads_evenly() {
        let data = GameData::default();
        let mut petals: Vec<Orbital> = (0..4)
            .map(|i| Orbital::new(i, OrbitalKind::Blade, Rarity::Common, 1, &data))
            .collect();
        let center = Vec2::splat(1000.0);
        // dt large enough to settle immediately
        layout(&mut petals, &frame(center), &data, 1.0);
        let expected_radius = 50.0 + 18.0;
        for (i, p) in petals.iter().enumerate() {
            assert_relative_eq!(p.pos.distance(center), expected_radius, epsilon = 1e-3);
            assert_relative_eq!(normalize_angle(p.spacing), normalize_angle(i as f32 / 4.0 * TAU), epsilon = 1e-4);
        }
    }

    #[test]
    fn test_melee_hit_costs_petal_health() {
        let mut arena = Arena::new();
        let center = Vec2::splat(3000.0);
        let mut petals = vec![Orbital::new(1, OrbitalKind::Blade, Rarity::Common, 1, &arena.data)];
        arena.add_enemy(EnemyKind::Tank, center + Vec2::new(68.0, 0.0));

        arena.step(&mut petals, &frame(center), 1.0 / 60.0);
        let tank = &arena.enemies[0];
        assert_relative_eq!(tank.hp, 55.0 - 15.0);
        let recoil = tank.damage * 0.15;
        assert_relative_eq!(petals[0].hp, 10.0 - recoil);

        // Cooldown holds the next hit
        arena.step(&mut petals, &frame(center), 1.0 / 60.0);
        assert_relative_eq!(arena.enemies[0].hp, 40.0);
    }

    #[test]
    fn test_reloading_petal_never_attacks() {
        let mut arena = Arena::new();
        let center = Vec2::splat(3000.0);
        let mut petals = vec![Orbital::new(1, OrbitalKind::Blade, Rarity::Common, 1, &arena.data)];
        arena.add_enemy(EnemyKind::Golem, center + Vec2::new(68.0, 0.0));
        petals[0].take_damage(100.0, &arena.data.combat);

        for _ in 0..60 {
            arena.step(&mut petals, &frame(center), 1.0 / 60.0);
            if !petals[0].is_active() {
                assert_eq!(arena.enemies[0].hp, arena.enemies[0].max_hp);
            }
        }
        assert!(petals[0].is_active());
    }

    #[test]
    fn test_shooter_fires_at_nearest() {
        let mut arena = Arena::new();
        let center = Vec2::splat(3000.0);
        let mut petals = vec![Orbital::new(1, OrbitalKind::Shooter, Rarity::Common, 1, &arena.data)];
        arena.add_enemy(EnemyKind::Blob, center + Vec2::new(200.0, 0.0));
        arena.step(&mut petals, &frame(center), 1.0 / 60.0);
        assert_eq!(arena.projectiles.len(), 1);
        assert_eq!(arena.projectiles[0].owner, Owner::Player);
        assert_relative_eq!(petals[0].attack_timer, 1.2);
    }

    #[test]
    fn test_lifesteal_reported() {
        let mut arena = Arena::new();
        let center = Vec2::splat(3000.0);
        let mut petals = vec![Orbital::new(1, OrbitalKind::Leech, Rarity::Common, 1, &arena.data)];
        // Leech orbits at 45 + 18
        arena.add_enemy(EnemyKind::Tank, center + Vec2::new(63.0, 0.0));
        let outcome = arena.step(&mut petals, &frame(center), 1.0 / 60.0);
        assert_relative_eq!(outcome.lifesteal, 7.0 * 0.3);
    }

    #[test]
    fn test_shield_block_only_when_active() {
        let data = GameData::default();
        let mut o = Orbital::new(1, OrbitalKind::Shield, Rarity::Common, 3, &data);
        assert_relative_eq!(o.block(&data), 0.15 * 1.3);
        o.take_damage(1000.0, &data.combat);
        assert_eq!(o.block(&data), 0.0);
    }

    #[test]
    fn test_shield_block_scales_with_rarity() {
        let data = GameData::default();
        let common = Orbital::new(1, OrbitalKind::Shield, Rarity::Common, 1, &data);
        let legendary = Orbital::new(2, OrbitalKind::Shield, Rarity::Legendary, 1, &data);
        assert_relative_eq!(common.block(&data), 0.15);
        assert_relative_eq!(legendary.block(&data), 0.15 * 4.5);
        assert!(legendary.block(&data) > common.block(&data));
    }

    #[test]
    fn test_shooter_projectile_grows_with_level() {
        let mut arena = Arena::new();
        let center = Vec2::splat(3000.0);
        let mut petals = vec![Orbital::new(1, OrbitalKind::Shooter, Rarity::Common, 6, &arena.data)];
        arena.add_enemy(EnemyKind::Blob, center + Vec2::new(200.0, 0.0));
        arena.step(&mut petals, &frame(center), 1.0 / 60.0);
        assert_eq!(arena.projectiles.len(), 1);
        assert_relative_eq!(arena.projectiles[0].size, 4.0 * 1.5);
        assert_relative_eq!(petals[0].attack_timer, 1.2 / 1.5);
    }

    #[test]
    fn test_nova_reach_and_rate_grow_with_level() {
        let center = Vec2::splat(3000.0);
        // Nova orbits at 35 + 18; the golem (radius 30) sits 160 from the petal
        let enemy_pos = center + Vec2::new(53.0 + 160.0, 0.0);

        let mut arena = Arena::new();
        let mut low = vec![Orbital::new(1, OrbitalKind::Nova, Rarity::Common, 1, &arena.data)];
        arena.add_enemy(EnemyKind::Golem, enemy_pos);
        arena.step(&mut low, &frame(center), 1.0 / 60.0);
        assert_eq!(arena.enemies[0].hp, arena.enemies[0].max_hp);
        assert_relative_eq!(low[0].attack_timer, 3.0);

        // Level 3 reaches 120 × 1.16 + 30 = 169.2
        let mut arena = Arena::new();
        let mut high = vec![Orbital::new(1, OrbitalKind::Nova, Rarity::Common, 3, &arena.data)];
        arena.add_enemy(EnemyKind::Golem, enemy_pos);
        arena.step(&mut high, &frame(center), 1.0 / 60.0);
        assert!(arena.enemies[0].hp < arena.enemies[0].max_hp);
        assert_relative_eq!(high[0].attack_timer, 3.0 / 1.2);
    }

    #[test]
    fn test_level_up_stops_at_max() {
        let data = GameData::default();
        let mut o = Orbital::new(1, OrbitalKind::Blade, Rarity::Common, 9, &data);
        assert!(o.level_up(&data));
        assert_eq!(o.level, MAX_ORBITAL_LEVEL);
        assert!(!o.level_up(&data));
        assert_eq!(o.hp, o.max_hp);
    }
}
