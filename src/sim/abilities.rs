//! Timer-driven enemy abilities
//!
//! Every ability is an optional component on the enemy with its own
//! countdown. Components never share timers, so a boss can carry all of
//! them at once. Effects that touch other entities (projectiles, hazards,
//! children, heals) are written into an [`AbilityContext`] and merged by
//! the world after the enemy pass.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::enemy::Enemy;
use super::events::{Spawned, StepEffects, Target};
use super::projectile::{Owner, Projectile};
use super::state::{Hazard, IdAllocator};
use crate::consts::MAX_ENEMIES;
use crate::data::{
    AbilityConfig, AreaConfig, BurstConfig, CombatTuning, DashConfig, GameData, HealConfig,
    PhaseConfig, ShieldConfig, ShootConfig, SpawnerConfig, SpiralConfig, TeleportConfig,
};
use crate::{clamp_to_world, heading};

/// Repeating countdown
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cooldown {
    pub interval: f32,
    pub remaining: f32,
}

impl Cooldown {
    /// Starts a full interval away from firing
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            remaining: interval,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.remaining = (self.remaining - dt).max(0.0);
    }

    pub fn ready(&self) -> bool {
        self.remaining <= 0.0
    }

    pub fn reset(&mut self) {
        self.remaining = self.interval;
    }

    /// Advance and, if elapsed, restart. Returns whether it fired.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.advance(dt);
        if self.ready() {
            self.reset();
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dash {
    pub cfg: DashConfig,
    pub timer: Cooldown,
    /// Remaining burst time
    pub active: f32,
    pub dir: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shoot {
    pub cfg: ShootConfig,
    pub timer: Cooldown,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spawner {
    pub cfg: SpawnerConfig,
    pub timer: Cooldown,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Healer {
    pub cfg: HealConfig,
    pub timer: Cooldown,
}

/// Two-length duty cycle: visible for `cfg.interval`, phased for the
/// tuned phased duration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub cfg: PhaseConfig,
    pub remaining: f32,
    pub phased: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Teleport {
    pub cfg: TeleportConfig,
    pub timer: Cooldown,
}

/// Off for `cfg.interval`, on for `cfg.duration`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShieldPhase {
    pub cfg: ShieldConfig,
    pub remaining: f32,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spiral {
    pub cfg: SpiralConfig,
    pub timer: Cooldown,
    pub angle: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Burst {
    pub cfg: BurstConfig,
    pub timer: Cooldown,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaDenial {
    pub cfg: AreaConfig,
    pub timer: Cooldown,
}

/// Capability components attached to one enemy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Abilities {
    pub dash: Option<Dash>,
    pub shoot: Option<Shoot>,
    pub spawner: Option<Spawner>,
    pub heal: Option<Healer>,
    pub phase: Option<Phase>,
    pub teleport: Option<Teleport>,
    pub shield: Option<ShieldPhase>,
    pub spiral: Option<Spiral>,
    pub burst: Option<Burst>,
    pub area: Option<AreaDenial>,
}

impl Abilities {
    pub fn from_config(cfg: &AbilityConfig) -> Self {
        Self {
            dash: cfg.dash.map(|cfg| Dash {
                cfg,
                timer: Cooldown::new(cfg.interval),
                active: 0.0,
                dir: Vec2::ZERO,
            }),
            shoot: cfg.shoot.map(|cfg| Shoot {
                cfg,
                timer: Cooldown::new(cfg.interval),
            }),
            spawner: cfg.spawner.map(|cfg| Spawner {
                cfg,
                timer: Cooldown::new(cfg.interval),
            }),
            heal: cfg.heal.map(|cfg| Healer {
                cfg,
                timer: Cooldown::new(cfg.interval),
            }),
            phase: cfg.phase.map(|cfg| Phase {
                cfg,
                remaining: cfg.interval,
                phased: false,
            }),
            teleport: cfg.teleport.map(|cfg| Teleport {
                cfg,
                timer: Cooldown::new(cfg.interval),
            }),
            shield: cfg.shield.map(|cfg| ShieldPhase {
                cfg,
                remaining: cfg.interval,
                active: false,
            }),
            spiral: cfg.spiral.map(|cfg| Spiral {
                cfg,
                timer: Cooldown::new(cfg.interval),
                angle: 0.0,
            }),
            burst: cfg.burst.map(|cfg| Burst {
                cfg,
                timer: Cooldown::new(cfg.interval),
            }),
            area: cfg.area.map(|cfg| AreaDenial {
                cfg,
                timer: Cooldown::new(cfg.interval),
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Deferred heal from a healer; applied once every enemy has moved
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealPulse {
    pub source: u32,
    pub pos: Vec2,
    pub range: f32,
    pub amount: f32,
}

/// Everything an ability may write to outside its own enemy
pub struct AbilityContext<'a, R: Rng + ?Sized> {
    pub data: &'a GameData,
    pub player_pos: Vec2,
    pub wave_scale: f32,
    /// Enemies alive before this pass
    pub live_enemies: usize,
    pub ids: &'a mut IdAllocator,
    pub rng: &'a mut R,
    pub projectiles: &'a mut Vec<Projectile>,
    pub hazards: &'a mut Vec<Hazard>,
    pub children: &'a mut Vec<Enemy>,
    pub heals: &'a mut Vec<HealPulse>,
    pub effects: &'a mut StepEffects,
}

impl<R: Rng + ?Sized> AbilityContext<'_, R> {
    fn room_for_enemy(&self) -> bool {
        self.live_enemies + self.children.len() < MAX_ENEMIES
    }

    #[allow(clippy::too_many_arguments)]
    fn fire(&mut self, pos: Vec2, angle: f32, speed: f32, damage: f32, size: f32, max_dist: f32) {
        let id = self.ids.next();
        self.projectiles.push(Projectile::new(
            id,
            Owner::Enemy,
            pos,
            angle,
            speed,
            damage,
            size,
            max_dist,
        ));
        self.effects.spawn(id, Spawned::EnemyProjectile, pos);
    }
}

/// Advance one enemy: status effects, duty cycles, movement, then every
/// ability whose timer elapsed. Dead enemies are skipped; phased enemies
/// only advance their timers.
pub fn update_enemy<R: Rng + ?Sized>(enemy: &mut Enemy, dt: f32, ctx: &mut AbilityContext<'_, R>) {
    if enemy.dead {
        return;
    }
    let tuning = ctx.data.combat;

    enemy.contact_timer = (enemy.contact_timer - dt).max(0.0);
    enemy.petal_contact_timer = (enemy.petal_contact_timer - dt).max(0.0);
    let (speed_mult, burn) = enemy.tick_status(dt, &tuning);
    ctx.effects
        .damage(Target::Enemy(enemy.id), burn.dealt, enemy.pos);
    if enemy.dead {
        return;
    }

    update_duty_cycles(enemy, dt, &tuning);
    if enemy.is_phased() {
        return;
    }

    let to_player = ctx.player_pos - enemy.pos;
    let dist = to_player.length();
    let dir = to_player.normalize_or_zero();

    let velocity = movement(enemy, dir, dt, &tuning) * speed_mult;
    enemy.pos += velocity * dt;

    shoot(enemy, to_player, dist, dt, ctx);
    spawn_children(enemy, dt, ctx);
    heal_allies(enemy, dt, ctx);
    teleport(enemy, dt, ctx);
    spiral(enemy, dist, dt, &tuning, ctx);
    burst(enemy, to_player, dist, dt, &tuning, ctx);
    area_denial(enemy, dt, ctx);

    enemy.pos = clamp_to_world(enemy.pos, enemy.radius);
}

fn update_duty_cycles(enemy: &mut Enemy, dt: f32, tuning: &CombatTuning) {
    if let Some(phase) = enemy.abilities.phase.as_mut() {
        phase.remaining -= dt;
        if phase.remaining <= 0.0 {
            phase.phased = !phase.phased;
            phase.remaining = if phase.phased {
                tuning.phased_duration
            } else {
                phase.cfg.interval
            };
        }
    }

    if let Some(shield) = enemy.abilities.shield.as_mut() {
        shield.remaining -= dt;
        if shield.remaining <= 0.0 {
            shield.active = !shield.active;
            shield.remaining = if shield.active {
                shield.cfg.duration
            } else {
                shield.cfg.interval
            };
        }
    }
}

/// Chase velocity. Dashers crawl between bursts.
fn movement(enemy: &mut Enemy, dir: Vec2, dt: f32, tuning: &CombatTuning) -> Vec2 {
    let speed = enemy.speed;
    let Some(dash) = enemy.abilities.dash.as_mut() else {
        return dir * speed;
    };

    if dash.active > 0.0 {
        dash.active = (dash.active - dt).max(0.0);
        return dash.dir * dash.cfg.speed;
    }
    if dash.timer.tick(dt) {
        dash.active = tuning.dash_burst;
        dash.dir = dir;
        return dir * dash.cfg.speed;
    }
    dir * speed * tuning.dash_crawl
}

fn shoot<R: Rng + ?Sized>(
    enemy: &mut Enemy,
    to_player: Vec2,
    dist: f32,
    dt: f32,
    ctx: &mut AbilityContext<'_, R>,
) {
    let boss = enemy.is_boss();
    let (pos, radius, damage) = (enemy.pos, enemy.radius, enemy.damage);
    let Some(shoot) = enemy.abilities.shoot.as_mut() else {
        return;
    };
    shoot.timer.advance(dt);
    if !shoot.timer.ready() || dist > shoot.cfg.range {
        return;
    }
    shoot.timer.reset();

    let (size, damage) = if boss {
        (14.0 + radius * 0.15, damage * 0.8)
    } else {
        (5.0, damage * 0.5)
    };
    let cfg = shoot.cfg;
    ctx.fire(
        pos,
        heading(to_player),
        cfg.proj_speed,
        damage,
        size,
        cfg.range * 1.2,
    );
}

fn spawn_children<R: Rng + ?Sized>(enemy: &mut Enemy, dt: f32, ctx: &mut AbilityContext<'_, R>) {
    let (pos, radius) = (enemy.pos, enemy.radius);
    let Some(spawner) = enemy.abilities.spawner.as_mut() else {
        return;
    };
    if !spawner.timer.tick(dt) {
        return;
    }
    let cfg = spawner.cfg;
    let Some(def) = ctx.data.enemy(cfg.kind) else {
        log::debug!("Spawner references unknown enemy kind {:?}", cfg.kind);
        return;
    };

    let scale = ctx.wave_scale * 0.6;
    for _ in 0..cfg.count {
        if !ctx.room_for_enemy() {
            break;
        }
        let angle = ctx.rng.random::<f32>() * TAU;
        let dist = radius + 15.0 + ctx.rng.random::<f32>() * 20.0;
        let at = clamp_to_world(
            super::collision::offset(pos, angle, dist),
            def.body.radius,
        );
        let id = ctx.ids.next();
        ctx.children
            .push(Enemy::from_def(id, def, at, scale, &ctx.data.combat));
        ctx.effects.spawn(id, Spawned::Enemy(cfg.kind), at);
    }
}

fn heal_allies<R: Rng + ?Sized>(enemy: &mut Enemy, dt: f32, ctx: &mut AbilityContext<'_, R>) {
    let (id, pos) = (enemy.id, enemy.pos);
    let Some(healer) = enemy.abilities.heal.as_mut() else {
        return;
    };
    if healer.timer.tick(dt) {
        ctx.heals.push(HealPulse {
            source: id,
            pos,
            range: healer.cfg.range,
            amount: healer.cfg.amount,
        });
    }
}

fn teleport<R: Rng + ?Sized>(enemy: &mut Enemy, dt: f32, ctx: &mut AbilityContext<'_, R>) {
    let Some(tp) = enemy.abilities.teleport.as_mut() else {
        return;
    };
    if !tp.timer.tick(dt) {
        return;
    }
    let angle = ctx.rng.random::<f32>() * TAU;
    let dist = 150.0 + ctx.rng.random::<f32>() * tp.cfg.range;
    enemy.pos = clamp_to_world(
        super::collision::offset(ctx.player_pos, angle, dist),
        enemy.radius,
    );
}

fn spiral<R: Rng + ?Sized>(
    enemy: &mut Enemy,
    dist: f32,
    dt: f32,
    tuning: &CombatTuning,
    ctx: &mut AbilityContext<'_, R>,
) {
    let (pos, radius, damage) = (enemy.pos, enemy.radius, enemy.damage);
    let Some(spiral) = enemy.abilities.spiral.as_mut() else {
        return;
    };
    spiral.angle = (spiral.angle + tuning.spiral_turn_rate * dt) % TAU;
    spiral.timer.advance(dt);
    if !spiral.timer.ready() || dist > spiral.cfg.range * 1.5 {
        return;
    }
    spiral.timer.reset();

    let cfg = spiral.cfg;
    let base = spiral.angle;
    let count = cfg.count.max(1);
    for i in 0..count {
        let angle = base + i as f32 / count as f32 * TAU;
        ctx.fire(
            pos,
            angle,
            cfg.speed,
            damage * 0.4,
            10.0 + radius * 0.1,
            cfg.range * 1.5,
        );
    }
}

fn burst<R: Rng + ?Sized>(
    enemy: &mut Enemy,
    to_player: Vec2,
    dist: f32,
    dt: f32,
    tuning: &CombatTuning,
    ctx: &mut AbilityContext<'_, R>,
) {
    let (pos, radius, damage) = (enemy.pos, enemy.radius, enemy.damage);
    let Some(burst) = enemy.abilities.burst.as_mut() else {
        return;
    };
    burst.timer.advance(dt);
    if !burst.timer.ready() || dist > burst.cfg.range * 1.5 {
        return;
    }
    burst.timer.reset();

    let cfg = burst.cfg;
    let aim = heading(to_player);
    for i in 0..cfg.count {
        let t = if cfg.count > 1 {
            i as f32 / (cfg.count - 1) as f32 - 0.5
        } else {
            0.0
        };
        let speed = cfg.speed * ctx.rng.random_range(0.8..1.2);
        ctx.fire(
            pos,
            aim + t * tuning.burst_spread,
            speed,
            damage * 0.3,
            8.0 + radius * 0.08,
            cfg.range * 1.2,
        );
    }
}

fn area_denial<R: Rng + ?Sized>(enemy: &mut Enemy, dt: f32, ctx: &mut AbilityContext<'_, R>) {
    let pos = enemy.pos;
    let Some(area) = enemy.abilities.area.as_mut() else {
        return;
    };
    if !area.timer.tick(dt) {
        return;
    }
    let cfg = area.cfg;
    for _ in 0..cfg.count {
        let angle = ctx.rng.random::<f32>() * TAU;
        let dist = 60.0 + ctx.rng.random::<f32>() * 200.0;
        let at = clamp_to_world(super::collision::offset(pos, angle, dist), cfg.radius);
        let id = ctx.ids.next();
        ctx.hazards.push(Hazard {
            id,
            pos: at,
            radius: cfg.radius,
            remaining: cfg.duration,
            dps: cfg.dps,
        });
        ctx.effects.spawn(id, Spawned::Hazard, at);
    }
}

/// Apply queued heals to every living enemy in range except the healer
pub fn apply_heals(enemies: &mut [Enemy], heals: &[HealPulse]) {
    for pulse in heals {
        let range_sq = pulse.range * pulse.range;
        for e in enemies.iter_mut() {
            if e.id != pulse.source && !e.dead && e.pos.distance_squared(pulse.pos) <= range_sq {
                e.heal(pulse.amount);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::EnemyKind;
    use crate::sim::state::IdAllocator;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    struct Harness {
        data: GameData,
        ids: IdAllocator,
        rng: Pcg32,
        projectiles: Vec<Projectile>,
        hazards: Vec<Hazard>,
        children: Vec<Enemy>,
        heals: Vec<HealPulse>,
        effects: StepEffects,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                data: GameData::default(),
                ids: IdAllocator::default(),
                rng: Pcg32::seed_from_u64(11),
                projectiles: Vec::new(),
                hazards: Vec::new(),
                children: Vec::new(),
                heals: Vec::new(),
                effects: StepEffects::default(),
            }
        }

        fn run(&mut self, enemy: &mut Enemy, player_pos: Vec2, dt: f32, steps: usize) {
            for _ in 0..steps {
                let mut ctx = AbilityContext {
                    data: &self.data,
                    player_pos,
                    wave_scale: 1.0,
                    live_enemies: 1,
                    ids: &mut self.ids,
                    rng: &mut self.rng,
                    projectiles: &mut self.projectiles,
                    hazards: &mut self.hazards,
                    children: &mut self.children,
                    heals: &mut self.heals,
                    effects: &mut self.effects,
                };
                update_enemy(enemy, dt, &mut ctx);
            }
        }

        fn enemy(&self, kind: EnemyKind, pos: Vec2) -> Enemy {
            let def = self.data.enemy(kind).unwrap();
            Enemy::from_def(1000, def, pos, 1.0, &self.data.combat)
        }

        fn boss(&self, index: usize, pos: Vec2) -> Enemy {
            Enemy::boss(1000, index, &self.data.bosses[index], pos, 1.0, &self.data.combat)
        }
    }

    #[test]
    fn test_cooldown_tick() {
        let mut c = Cooldown::new(1.0);
        assert!(!c.tick(0.6));
        assert!(c.tick(0.6));
        assert_relative_eq!(c.remaining, 1.0);
    }

    #[test]
    fn test_chaser_moves_toward_player() {
        let mut h = Harness::new();
        let start = Vec2::splat(5000.0);
        let mut e = h.enemy(EnemyKind::Blob, start);
        h.run(&mut e, start + Vec2::new(500.0, 0.0), 0.1, 1);
        assert_relative_eq!(e.pos.x, start.x + 6.5, epsilon = 1e-3);
    }

    #[test]
    fn test_dasher_bursts_then_crawls() {
        let mut h = Harness::new();
        let start = Vec2::splat(5000.0);
        let mut e = h.enemy(EnemyKind::Dasher, start);
        let target = start + Vec2::new(3000.0, 0.0);

        // Crawl before the first dash
        h.run(&mut e, target, 0.1, 1);
        assert_relative_eq!(e.pos.x - start.x, 170.0 * 0.3 * 0.1, epsilon = 1e-3);

        // Dash fires once the 2.2 s interval elapses
        h.run(&mut e, target, 0.1, 22);
        let dash = e.abilities.dash.unwrap();
        assert!(dash.active > 0.0);
    }

    #[test]
    fn test_shooter_waits_for_range() {
        let mut h = Harness::new();
        let start = Vec2::splat(5000.0);
        let mut e = h.enemy(EnemyKind::Sniper, start);
        h.run(&mut e, start + Vec2::new(2000.0, 0.0), 0.1, 30);
        assert!(h.projectiles.is_empty());
        assert!(e.abilities.shoot.unwrap().timer.ready());

        let target = e.pos + Vec2::new(300.0, 0.0);
        h.run(&mut e, target, 0.1, 1);
        assert_eq!(h.projectiles.len(), 1);
        let p = &h.projectiles[0];
        assert_eq!(p.owner, Owner::Enemy);
        assert_relative_eq!(p.damage, e.damage * 0.5);
        assert_relative_eq!(p.max_dist, 480.0);
    }

    #[test]
    fn test_phase_duty_cycle() {
        let mut h = Harness::new();
        let start = Vec2::splat(5000.0);
        let mut e = h.enemy(EnemyKind::Wraith, start);
        let player = start + Vec2::new(1000.0, 0.0);
        h.run(&mut e, player, 0.1, 31);
        assert!(e.is_phased());

        // Immobile while phased
        let frozen = e.pos;
        h.run(&mut e, player, 0.1, 5);
        assert_eq!(e.pos, frozen);

        h.run(&mut e, player, 0.1, 11);
        assert!(!e.is_phased());
    }

    #[test]
    fn test_spawner_respects_cap() {
        let mut h = Harness::new();
        let start = Vec2::splat(5000.0);
        let mut e = h.enemy(EnemyKind::Spawner, start);
        h.run(&mut e, start, 0.1, 31);
        assert_eq!(h.children.len(), 3);
        for child in &h.children {
            assert!(child.pos.distance(e.pos) < e.radius + 40.0 + 5.0);
            assert_relative_eq!(child.max_hp, 15.0 * 0.6);
        }

        let mut ctx = AbilityContext {
            data: &h.data,
            player_pos: start,
            wave_scale: 1.0,
            live_enemies: MAX_ENEMIES,
            ids: &mut h.ids,
            rng: &mut h.rng,
            projectiles: &mut h.projectiles,
            hazards: &mut h.hazards,
            children: &mut h.children,
            heals: &mut h.heals,
            effects: &mut h.effects,
        };
        e.abilities.spawner.as_mut().unwrap().timer.remaining = 0.0;
        update_enemy(&mut e, 0.1, &mut ctx);
        assert_eq!(h.children.len(), 3);
    }

    #[test]
    fn test_heal_skips_self_and_caps() {
        let data = GameData::default();
        let def = data.enemy(EnemyKind::Tank).unwrap();
        let mut enemies: Vec<Enemy> = (0..3)
            .map(|i| Enemy::from_def(i, def, Vec2::new(i as f32 * 100.0, 0.0), 1.0, &data.combat))
            .collect();
        for e in &mut enemies {
            e.hp = 10.0;
        }
        apply_heals(
            &mut enemies,
            &[HealPulse {
                source: 0,
                pos: Vec2::ZERO,
                range: 150.0,
                amount: 100.0,
            }],
        );
        assert_eq!(enemies[0].hp, 10.0);
        assert_eq!(enemies[1].hp, enemies[1].max_hp);
        assert_eq!(enemies[2].hp, 10.0);
    }

    #[test]
    fn test_boss_runs_every_ability() {
        let mut h = Harness::new();
        let start = Vec2::splat(6000.0);
        let mut boss = h.boss(7, start);
        h.run(&mut boss, start + Vec2::new(200.0, 0.0), 1.0 / 60.0, 60 * 12);
        assert!(!h.projectiles.is_empty());
        assert!(!h.hazards.is_empty());
        assert!(!h.children.is_empty());
        assert!(!h.heals.is_empty());
        assert!(boss.pos.x >= boss.radius && boss.pos.x <= crate::consts::WORLD_SIZE);
    }

    #[test]
    fn test_teleport_lands_around_player() {
        let mut h = Harness::new();
        let player = Vec2::splat(6000.0);
        let mut e = h.enemy(EnemyKind::Blob, player + Vec2::new(2000.0, 0.0));
        e.abilities = Abilities::from_config(&AbilityConfig {
            teleport: Some(TeleportConfig {
                interval: 1.0,
                range: 300.0,
            }),
            ..Default::default()
        });

        for _ in 0..20 {
            if let Some(tp) = e.abilities.teleport.as_mut() {
                tp.timer.remaining = 0.01;
            }
            h.run(&mut e, player, 0.05, 1);
            let dist = e.pos.distance(player);
            assert!(dist >= 150.0 - 1e-2 && dist <= 450.0 + 1e-2, "landed {dist} away");
        }
    }

    #[test]
    fn test_spiral_fires_even_ring_in_range() {
        let mut h = Harness::new();
        let start = Vec2::splat(5000.0);
        let mut e = h.enemy(EnemyKind::Blob, start);
        e.abilities = Abilities::from_config(&AbilityConfig {
            spiral: Some(SpiralConfig {
                interval: 0.5,
                count: 6,
                speed: 150.0,
                range: 200.0,
            }),
            ..Default::default()
        });

        // Timer elapses while the player is beyond 1.5 × range
        h.run(&mut e, start + Vec2::new(1000.0, 0.0), 0.1, 10);
        assert!(h.projectiles.is_empty());
        assert!(e.abilities.spiral.unwrap().timer.ready());

        let target = e.pos + Vec2::new(100.0, 0.0);
        h.run(&mut e, target, 0.1, 1);
        assert_eq!(h.projectiles.len(), 6);
        let headings: Vec<f32> = h.projectiles.iter().map(|p| heading(p.vel)).collect();
        for pair in headings.windows(2) {
            assert_relative_eq!(
                crate::normalize_angle(pair[1] - pair[0]),
                TAU / 6.0,
                epsilon = 1e-4
            );
        }
        assert!(h.projectiles.iter().all(|p| p.owner == Owner::Enemy));
    }

    #[test]
    fn test_burst_spreads_toward_target() {
        let mut h = Harness::new();
        let start = Vec2::splat(5000.0);
        let mut e = h.enemy(EnemyKind::Blob, start);
        e.abilities = Abilities::from_config(&AbilityConfig {
            burst: Some(BurstConfig {
                interval: 0.5,
                count: 5,
                speed: 200.0,
                range: 250.0,
            }),
            ..Default::default()
        });

        // Straight above, so chasing never bends the aim
        h.run(&mut e, start + Vec2::new(0.0, 200.0), 0.1, 6);
        assert_eq!(h.projectiles.len(), 5);

        let aim = std::f32::consts::FRAC_PI_2;
        let spread = h.data.combat.burst_spread;
        let headings: Vec<f32> = h.projectiles.iter().map(|p| heading(p.vel)).collect();
        assert_relative_eq!(headings[0], aim - spread / 2.0, epsilon = 1e-4);
        assert_relative_eq!(headings[2], aim, epsilon = 1e-4);
        assert_relative_eq!(headings[4], aim + spread / 2.0, epsilon = 1e-4);
        for p in &h.projectiles {
            assert!(p.speed >= 160.0 && p.speed <= 240.0);
        }
    }

    #[test]
    fn test_abilities_from_empty_config() {
        assert!(Abilities::from_config(&AbilityConfig::default()).is_empty());
    }
}
