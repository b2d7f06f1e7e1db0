//! Shared damage primitives
//!
//! Pure functions over attacker numbers and defender state. Target queries
//! return indices into the enemy slice so callers can apply damage after the
//! query borrow ends.

use rand::Rng;

use super::collision::{beam_hits_circle, circles_overlap};
use super::enemy::Enemy;
use super::projectile::Projectile;
use crate::data::CombatTuning;
use crate::heading;
use glam::Vec2;

/// Armor first (never below 1), then the shield block fraction (capped)
pub fn mitigate(raw: f32, armor: f32, block: f32, block_cap: f32) -> f32 {
    if raw <= 0.0 {
        return 0.0;
    }
    let after_armor = (raw - armor.max(0.0)).max(1.0);
    after_armor * (1.0 - block.clamp(0.0, block_cap))
}

/// Rate-limit a contact attacker. Returns true and restarts the cooldown
/// when the attacker may hit.
pub fn try_contact(timer: &mut f32, cooldown: f32) -> bool {
    if *timer > 0.0 {
        return false;
    }
    *timer = cooldown;
    true
}

/// What a collision cost a projectile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Absorption {
    /// Hit points spent
    pub dealt: f32,
    pub before: f32,
    pub after: f32,
    pub destroyed: bool,
}

/// Spend a projectile's hit points on a collision.
///
/// `spent` is how much damage the exchange cost it, capped at its per-hit
/// damage and its remaining hit points. A survivor bounces back with a
/// random scatter, slows down and shrinks with its remaining hit points.
pub fn absorb<R: Rng + ?Sized>(
    proj: &mut Projectile,
    spent: f32,
    tuning: &CombatTuning,
    rng: &mut R,
) -> Absorption {
    let before = proj.hp;
    if proj.dead {
        return Absorption {
            dealt: 0.0,
            before,
            after: before,
            destroyed: false,
        };
    }

    let dealt = spent.max(0.0).min(proj.damage).min(before);
    proj.hp = before - dealt;

    if proj.hp <= 0.0 {
        proj.hp = 0.0;
        proj.dead = true;
        return Absorption {
            dealt,
            before,
            after: 0.0,
            destroyed: true,
        };
    }

    let scatter = tuning.projectile_scatter;
    let angle = heading(proj.vel)
        + std::f32::consts::PI
        + rng.random_range(-scatter..=scatter);
    proj.speed *= tuning.projectile_speed_keep;
    proj.vel = Vec2::from_angle(angle) * proj.speed;
    let ratio = if proj.max_hp > 0.0 {
        proj.hp / proj.max_hp
    } else {
        0.0
    };
    proj.size = (proj.base_size * ratio).max(tuning.projectile_min_size);
    proj.damage = proj.hp;

    Absorption {
        dealt,
        before,
        after: proj.hp,
        destroyed: false,
    }
}

/// Nearest targetable enemy within `range` of `from`, skipping `exclude`
pub fn nearest_enemy(enemies: &[Enemy], from: Vec2, range: f32, exclude: &[u32]) -> Option<usize> {
    let range_sq = range * range;
    enemies
        .iter()
        .enumerate()
        .filter(|(_, e)| e.targetable() && !exclude.contains(&e.id))
        .map(|(i, e)| (i, e.pos.distance_squared(from)))
        .filter(|&(_, d)| d <= range_sq)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

/// Chain hop sequence starting at `first`. Each hop picks the nearest
/// enemy not already in the chain within `bounce_range` of the last one.
pub fn chain_path(enemies: &[Enemy], first: usize, hops: u32, bounce_range: f32) -> Vec<usize> {
    let Some(start) = enemies.get(first).filter(|e| e.targetable()) else {
        return Vec::new();
    };
    let mut path = vec![first];
    let mut hit = vec![start.id];
    let mut from = start.pos;

    for _ in 0..hops {
        let Some(next) = nearest_enemy(enemies, from, bounce_range, &hit) else {
            break;
        };
        hit.push(enemies[next].id);
        from = enemies[next].pos;
        path.push(next);
    }
    path
}

/// Damage for position `hop` in a chain: full scaled damage first, a fixed
/// fraction of that afterwards
pub fn chain_damage(base: f32, hop: usize, tuning: &CombatTuning) -> f32 {
    let first = base * tuning.chain_damage_scale;
    if hop == 0 {
        first
    } else {
        first * tuning.chain_hop_scale
    }
}

/// Every targetable enemy intersecting a beam
pub fn beam_targets(
    enemies: &[Enemy],
    origin: Vec2,
    angle: f32,
    range: f32,
    half_width: f32,
) -> Vec<usize> {
    enemies
        .iter()
        .enumerate()
        .filter(|(_, e)| {
            e.targetable() && beam_hits_circle(origin, angle, range, half_width, e.pos, e.radius)
        })
        .map(|(i, _)| i)
        .collect()
}

/// Every targetable enemy whose body overlaps the pulse radius
pub fn area_targets(enemies: &[Enemy], center: Vec2, radius: f32) -> Vec<usize> {
    enemies
        .iter()
        .enumerate()
        .filter(|(_, e)| e.targetable() && circles_overlap(center, radius, e.pos, e.radius))
        .map(|(i, _)| i)
        .collect()
}
