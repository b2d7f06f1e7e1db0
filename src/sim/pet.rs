//! Healing companion
//!
//! The pet keeps to the side of the player facing away from nearby enemies,
//! soaks contact damage, and periodically launches homing pellets that heal
//! the player on arrival. When knocked out it revives after a fixed delay.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::abilities::Cooldown;
use super::collision::{circle_contact, offset};
use super::enemy::Enemy;
use super::events::{GameEvent, Spawned, StepEffects, Target};
use super::player::Player;
use super::state::IdAllocator;
use crate::data::{GameData, OrbitalKind};
use crate::{clamp_to_world, heading, normalize_angle};

/// Radius around the player that counts as a threat
const THREAT_RANGE: f32 = 400.0;
/// Default follow distance when the player has no petals
const DEFAULT_FOLLOW: f32 = 55.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealPellet {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32,
    pub heal: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pet {
    pub pos: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    pub alive: bool,
    pub revive_timer: f32,
    /// Angle around the player the pet settles at
    pub angle: f32,
    pub heal_timer: Cooldown,
    pub pellets: Vec<HealPellet>,
}

impl Pet {
    pub fn new(player: &Player, data: &GameData) -> Self {
        let max_hp = player.stats.max_hp * data.pet.hp_fraction;
        Self {
            pos: player.pos + Vec2::new(40.0, 0.0),
            hp: max_hp,
            max_hp,
            alive: true,
            revive_timer: 0.0,
            angle: 0.0,
            heal_timer: Cooldown::new(data.pet.heal_interval),
            pellets: Vec::new(),
        }
    }

    /// Apply damage; a knockout starts the revive timer exactly once
    pub fn take_damage(&mut self, amount: f32, data: &GameData) -> (f32, bool) {
        if !self.alive || amount <= 0.0 {
            return (0.0, false);
        }
        let before = self.hp;
        self.hp = (self.hp - amount).max(0.0);
        let downed = self.hp <= 0.0;
        if downed {
            self.alive = false;
            self.revive_timer = data.pet.revive_time;
            self.pellets.clear();
        }
        (before - self.hp, downed)
    }
}

/// Follow distance from the player's first petal orbit
fn follow_distance(player: &Player, data: &GameData) -> f32 {
    player
        .orbitals
        .first()
        .and_then(|o| data.orbital(o.kind))
        .map(|d| (d.orbit_dist * 0.7).clamp(data.pet.min_follow, data.pet.max_follow))
        .unwrap_or(DEFAULT_FOLLOW)
}

/// Heal per pellet, grown by the level of the player's best healing petal
fn pellet_heal(player: &Player, data: &GameData) -> f32 {
    let level = player
        .orbitals
        .iter()
        .filter(|o| o.kind == OrbitalKind::Leech)
        .map(|o| o.level)
        .max()
        .unwrap_or(1);
    player.stats.max_hp * data.pet.heal_fraction * (1.0 + (level - 1) as f32 * data.pet.heal_per_level)
}

/// Advance the pet for one step. Returns the healing delivered to the player.
pub fn update_pet(
    pet: &mut Pet,
    player: &Player,
    enemies: &[Enemy],
    data: &GameData,
    dt: f32,
    ids: &mut IdAllocator,
    effects: &mut StepEffects,
) -> f32 {
    let tuning = &data.pet;
    pet.max_hp = player.stats.max_hp * tuning.hp_fraction;
    pet.hp = pet.hp.min(pet.max_hp);

    if !pet.alive {
        pet.revive_timer -= dt;
        if pet.revive_timer <= 0.0 {
            pet.alive = true;
            pet.hp = pet.max_hp;
            pet.pos = clamp_to_world(player.pos + Vec2::new(40.0, 0.0), tuning.radius);
            pet.heal_timer.reset();
            effects.event(GameEvent::PetRevived);
        }
        return 0.0;
    }

    pet.hp = (pet.hp + pet.max_hp * tuning.regen_fraction * dt).min(pet.max_hp);
    follow(pet, player, enemies, data, dt);

    for e in enemies.iter().filter(|e| e.targetable()) {
        if !circle_contact(pet.pos, tuning.radius, e.pos, e.radius).hit() {
            continue;
        }
        let (dealt, downed) = pet.take_damage(e.damage * data.combat.pet_contact_scale * dt, data);
        effects.damage(Target::Pet, dealt, pet.pos);
        if downed {
            effects.death(Target::Pet, pet.pos, false);
            effects.event(GameEvent::PetDown);
            log::debug!("Pet knocked out, reviving in {:.1}s", tuning.revive_time);
            return 0.0;
        }
    }

    let hurt = player.hp < player.stats.max_hp;
    if pet.heal_timer.tick(dt) && hurt && !player.is_dead() {
        let id = ids.next();
        let vel = Vec2::from_angle(heading(player.pos - pet.pos)) * tuning.pellet_speed;
        pet.pellets.push(HealPellet {
            id,
            pos: pet.pos,
            vel,
            life: tuning.pellet_life,
            heal: pellet_heal(player, data),
        });
        effects.spawn(id, Spawned::HealPellet, pet.pos);
    }

    steer_pellets(pet, player, data, dt)
}

fn follow(pet: &mut Pet, player: &Player, enemies: &[Enemy], data: &GameData, dt: f32) {
    let tuning = &data.pet;
    let threat: Vec2 = enemies
        .iter()
        .filter(|e| !e.dead && e.pos.distance_squared(player.pos) < THREAT_RANGE * THREAT_RANGE)
        .map(|e| (e.pos - player.pos).normalize_or_zero())
        .sum();
    if threat != Vec2::ZERO {
        let safe = heading(-threat);
        pet.angle = normalize_angle(pet.angle + normalize_angle(safe - pet.angle) * (3.0 * dt).min(1.0));
    }

    let target = offset(player.pos, pet.angle, follow_distance(player, data));
    let to_target = target - pet.pos;
    let speed = (player.stats.speed * 1.2).max(300.0);
    let step = speed * dt;
    pet.pos = if to_target.length() <= step {
        target
    } else {
        pet.pos + to_target.normalize() * step
    };

    let from_player = pet.pos - player.pos;
    if from_player.length() > tuning.snap_dist {
        pet.pos = player.pos + from_player.normalize() * tuning.snap_to;
    }
    pet.pos = clamp_to_world(pet.pos, tuning.radius);
}

/// Home pellets on the player; returns the healing that landed
fn steer_pellets(pet: &mut Pet, player: &Player, data: &GameData, dt: f32) -> f32 {
    let tuning = &data.pet;
    let mut healed = 0.0;
    pet.pellets.retain_mut(|p| {
        let desired = (player.pos - p.pos).normalize_or_zero() * tuning.pellet_speed;
        p.vel += (desired - p.vel) * (tuning.pellet_turn_rate * dt).min(1.0);
        p.pos += p.vel * dt;
        p.life -= dt;
        if p.pos.distance(player.pos) < player.radius + tuning.pellet_size {
            healed += p.heal;
            return false;
        }
        p.life > 0.0
    });
    healed
}
