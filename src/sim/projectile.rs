//! Projectiles with hit points
//!
//! A projectile's remaining hit points start equal to its damage. Every
//! collision spends some of them; see `combat::absorb`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::WORLD_SIZE;

/// Which side fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Enemy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub owner: Owner,
    pub pos: Vec2,
    pub vel: Vec2,
    pub speed: f32,
    /// Damage per hit; tracks remaining hit points after a bounce
    pub damage: f32,
    /// Remaining hit points
    pub hp: f32,
    pub max_hp: f32,
    pub size: f32,
    pub base_size: f32,
    pub traveled: f32,
    pub max_dist: f32,
    pub dead: bool,
}

impl Projectile {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u32,
        owner: Owner,
        pos: Vec2,
        angle: f32,
        speed: f32,
        damage: f32,
        size: f32,
        max_dist: f32,
    ) -> Self {
        Self {
            id,
            owner,
            pos,
            vel: Vec2::from_angle(angle) * speed,
            speed,
            damage,
            hp: damage,
            max_hp: damage,
            size,
            base_size: size,
            traveled: 0.0,
            max_dist,
            dead: false,
        }
    }

    /// Move one step. Expires past its travel distance or outside the world.
    pub fn advance(&mut self, dt: f32) {
        if self.dead {
            return;
        }
        let step = self.vel * dt;
        self.pos += step;
        self.traveled += step.length();

        let out_of_bounds = self.pos.x < 0.0
            || self.pos.y < 0.0
            || self.pos.x > WORLD_SIZE
            || self.pos.y > WORLD_SIZE;
        if self.traveled > self.max_dist || out_of_bounds {
            self.dead = true;
        }
    }
}
