//! Wave pacing, enemy budgets and boss cadence
//!
//! The director only decides *what* should happen this step; spawning is
//! done by the helpers below against the world's collections.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::offset;
use super::enemy::Enemy;
use super::events::{Spawned, StepEffects};
use super::state::IdAllocator;
use crate::clamp_to_world;
use crate::consts::MAX_ENEMIES;
use crate::data::{EnemyDef, GameData, WaveTuning};

/// Ordinary enemies dispatched in a wave
pub fn enemy_count(wave: u32) -> u32 {
    let w = wave as f64;
    ((8.0 + 4.0 * w + w.powf(1.4)) * 3.0).floor() as u32
}

/// Stat multiplier for ordinary enemies
pub fn wave_scale(wave: u32) -> f32 {
    1.0 + 0.12 * wave as f32
}

/// Seconds between spawn dispatches
pub fn spawn_interval(wave: u32) -> f32 {
    ((0.2 - 0.004 * wave as f32) / 3.0).max(0.01)
}

pub fn is_boss_wave(wave: u32, interval: u32) -> bool {
    interval > 0 && wave > 0 && wave % interval == 0
}

/// Boss template for a boss wave, clamped to the last template
pub fn boss_index(wave: u32, interval: u32, count: usize) -> usize {
    let n = (wave / interval.max(1)).saturating_sub(1) as usize;
    n.min(count.saturating_sub(1))
}

/// Boss stat multiplier; grows with each elapsed boss interval
pub fn boss_scale(wave: u32, tuning: &WaveTuning) -> f32 {
    let n = (wave / tuning.boss_interval.max(1)).saturating_sub(1);
    1.0 + n as f32 * tuning.boss_scale_step
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WavePhase {
    BetweenWaves {
        timer: f32,
    },
    Active {
        budget: u32,
        spawned: u32,
        boss_spawned: bool,
        spawn_timer: f32,
    },
}

/// What the world should do this step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Idle,
    StartWave(u32),
    SpawnRegular,
    SpawnBoss,
    Cleared(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveDirector {
    /// Current (or last finished) wave, 0 before the first
    pub wave: u32,
    pub phase: WavePhase,
}

impl WaveDirector {
    pub fn new(tuning: &WaveTuning) -> Self {
        Self {
            wave: 0,
            phase: WavePhase::BetweenWaves {
                timer: tuning.initial_delay,
            },
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, WavePhase::Active { .. })
    }

    /// Decide this step's action. `alive` is the live enemy count.
    pub fn advance(&mut self, dt: f32, alive: usize, tuning: &WaveTuning) -> Directive {
        match &mut self.phase {
            WavePhase::BetweenWaves { timer } => {
                *timer -= dt;
                if *timer > 0.0 {
                    return Directive::Idle;
                }
                self.wave += 1;
                self.phase = WavePhase::Active {
                    budget: enemy_count(self.wave),
                    spawned: 0,
                    boss_spawned: false,
                    spawn_timer: 0.0,
                };
                Directive::StartWave(self.wave)
            }
            WavePhase::Active {
                budget,
                spawned,
                boss_spawned,
                spawn_timer,
            } => {
                let boss_due = is_boss_wave(self.wave, tuning.boss_interval)
                    && !*boss_spawned
                    && *spawned as f32 >= *budget as f32 * tuning.boss_threshold;
                if boss_due {
                    *boss_spawned = true;
                    return Directive::SpawnBoss;
                }

                if *spawned >= *budget && alive == 0 {
                    let wave = self.wave;
                    self.phase = WavePhase::BetweenWaves {
                        timer: tuning.between_waves,
                    };
                    return Directive::Cleared(wave);
                }

                *spawn_timer -= dt;
                if *spawn_timer <= 0.0 && *spawned < *budget {
                    *spawn_timer = spawn_interval(self.wave);
                    return Directive::SpawnRegular;
                }
                Directive::Idle
            }
        }
    }

    /// Budget still undispatched in the active wave
    pub fn remaining_budget(&self) -> u32 {
        match self.phase {
            WavePhase::Active { budget, spawned, .. } => budget.saturating_sub(spawned),
            WavePhase::BetweenWaves { .. } => 0,
        }
    }

    pub fn record_spawned(&mut self, count: u32) {
        if let WavePhase::Active { spawned, .. } = &mut self.phase {
            *spawned += count;
        }
    }
}

/// Collections the spawn helpers write to
pub struct SpawnTarget<'a, R: Rng + ?Sized> {
    pub data: &'a GameData,
    pub ids: &'a mut IdAllocator,
    pub rng: &'a mut R,
    pub enemies: &'a mut Vec<Enemy>,
    pub effects: &'a mut StepEffects,
}

/// Spawn one pack of a zone-appropriate enemy around the player. Returns
/// how many were created.
pub fn spawn_regular<R: Rng + ?Sized>(
    target: &mut SpawnTarget<'_, R>,
    player_pos: Vec2,
    wave: u32,
    remaining_budget: u32,
) -> u32 {
    let room = MAX_ENEMIES.saturating_sub(target.enemies.len()) as u32;
    if room == 0 || remaining_budget == 0 {
        return 0;
    }
    let data = target.data;
    let tuning = &data.waves;

    let angle = target.rng.random::<f32>() * TAU;
    let dist = target
        .rng
        .random_range(tuning.spawn_min_dist..=tuning.spawn_max_dist);
    let pos = clamp_to_world(offset(player_pos, angle, dist), 50.0);
    let zone = data.zone_at(pos);

    let candidates: Vec<&EnemyDef> = data.enemies.iter().filter(|d| d.spawns_in(zone)).collect();
    let def = if candidates.is_empty() {
        data.enemies.first()
    } else {
        Some(candidates[target.rng.random_range(0..candidates.len())])
    };
    let Some(def) = def else {
        return 0;
    };

    let scale = wave_scale(wave) * (1.0 + tuning.zone_scale * zone as f32);
    let count = def.pack_size.max(1).min(remaining_budget).min(room);
    for i in 0..count {
        let jitter = if i == 0 {
            Vec2::ZERO
        } else {
            Vec2::new(
                target.rng.random_range(-20.0..=20.0),
                target.rng.random_range(-20.0..=20.0),
            )
        };
        let at = clamp_to_world(pos + jitter, def.body.radius);
        let id = target.ids.next();
        target
            .enemies
            .push(Enemy::from_def(id, def, at, scale, &data.combat));
        target.effects.spawn(id, Spawned::Enemy(def.kind), at);
    }
    count
}

/// Spawn the boss for `wave`. Returns its id, or None with no templates.
pub fn spawn_boss<R: Rng + ?Sized>(
    target: &mut SpawnTarget<'_, R>,
    player_pos: Vec2,
    wave: u32,
) -> Option<u32> {
    let data = target.data;
    if data.bosses.is_empty() {
        return None;
    }
    let index = boss_index(wave, data.waves.boss_interval, data.bosses.len());
    let def = &data.bosses[index];
    let scale = boss_scale(wave, &data.waves);

    let angle = target.rng.random::<f32>() * TAU;
    let pos = clamp_to_world(offset(player_pos, angle, 600.0), 100.0);
    let id = target.ids.next();
    target
        .enemies
        .push(Enemy::boss(id, index, def, pos, scale, &data.combat));
    target.effects.spawn(id, Spawned::Boss(index), pos);
    log::info!(
        "Wave {wave}: boss {} spawned (scale {scale:.2})",
        def.name
    );
    Some(id)
}
