//! Per-step effects handed to presentation collaborators

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::data::{EnemyKind, OrbitalKind, Rarity};
use crate::error::InventoryError;

/// Something that can take damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    Player,
    Pet,
    Enemy(u32),
    Petal(u32),
    Projectile(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageEvent {
    pub target: Target,
    pub amount: f32,
    pub pos: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeathEvent {
    pub target: Target,
    pub pos: Vec2,
    pub boss: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Spawned {
    Enemy(EnemyKind),
    Boss(usize),
    PlayerProjectile,
    EnemyProjectile,
    XpGem,
    Loot(OrbitalKind, Rarity),
    Hazard,
    HealPellet,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnEvent {
    pub id: u32,
    pub what: Spawned,
    pub pos: Vec2,
}

/// Discrete gameplay notifications
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    WaveStarted { wave: u32 },
    WaveCleared { wave: u32 },
    BossSpawned { wave: u32, index: usize },
    LevelUp { level: u32, choice_offered: bool },
    PetalReloading { id: u32 },
    PetalRestored { id: u32 },
    Equipped { kind: OrbitalKind, rarity: Rarity },
    Unequipped { kind: OrbitalKind, rarity: Rarity },
    Stored { kind: OrbitalKind, rarity: Rarity },
    Merged { kind: OrbitalKind, rarity: Rarity },
    RequestRejected(InventoryError),
    PetDown,
    PetRevived,
    PlayerDied,
}

/// Everything observable that happened during one step
#[derive(Debug, Clone, Default)]
pub struct StepEffects {
    pub damage: Vec<DamageEvent>,
    pub deaths: Vec<DeathEvent>,
    pub spawns: Vec<SpawnEvent>,
    pub events: Vec<GameEvent>,
}

impl StepEffects {
    pub fn damage(&mut self, target: Target, amount: f32, pos: Vec2) {
        if amount > 0.0 {
            self.damage.push(DamageEvent {
                target,
                amount,
                pos,
            });
        }
    }

    pub fn death(&mut self, target: Target, pos: Vec2, boss: bool) {
        self.deaths.push(DeathEvent { target, pos, boss });
    }

    pub fn spawn(&mut self, id: u32, what: Spawned, pos: Vec2) {
        self.spawns.push(SpawnEvent { id, what, pos });
    }

    pub fn event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn is_empty(&self) -> bool {
        self.damage.is_empty()
            && self.deaths.is_empty()
            && self.spawns.is_empty()
            && self.events.is_empty()
    }
}
