//! Host state snapshots and client-side interpolation
//!
//! The host serializes an immutable snapshot at a fixed rate. The client
//! keeps the latest two and blends positions with its own accumulated `dt`,
//! so rendering never waits on the network.

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::leaderboard::{LeaderEntry, Leaderboard};
use crate::data::{OrbitalKind, Rarity};
use crate::sim::inventory::Item;
use crate::sim::projectile::Owner;
use crate::sim::state::World;

/// Host snapshot rate
pub const SNAPSHOT_HZ: f32 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PetalSnapshot {
    pub kind: OrbitalKind,
    pub rarity: Rarity,
    pub x: f32,
    pub y: f32,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: u32,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub hp: f32,
    #[serde(rename = "mhp")]
    pub max_hp: f32,
    pub score: u64,
    pub petals: Vec<PetalSnapshot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MobSnapshot {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub r: f32,
    pub hp: f32,
    #[serde(rename = "mhp")]
    pub max_hp: f32,
    #[serde(default)]
    pub boss: bool,
}

/// XP orb on the ground
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbSnapshot {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub v: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSnapshot {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    /// Fired by a mob rather than a player petal
    pub hostile: bool,
}

/// Payload of a `state` message. Short keys keep frames small.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    #[serde(rename = "p")]
    pub players: Vec<PlayerSnapshot>,
    #[serde(rename = "o")]
    pub orbs: Vec<OrbSnapshot>,
    #[serde(rename = "m")]
    pub mobs: Vec<MobSnapshot>,
    #[serde(rename = "pr")]
    pub projectiles: Vec<ProjectileSnapshot>,
    #[serde(rename = "lb")]
    pub leaderboard: Vec<LeaderEntry>,
    /// Receiving player's score, health and max health
    #[serde(rename = "s")]
    pub score: u64,
    pub hp: f32,
    #[serde(rename = "mhp")]
    pub max_hp: f32,
    /// Host time in seconds
    #[serde(rename = "t")]
    pub time: f32,
    #[serde(rename = "inv", default, skip_serializing_if = "Option::is_none")]
    pub inventory: Option<Vec<Item>>,
    #[serde(rename = "ms", default, skip_serializing_if = "Option::is_none")]
    pub max_slots: Option<usize>,
}

/// Snapshot a world for the player it belongs to
pub fn snapshot_from_world(
    world: &World,
    player_id: u32,
    name: &str,
    score: u64,
) -> StateSnapshot {
    let player = &world.player;
    let petals = player
        .orbitals
        .iter()
        .map(|o| PetalSnapshot {
            kind: o.kind,
            rarity: o.rarity,
            x: o.pos.x,
            y: o.pos.y,
            active: o.is_active(),
        })
        .collect();

    StateSnapshot {
        players: vec![PlayerSnapshot {
            id: player_id,
            name: name.to_string(),
            x: player.pos.x,
            y: player.pos.y,
            hp: player.hp,
            max_hp: player.stats.max_hp,
            score,
            petals,
        }],
        orbs: world
            .gems
            .iter()
            .map(|g| OrbSnapshot {
                id: g.id,
                x: g.pos.x,
                y: g.pos.y,
                v: g.amount,
            })
            .collect(),
        mobs: world
            .enemies
            .iter()
            .filter(|e| !e.dead)
            .map(|e| MobSnapshot {
                id: e.id,
                x: e.pos.x,
                y: e.pos.y,
                r: e.radius,
                hp: e.hp,
                max_hp: e.max_hp,
                boss: e.is_boss(),
            })
            .collect(),
        projectiles: world
            .projectiles
            .iter()
            .filter(|p| !p.dead)
            .map(|p| ProjectileSnapshot {
                id: p.id,
                x: p.pos.x,
                y: p.pos.y,
                size: p.size,
                hostile: p.owner == Owner::Enemy,
            })
            .collect(),
        leaderboard: Vec::new(),
        score,
        hp: player.hp,
        max_hp: player.stats.max_hp,
        time: world.time,
        inventory: Some(world.inventory.items().to_vec()),
        max_slots: Some(player.slots),
    }
}

impl StateSnapshot {
    /// Attach the visible slice of the arena board
    pub fn with_leaderboard(mut self, board: &Leaderboard) -> Self {
        self.leaderboard = board.top();
        self
    }
}

/// Latest two snapshots plus the client's blend factor
#[derive(Debug, Clone)]
pub struct SnapshotBuffer {
    latest: Option<StateSnapshot>,
    previous_players: HashMap<u32, Vec2>,
    previous_mobs: HashMap<u32, Vec2>,
    /// Seconds since the latest snapshot arrived
    elapsed: f32,
    /// Expected gap between snapshots
    interval: f32,
}

impl Default for SnapshotBuffer {
    fn default() -> Self {
        Self::new(1.0 / SNAPSHOT_HZ)
    }
}

impl SnapshotBuffer {
    pub fn new(interval: f32) -> Self {
        Self {
            latest: None,
            previous_players: HashMap::new(),
            previous_mobs: HashMap::new(),
            elapsed: 0.0,
            interval: interval.max(f32::EPSILON),
        }
    }

    pub fn latest(&self) -> Option<&StateSnapshot> {
        self.latest.as_ref()
    }

    /// Accept a new snapshot; the current one becomes the blend origin
    pub fn push(&mut self, snapshot: StateSnapshot) {
        self.previous_players.clear();
        self.previous_mobs.clear();
        if let Some(prev) = &self.latest {
            self.previous_players
                .extend(prev.players.iter().map(|p| (p.id, Vec2::new(p.x, p.y))));
            self.previous_mobs
                .extend(prev.mobs.iter().map(|m| (m.id, Vec2::new(m.x, m.y))));
        }
        self.latest = Some(snapshot);
        self.elapsed = 0.0;
    }

    /// Advance the client clock
    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt.max(0.0);
    }

    /// Blend factor in [0, 1]
    pub fn factor(&self) -> f32 {
        (self.elapsed / self.interval).min(1.0)
    }

    fn blend(prev: Option<&Vec2>, current: Vec2, t: f32) -> Vec2 {
        match prev {
            Some(prev) => prev.lerp(current, t),
            None => current,
        }
    }

    /// Interpolated player position; players new in the latest snapshot
    /// sit at their reported position
    pub fn player_pos(&self, id: u32) -> Option<Vec2> {
        let p = self.latest.as_ref()?.players.iter().find(|p| p.id == id)?;
        Some(Self::blend(
            self.previous_players.get(&id),
            Vec2::new(p.x, p.y),
            self.factor(),
        ))
    }

    pub fn mob_pos(&self, id: u32) -> Option<Vec2> {
        let m = self.latest.as_ref()?.mobs.iter().find(|m| m.id == id)?;
        Some(Self::blend(
            self.previous_mobs.get(&id),
            Vec2::new(m.x, m.y),
            self.factor(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameData;
    use crate::sim::state::RunOptions;
    use approx::assert_relative_eq;

    fn with_player(id: u32, x: f32) -> StateSnapshot {
        StateSnapshot {
            players: vec![PlayerSnapshot {
                id,
                name: "a".into(),
                x,
                y: 0.0,
                hp: 10.0,
                max_hp: 10.0,
                score: 0,
                petals: Vec::new(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_interpolates_with_accumulated_dt() {
        let mut buf = SnapshotBuffer::new(0.1);
        buf.push(with_player(1, 0.0));
        buf.push(with_player(1, 100.0));
        assert_relative_eq!(buf.player_pos(1).unwrap().x, 0.0);

        buf.advance(0.05);
        assert_relative_eq!(buf.player_pos(1).unwrap().x, 50.0, epsilon = 1e-3);

        buf.advance(1.0);
        assert_relative_eq!(buf.player_pos(1).unwrap().x, 100.0);
    }

    #[test]
    fn test_mobs_interpolate_by_id() {
        let mob = |id: u32, x: f32| MobSnapshot {
            id,
            x,
            y: 0.0,
            r: 10.0,
            hp: 5.0,
            max_hp: 5.0,
            boss: false,
        };
        let mut buf = SnapshotBuffer::new(0.2);
        buf.push(StateSnapshot {
            mobs: vec![mob(4, 0.0), mob(5, 10.0)],
            ..Default::default()
        });
        buf.push(StateSnapshot {
            mobs: vec![mob(5, 30.0), mob(4, 20.0)],
            ..Default::default()
        });
        buf.advance(0.1);
        assert_relative_eq!(buf.mob_pos(4).unwrap().x, 10.0, epsilon = 1e-3);
        assert_relative_eq!(buf.mob_pos(5).unwrap().x, 20.0, epsilon = 1e-3);
        assert_eq!(buf.mob_pos(6), None);
    }

    #[test]
    fn test_new_entity_uses_latest_position() {
        let mut buf = SnapshotBuffer::new(0.1);
        buf.push(with_player(1, 0.0));
        buf.push(with_player(2, 40.0));
        assert_eq!(buf.player_pos(2), Some(Vec2::new(40.0, 0.0)));
        assert_eq!(buf.player_pos(1), None);
    }

    #[test]
    fn test_snapshot_from_world() {
        let world = World::new(GameData::shared(), RunOptions::default());
        let mut board = Leaderboard::new();
        board.upsert(LeaderEntry {
            id: 9,
            name: "solo".into(),
            score: 12,
            alive: true,
            is_bot: false,
        });
        let snap = snapshot_from_world(&world, 9, "solo", 12).with_leaderboard(&board);
        assert_eq!(snap.leaderboard.len(), 1);
        assert_eq!(snap.players.len(), 1);
        assert_eq!(snap.players[0].petals.len(), world.player.orbitals.len());
        assert_eq!(snap.max_slots, Some(world.player.slots));

        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"mhp\""));
        assert!(json.contains("\"lb\""));
    }
}
