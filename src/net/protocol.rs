//! Arena wire contract
//!
//! Messages are JSON objects tagged by `type`. Clients send intents; the
//! host answers with snapshots and discrete notifications.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::leaderboard::LeaderEntry;
use super::snapshot::StateSnapshot;
use crate::data::{ArenaZoneDef, OrbitalKind, Rarity};
use crate::error::ProtocolError;
use crate::sim::tick::{Request, TickInput};

/// Stash entry carried into an arena on join
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarriedPetal {
    #[serde(alias = "type")]
    pub kind: OrbitalKind,
    pub rarity: Rarity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Join {
        name: String,
        #[serde(default)]
        inventory: Vec<CarriedPetal>,
        #[serde(default)]
        color: Option<String>,
    },
    Input {
        dx: f32,
        dy: f32,
        #[serde(default)]
        dash: bool,
        #[serde(default)]
        extend: bool,
        #[serde(default)]
        retract: bool,
    },
    Equip {
        #[serde(alias = "invId")]
        item_id: u32,
    },
    Unequip {
        #[serde(alias = "orbIndex")]
        slot: usize,
    },
    Merge {
        #[serde(alias = "petalType")]
        kind: OrbitalKind,
        rarity: Rarity,
    },
    Ping,
    Leave,
}

impl ClientMessage {
    /// Loadout request carried by this message, if any
    pub fn request(&self) -> Option<Request> {
        match *self {
            ClientMessage::Equip { item_id } => Some(Request::Equip { item_id }),
            ClientMessage::Unequip { slot } => Some(Request::Unequip { slot }),
            ClientMessage::Merge { kind, rarity } => Some(Request::Merge { kind, rarity }),
            _ => None,
        }
    }

    /// Movement intent for an `input` message
    pub fn tick_input(&self) -> Option<TickInput> {
        match *self {
            ClientMessage::Input {
                dx,
                dy,
                dash,
                extend,
                retract,
            } => Some(TickInput {
                move_dir: Vec2::new(dx, dy).clamp_length_max(1.0),
                dash,
                extend,
                retract,
                requests: Vec::new(),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Joined {
        id: u32,
        zone: ArenaZoneDef,
    },
    State(StateSnapshot),
    Death {
        /// Seconds survived
        time: f32,
        score: u64,
        rank: usize,
        leaderboard: Vec<LeaderEntry>,
    },
    Respawned,
    Toast {
        msg: String,
        #[serde(default)]
        color: Option<String>,
    },
    Equipped {
        item_id: u32,
    },
    Unequipped {
        slot: usize,
    },
    Merged {
        #[serde(rename = "newType")]
        new_kind: OrbitalKind,
        #[serde(rename = "newRarity")]
        new_rarity: Rarity,
    },
    Pong,
    Error {
        msg: String,
    },
}

pub fn decode_client(text: &str) -> Result<ClientMessage, ProtocolError> {
    Ok(serde_json::from_str(text)?)
}

pub fn decode_server(text: &str) -> Result<ServerMessage, ProtocolError> {
    Ok(serde_json::from_str(text)?)
}

pub fn encode<T: Serialize>(message: &T) -> Result<String, ProtocolError> {
    serde_json::to_string(message).map_err(ProtocolError::Encode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameData;

    #[test]
    fn test_decode_input() {
        let msg = decode_client(r#"{"type":"input","dx":3.0,"dy":4.0,"dash":true}"#).unwrap();
        let input = msg.tick_input().unwrap();
        assert!(input.dash);
        assert!(!input.extend);
        assert!((input.move_dir.length() - 1.0).abs() < 1e-5);
        assert_eq!(msg.request(), None);
    }

    #[test]
    fn test_legacy_field_names() {
        let equip = decode_client(r#"{"type":"equip","invId":12}"#).unwrap();
        assert_eq!(equip.request(), Some(Request::Equip { item_id: 12 }));

        let merge =
            decode_client(r#"{"type":"merge","petalType":"frost","rarity":"rare"}"#).unwrap();
        assert_eq!(
            merge.request(),
            Some(Request::Merge {
                kind: OrbitalKind::Frost,
                rarity: Rarity::Rare,
            })
        );
    }

    #[test]
    fn test_join_defaults() {
        let join = decode_client(r#"{"type":"join","name":"ana"}"#).unwrap();
        assert_eq!(
            join,
            ClientMessage::Join {
                name: "ana".into(),
                inventory: Vec::new(),
                color: None,
            }
        );
    }

    #[test]
    fn test_malformed_is_error() {
        assert!(matches!(
            decode_client(r#"{"type":"teleport"}"#),
            Err(ProtocolError::Decode(_))
        ));
        assert!(decode_client("not json").is_err());
    }

    #[test]
    fn test_server_messages_are_tagged() {
        let zone = GameData::shared().arena_zones[0].clone();
        let text = encode(&ServerMessage::Joined { id: 4, zone }).unwrap();
        assert!(text.starts_with(r#"{"type":"joined""#));
        assert!(matches!(
            decode_server(&text).unwrap(),
            ServerMessage::Joined { id: 4, .. }
        ));

        let merged = encode(&ServerMessage::Merged {
            new_kind: OrbitalKind::Blade,
            new_rarity: Rarity::Epic,
        })
        .unwrap();
        assert!(merged.contains(r#""newRarity":"epic""#));
        assert_eq!(encode(&ServerMessage::Pong).unwrap(), r#"{"type":"pong"}"#);
    }
}
