//! Client connection lifecycle
//!
//! Transport agnostic: the caller owns the socket, feeds events in and
//! performs the returned actions. All waiting is countdown timers advanced
//! by the caller's `dt`.

use super::leaderboard::LeaderEntry;
use super::protocol::{CarriedPetal, ClientMessage, ServerMessage};
use super::snapshot::SnapshotBuffer;
use crate::data::ArenaZoneDef;

/// Seconds between keepalive pings
pub const PING_INTERVAL: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    /// Seconds between attempts
    pub delay: f32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConnectionState {
    Offline,
    /// Socket opening or join sent, waiting for `joined`
    Connecting,
    InArena,
    /// Dead in the arena, waiting for `respawned`
    Spectating,
    Reconnecting { attempt: u32, wait: f32 },
}

/// What the caller should do next
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    Open,
    Send(ClientMessage),
    Close,
}

/// Result of the last arena death
#[derive(Debug, Clone, PartialEq)]
pub struct DeathReport {
    pub time: f32,
    pub score: u64,
    pub rank: usize,
    pub leaderboard: Vec<LeaderEntry>,
}

#[derive(Debug, Clone)]
pub struct Session {
    state: ConnectionState,
    policy: ReconnectPolicy,
    name: String,
    carried: Vec<CarriedPetal>,
    player_id: Option<u32>,
    zone: Option<ArenaZoneDef>,
    snapshots: SnapshotBuffer,
    last_death: Option<DeathReport>,
    last_error: Option<String>,
    /// Consecutive failed reconnects since the last `joined`
    attempts: u32,
    clock: f32,
    ping_timer: f32,
    ping_sent_at: Option<f32>,
    latency: Option<f32>,
}

impl Session {
    pub fn new(
        name: impl Into<String>,
        carried: Vec<CarriedPetal>,
        policy: ReconnectPolicy,
    ) -> Self {
        Self {
            state: ConnectionState::Offline,
            policy,
            name: name.into(),
            carried,
            player_id: None,
            zone: None,
            snapshots: SnapshotBuffer::default(),
            last_death: None,
            last_error: None,
            attempts: 0,
            clock: 0.0,
            ping_timer: 0.0,
            ping_sent_at: None,
            latency: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn player_id(&self) -> Option<u32> {
        self.player_id
    }

    pub fn zone(&self) -> Option<&ArenaZoneDef> {
        self.zone.as_ref()
    }

    pub fn snapshots(&self) -> &SnapshotBuffer {
        &self.snapshots
    }

    pub fn last_death(&self) -> Option<&DeathReport> {
        self.last_death.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Round trip of the last answered ping, in seconds
    pub fn latency(&self) -> Option<f32> {
        self.latency
    }

    pub fn is_online(&self) -> bool {
        matches!(
            self.state,
            ConnectionState::InArena | ConnectionState::Spectating
        )
    }

    /// Start a fresh connection
    pub fn connect(&mut self) -> Option<SessionAction> {
        match self.state {
            ConnectionState::Offline => {
                self.state = ConnectionState::Connecting;
                Some(SessionAction::Open)
            }
            _ => None,
        }
    }

    /// Socket opened; announce ourselves
    pub fn on_open(&mut self) -> SessionAction {
        self.state = ConnectionState::Connecting;
        SessionAction::Send(ClientMessage::Join {
            name: self.name.clone(),
            inventory: self.carried.clone(),
            color: None,
        })
    }

    /// Socket closed without us asking
    pub fn on_close(&mut self) {
        if self.state == ConnectionState::Offline {
            return;
        }
        self.attempts += 1;
        let attempt = self.attempts;
        self.ping_sent_at = None;

        if attempt > self.policy.max_attempts {
            log::warn!(
                "Giving up after {} reconnect attempts",
                self.policy.max_attempts
            );
            self.state = ConnectionState::Offline;
            self.player_id = None;
            self.attempts = 0;
            return;
        }

        log::info!(
            "Connection lost, reconnect {}/{} in {:.1}s",
            attempt,
            self.policy.max_attempts,
            self.policy.delay
        );
        self.state = ConnectionState::Reconnecting {
            attempt,
            wait: self.policy.delay,
        };
    }

    /// Leave the arena on purpose; no reconnect follows
    pub fn leave(&mut self) -> Vec<SessionAction> {
        let mut actions = Vec::new();
        if self.is_online() {
            actions.push(SessionAction::Send(ClientMessage::Leave));
        }
        if self.state != ConnectionState::Offline {
            actions.push(SessionAction::Close);
        }
        self.state = ConnectionState::Offline;
        self.player_id = None;
        self.attempts = 0;
        actions
    }

    /// Advance timers by the caller's frame time
    pub fn update(&mut self, dt: f32) -> Option<SessionAction> {
        let dt = dt.max(0.0);
        self.clock += dt;
        self.snapshots.advance(dt);

        match &mut self.state {
            ConnectionState::Reconnecting { attempt, wait } => {
                *wait -= dt;
                if *wait <= 0.0 {
                    log::debug!("Reconnect attempt {}", attempt);
                    self.state = ConnectionState::Connecting;
                    return Some(SessionAction::Open);
                }
                None
            }
            ConnectionState::InArena | ConnectionState::Spectating => {
                self.ping_timer += dt;
                if self.ping_timer >= PING_INTERVAL {
                    self.ping_timer = 0.0;
                    self.ping_sent_at = Some(self.clock);
                    return Some(SessionAction::Send(ClientMessage::Ping));
                }
                None
            }
            _ => None,
        }
    }

    /// Movement message for this frame; nothing is sent while not playing
    pub fn input(
        &self,
        dx: f32,
        dy: f32,
        dash: bool,
        extend: bool,
        retract: bool,
    ) -> Option<ClientMessage> {
        (self.state == ConnectionState::InArena).then_some(ClientMessage::Input {
            dx,
            dy,
            dash,
            extend,
            retract,
        })
    }

    pub fn handle(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::Joined { id, zone } => {
                log::info!("Joined {} as player {}", zone.name, id);
                self.player_id = Some(id);
                self.zone = Some(zone);
                self.state = ConnectionState::InArena;
                self.ping_timer = 0.0;
                self.attempts = 0;
                self.last_error = None;
            }
            ServerMessage::State(snapshot) => self.snapshots.push(snapshot),
            ServerMessage::Death {
                time,
                score,
                rank,
                leaderboard,
            } => {
                log::info!("Died after {:.0}s with score {} (rank {})", time, score, rank);
                self.state = ConnectionState::Spectating;
                self.last_death = Some(DeathReport {
                    time,
                    score,
                    rank,
                    leaderboard,
                });
            }
            ServerMessage::Respawned => self.state = ConnectionState::InArena,
            ServerMessage::Pong => {
                if let Some(sent) = self.ping_sent_at.take() {
                    self.latency = Some(self.clock - sent);
                }
            }
            ServerMessage::Error { msg } => {
                log::warn!("Server error: {}", msg);
                self.last_error = Some(msg);
            }
            ServerMessage::Toast { msg, .. } => log::debug!("Toast: {}", msg),
            ServerMessage::Equipped { .. }
            | ServerMessage::Unequipped { .. }
            | ServerMessage::Merged { .. } => {}
        }
    }
}
