//! Arena networking contract
//!
//! No sockets live here. The host publishes `StateSnapshot`s, the client
//! interpolates them and drives a `Session` from its transport events.

pub mod leaderboard;
pub mod protocol;
pub mod session;
pub mod snapshot;

pub use leaderboard::{LeaderEntry, Leaderboard};
pub use protocol::{ClientMessage, ServerMessage, decode_client, decode_server, encode};
pub use session::{ConnectionState, ReconnectPolicy, Session, SessionAction};
pub use snapshot::{SnapshotBuffer, StateSnapshot, snapshot_from_world};
