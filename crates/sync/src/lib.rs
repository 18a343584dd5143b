//! Sync module - keeping two boards in step through a relay
//!
//! Two clients play one match by exchanging **full state** over a dumb relay:
//! after every committed move the mover sends the whole board, whose turn it
//! is and the winner. Receivers adopt that state wholesale. There is no
//! diffing and no validation of the peer; the last message wins.
//!
//! # Protocol Overview
//!
//! A **line-delimited JSON protocol** over TCP:
//!
//! 1. **Join**: client sends `join` with a lobby id, relay answers `joined`
//!    with the assigned side (first seat plays 1)
//! 2. **Start**: once both seats are taken the relay sends `game_started`
//! 3. **Moves**: `move` lines are echoed to both seats, sender included
//! 4. **Control**: rematch signals travel as `control` and are echoed the same way
//! 5. **Leaving**: `leave` or a dropped connection sends `peer_left` to the other seat
//!
//! # Message Types
//!
//! - **move**: `{lobbyId, board, turn, winner}`; board is 8 rows of 8 cells,
//!   each `null` or `{player, isKing}`
//! - **control**: `{lobbyId, signal: {id, action, from, accept?}}`
//! - **joined** / **game_started** / **peer_left** / **error**: relay notices
//!
//! Older clients send bare move objects without `type` and smuggle rematch
//! signals inside a piece of the board; see [`piggyback`].
//!
//! # Environment Variables
//!
//! - `DRAUGHTS_RELAY_HOST`: relay address (default: "127.0.0.1")
//! - `DRAUGHTS_RELAY_PORT`: relay port (default: 7878)
//! - `DRAUGHTS_RELAY_LOG_PATH`: relay wire log file (default: none)
//! - `DRAUGHTS_WIRE_FORMAT`: `tagged` or `piggyback` rematch signals (default: tagged)
//! - `DRAUGHTS_REMATCH_TIMEOUT_MS`: rematch request expiry (default: 30000)
//!
//! # Example Protocol Flow
//!
//! ```text
//! A -> Relay: {"type":"join","lobbyId":"L1"}
//! Relay -> A: {"type":"joined","lobbyId":"L1","role":1}
//! B -> Relay: {"type":"join","lobbyId":"L1"}
//! Relay -> B: {"type":"joined","lobbyId":"L1","role":2}
//! Relay -> A,B: {"type":"game_started","lobbyId":"L1"}
//! A -> Relay: {"type":"move","lobbyId":"L1","board":[[null,{"player":2,"isKing":false},...],...],"turn":2,"winner":null}
//! Relay -> A,B: (same line)
//! ```
//!
//! # Testing
//!
//! Talk to a running relay with netcat:
//!
//! ```bash
//! nc 127.0.0.1 7878
//! {"type":"join","lobbyId":"test"}
//! ```

pub mod client;
pub mod errors;
pub mod piggyback;
pub mod protocol;
pub mod rematch;
pub mod runtime;
pub mod server;
pub mod session;

pub use draughts_core as core;
pub use draughts_engine as engine;
pub use draughts_types as types;

// Re-export commonly used types for convenience
pub use client::{ChannelEvent, ClientConfig, ClientEvent, MatchClient, WireFormat};
pub use errors::{classify_channel_error, ChannelErrorKind, SyncError};
pub use protocol::*;
pub use rematch::{RematchEvent, RematchNegotiator};
pub use runtime::RelayLink;
pub use server::{run_relay, RelayConfig};
pub use session::SessionContext;
