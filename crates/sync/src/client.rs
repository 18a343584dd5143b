//! Match client - one seat at a synchronized board
//!
//! Glues the local rules to the channel. Taps run through the selection
//! controller and every committed move is queued as a full-state `move`
//! message. Everything received from the channel is applied here: moves
//! replace the local state wholesale, control signals drive the rematch
//! negotiation, relay notices update the session.
//!
//! The client never touches the network itself. Outbound envelopes are
//! queued; the caller drains them with [`MatchClient::take_outbound`] and
//! feeds inbound lines back with [`MatchClient::handle`].

use std::collections::VecDeque;
use std::net::SocketAddr;

use tracing::{debug, info, warn};

use crate::core::MatchState;
use crate::engine::{Selection, TapOutcome};
use crate::errors::{classify_channel_error, ChannelErrorKind, SyncError};
use crate::piggyback::{build_marker_message, extract_marker, strip_markers};
use crate::protocol::{
    build_move_message, create_control, create_join, create_leave, parse_message, Envelope,
    MoveMessage, ParsedMessage, RematchMarker,
};
use crate::rematch::{RematchEvent, RematchNegotiator};
use crate::session::SessionContext;
use crate::types::{Player, Pos, REMATCH_TIMEOUT_MS};

/// How outbound rematch signals are encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireFormat {
    /// `control` envelopes
    #[default]
    Tagged,
    /// Markers inside a move message, for older peers
    Piggyback,
}

impl WireFormat {
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("tagged") {
            Some(Self::Tagged)
        } else if s.eq_ignore_ascii_case("piggyback") {
            Some(Self::Piggyback)
        } else {
            None
        }
    }
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub wire_format: WireFormat,
    pub rematch_timeout_ms: u32,
    /// Seed for rematch ids
    pub seed: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            wire_format: WireFormat::Tagged,
            rematch_timeout_ms: REMATCH_TIMEOUT_MS,
            seed: 1,
        }
    }
}

impl ClientConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("DRAUGHTS_RELAY_HOST").unwrap_or(defaults.host);
        let port = env::var("DRAUGHTS_RELAY_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);
        let wire_format = env::var("DRAUGHTS_WIRE_FORMAT")
            .ok()
            .and_then(|s| WireFormat::parse(&s))
            .unwrap_or(defaults.wire_format);
        let rematch_timeout_ms = env::var("DRAUGHTS_REMATCH_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.rematch_timeout_ms);

        Self {
            host,
            port,
            wire_format,
            rematch_timeout_ms,
            seed: clock_seed(),
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

fn clock_seed() -> u32 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
        .unwrap_or(1)
}

/// Something the channel delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    MoveApplied(ParsedMessage),
    PeerLeft,
    Error(String),
}

impl ChannelEvent {
    /// Decode one received line
    pub fn from_line(line: &str) -> Result<Self, serde_json::Error> {
        Ok(match parse_message(line)? {
            ParsedMessage::Envelope(Envelope::PeerLeft) => ChannelEvent::PeerLeft,
            ParsedMessage::Envelope(Envelope::Error(e)) => ChannelEvent::Error(e.message),
            other => ChannelEvent::MoveApplied(other),
        })
    }
}

/// What the user should be told after handling an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    Joined { lobby_id: String, role: Player },
    GameStarted,
    StateSynced { turn: Player, winner: Option<Player> },
    RematchPrompt { id: String, from: String },
    RematchStarted,
    RematchDeclined,
    RematchExpired,
    OpponentLeft,
    /// The lobby vanished; the session is back to neutral
    LobbyLost,
    Notice(String),
}

pub struct MatchClient {
    session: SessionContext,
    state: MatchState,
    selection: Selection,
    rematch: RematchNegotiator,
    wire_format: WireFormat,
    outbox: VecDeque<Envelope>,
}

impl MatchClient {
    pub fn new(session: SessionContext, config: &ClientConfig) -> Self {
        Self {
            session,
            state: MatchState::new(),
            selection: Selection::new(),
            rematch: RematchNegotiator::new(config.seed, config.rematch_timeout_ms),
            wire_format: config.wire_format,
            outbox: VecDeque::new(),
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn rematch(&self) -> &RematchNegotiator {
        &self.rematch
    }

    pub fn wire_format(&self) -> WireFormat {
        self.wire_format
    }

    /// Next envelope to send, oldest first
    pub fn take_outbound(&mut self) -> Option<Envelope> {
        self.outbox.pop_front()
    }

    pub fn has_outbound(&self) -> bool {
        !self.outbox.is_empty()
    }

    /// Ask the relay for a seat in `lobby_id`
    pub fn join(&mut self, lobby_id: &str) {
        self.outbox.push_back(create_join(lobby_id));
    }

    /// Give up the seat; the session goes back to neutral
    pub fn leave(&mut self) -> Result<(), SyncError> {
        let lobby = self
            .session
            .active_lobby()
            .ok_or(SyncError::NoActiveMatch)?
            .to_string();
        self.outbox.push_back(create_leave(&lobby));
        self.reset_to_neutral();
        Ok(())
    }

    /// A tap on `pos` by the local player
    pub fn tap(&mut self, pos: Pos) -> Result<TapOutcome, SyncError> {
        let (Some(lobby), Some(me)) = (self.session.active_lobby(), self.session.role) else {
            return Err(SyncError::NoActiveMatch);
        };
        if !self.session.opponent_present {
            return Ok(TapOutcome::Ignored);
        }

        let outcome = self.selection.tap(&mut self.state, me, pos);
        if let TapOutcome::Committed(done) = &outcome {
            debug!(
                from = ?done.from,
                landing = ?done.landing,
                captures = done.captures(),
                "committed move"
            );
            let msg = build_move_message(lobby, &self.state);
            self.outbox.push_back(Envelope::Move(msg));
        }
        Ok(outcome)
    }

    /// Ask the opponent for a rematch
    pub fn request_rematch(&mut self) -> Result<(), SyncError> {
        let marker = self.rematch.request(&self.session)?;
        if let Err(err) = self.send_signal(marker) {
            self.rematch.cancel();
            return Err(err);
        }
        info!(id = self.rematch.pending_id().unwrap_or_default(), "rematch requested");
        Ok(())
    }

    /// Answer the request `id`; accepting starts the new match locally
    pub fn answer_rematch(&mut self, id: &str, accept: bool) -> Result<(), SyncError> {
        if !self.session.is_active() {
            return Err(SyncError::NoActiveMatch);
        }
        if accept {
            self.start_new_match();
        }
        let marker = self.rematch.respond(id, accept, &self.session);
        self.send_signal(marker)?;
        info!(id, accept, "rematch answered");
        Ok(())
    }

    /// Advance timers by `elapsed_ms`
    pub fn tick(&mut self, elapsed_ms: u32) -> Option<ClientEvent> {
        match self.rematch.tick(elapsed_ms)? {
            RematchEvent::Expired { id } => {
                info!(id, "rematch request expired");
                Some(ClientEvent::RematchExpired)
            }
            _ => None,
        }
    }

    /// Decode and handle one received line
    pub fn handle_line(&mut self, line: &str) -> Result<Vec<ClientEvent>, serde_json::Error> {
        let event = ChannelEvent::from_line(line)?;
        Ok(self.handle(event))
    }

    /// Apply something the channel delivered
    pub fn handle(&mut self, event: ChannelEvent) -> Vec<ClientEvent> {
        match event {
            ChannelEvent::PeerLeft => {
                self.session.opponent_present = false;
                self.rematch.cancel();
                self.selection.clear();
                info!("opponent left");
                vec![ClientEvent::OpponentLeft]
            }
            ChannelEvent::Error(message) => match classify_channel_error(&message) {
                ChannelErrorKind::LobbyNotFound => {
                    warn!(%message, "lobby lost");
                    self.reset_to_neutral();
                    vec![ClientEvent::LobbyLost]
                }
                ChannelErrorKind::Other(message) => {
                    warn!(%message, "channel error");
                    vec![ClientEvent::Notice(message)]
                }
            },
            ChannelEvent::MoveApplied(ParsedMessage::Unknown(unknown)) => {
                debug!(msg_type = %unknown.msg_type, "ignoring unknown message");
                Vec::new()
            }
            ChannelEvent::MoveApplied(ParsedMessage::Envelope(env)) => self.handle_envelope(env),
        }
    }

    fn handle_envelope(&mut self, env: Envelope) -> Vec<ClientEvent> {
        match env {
            Envelope::Joined(m) => {
                let role = m.role.0;
                if self.is_our_lobby(&m.lobby_id) && self.session.role == Some(role) {
                    // Same seat confirmed again; the match in progress stands
                    debug!(lobby = %m.lobby_id, "seat confirmed again");
                } else {
                    self.session.join(m.lobby_id.clone(), role);
                    self.start_new_match();
                    info!(lobby = %m.lobby_id, role = role.number(), "joined lobby");
                }
                vec![ClientEvent::Joined {
                    lobby_id: m.lobby_id,
                    role,
                }]
            }
            Envelope::GameStarted(m) if self.is_our_lobby(&m.lobby_id) => {
                self.session.opponent_present = true;
                self.start_new_match();
                vec![ClientEvent::GameStarted]
            }
            Envelope::Move(msg) if self.is_our_lobby(&msg.lobby_id) => self.apply_move(msg),
            Envelope::Control(m) if self.is_our_lobby(&m.lobby_id) => {
                self.apply_signal(&m.signal).into_iter().collect()
            }
            Envelope::PeerLeft => self.handle(ChannelEvent::PeerLeft),
            Envelope::Error(e) => self.handle(ChannelEvent::Error(e.message)),
            other => {
                debug!(lobby = ?other.lobby_id(), "ignoring message for another lobby");
                Vec::new()
            }
        }
    }

    fn apply_move(&mut self, mut msg: MoveMessage) -> Vec<ClientEvent> {
        let Some(marker) = extract_marker(&msg.board).cloned() else {
            self.state.adopt(msg.board.to_board(), msg.turn(), msg.winner());
            self.selection.clear();
            return vec![ClientEvent::StateSynced {
                turn: msg.turn(),
                winner: msg.winner(),
            }];
        };

        strip_markers(&mut msg.board);
        let event = self.apply_signal(&marker);
        if event != Some(ClientEvent::RematchStarted) {
            // Carrier board: keep our own verdict on the winner
            let winner = self.state.winner();
            self.state.adopt(msg.board.to_board(), msg.turn(), winner);
            self.selection.clear();
        }
        event.into_iter().collect()
    }

    fn apply_signal(&mut self, marker: &RematchMarker) -> Option<ClientEvent> {
        match self.rematch.on_signal(marker, &self.session) {
            RematchEvent::SelfEcho | RematchEvent::Unmatched | RematchEvent::Expired { .. } => None,
            RematchEvent::Prompt { id, from } => {
                info!(%id, %from, "rematch offered");
                Some(ClientEvent::RematchPrompt { id, from })
            }
            RematchEvent::Accepted { id } => {
                info!(%id, "rematch accepted");
                self.start_new_match();
                Some(ClientEvent::RematchStarted)
            }
            RematchEvent::Declined { id } => {
                info!(%id, "rematch declined");
                Some(ClientEvent::RematchDeclined)
            }
        }
    }

    fn send_signal(&mut self, marker: RematchMarker) -> Result<(), SyncError> {
        let (Some(lobby), Some(me)) = (self.session.active_lobby(), self.session.role) else {
            return Err(SyncError::NoActiveMatch);
        };
        let env = match self.wire_format {
            WireFormat::Tagged => create_control(lobby, marker),
            WireFormat::Piggyback => {
                Envelope::Move(build_marker_message(lobby, &self.state, me, marker)?)
            }
        };
        self.outbox.push_back(env);
        Ok(())
    }

    fn is_our_lobby(&self, lobby_id: &str) -> bool {
        self.session.active_lobby() == Some(lobby_id)
    }

    fn start_new_match(&mut self) {
        self.state.reset();
        self.selection.clear();
    }

    fn reset_to_neutral(&mut self) {
        self.session.leave();
        self.rematch.cancel();
        self.start_new_match();
    }
}
