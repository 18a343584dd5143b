//! Session context - who we are and which match we sit in
//!
//! Passed explicitly into every sync operation; nothing in the workspace reads
//! identity or lobby membership from global state.

use crate::types::Player;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// Lobby we joined, if any
    pub lobby_id: Option<String>,
    /// Nickname; rematch signals carry it in `from`
    pub identity: String,
    /// Side assigned by the relay
    pub role: Option<Player>,
    pub opponent_present: bool,
}

impl SessionContext {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            lobby_id: None,
            identity: identity.into(),
            role: None,
            opponent_present: false,
        }
    }

    /// Seat in `lobby_id` as `role`; the opponent is assumed absent until the
    /// relay says otherwise
    pub fn join(&mut self, lobby_id: impl Into<String>, role: Player) {
        self.lobby_id = Some(lobby_id.into());
        self.role = Some(role);
        self.opponent_present = false;
    }

    pub fn leave(&mut self) {
        self.lobby_id = None;
        self.role = None;
        self.opponent_present = false;
    }

    /// Seated in a lobby with a side
    pub fn is_active(&self) -> bool {
        self.lobby_id.is_some() && self.role.is_some()
    }

    /// Seated, and the other side is there too
    pub fn can_play(&self) -> bool {
        self.is_active() && self.opponent_present
    }

    /// Lobby id of an active session
    pub fn active_lobby(&self) -> Option<&str> {
        if self.is_active() {
            self.lobby_id.as_deref()
        } else {
            None
        }
    }
}
