//! Rematch negotiation
//!
//! One side sends a request with a fresh id and waits. The other side is
//! prompted and answers with a response carrying the same id. The requester
//! only reacts to a response that matches its pending id. An unanswered
//! request expires locally after the timeout; nothing is sent when it does.
//!
//! Time is advanced explicitly with [`RematchNegotiator::tick`], the same way
//! the game loop drives every other timer.

use crate::core::SimpleRng;
use crate::errors::SyncError;
use crate::protocol::{RematchAction, RematchMarker};
use crate::session::SessionContext;
use crate::types::REMATCH_TIMEOUT_MS;

/// Outcome of an incoming signal or of the timer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RematchEvent {
    /// Our own request relayed back to us
    SelfEcho,
    /// The opponent asks for a rematch; answer with [`RematchNegotiator::respond`]
    Prompt { id: String, from: String },
    /// Our request was accepted; start a new match
    Accepted { id: String },
    Declined { id: String },
    /// A response to nothing we are waiting for
    Unmatched,
    /// Our request went unanswered
    Expired { id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingRequest {
    id: String,
    remaining_ms: u32,
}

#[derive(Debug, Clone)]
pub struct RematchNegotiator {
    rng: SimpleRng,
    timeout_ms: u32,
    pending: Option<PendingRequest>,
}

impl RematchNegotiator {
    /// `seed` feeds the id generator
    pub fn new(seed: u32, timeout_ms: u32) -> Self {
        Self {
            rng: SimpleRng::new(seed),
            timeout_ms,
            pending: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_id(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.id.as_str())
    }

    /// Time left on the pending request
    pub fn remaining_ms(&self) -> Option<u32> {
        self.pending.as_ref().map(|p| p.remaining_ms)
    }

    /// Start a request and arm the timer
    pub fn request(&mut self, session: &SessionContext) -> Result<RematchMarker, SyncError> {
        if !session.is_active() {
            return Err(SyncError::NoActiveMatch);
        }
        if self.pending.is_some() {
            return Err(SyncError::RematchPending);
        }

        let id = self.rng.next_id();
        self.pending = Some(PendingRequest {
            id: id.clone(),
            remaining_ms: self.timeout_ms,
        });
        Ok(RematchMarker::request(id, session.identity.clone()))
    }

    /// Answer the request `id`
    pub fn respond(&self, id: &str, accept: bool, session: &SessionContext) -> RematchMarker {
        RematchMarker::response(id, session.identity.clone(), accept)
    }

    /// React to a signal received from the channel
    pub fn on_signal(&mut self, marker: &RematchMarker, session: &SessionContext) -> RematchEvent {
        match marker.action {
            RematchAction::Request if marker.from == session.identity => RematchEvent::SelfEcho,
            RematchAction::Request => RematchEvent::Prompt {
                id: marker.id.clone(),
                from: marker.from.clone(),
            },
            RematchAction::Response => {
                if self.pending_id() != Some(marker.id.as_str()) {
                    return RematchEvent::Unmatched;
                }
                self.pending = None;
                if marker.is_accepted() {
                    RematchEvent::Accepted {
                        id: marker.id.clone(),
                    }
                } else {
                    RematchEvent::Declined {
                        id: marker.id.clone(),
                    }
                }
            }
        }
    }

    /// Advance the timer; fires once when the pending request runs out
    pub fn tick(&mut self, elapsed_ms: u32) -> Option<RematchEvent> {
        let pending = self.pending.as_mut()?;
        pending.remaining_ms = pending.remaining_ms.saturating_sub(elapsed_ms);
        if pending.remaining_ms > 0 {
            return None;
        }
        let expired = self.pending.take()?;
        Some(RematchEvent::Expired { id: expired.id })
    }

    /// Drop any pending request without an event
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

impl Default for RematchNegotiator {
    fn default() -> Self {
        Self::new(1, REMATCH_TIMEOUT_MS)
    }
}
