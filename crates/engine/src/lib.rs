//! Engine crate - drives a [`MatchState`](draughts_core::MatchState) from
//! player input.
//!
//! The rules live in `draughts-core`; this crate only turns square taps into
//! selections and committed moves. See [`select::Selection`].

pub mod select;

pub use draughts_core as core;
pub use draughts_types as types;

pub use select::{Selection, TapOutcome};
