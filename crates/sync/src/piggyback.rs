//! Piggyback codec - rematch signals hidden inside a move message
//!
//! Clients that predate the `control` envelope can only exchange move
//! messages. They carry a rematch signal by attaching it to one of the
//! sender's own pieces in an otherwise ordinary board snapshot. The receiver
//! looks for the first marked cell, acts on it, and strips every marker before
//! the board is adopted.

use crate::core::MatchState;
use crate::errors::SyncError;
use crate::protocol::{BoardSnapshot, MoveMessage, RematchMarker};
use crate::types::Player;

/// Copy of `snapshot` with `marker` attached to `player`'s first piece in
/// row-major order
pub fn embed_marker(
    snapshot: &BoardSnapshot,
    player: Player,
    marker: RematchMarker,
) -> Result<BoardSnapshot, SyncError> {
    let pos = snapshot
        .cells()
        .find(|(_, cell)| cell.player.0 == player)
        .map(|(pos, _)| pos)
        .ok_or(SyncError::NoFriendlyPiece)?;

    let mut out = snapshot.clone();
    if let Some(cell) = out.get_mut(pos) {
        cell.rematch = Some(marker);
    }
    Ok(out)
}

/// First marker in row-major order
pub fn extract_marker(snapshot: &BoardSnapshot) -> Option<&RematchMarker> {
    snapshot.cells().find_map(|(_, cell)| cell.rematch.as_ref())
}

/// Remove every marker
pub fn strip_markers(snapshot: &mut BoardSnapshot) {
    for cell in snapshot.rows.iter_mut().flatten().flatten() {
        cell.rematch = None;
    }
}

/// Move message that carries `marker` for `player` without changing the turn;
/// the winner is always sent as `null`
pub fn build_marker_message(
    lobby_id: &str,
    state: &MatchState,
    player: Player,
    marker: RematchMarker,
) -> Result<MoveMessage, SyncError> {
    let board = embed_marker(&BoardSnapshot::from_board(state.board()), player, marker)?;
    Ok(MoveMessage {
        lobby_id: lobby_id.to_string(),
        board,
        turn: state.turn().into(),
        winner: None,
    })
}
