//! Forced capture rule
//!
//! If any of a player's pieces can capture, only those pieces may move. The
//! rule is applied lazily when a piece is selected: selecting a piece outside
//! the capturing set yields no candidates at all.

use arrayvec::ArrayVec;

use crate::board::Board;
use crate::movegen::{moves_for, Candidates};
use crate::types::{Player, Pos, PLAYABLE_CELLS};

/// Squares of pieces that must move, row-major
pub type PosList = ArrayVec<Pos, PLAYABLE_CELLS>;

/// Origins of every `player` piece whose candidate set is a capture set
pub fn capturable_pieces(board: &Board, player: Player) -> PosList {
    board
        .pieces_of(player)
        .filter(|&(pos, piece)| moves_for(board, pos, piece).is_capture())
        .map(|(pos, _)| pos)
        .collect()
}

/// Candidates offered when `player` selects `pos`
///
/// Empty when `pos` holds no piece of `player`, or when another of their
/// pieces must capture and this one cannot.
pub fn selectable_moves(board: &Board, pos: Pos, player: Player) -> Candidates {
    let Some(piece) = board.get(pos).filter(|p| p.owner == player) else {
        return Candidates::none();
    };

    let forced = capturable_pieces(board, player);
    if !forced.is_empty() && !forced.contains(&pos) {
        return Candidates::none();
    }
    moves_for(board, pos, piece)
}
