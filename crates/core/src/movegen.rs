//! Move generation - per-piece candidate hops
//!
//! A piece's candidate set is either its captures or, only when it has none,
//! its simple moves. Men step forward only but capture in all four diagonal
//! directions; kings fly along whole diagonals for both moves and captures.
//!
//! Candidate lists live in an [`ArrayVec`] so generation never allocates.

use arrayvec::ArrayVec;

use crate::board::Board;
use crate::types::{Move, Piece, Pos, Rank, DIAGONALS};

/// Upper bound on hops from one square (a centre king reaches 13 squares)
pub const MAX_CANDIDATES: usize = 16;

/// Fixed-capacity list of hops
pub type MoveList = ArrayVec<Move, MAX_CANDIDATES>;

/// Candidate hops for one piece
///
/// `Captures` is never empty; `Moves` may be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidates {
    Captures(MoveList),
    Moves(MoveList),
}

impl Candidates {
    /// No candidates at all
    pub fn none() -> Self {
        Candidates::Moves(MoveList::new())
    }

    pub fn as_slice(&self) -> &[Move] {
        match self {
            Candidates::Captures(list) | Candidates::Moves(list) => list.as_slice(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_capture(&self) -> bool {
        matches!(self, Candidates::Captures(_))
    }

    /// The candidate landing on `target`, if any
    pub fn find(&self, target: Pos) -> Option<Move> {
        self.as_slice().iter().copied().find(|m| m.target == target)
    }
}

/// Candidate hops for `piece` standing on `pos`
pub fn moves_for(board: &Board, pos: Pos, piece: Piece) -> Candidates {
    let captures = captures_for(board, pos, piece);
    if !captures.is_empty() {
        return Candidates::Captures(captures);
    }
    Candidates::Moves(simple_moves_for(board, pos, piece))
}

/// Whether `piece` on `pos` has any hop at all
pub fn has_any_move(board: &Board, pos: Pos, piece: Piece) -> bool {
    !moves_for(board, pos, piece).is_empty()
}

/// Capture hops only, in [`DIAGONALS`] order
pub fn captures_for(board: &Board, pos: Pos, piece: Piece) -> MoveList {
    match piece.rank {
        Rank::Man => man_captures(board, pos, piece),
        Rank::King => king_captures(board, pos, piece),
    }
}

/// Non-capturing hops only
pub fn simple_moves_for(board: &Board, pos: Pos, piece: Piece) -> MoveList {
    let mut out = MoveList::new();
    match piece.rank {
        Rank::Man => {
            for (dr, dc) in piece.owner.forward_diagonals() {
                if let Some(next) = pos.offset(dr, dc) {
                    if board.is_empty(next) {
                        out.push(Move::step(next));
                    }
                }
            }
        }
        Rank::King => {
            for (dr, dc) in DIAGONALS {
                let mut cur = pos;
                while let Some(next) = cur.offset(dr, dc) {
                    if !board.is_empty(next) {
                        break;
                    }
                    out.push(Move::step(next));
                    cur = next;
                }
            }
        }
    }
    out
}

fn man_captures(board: &Board, pos: Pos, piece: Piece) -> MoveList {
    let mut out = MoveList::new();
    for (dr, dc) in DIAGONALS {
        let (Some(over), Some(land)) = (pos.offset(dr, dc), pos.offset(2 * dr, 2 * dc)) else {
            continue;
        };
        let is_enemy = board
            .get(over)
            .map(|p| p.owner != piece.owner)
            .unwrap_or(false);
        if is_enemy && board.is_empty(land) {
            out.push(Move::jump(land, over));
        }
    }
    out
}

fn king_captures(board: &Board, pos: Pos, piece: Piece) -> MoveList {
    let mut out = MoveList::new();
    for (dr, dc) in DIAGONALS {
        let mut cur = pos;
        let mut jumped: Option<Pos> = None;
        while let Some(next) = cur.offset(dr, dc) {
            match (board.get(next), jumped) {
                (None, Some(enemy)) => out.push(Move::jump(next, enemy)),
                (None, None) => {}
                // Own piece blocks the ray; so does a second piece of any side.
                (Some(other), None) if other.owner != piece.owner => jumped = Some(next),
                (Some(_), _) => break,
            }
            cur = next;
        }
    }
    out
}
