//! Capture chains - multi-jump search and the auto-extension policy
//!
//! [`all_maximal_sequences`] explores every capture path from a square by
//! depth-first search over cloned boards and reports only the leaves: paths
//! that cannot be extended any further. The moving piece keeps its rank for
//! the whole search.
//!
//! Once a player commits a capturing hop, [`resolve_chain`] finishes the move
//! on their behalf: from the landing square it repeatedly takes the first hop
//! of the longest maximal sequence (earliest found wins a tie) until nothing
//! is left to capture. The player never chooses between branches. Promotion is
//! checked after every hop, so a man crowned mid-chain continues as a king.

use crate::board::Board;
use crate::movegen::captures_for;
use crate::types::{Move, Piece, Pos};

/// A non-empty run of capturing hops, each starting where the previous landed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CaptureSequence(Vec<Move>);

impl CaptureSequence {
    pub fn hops(&self) -> &[Move] {
        &self.0
    }

    /// Hop count
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Move {
        self.0[0]
    }

    /// Square the piece ends on
    pub fn landing(&self) -> Pos {
        self.0[self.0.len() - 1].target
    }
}

/// Every maximal capture sequence for the piece on `pos`, in discovery order
///
/// Returns an empty list for an empty square or a piece with no capture.
pub fn all_maximal_sequences(board: &Board, pos: Pos) -> Vec<CaptureSequence> {
    let Some(piece) = board.get(pos) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    let mut path = Vec::new();
    search(board, pos, piece, &mut path, &mut out);
    out
}

fn search(board: &Board, pos: Pos, piece: Piece, path: &mut Vec<Move>, out: &mut Vec<CaptureSequence>) {
    let captures = captures_for(board, pos, piece);
    if captures.is_empty() {
        if !path.is_empty() {
            out.push(CaptureSequence(path.clone()));
        }
        return;
    }

    for hop in captures {
        let next = board.apply_hop_unpromoted(pos, &hop);
        path.push(hop);
        search(&next, hop.target, piece, path, out);
        path.pop();
    }
}

/// The longest sequence; among equals, the one found first
pub fn longest_sequence(sequences: &[CaptureSequence]) -> Option<&CaptureSequence> {
    let mut best: Option<&CaptureSequence> = None;
    for seq in sequences {
        if best.map_or(true, |b| seq.len() > b.len()) {
            best = Some(seq);
        }
    }
    best
}

/// Result of a fully resolved capturing move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainOutcome {
    pub board: Board,
    /// Every hop applied, the committed one first
    pub hops: Vec<Move>,
    pub landing: Pos,
}

/// Apply the committed capture `first_hop` from `from`, then extend the chain
/// automatically until no capture remains
pub fn resolve_chain(board: &Board, from: Pos, first_hop: Move) -> ChainOutcome {
    debug_assert!(first_hop.is_capture, "chains start with a capture");

    let mut board = board.apply_hop(from, &first_hop);
    let mut pos = first_hop.target;
    let mut hops = vec![first_hop];

    loop {
        let sequences = all_maximal_sequences(&board, pos);
        let Some(best) = longest_sequence(&sequences) else {
            break;
        };
        let hop = best.first();
        board = board.apply_hop(pos, &hop);
        pos = hop.target;
        hops.push(hop);
    }

    ChainOutcome {
        board,
        hops,
        landing: pos,
    }
}
