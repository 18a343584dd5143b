//! Game state module - one match from setup to a winner
//!
//! [`MatchState`] owns the board, whose turn it is and the winner, if any.
//! Local moves go through [`MatchState::play`], which validates the hop,
//! resolves capture chains and hands the turn over. Boards received from the
//! peer are installed verbatim with [`MatchState::adopt`].

use crate::board::Board;
use crate::chain::resolve_chain;
use crate::forced::selectable_moves;
use crate::movegen::has_any_move;
use crate::types::{Move, Player, Pos};

/// Why a local move was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("match is already decided")]
    Finished,
    #[error("no piece on {0:?}")]
    EmptySquare(Pos),
    #[error("piece on {0:?} does not belong to the player on turn")]
    NotOnTurn(Pos),
    #[error("no legal hop from {from:?} to {target:?}")]
    IllegalMove { from: Pos, target: Pos },
}

impl GameError {
    /// Stable short code for logs and error replies
    pub fn code(self) -> &'static str {
        match self {
            GameError::Finished => "finished",
            GameError::EmptySquare(_) | GameError::NotOnTurn(_) => "bad_selection",
            GameError::IllegalMove { .. } => "illegal_move",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    InProgress,
    Finished(Player),
}

/// A move that went through, with every hop of its chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedMove {
    pub player: Player,
    pub from: Pos,
    pub hops: Vec<Move>,
    pub landing: Pos,
    /// The moving man was crowned somewhere along the way
    pub promoted: bool,
}

impl CommittedMove {
    pub fn captures(&self) -> usize {
        self.hops.iter().filter(|h| h.is_capture).count()
    }
}

/// Complete match state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchState {
    board: Board,
    turn: Player,
    winner: Option<Player>,
}

impl MatchState {
    /// Fresh match: standard setup, Player One to move
    pub fn new() -> Self {
        Self {
            board: Board::initial(),
            turn: Player::One,
            winner: None,
        }
    }

    /// Arbitrary position, e.g. a test scenario
    pub fn from_parts(board: Board, turn: Player, winner: Option<Player>) -> Self {
        Self {
            board,
            turn,
            winner,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Player {
        self.turn
    }

    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    pub fn is_finished(&self) -> bool {
        self.winner.is_some()
    }

    pub fn status(&self) -> MatchStatus {
        match self.winner {
            Some(p) => MatchStatus::Finished(p),
            None => MatchStatus::InProgress,
        }
    }

    /// Play the hop `mv` with the piece on `from` for the player on turn
    ///
    /// A capture is extended to the end of its chain automatically. On
    /// success the turn passes and the winner is re-evaluated.
    pub fn play(&mut self, from: Pos, mv: Move) -> Result<CommittedMove, GameError> {
        if self.is_finished() {
            return Err(GameError::Finished);
        }
        let piece = self.board.get(from).ok_or(GameError::EmptySquare(from))?;
        if piece.owner != self.turn {
            return Err(GameError::NotOnTurn(from));
        }

        let legal = selectable_moves(&self.board, from, self.turn).find(mv.target);
        if legal != Some(mv) {
            return Err(GameError::IllegalMove {
                from,
                target: mv.target,
            });
        }

        let (next, hops, landing) = if mv.is_capture {
            let outcome = resolve_chain(&self.board, from, mv);
            (outcome.board, outcome.hops, outcome.landing)
        } else {
            (self.board.apply_hop(from, &mv), vec![mv], mv.target)
        };

        let promoted = !piece.is_king() && next.get(landing).is_some_and(|p| p.is_king());
        let committed = CommittedMove {
            player: self.turn,
            from,
            hops,
            landing,
            promoted,
        };
        self.commit(next)?;
        Ok(committed)
    }

    /// Install `board` as the result of the current player's move
    pub fn commit(&mut self, board: Board) -> Result<(), GameError> {
        if self.is_finished() {
            return Err(GameError::Finished);
        }
        self.board = board;
        self.turn = self.turn.opponent();
        self.winner = evaluate_winner(&self.board);
        Ok(())
    }

    /// Replace everything with a state received from the peer
    pub fn adopt(&mut self, board: Board, turn: Player, winner: Option<Player>) {
        self.board = board;
        self.turn = turn;
        self.winner = winner;
    }

    /// Back to the starting position
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether any of `player`'s pieces has a hop
pub fn has_legal_move(board: &Board, player: Player) -> bool {
    board
        .pieces_of(player)
        .any(|(pos, piece)| has_any_move(board, pos, piece))
}

/// Winner of `board`, if the game is decided
///
/// A side with no pieces, or with no hop for any piece, has lost. Player One
/// is checked first, so a board where both sides are stuck goes to Player Two.
pub fn evaluate_winner(board: &Board) -> Option<Player> {
    let count = board.count();
    for player in [Player::One, Player::Two] {
        if count.of(player) == 0 || !has_legal_move(board, player) {
            return Some(player.opponent());
        }
    }
    None
}
