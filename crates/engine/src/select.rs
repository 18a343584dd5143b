//! Selection controller - square taps to moves
//!
//! Mirrors how a player drives the board: tap one of your pieces to see where
//! it can go, then tap one of the highlighted squares to move there. Tapping
//! anything else picks a different piece or drops the selection. Invalid taps
//! are never errors.

use draughts_core::{selectable_moves, Candidates, CommittedMove, GameError, MatchState};
use draughts_types::{Player, Pos};

/// What a tap did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapOutcome {
    /// Not this player's turn, or the match is over
    Ignored,
    /// A piece of ours is now selected; `candidates` may be empty when another
    /// piece is obliged to capture
    Selected { pos: Pos, candidates: Candidates },
    /// Nothing is selected any more
    Cleared,
    /// A move went through and the turn passed
    Committed(CommittedMove),
    /// The match refused a hop it had offered; only seen if the state changed
    /// under a stale selection
    Rejected(GameError),
}

/// Current selection of one local player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    selected: Option<Pos>,
    candidates: Candidates,
}

impl Selection {
    pub fn new() -> Self {
        Self {
            selected: None,
            candidates: Candidates::none(),
        }
    }

    pub fn selected(&self) -> Option<Pos> {
        self.selected
    }

    /// Highlighted hops for the selected piece
    pub fn candidates(&self) -> &Candidates {
        &self.candidates
    }

    pub fn clear(&mut self) {
        self.selected = None;
        self.candidates = Candidates::none();
    }

    /// Handle a tap on `pos` by the local player `me`
    pub fn tap(&mut self, state: &mut MatchState, me: Player, pos: Pos) -> TapOutcome {
        if state.is_finished() || state.turn() != me {
            return TapOutcome::Ignored;
        }

        if let Some(from) = self.selected {
            if let Some(mv) = self.candidates.find(pos) {
                self.clear();
                return match state.play(from, mv) {
                    Ok(committed) => TapOutcome::Committed(committed),
                    Err(err) => TapOutcome::Rejected(err),
                };
            }
        }

        let own = state.board().get(pos).is_some_and(|p| p.owner == me);
        if own {
            let candidates = selectable_moves(state.board(), pos, me);
            self.selected = Some(pos);
            self.candidates = candidates.clone();
            return TapOutcome::Selected { pos, candidates };
        }

        self.clear();
        TapOutcome::Cleared
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use draughts_core::Board;
    use draughts_types::{Move, Piece};

    #[test]
    fn test_select_then_move() {
        let mut state = MatchState::new();
        let mut sel = Selection::new();

        let outcome = sel.tap(&mut state, Player::One, Pos::new(5, 2));
        let TapOutcome::Selected { candidates, .. } = outcome else {
            panic!("expected selection, got {outcome:?}");
        };
        assert_eq!(candidates.len(), 2);
        assert_eq!(sel.selected(), Some(Pos::new(5, 2)));

        let outcome = sel.tap(&mut state, Player::One, Pos::new(4, 3));
        assert!(matches!(outcome, TapOutcome::Committed(_)));
        assert_eq!(sel.selected(), None);
        assert_eq!(state.turn(), Player::Two);
    }

    #[test]
    fn test_taps_ignored_off_turn() {
        let mut state = MatchState::new();
        let mut sel = Selection::new();
        assert_eq!(sel.tap(&mut state, Player::Two, Pos::new(2, 1)), TapOutcome::Ignored);
    }

    #[test]
    fn test_tapping_elsewhere_reselects_or_clears() {
        let mut state = MatchState::new();
        let mut sel = Selection::new();

        sel.tap(&mut state, Player::One, Pos::new(5, 2));
        let outcome = sel.tap(&mut state, Player::One, Pos::new(5, 4));
        assert!(matches!(outcome, TapOutcome::Selected { pos, .. } if pos == Pos::new(5, 4)));

        // Opponent piece drops the selection
        assert_eq!(sel.tap(&mut state, Player::One, Pos::new(2, 1)), TapOutcome::Cleared);
        assert_eq!(sel.selected(), None);
        assert!(sel.candidates().is_empty());
    }

    #[test]
    fn test_forced_capture_leaves_other_piece_without_moves() {
        let board = Board::blank()
            .place(Pos::new(4, 3), Piece::man(Player::One))
            .place(Pos::new(3, 2), Piece::man(Player::Two))
            .place(Pos::new(6, 7), Piece::man(Player::One));
        let mut state = MatchState::from_parts(board, Player::One, None);
        let mut sel = Selection::new();

        let outcome = sel.tap(&mut state, Player::One, Pos::new(6, 7));
        assert!(matches!(outcome, TapOutcome::Selected { ref candidates, .. } if candidates.is_empty()));

        // Tapping where a simple move would go just clears
        assert_eq!(sel.tap(&mut state, Player::One, Pos::new(5, 6)), TapOutcome::Cleared);

        sel.tap(&mut state, Player::One, Pos::new(4, 3));
        let outcome = sel.tap(&mut state, Player::One, Pos::new(2, 1));
        let TapOutcome::Committed(done) = outcome else {
            panic!("expected commit, got {outcome:?}");
        };
        assert_eq!(done.hops, vec![Move::jump(Pos::new(2, 1), Pos::new(3, 2))]);
        assert_eq!(state.winner(), Some(Player::One));

        // Finished matches ignore input
        assert_eq!(sel.tap(&mut state, Player::One, Pos::new(2, 1)), TapOutcome::Ignored);
    }
}
