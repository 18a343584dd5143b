//! Board module - the 8x8 draughts grid
//!
//! The board is a value: every transformation returns a fresh board and leaves
//! the receiver untouched, so chain search can branch freely.
//! Uses a flat array for better cache locality and zero-allocation.
//! Coordinates: (row, col) where both range 0..8, row 0 at the top.
//! Only playable squares ((row + col) odd) are ever occupied.

use crate::types::{Move, Piece, Player, Pos, BOARD_CELLS, BOARD_SIZE};

/// Piece totals per side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PieceCount {
    pub player_one: usize,
    pub player_two: usize,
}

impl PieceCount {
    pub fn of(&self, player: Player) -> usize {
        match player {
            Player::One => self.player_one,
            Player::Two => self.player_two,
        }
    }
}

/// The game board - 8 x 8 squares using flat array storage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    /// Flat array of squares, row-major order (row * 8 + col)
    cells: [Option<Piece>; BOARD_CELLS],
}

impl Board {
    /// Create a board with no pieces
    pub fn blank() -> Self {
        Self {
            cells: [None; BOARD_CELLS],
        }
    }

    /// Create the standard starting position: 12 men per side on the
    /// playable squares of each side's three home rows
    pub fn initial() -> Self {
        let mut board = Self::blank();
        for player in [Player::Two, Player::One] {
            for row in player.home_rows() {
                for col in 0..BOARD_SIZE {
                    let pos = Pos::new(row, col);
                    if pos.is_playable() {
                        board.cells[pos.index()] = Some(Piece::man(player));
                    }
                }
            }
        }
        board
    }

    /// Get the piece at `pos`, if any
    #[inline(always)]
    pub fn get(&self, pos: Pos) -> Option<Piece> {
        self.cells[pos.index()]
    }

    /// Check if `pos` is empty
    pub fn is_empty(&self, pos: Pos) -> bool {
        self.get(pos).is_none()
    }

    /// New board with `piece` standing on `pos`
    pub fn place(&self, pos: Pos, piece: Piece) -> Board {
        let mut next = self.clone();
        next.cells[pos.index()] = Some(piece);
        next
    }

    /// New board with `pos` emptied
    pub fn remove(&self, pos: Pos) -> Board {
        let mut next = self.clone();
        next.cells[pos.index()] = None;
        next
    }

    /// New board with the piece on `from` moved to `mv.target` without any
    /// promotion; the captured piece, if any, is taken off.
    ///
    /// Chain search uses this so a piece keeps its rank for a whole search.
    pub fn apply_hop_unpromoted(&self, from: Pos, mv: &Move) -> Board {
        let mut next = self.clone();
        let piece = next.cells[from.index()].take();
        next.cells[mv.target.index()] = piece;
        if let Some(captured) = mv.captured {
            next.cells[captured.index()] = None;
        }
        next
    }

    /// New board with the hop applied and the moving man crowned if it
    /// landed on its promotion row
    pub fn apply_hop(&self, from: Pos, mv: &Move) -> Board {
        let mut next = self.apply_hop_unpromoted(from, mv);
        let idx = mv.target.index();
        if let Some(piece) = next.cells[idx] {
            if !piece.is_king() && mv.target.row == piece.owner.promotion_row() {
                next.cells[idx] = Some(piece.crowned());
            }
        }
        next
    }

    /// Occupied squares in row-major order
    pub fn pieces(&self) -> impl Iterator<Item = (Pos, Piece)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(idx, cell)| cell.map(|piece| (Pos::from_index(idx), piece)))
    }

    /// Squares holding `player`'s pieces, row-major
    pub fn pieces_of(&self, player: Player) -> impl Iterator<Item = (Pos, Piece)> + '_ {
        self.pieces().filter(move |(_, piece)| piece.owner == player)
    }

    /// Count pieces per side
    pub fn count(&self) -> PieceCount {
        let mut count = PieceCount::default();
        for (_, piece) in self.pieces() {
            match piece.owner {
                Player::One => count.player_one += 1,
                Player::Two => count.player_two += 1,
            }
        }
        count
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Option<Piece>] {
        &self.cells
    }

    /// Build from rows of cells (row-major, 8 x 8)
    pub fn from_rows(rows: [[Option<Piece>; BOARD_SIZE as usize]; BOARD_SIZE as usize]) -> Self {
        let mut board = Self::blank();
        for (row, cells) in rows.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                board.cells[row * BOARD_SIZE as usize + col] = *cell;
            }
        }
        board
    }

    /// Convert to rows of cells (row-major, 8 x 8)
    pub fn to_rows(&self) -> [[Option<Piece>; BOARD_SIZE as usize]; BOARD_SIZE as usize] {
        let size = BOARD_SIZE as usize;
        std::array::from_fn(|row| std::array::from_fn(|col| self.cells[row * size + col]))
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Rank, PIECES_PER_SIDE};

    #[test]
    fn test_initial_setup() {
        let board = Board::initial();
        let count = board.count();
        assert_eq!(count.player_one, PIECES_PER_SIDE);
        assert_eq!(count.player_two, PIECES_PER_SIDE);

        for (pos, piece) in board.pieces() {
            assert!(pos.is_playable());
            assert_eq!(piece.rank, Rank::Man);
            assert!(piece.owner.home_rows().contains(&pos.row));
        }

        // Middle rows start empty
        for row in 3..5 {
            for col in 0..8 {
                assert!(board.is_empty(Pos::new(row, col)));
            }
        }
    }

    #[test]
    fn test_transformations_leave_input_untouched() {
        let board = Board::initial();
        let before = board.clone();

        let placed = board.place(Pos::new(4, 3), Piece::king(Player::One));
        let removed = board.remove(Pos::new(5, 0));

        assert_eq!(board, before);
        assert_eq!(placed.get(Pos::new(4, 3)), Some(Piece::king(Player::One)));
        assert!(removed.is_empty(Pos::new(5, 0)));
        assert_eq!(removed.count().player_one, PIECES_PER_SIDE - 1);
    }

    #[test]
    fn test_apply_hop_removes_captured_piece() {
        let board = Board::blank()
            .place(Pos::new(4, 3), Piece::man(Player::One))
            .place(Pos::new(3, 2), Piece::man(Player::Two));

        let next = board.apply_hop(Pos::new(4, 3), &Move::jump(Pos::new(2, 1), Pos::new(3, 2)));

        assert!(next.is_empty(Pos::new(4, 3)));
        assert!(next.is_empty(Pos::new(3, 2)));
        assert_eq!(next.get(Pos::new(2, 1)), Some(Piece::man(Player::One)));
    }

    #[test]
    fn test_apply_hop_promotes_on_last_row() {
        let board = Board::blank()
            .place(Pos::new(1, 2), Piece::man(Player::One))
            .place(Pos::new(6, 1), Piece::man(Player::Two));

        let one = board.apply_hop(Pos::new(1, 2), &Move::step(Pos::new(0, 1)));
        assert_eq!(one.get(Pos::new(0, 1)), Some(Piece::king(Player::One)));

        let two = board.apply_hop(Pos::new(6, 1), &Move::step(Pos::new(7, 0)));
        assert_eq!(two.get(Pos::new(7, 0)), Some(Piece::king(Player::Two)));

        // Unpromoted variant keeps rank
        let raw = board.apply_hop_unpromoted(Pos::new(1, 2), &Move::step(Pos::new(0, 1)));
        assert_eq!(raw.get(Pos::new(0, 1)), Some(Piece::man(Player::One)));
    }

    #[test]
    fn test_rows_roundtrip() {
        let board = Board::initial().remove(Pos::new(2, 1));
        assert_eq!(Board::from_rows(board.to_rows()), board);
    }
}
