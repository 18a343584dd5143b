//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (rule engine, selection controller, sync protocol).
//!
//! # Board Geometry
//!
//! Standard 8x8 draughts board:
//!
//! - **Size**: 8 rows x 8 columns, `(row, col)` with row 0 at the top
//! - **Playable squares**: `(row + col)` odd; the others are always empty
//! - **Setup**: Player One on rows 5-7, Player Two on rows 0-2
//! - **Promotion**: row 0 for Player One, row 7 for Player Two
//!
//! # Timing Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `REMATCH_TIMEOUT_MS` | 30000 | Local expiry of an unanswered rematch request |
//!
//! # Examples
//!
//! ```
//! use draughts_types::{Player, Pos, Rank, BOARD_SIZE};
//!
//! assert_eq!(Player::One.opponent(), Player::Two);
//! assert_eq!(Player::from_number(2), Some(Player::Two));
//! assert_eq!(Player::One.promotion_row(), 0);
//!
//! let pos = Pos::new(4, 3);
//! assert!(pos.is_playable());
//! assert_eq!(pos.offset(-1, -1), Some(Pos::new(3, 2)));
//! assert_eq!(Pos::new(0, 1).offset(-1, 0), None);
//!
//! assert_eq!(Rank::Man.as_str(), "man");
//! assert_eq!(BOARD_SIZE, 8);
//! ```

/// Board side length in squares (8)
pub const BOARD_SIZE: u8 = 8;

/// Number of squares on the board (64)
pub const BOARD_CELLS: usize = (BOARD_SIZE as usize) * (BOARD_SIZE as usize);

/// Number of playable (dark) squares (32)
pub const PLAYABLE_CELLS: usize = BOARD_CELLS / 2;

/// Rows filled by each side at setup (3)
pub const SETUP_ROWS: u8 = 3;

/// Pieces per side at setup (12)
pub const PIECES_PER_SIDE: usize = (SETUP_ROWS as usize) * (BOARD_SIZE as usize) / 2;

/// Unanswered rematch requests expire locally after this long (30s).
pub const REMATCH_TIMEOUT_MS: u32 = 30_000;

/// The four diagonal directions as `(d_row, d_col)`.
///
/// Order is significant: move generation and chain search enumerate in this
/// order, which fixes the tie-break order of equally long capture chains.
pub const DIAGONALS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];


/// The two sides of a match.
///
/// On the wire a player is the number `1` or `2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    /// Moves first, starts on rows 5-7, promotes on row 0
    One,
    /// Starts on rows 0-2, promotes on row 7
    Two,
}

impl Player {
    /// Parse from the wire number (1 or 2)
    ///
    /// # Examples
    ///
    /// ```
    /// use draughts_types::Player;
    ///
    /// assert_eq!(Player::from_number(1), Some(Player::One));
    /// assert_eq!(Player::from_number(3), None);
    /// ```
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Player::One),
            2 => Some(Player::Two),
            _ => None,
        }
    }

    /// Wire number (1 or 2)
    pub fn number(self) -> u8 {
        match self {
            Player::One => 1,
            Player::Two => 2,
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Row on which this player's men are crowned
    pub fn promotion_row(self) -> u8 {
        match self {
            Player::One => 0,
            Player::Two => BOARD_SIZE - 1,
        }
    }

    /// Row step of a forward move (-1 for Player One, +1 for Player Two)
    pub fn forward(self) -> i8 {
        match self {
            Player::One => -1,
            Player::Two => 1,
        }
    }

    /// The two diagonals a man may step along
    pub fn forward_diagonals(self) -> [(i8, i8); 2] {
        let dr = self.forward();
        [(dr, -1), (dr, 1)]
    }

    /// Rows filled at setup
    pub fn home_rows(self) -> std::ops::Range<u8> {
        match self {
            Player::One => (BOARD_SIZE - SETUP_ROWS)..BOARD_SIZE,
            Player::Two => 0..SETUP_ROWS,
        }
    }
}

/// Piece rank
///
/// - **Man**: forward-only steps, captures in all four directions
/// - **King**: flying moves and flying captures along any diagonal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rank {
    Man,
    King,
}

impl Rank {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Man => "man",
            Rank::King => "king",
        }
    }
}

/// A piece on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub owner: Player,
    pub rank: Rank,
}

impl Piece {
    pub fn man(owner: Player) -> Self {
        Self {
            owner,
            rank: Rank::Man,
        }
    }

    pub fn king(owner: Player) -> Self {
        Self {
            owner,
            rank: Rank::King,
        }
    }

    pub fn is_king(&self) -> bool {
        self.rank == Rank::King
    }

    /// Same piece with rank King; kings stay kings
    pub fn crowned(self) -> Self {
        Self::king(self.owner)
    }
}

/// A board coordinate, `row` 0..8 top to bottom, `col` 0..8 left to right
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub row: u8,
    pub col: u8,
}

impl Pos {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Build from signed coordinates; `None` when off the board
    pub fn checked(row: i8, col: i8) -> Option<Self> {
        let size = BOARD_SIZE as i8;
        if row < 0 || row >= size || col < 0 || col >= size {
            return None;
        }
        Some(Self::new(row as u8, col as u8))
    }

    /// One step along `(dr, dc)`; `None` when the result is off the board
    pub fn offset(self, dr: i8, dc: i8) -> Option<Self> {
        Self::checked(self.row as i8 + dr, self.col as i8 + dc)
    }

    /// Dark squares, the only ones pieces ever stand on
    pub fn is_playable(self) -> bool {
        (self.row + self.col) % 2 == 1
    }

    /// Flat row-major index (row * 8 + col)
    #[inline(always)]
    pub fn index(self) -> usize {
        self.row as usize * BOARD_SIZE as usize + self.col as usize
    }

    /// Inverse of [`Pos::index`]
    pub fn from_index(idx: usize) -> Self {
        let size = BOARD_SIZE as usize;
        Self::new((idx / size) as u8, (idx % size) as u8)
    }
}

/// A single hop: one step, one slide, or one jump
///
/// `captured` is set exactly when `is_capture` is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub target: Pos,
    pub is_capture: bool,
    pub captured: Option<Pos>,
}

impl Move {
    pub fn step(target: Pos) -> Self {
        Self {
            target,
            is_capture: false,
            captured: None,
        }
    }

    pub fn jump(target: Pos, captured: Pos) -> Self {
        Self {
            target,
            is_capture: true,
            captured: Some(captured),
        }
    }
}
