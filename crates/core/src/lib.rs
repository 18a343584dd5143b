//! Core rules module - pure, deterministic, and testable
//!
//! This crate contains every draughts rule and the match state machine. It has
//! **zero dependencies** on UI, networking, or I/O, so the same rules run in a
//! client, a headless test or a benchmark.
//!
//! # Module Structure
//!
//! - [`board`]: 8x8 board value with hop application and promotion
//! - [`movegen`]: per-piece candidate hops, captures taking precedence
//! - [`forced`]: the side-wide forced capture filter
//! - [`chain`]: multi-jump search and automatic chain extension
//! - [`game_state`]: turn handling and winner evaluation
//! - [`rng`]: LCG and short ids for rematch correlation
//!
//! # Rules
//!
//! - **Men** step one square diagonally forward and capture in all four
//!   directions by jumping an adjacent enemy onto the empty square behind it
//! - **Kings** fly: they slide any distance along a diagonal and capture a
//!   single enemy anywhere on the ray, landing on any empty square beyond it
//! - **Forced capture**: if any piece of the side to move can capture, only
//!   capturing pieces may move
//! - **Chains**: after a capture the move continues automatically along the
//!   longest available sequence
//! - **Promotion**: a man reaching the far row is crowned, also mid-chain
//! - **Loss**: no pieces left, or no legal hop on your turn
//!
//! # Example
//!
//! ```
//! use draughts_core::{MatchState, Move, Player, Pos};
//!
//! let mut game = MatchState::new();
//! let done = game
//!     .play(Pos::new(5, 0), Move::step(Pos::new(4, 1)))
//!     .unwrap();
//!
//! assert_eq!(done.landing, Pos::new(4, 1));
//! assert_eq!(game.turn(), Player::Two);
//! assert_eq!(game.winner(), None);
//! ```

pub mod board;
pub mod chain;
pub mod forced;
pub mod game_state;
pub mod movegen;
pub mod rng;

pub use draughts_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, PieceCount};
pub use chain::{all_maximal_sequences, longest_sequence, resolve_chain, CaptureSequence, ChainOutcome};
pub use forced::{capturable_pieces, selectable_moves};
pub use game_state::{evaluate_winner, has_legal_move, CommittedMove, GameError, MatchState, MatchStatus};
pub use movegen::{moves_for, Candidates, MoveList};
pub use rng::SimpleRng;
pub use types::{Move, Piece, Player, Pos, Rank};
