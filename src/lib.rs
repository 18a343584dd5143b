//! Draughts (workspace facade crate).
//!
//! This package exposes `draughts::{types, core, engine, sync}` as one public
//! API while the implementation lives in dedicated crates under `crates/`.

pub use draughts_core as core;
pub use draughts_engine as engine;
pub use draughts_sync as sync;
pub use draughts_types as types;
