//! # relay-core
//!
//! Core types for the Chain Reaction engine relay.
//!
//! This crate provides the pieces that have no I/O of their own:
//! - Board model (cells, colors, moves) with invariant checks
//! - Exchange record encoding shared with the external engine
//! - Move extraction by diffing a prior board against rewritten exchange text
//! - Error types

pub mod board;
pub mod error;
pub mod exchange;

pub use board::{Board, Cell, Color, Move};
pub use error::{RelayError, Result, error_codes};
pub use exchange::{DEFAULT_LABEL, encode, extract_move, parse_token};
