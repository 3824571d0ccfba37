//! Tagger error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaggerError {
    #[error("Invalid FEN: {0}")]
    InvalidFen(String),

    #[error("Invalid move at ply {ply}: {uci}")]
    InvalidMove { ply: usize, uci: String },

    #[error("Puzzle has no moves")]
    EmptyMainline,

    #[error("Malformed row: expected {expected} columns, found {found}")]
    MalformedRow { expected: usize, found: usize },

    #[error("Malformed tag: {0:?}")]
    MalformedTag(String),
}
