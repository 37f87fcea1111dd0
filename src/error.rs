//! Error types for the gomoku-zero crate.

use thiserror::Error;

/// Main error type for the crate.
///
/// Every variant is recoverable at the session boundary: the request that
/// triggered it is answered with an error payload and the session continues.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("invalid move: {reason} at ({x}, {y})")]
    InvalidMove { x: usize, y: usize, reason: String },

    #[error("action {action} is out of range for a {rows}x{cols} board")]
    ActionOutOfRange {
        action: usize,
        rows: usize,
        cols: usize,
    },

    #[error("no legal moves available")]
    NoLegalMoves,

    #[error("evaluator unavailable: {0}")]
    EvaluatorUnavailable(String),

    #[error("unknown message type: {0}")]
    UnknownMessageType(String),

    #[error("invalid stone marker '{0}' (expected 'X' or 'O')")]
    InvalidStone(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Convenience type alias for Results using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
