//! Error types shared by the board, the resolvers and the session driver.

use thiserror::Error;

use crate::session::SessionState;

/// Errors produced by the engine.
///
/// All of these are deterministic and local; there is no I/O failure mode
/// inside the core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A coordinate outside the board was accessed.
    #[error("position ({x}, {y}) is outside the {width}x{height} board")]
    OutOfRange {
        x: isize,
        y: isize,
        width: usize,
        height: usize,
    },

    /// A zero vector was supplied where a move direction was expected.
    ///
    /// `movement::compute_move` treats this as a no-op rather than failing;
    /// the error is surfaced only by the strict `Direction` constructors.
    #[error("({dx}, {dy}) is not a move direction")]
    InvalidDirection { dx: i32, dy: i32 },

    /// A new move was requested while the previous one is still settling.
    #[error("move rejected: session is {state:?}")]
    ConcurrentMoveRejected { state: SessionState },

    /// A configuration value is outside its accepted range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A textual board fixture could not be parsed.
    #[error("invalid board text: {0}")]
    Parse(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EngineError>;
