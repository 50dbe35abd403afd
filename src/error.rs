//! Errors surfaced by the engine API.

/// Errors returned by the game controller and the saved-session codec.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Target cell is off the board, occupied, or flips nothing.
    #[error("illegal move at ({row}, {col})")]
    IllegalMove { row: u8, col: u8 },

    #[error("it is not the player's turn")]
    NotYourTurn,

    #[error("game is already over")]
    GameAlreadyOver,

    #[error("malformed saved state: {0}")]
    MalformedSavedState(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
