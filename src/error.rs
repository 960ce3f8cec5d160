use crate::color::Color;
use crate::r#move::Move;

/// Errors raised by the rules engine and its text conventions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChessError {
    /// The move is not among the legal moves of the piece on its start
    /// square, or that piece does not belong to the side to move.
    #[error("invalid move: {0}")]
    InvalidMove(Move),

    #[error("invalid square notation: {0}")]
    InvalidSquare(String),

    #[error("invalid move notation: {0}")]
    InvalidNotation(String),
}

/// Errors raised by the game service and its store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("game not found: {0}")]
    GameNotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("{0} is already taken")]
    AlreadyTaken(Color),

    #[error("{0} is not a player in this game")]
    NotAPlayer(String),

    #[error("it is not your turn")]
    NotYourTurn,

    #[error("the game is over")]
    GameOver,

    #[error("game store is full ({0} games)")]
    StoreFull(usize),

    #[error("storage failure: {0}")]
    Storage(String),

    #[error(transparent)]
    InvalidMove(#[from] ChessError),
}
