//! Chess rules engine with an in-memory service layer for shared live games.
//!
//! The engine ([`game::Game`], [`board::Board`], [`movegen`]) is synchronous
//! plain data. [`service::GameService`] wraps it with storage, per-game
//! serialization of moves and notification of connected participants.

pub mod board;
pub mod color;
pub mod config;
pub mod error;
pub mod game;
pub mod movegen;
pub mod r#move;
pub mod notify;
pub mod outcome;
pub mod pieces;
pub mod position;
pub mod service;
pub mod store;

pub use color::Color;
pub use error::ChessError;
pub use game::Game;
pub use r#move::Move;
pub use pieces::{Piece, PieceType};
pub use position::Position;
