//! Rules for noughts and crosses on a 3×3 grid.
//!
//! Boards are always stored from the perspective of the player about to
//! move: their marks are [`Cell::Mine`], the opponent's are
//! [`Cell::Theirs`]. Passing the turn is [`Board::flip`].

mod board;
mod error;

pub use board::{Board, Cell, Mark, Reward, StateKey, KEY_SPACE, NUM_ACTIONS, NUM_CELLS};
pub use error::BoardError;
