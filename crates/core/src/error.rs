use thiserror::Error;

/// Errors raised by board operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("Action {0} is outside the board (0..9)")]
    OutOfRange(usize),

    #[error("Cell {0} is already occupied")]
    Occupied(usize),

    #[error("Key {0} is outside the canonical key space (0..19683)")]
    InvalidKey(u32),

    #[error("Cannot parse board from {0:?}: expected 9 cells of 'X', 'O', '-' or '.'")]
    Parse(String),
}
