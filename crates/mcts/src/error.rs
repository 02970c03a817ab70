use noughts_core::{BoardError, StateKey};
use thiserror::Error;

/// Errors reported by an evaluator implementation
#[derive(Error, Debug)]
pub enum EvaluatorError {
    #[error("Evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Training failed: {0}")]
    TrainingFailed(String),

    #[error("Model error: {0}")]
    Model(#[from] noughts_nn::NnError),
}

#[derive(Error, Debug)]
pub enum MctsError {
    #[error("Board error: {0}")]
    Board(#[from] BoardError),

    #[error("Evaluator error: {0}")]
    Evaluator(#[from] EvaluatorError),

    #[error("Terminal position cannot be searched")]
    TerminalPosition,

    #[error("Terminal node {0} cannot be expanded")]
    TerminalExpansion(StateKey),

    #[error("Evaluator returned {0} values, expected 10")]
    EvaluatorShape(usize),

    #[error("Evaluator returned a non-finite value at index {0}")]
    NonFiniteOutput(usize),

    #[error("Key {0} does not decode back to the board it was built from")]
    EncodingRoundTrip(StateKey),

    #[error("No node for key {0}")]
    UnknownNode(StateKey),

    #[error("No legal moves available")]
    NoLegalMoves,
}

pub type Result<T> = std::result::Result<T, MctsError>;
