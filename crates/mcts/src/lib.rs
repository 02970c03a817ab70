//! Policy/value guided tree search for noughts and crosses.
//!
//! Each iteration descends from the root by the selection score
//! `prior + sqrt(N_parent) / (N_child + 1)`, expands the leaf it reaches
//! with one batched evaluator call for its new children, and backs values up as
//! `1 - mean(child values)`. The final move maximises the mover's value.

// Module declarations
mod backup;
mod config;
mod error;
mod evaluation;
mod expansion;
mod mcts;
mod search_result;
mod selection;
mod tree;

// Public exports
pub use config::MctsConfig;
pub use error::{EvaluatorError, MctsError, Result};
pub use evaluation::{evaluate, evaluate_batch, Evaluator, Prediction, UniformEvaluator};
pub use mcts::{choose_move, Mcts};
pub use search_result::SearchResult;
pub use tree::{SearchNode, SearchTree};

pub use noughts_nn::OUTPUT_LEN;
