//! Self-play training for the noughts and crosses tree search
//!
//! This crate provides functionality for:
//! - Playing self-play games in a tree shared across a generation
//! - Turning the tree statistics into per-position training targets
//! - Fitting an evaluator generation by generation
//! - Playing matches between evaluators
//! - Saving training sets to NPY files
//!
//! # Example
//!
//! ```no_run
//! use noughts_nn::TabularEvaluator;
//! use noughts_selfplay::{play_series, train, SelfPlayConfig};
//! use noughts_mcts::{MctsConfig, UniformEvaluator};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut evaluator = TabularEvaluator::new();
//! let config = SelfPlayConfig::default().with_games(200).with_iterations(50);
//!
//! let reports = train(&mut evaluator, 3, &config)?;
//! println!("Last generation drew {} games", reports[2].draws);
//!
//! let summary = play_series(&evaluator, &UniformEvaluator, 10, &MctsConfig::default())?;
//! println!("Score against uniform: {}", summary.a_score());
//! # Ok(())
//! # }
//! ```

mod arena;
mod config;
mod data;
mod game;
mod generation;
pub mod storage;
mod training;

// Re-export public API
pub use arena::{play_match, play_series, MatchOutcome, MatchSummary};
pub use config::SelfPlayConfig;
pub use data::{EpisodeRecord, GameResult, TrainingExample, TrainingSet};
pub use game::play_game;
pub use generation::{
    play_generation, run_self_play_generation, train, train_generation, GenerationReport,
};
pub use storage::{load_training_set, save_training_set};
pub use training::{build_training_set, target_for};
