//! Concrete evaluators for the search engine.
//!
//! [`TabularEvaluator`] keeps one output row per canonical key and is the
//! default model. With the `torch` feature, [`TorchEvaluator`] runs a
//! TorchScript policy/value network.

mod error;
mod tabular;
#[cfg(feature = "torch")]
mod torch;

pub use error::{NnError, Result};
pub use tabular::{TabularEvaluator, OUTPUT_LEN};
#[cfg(feature = "torch")]
pub use torch::TorchEvaluator;
#[cfg(feature = "torch")]
pub use tch::Device;
