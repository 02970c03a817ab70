use noughts_core::{Board, NUM_ACTIONS};
use noughts_nn::{TabularEvaluator, OUTPUT_LEN};

use crate::error::{EvaluatorError, MctsError, Result};

/// Contract the search engine needs from a learned evaluator.
///
/// `predict` maps a canonical board to ten numbers: a prior for each of
/// the nine actions followed by the probability that the player to move
/// eventually wins. `fit` trains on `(board, target)` pairs of the same
/// shape.
pub trait Evaluator {
    fn predict(&self, board: &Board) -> std::result::Result<Vec<f32>, EvaluatorError>;

    /// Evaluate several boards at once. Must return the same rows as
    /// calling [`predict`](Evaluator::predict) on each board in turn.
    fn predict_batch(&self, boards: &[Board]) -> std::result::Result<Vec<Vec<f32>>, EvaluatorError> {
        boards.iter().map(|b| self.predict(b)).collect()
    }

    fn fit(
        &mut self,
        inputs: &[Board],
        targets: &[[f32; OUTPUT_LEN]],
        batch_size: usize,
        epochs: usize,
    ) -> std::result::Result<(), EvaluatorError>;
}

impl Evaluator for TabularEvaluator {
    fn predict(&self, board: &Board) -> std::result::Result<Vec<f32>, EvaluatorError> {
        Ok(TabularEvaluator::predict(self, board))
    }

    fn fit(
        &mut self,
        inputs: &[Board],
        targets: &[[f32; OUTPUT_LEN]],
        batch_size: usize,
        epochs: usize,
    ) -> std::result::Result<(), EvaluatorError> {
        TabularEvaluator::fit(self, inputs, targets, batch_size, epochs)?;
        Ok(())
    }
}

#[cfg(feature = "torch")]
impl Evaluator for noughts_nn::TorchEvaluator {
    fn predict(&self, board: &Board) -> std::result::Result<Vec<f32>, EvaluatorError> {
        Ok(noughts_nn::TorchEvaluator::predict(self, board)?)
    }

    fn fit(
        &mut self,
        _inputs: &[Board],
        _targets: &[[f32; OUTPUT_LEN]],
        _batch_size: usize,
        _epochs: usize,
    ) -> std::result::Result<(), EvaluatorError> {
        Err(noughts_nn::NnError::Unsupported("TorchScript modules").into())
    }
}

/// Evaluator that returns a uniform prior and a neutral value.
/// Useful for testing search without a trained model.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformEvaluator;

impl Evaluator for UniformEvaluator {
    fn predict(&self, _board: &Board) -> std::result::Result<Vec<f32>, EvaluatorError> {
        let mut out = vec![1.0 / NUM_ACTIONS as f32; OUTPUT_LEN];
        out[NUM_ACTIONS] = 0.5;
        Ok(out)
    }

    fn fit(
        &mut self,
        _inputs: &[Board],
        _targets: &[[f32; OUTPUT_LEN]],
        _batch_size: usize,
        _epochs: usize,
    ) -> std::result::Result<(), EvaluatorError> {
        Ok(())
    }
}

/// A validated evaluator output
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub priors: [f32; NUM_ACTIONS],
    pub value: f32,
}

impl Prediction {
    /// Check length and finiteness of a raw evaluator row
    pub fn from_output(output: &[f32]) -> Result<Self> {
        if output.len() != OUTPUT_LEN {
            return Err(MctsError::EvaluatorShape(output.len()));
        }
        if let Some(i) = output.iter().position(|v| !v.is_finite()) {
            return Err(MctsError::NonFiniteOutput(i));
        }

        let mut priors = [0f32; NUM_ACTIONS];
        priors.copy_from_slice(&output[..NUM_ACTIONS]);
        Ok(Self {
            priors,
            value: output[NUM_ACTIONS],
        })
    }
}

/// Evaluate one board and validate the output
pub fn evaluate<E: Evaluator + ?Sized>(evaluator: &E, board: &Board) -> Result<Prediction> {
    let output = evaluator.predict(board)?;
    Prediction::from_output(&output)
}

/// Evaluate a batch of boards with a single evaluator call
pub fn evaluate_batch<E: Evaluator + ?Sized>(
    evaluator: &E,
    boards: &[Board],
) -> Result<Vec<Prediction>> {
    if boards.is_empty() {
        return Ok(Vec::new());
    }
    let outputs = evaluator.predict_batch(boards)?;
    if outputs.len() != boards.len() {
        return Err(EvaluatorError::EvaluationFailed(format!(
            "Expected {} rows, got {}",
            boards.len(),
            outputs.len()
        ))
        .into());
    }
    outputs.iter().map(|o| Prediction::from_output(o)).collect()
}
