use std::collections::BTreeMap;
use std::path::Path;

use ndarray::{Array2, Axis};
use ndarray_npy::{read_npy, write_npy};
use noughts_core::{Board, KEY_SPACE, NUM_ACTIONS};
use tracing::{debug, info};

use crate::error::{NnError, Result};

/// Length of an evaluator output row: one prior per action plus the value
pub const OUTPUT_LEN: usize = NUM_ACTIONS + 1;

const DEFAULT_LEARNING_RATE: f32 = 0.5;

/// Lookup-table evaluator with one output row per canonical key.
///
/// Rows start at a uniform prior of 1/9 per action and a value of 0.5.
/// Training moves each row toward the mean of its targets in a mini-batch.
#[derive(Debug, Clone)]
pub struct TabularEvaluator {
    table: Array2<f32>,
    learning_rate: f32,
}

impl TabularEvaluator {
    pub fn new() -> Self {
        let mut table = Array2::from_elem((KEY_SPACE, OUTPUT_LEN), 1.0 / NUM_ACTIONS as f32);
        table.column_mut(NUM_ACTIONS).fill(0.5);
        Self {
            table,
            learning_rate: DEFAULT_LEARNING_RATE,
        }
    }

    /// Set the step size used by [`fit`](Self::fit), clamped to (0, 1]
    pub fn with_learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = learning_rate.clamp(f32::EPSILON, 1.0);
        self
    }

    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    /// Output row for `board`: nine priors followed by the value
    pub fn predict(&self, board: &Board) -> Vec<f32> {
        self.table.row(board.encode() as usize).to_vec()
    }

    /// Train on `(board, target)` pairs for `epochs` passes of `batch_size` chunks.
    ///
    /// Returns the mean squared error of the final epoch, measured before
    /// each batch is applied.
    pub fn fit(
        &mut self,
        inputs: &[Board],
        targets: &[[f32; OUTPUT_LEN]],
        batch_size: usize,
        epochs: usize,
    ) -> Result<f32> {
        if inputs.len() != targets.len() {
            return Err(NnError::LengthMismatch {
                inputs: inputs.len(),
                targets: targets.len(),
            });
        }
        if inputs.is_empty() {
            return Ok(0.0);
        }

        let batch_size = batch_size.max(1);
        let mut loss = 0.0;
        for epoch in 0..epochs {
            let mut squared_error = 0.0f64;
            for (boards, batch_targets) in inputs.chunks(batch_size).zip(targets.chunks(batch_size)) {
                squared_error += self.apply_batch(boards, batch_targets);
            }
            loss = (squared_error / (inputs.len() * OUTPUT_LEN) as f64) as f32;
            debug!(epoch = epoch + 1, epochs, loss, "tabular epoch complete");
        }

        info!(
            samples = inputs.len(),
            batch_size,
            epochs,
            loss,
            "tabular evaluator fitted"
        );
        Ok(loss)
    }

    fn apply_batch(&mut self, boards: &[Board], targets: &[[f32; OUTPUT_LEN]]) -> f64 {
        // Accumulate per key so repeated positions move once by their mean error
        let mut deltas: BTreeMap<usize, ([f32; OUTPUT_LEN], u32)> = BTreeMap::new();
        let mut squared_error = 0.0f64;

        for (board, target) in boards.iter().zip(targets) {
            let key = board.encode() as usize;
            let row = self.table.row(key);
            let entry = deltas.entry(key).or_insert(([0.0; OUTPUT_LEN], 0));
            for (i, (&current, &wanted)) in row.iter().zip(target.iter()).enumerate() {
                let error = wanted - current;
                entry.0[i] += error;
                squared_error += (error * error) as f64;
            }
            entry.1 += 1;
        }

        for (key, (sum, count)) in deltas {
            let mut row = self.table.row_mut(key);
            for (cell, delta) in row.iter_mut().zip(sum) {
                *cell += self.learning_rate * delta / count as f32;
            }
        }
        squared_error
    }

    /// Write the table to `path` as a `(19683, 10)` `.npy` array
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_npy(path, &self.table)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let table: Array2<f32> = read_npy(path)?;
        if table.len_of(Axis(0)) != KEY_SPACE || table.len_of(Axis(1)) != OUTPUT_LEN {
            return Err(NnError::Shape {
                expected: KEY_SPACE * OUTPUT_LEN,
                actual: table.len(),
            });
        }
        Ok(Self {
            table,
            learning_rate: DEFAULT_LEARNING_RATE,
        })
    }
}

impl Default for TabularEvaluator {
    fn default() -> Self {
        Self::new()
    }
}
