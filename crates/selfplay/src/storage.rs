use anyhow::{bail, Context, Result};
use ndarray::{Array, Array2, Array3, Axis};
use ndarray_npy::{read_npy, write_npy};
use noughts_core::{Board, Cell, NUM_CELLS};
use noughts_mcts::OUTPUT_LEN;

use crate::data::{TrainingExample, TrainingSet};

fn inputs_path(path: &str) -> String {
    format!("{}_inputs.npy", path)
}

fn targets_path(path: &str) -> String {
    format!("{}_targets.npy", path)
}

/// Save a training set to NPY files
///
/// Creates two files:
/// - `{path}_inputs.npy`: (N, 3, 3) boards, 1 for mine, -1 for theirs, 0 for empty
/// - `{path}_targets.npy`: (N, 10) per-action values followed by the position value
///
/// # Example
/// ```no_run
/// use noughts_selfplay::{run_self_play_generation, save_training_set, SelfPlayConfig};
/// use noughts_mcts::UniformEvaluator;
///
/// # fn main() -> anyhow::Result<()> {
/// let set = run_self_play_generation(&UniformEvaluator, &SelfPlayConfig::default())?;
/// save_training_set(&set, "generation_0")?;
/// // Creates: generation_0_inputs.npy, generation_0_targets.npy
/// # Ok(())
/// # }
/// ```
pub fn save_training_set(set: &TrainingSet, path: &str) -> Result<()> {
    if set.is_empty() {
        bail!("Cannot save empty training set");
    }

    let inputs: Vec<f32> = set
        .examples
        .iter()
        .flat_map(|e| e.board.to_input())
        .collect();
    let inputs: Array3<f32> = Array::from_shape_vec((set.len(), 3, 3), inputs)?;

    let targets: Vec<f32> = set.examples.iter().flat_map(|e| e.target).collect();
    let targets: Array2<f32> = Array::from_shape_vec((set.len(), OUTPUT_LEN), targets)?;

    let inputs_file = inputs_path(path);
    write_npy(&inputs_file, &inputs).with_context(|| format!("writing {inputs_file}"))?;
    let targets_file = targets_path(path);
    write_npy(&targets_file, &targets).with_context(|| format!("writing {targets_file}"))?;

    Ok(())
}

/// Load a training set written by [`save_training_set`]
pub fn load_training_set(path: &str) -> Result<TrainingSet> {
    let inputs_file = inputs_path(path);
    let inputs: Array3<f32> =
        read_npy(&inputs_file).with_context(|| format!("reading {inputs_file}"))?;
    let targets_file = targets_path(path);
    let targets: Array2<f32> =
        read_npy(&targets_file).with_context(|| format!("reading {targets_file}"))?;

    if inputs.shape()[1..] != [3, 3] || targets.shape()[1] != OUTPUT_LEN {
        bail!(
            "unexpected training set shapes {:?} and {:?}",
            inputs.shape(),
            targets.shape()
        );
    }
    if inputs.len_of(Axis(0)) != targets.len_of(Axis(0)) {
        bail!(
            "{} inputs but {} targets",
            inputs.len_of(Axis(0)),
            targets.len_of(Axis(0))
        );
    }

    let mut examples = Vec::with_capacity(targets.nrows());
    for (input, row) in inputs.outer_iter().zip(targets.outer_iter()) {
        let mut cells = [Cell::Empty; NUM_CELLS];
        for (cell, &value) in cells.iter_mut().zip(input.iter()) {
            *cell = cell_from_value(value)?;
        }

        let mut target = [0.0; OUTPUT_LEN];
        for (t, &value) in target.iter_mut().zip(row.iter()) {
            *t = value;
        }
        examples.push(TrainingExample::new(Board::from_cells(cells), target));
    }

    Ok(TrainingSet::new(examples))
}

fn cell_from_value(value: f32) -> Result<Cell> {
    match value {
        v if v == 0.0 => Ok(Cell::Empty),
        v if v == 1.0 => Ok(Cell::Mine),
        v if v == -1.0 => Ok(Cell::Theirs),
        v => bail!("invalid cell value {v}"),
    }
}
