use std::collections::HashSet;

use anyhow::{Context, Result};
use noughts_core::{Board, StateKey, NUM_ACTIONS};
use noughts_mcts::{SearchNode, SearchTree, OUTPUT_LEN};

use crate::data::{TrainingExample, TrainingSet};

/// Build one training example per distinct key, in first-visit order
///
/// Targets come from the tree after self-play:
/// - terminal positions: every entry is the terminal reward
/// - expanded positions: entry `a` is `1 - score(child_a)` for legal
///   actions and 0 for occupied cells
/// - unexpanded positions: the node's own prior for every action
///
/// The last entry is always the node's own score.
pub fn build_training_set(tree: &SearchTree, keys: &[StateKey]) -> Result<TrainingSet> {
    let mut seen = HashSet::with_capacity(keys.len());
    let mut examples = Vec::new();

    for &key in keys {
        if !seen.insert(key) {
            continue;
        }
        let node = tree
            .node(key)
            .with_context(|| format!("training key {key} missing from tree"))?;
        let board = Board::decode(key)?;
        examples.push(TrainingExample::new(board, target_for(tree, node)?));
    }

    Ok(TrainingSet::new(examples))
}

/// Compute the ten-entry target for a single node
pub fn target_for(tree: &SearchTree, node: &SearchNode) -> Result<[f32; OUTPUT_LEN]> {
    if let Some(reward) = node.terminal {
        return Ok([reward.value(); OUTPUT_LEN]);
    }

    let mut target = [0.0; OUTPUT_LEN];
    if node.expanded {
        for (action, child_key) in node.child_keys() {
            target[action] = 1.0 - tree.node(child_key)?.score();
        }
    } else {
        target[..NUM_ACTIONS].fill(node.prior_probability);
    }
    target[NUM_ACTIONS] = node.score();
    Ok(target)
}
