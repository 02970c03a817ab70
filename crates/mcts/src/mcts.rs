use noughts_core::{Board, Mark, StateKey, NUM_ACTIONS};
use rand::distributions::{Distribution, WeightedIndex};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::{debug, trace};

use crate::backup::backup;
use crate::config::MctsConfig;
use crate::error::{MctsError, Result};
use crate::evaluation::{evaluate, Evaluator};
use crate::expansion::expand;
use crate::search_result::SearchResult;
use crate::selection::descend;
use crate::tree::{SearchNode, SearchTree};

/// Policy/value guided tree search over canonical boards.
///
/// The tree survives between searches until [`reset`](Mcts::reset), so
/// one engine can accumulate statistics across a whole batch of games.
pub struct Mcts {
    tree: SearchTree,
    rng: ChaCha20Rng,
}

impl Mcts {
    /// Create a new search engine with an empty tree
    pub fn new() -> Self {
        Self::with_seed(0)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            tree: SearchTree::new(),
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    /// Run the configured number of iterations from `board`
    /// and pick the move with the best value for the player to move.
    pub fn search<E: Evaluator + ?Sized>(
        &mut self,
        board: &Board,
        evaluator: &E,
        config: &MctsConfig,
    ) -> Result<SearchResult> {
        // Check if position is already terminal
        if board.reward().is_some() {
            return Err(MctsError::TerminalPosition);
        }

        let root_key = board.encode();
        if Board::decode(root_key)? != *board {
            return Err(MctsError::EncodingRoundTrip(root_key));
        }

        if !self.tree.contains(root_key) {
            let prediction = evaluate(evaluator, board)?;
            self.tree
                .insert(root_key, SearchNode::new(1.0, &prediction))?;
        }

        let iterations = config.num_iterations.max(1);
        for iteration in 0..iterations {
            let path = descend(&self.tree, root_key, config.exploration)?;
            let leaf = path[path.len() - 1];

            if !self.tree.node(leaf)?.is_terminal() {
                expand(&mut self.tree, leaf, evaluator)?;
            }

            backup(&mut self.tree, &path)?;

            trace!(
                iteration,
                leaf,
                depth = path.len() - 1,
                value = self.tree.node(leaf)?.value,
                "search iteration complete"
            );
        }

        let result = self.create_search_result(root_key, iterations, config.temperature)?;
        debug!(
            root = root_key,
            best_move = result.best_move,
            root_value = result.root_value,
            tree_size = self.tree.len(),
            "search complete"
        );
        Ok(result)
    }

    /// Create search result from root node statistics
    fn create_search_result(
        &mut self,
        root_key: StateKey,
        iterations: u32,
        temperature: f32,
    ) -> Result<SearchResult> {
        let root = self.tree.node(root_key)?;

        let mut action_values = [None; NUM_ACTIONS];
        let mut visit_counts = [0u32; NUM_ACTIONS];
        for (action, child_key) in root.child_keys() {
            let child = self.tree.node(child_key)?;
            // Child values belong to the opponent
            action_values[action] = Some(1.0 - child.value);
            visit_counts[action] = child.visit_count;
        }
        let root_value = root.value;

        let best_move = select_move(&action_values, temperature, &mut self.rng)
            .ok_or(MctsError::NoLegalMoves)?;

        Ok(SearchResult {
            best_move,
            action_values,
            visit_counts,
            root_value,
            iterations,
        })
    }

    /// Reset the tree (clear all nodes)
    pub fn reset(&mut self) {
        self.tree.clear();
    }

    /// Get the number of nodes in the tree
    pub fn tree_size(&self) -> usize {
        self.tree.len()
    }

    pub fn tree(&self) -> &SearchTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut SearchTree {
        &mut self.tree
    }
}

impl Default for Mcts {
    fn default() -> Self {
        Self::new()
    }
}

/// Pick a move for the player at the root with a fresh tree.
///
/// The returned move is checked against `board`; an illegal result is
/// reported rather than corrected.
pub fn choose_move<E: Evaluator + ?Sized>(
    board: &Board,
    evaluator: &E,
    config: &MctsConfig,
) -> Result<usize> {
    let mut mcts = Mcts::with_seed(config.seed);
    let result = mcts.search(board, evaluator, config)?;
    board.apply_move(result.best_move, Mark::Mine)?;
    Ok(result.best_move)
}

/// Select move based on temperature
///
/// - temperature ≈ 0: argmax of value, lowest action on ties
/// - temperature > 0: sample proportional to value^(1/t)
fn select_move(
    action_values: &[Option<f32>; NUM_ACTIONS],
    temperature: f32,
    rng: &mut ChaCha20Rng,
) -> Option<usize> {
    let candidates: Vec<(usize, f32)> = action_values
        .iter()
        .enumerate()
        .filter_map(|(action, v)| v.map(|v| (action, v)))
        .collect();

    let argmax = || {
        candidates
            .iter()
            .fold(None, |best: Option<(usize, f32)>, &(a, v)| match best {
                Some((_, bv)) if bv >= v => best,
                _ => Some((a, v)),
            })
            .map(|(a, _)| a)
    };

    if temperature < 0.01 {
        return argmax();
    }

    let inv_temp = 1.0f64 / temperature as f64;
    let weights: Vec<f64> = candidates
        .iter()
        .map(|&(_, v)| (v.max(0.0) as f64).powf(inv_temp))
        .collect();

    match WeightedIndex::new(&weights) {
        Ok(dist) => Some(candidates[dist.sample(rng)].0),
        // All weights zero
        Err(_) => argmax(),
    }
}
