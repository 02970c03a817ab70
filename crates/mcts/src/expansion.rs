use noughts_core::{Board, Mark, StateKey, NUM_ACTIONS};

use crate::error::{MctsError, Result};
use crate::evaluation::{evaluate_batch, Evaluator};
use crate::tree::{SearchNode, SearchTree};

/// Create the children of `key`, one per legal action.
///
/// Each child's prior is this node's cached prior for the action. New
/// non-terminal children are evaluated with one batched call on their
/// canonical (flipped) boards; terminal children get their reward as a
/// fixed value. Children already in the tree are linked as they are.
///
/// Expanding an already expanded node is a no-op; expanding a terminal
/// node is an error.
pub fn expand<E: Evaluator + ?Sized>(
    tree: &mut SearchTree,
    key: StateKey,
    evaluator: &E,
) -> Result<()> {
    let node = tree.node(key)?;
    if node.is_terminal() {
        return Err(MctsError::TerminalExpansion(key));
    }
    if node.expanded {
        return Ok(());
    }
    let priors = node.priors;

    let board = Board::decode(key)?;
    if board.reward().is_some() {
        return Err(MctsError::TerminalExpansion(key));
    }

    let mut children = [None; NUM_ACTIONS];
    let mut pending: Vec<(usize, StateKey, Board)> = Vec::new();

    for action in board.legal_moves() {
        let child_board = board.apply_move(action, Mark::Mine)?.flip();
        let child_key = child_board.encode();
        children[action] = Some(child_key);

        if tree.contains(child_key) {
            continue;
        }
        match child_board.reward() {
            Some(reward) => tree.insert(child_key, SearchNode::new_terminal(priors[action], reward))?,
            None => pending.push((action, child_key, child_board)),
        }
    }

    let boards: Vec<Board> = pending.iter().map(|(_, _, b)| *b).collect();
    let predictions = evaluate_batch(evaluator, &boards)?;
    for ((action, child_key, _), prediction) in pending.into_iter().zip(predictions) {
        tree.insert(child_key, SearchNode::new(priors[action], &prediction))?;
    }

    let node = tree.node_mut(key)?;
    node.children = children;
    node.expanded = true;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::{evaluate, UniformEvaluator};
    use crate::error::EvaluatorError;
    use noughts_core::Reward;
    use noughts_nn::OUTPUT_LEN;
    use std::cell::Cell;

    struct CountingEvaluator {
        batches: Cell<usize>,
        boards: Cell<usize>,
    }

    impl CountingEvaluator {
        fn new() -> Self {
            Self {
                batches: Cell::new(0),
                boards: Cell::new(0),
            }
        }
    }

    impl Evaluator for CountingEvaluator {
        fn predict(&self, board: &Board) -> std::result::Result<Vec<f32>, EvaluatorError> {
            self.boards.set(self.boards.get() + 1);
            UniformEvaluator.predict(board)
        }

        fn predict_batch(
            &self,
            boards: &[Board],
        ) -> std::result::Result<Vec<Vec<f32>>, EvaluatorError> {
            self.batches.set(self.batches.get() + 1);
            boards.iter().map(|b| self.predict(b)).collect()
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

    fn tree_with_root(board: &Board) -> SearchTree {
        let mut tree = SearchTree::new();
        let prediction = evaluate(&UniformEvaluator, board).unwrap();
        tree.insert(board.encode(), SearchNode::new(1.0, &prediction))
            .unwrap();
        tree
    }

    #[test]
    fn test_expand_empty_board() {
        let board = Board::new();
        let mut tree = tree_with_root(&board);
        let model = CountingEvaluator::new();

        expand(&mut tree, 0, &model).unwrap();

        let root = tree.node(0).unwrap();
        assert!(root.expanded);
        assert_eq!(root.child_keys().count(), 9);
        assert_eq!(tree.len(), 10);
        assert_eq!(model.batches.get(), 1);
        assert_eq!(model.boards.get(), 9);

        // Child for action 4 has the opponent's mark in the centre
        let child_key = root.children[4].unwrap();
        let child_board = Board::decode(child_key).unwrap();
        assert_eq!(child_board, "----O----".parse().unwrap());
        assert!((tree.node(child_key).unwrap().prior_probability - 1.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_expand_is_idempotent() {
        let board = Board::new();
        let mut tree = tree_with_root(&board);
        let model = CountingEvaluator::new();

        expand(&mut tree, 0, &model).unwrap();
        let children = tree.node(0).unwrap().children;
        expand(&mut tree, 0, &model).unwrap();

        assert_eq!(tree.node(0).unwrap().children, children);
        assert_eq!(model.batches.get(), 1);
    }

    #[test]
    fn test_expand_creates_terminal_child_without_evaluation() {
        let board: Board = "XX-OO----".parse().unwrap();
        let mut tree = tree_with_root(&board);
        let model = CountingEvaluator::new();
        let key = board.encode();

        expand(&mut tree, key, &model).unwrap();

        let winning_child = tree.node(key).unwrap().children[2].unwrap();
        let child = tree.node(winning_child).unwrap();
        assert_eq!(child.terminal, Some(Reward::Loss));
        assert_eq!(child.value, 0.0);
        // Five empty cells, one of them ends the game
        assert_eq!(model.boards.get(), 4);
    }

    #[test]
    fn test_expand_terminal_node_is_error() {
        let board: Board = "OOOXX-X--".parse().unwrap();
        let key = board.encode();
        let mut tree = SearchTree::new();
        tree.insert(key, SearchNode::new_terminal(1.0, Reward::Loss))
            .unwrap();

        let result = expand(&mut tree, key, &UniformEvaluator);
        assert!(matches!(result, Err(MctsError::TerminalExpansion(k)) if k == key));
    }

    #[test]
    fn test_expand_links_existing_children() {
        let board = Board::new();
        let mut tree = tree_with_root(&board);
        let child_key = board.apply_move(0, Mark::Mine).unwrap().flip().encode();
        let prediction = evaluate(&UniformEvaluator, &Board::new()).unwrap();
        let mut existing = SearchNode::new(0.9, &prediction);
        existing.value = 0.25;
        existing.visit_count = 7;
        tree.insert(child_key, existing.clone()).unwrap();

        expand(&mut tree, 0, &UniformEvaluator).unwrap();

        assert_eq!(tree.node(child_key).unwrap(), &existing);
    }
}
