use noughts_core::StateKey;

use crate::error::Result;
use crate::tree::SearchTree;

/// Walk from `root` to a leaf (unexpanded or terminal node).
///
/// Returns the path including both endpoints.
pub fn descend(tree: &SearchTree, root: StateKey, exploration: f32) -> Result<Vec<StateKey>> {
    let mut path = vec![root];
    let mut current = root;

    loop {
        let node = tree.node(current)?;

        // Stop at leaf or terminal
        if !node.expanded || node.is_terminal() {
            return Ok(path);
        }

        match select_child(tree, current, exploration)? {
            Some((_, child)) => {
                path.push(child);
                current = child;
            }
            None => return Ok(path),
        }
    }
}

/// Pick the child of `key` with the highest selection score.
///
/// Ties keep the first action in index order.
pub fn select_child(
    tree: &SearchTree,
    key: StateKey,
    exploration: f32,
) -> Result<Option<(usize, StateKey)>> {
    let node = tree.node(key)?;
    let sqrt_parent = (node.visit_count as f32).sqrt();

    let mut best: Option<(usize, StateKey, f32)> = None;
    for (action, child_key) in node.child_keys() {
        let child = tree.node(child_key)?;
        let score = selection_score(
            child.prior_probability,
            sqrt_parent,
            child.visit_count,
            exploration,
        );
        if best.map_or(true, |(_, _, s)| score > s) {
            best = Some((action, child_key, score));
        }
    }

    Ok(best.map(|(action, child_key, _)| (action, child_key)))
}

/// score = P(child) + c * sqrt(N(parent)) / (N(child) + 1)
///
/// The prior is the exploitation term; there is no separate win-rate term.
pub fn selection_score(prior: f32, sqrt_parent: f32, child_visits: u32, exploration: f32) -> f32 {
    prior + exploration * sqrt_parent / (child_visits as f32 + 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::Prediction;
    use crate::tree::SearchNode;
    use noughts_core::NUM_ACTIONS;

    fn node(prior: f32) -> SearchNode {
        SearchNode::new(
            prior,
            &Prediction {
                priors: [1.0 / 9.0; NUM_ACTIONS],
                value: 0.5,
            },
        )
    }

    /// Root 0 with children at keys 1, 2, 3 for actions 4, 5, 6
    fn small_tree(priors: [f32; 3], visits: [u32; 3], root_visits: u32) -> SearchTree {
        let mut tree = SearchTree::new();
        let mut root = node(1.0);
        root.expanded = true;
        root.visit_count = root_visits;
        for i in 0..3 {
            root.children[4 + i] = Some(1 + i as u32);
            let mut child = node(priors[i]);
            child.visit_count = visits[i];
            tree.insert(1 + i as u32, child).unwrap();
        }
        tree.insert(0, root).unwrap();
        tree
    }

    #[test]
    fn test_selection_score_unvisited() {
        // 0.5 + 10 / 1
        let score = selection_score(0.5, 100f32.sqrt(), 0, 1.0);
        assert!((score - 10.5).abs() < 1e-5);
    }

    #[test]
    fn test_selection_score_visited() {
        // 0.5 + 10 / 11
        let score = selection_score(0.5, 10.0, 10, 1.0);
        assert!((score - 1.409).abs() < 0.001);
    }

    #[test]
    fn test_select_prefers_under_visited_child() {
        let tree = small_tree([0.5, 0.3, 0.2], [8, 0, 1], 9);
        assert_eq!(select_child(&tree, 0, 1.0).unwrap(), Some((5, 2)));
    }

    #[test]
    fn test_select_prefers_prior_without_exploration() {
        let tree = small_tree([0.2, 0.5, 0.3], [8, 0, 1], 9);
        assert_eq!(select_child(&tree, 0, 0.0).unwrap(), Some((5, 2)));
    }

    #[test]
    fn test_select_tie_keeps_first_action() {
        let tree = small_tree([0.3, 0.3, 0.3], [2, 2, 2], 6);
        for _ in 0..5 {
            assert_eq!(select_child(&tree, 0, 1.0).unwrap(), Some((4, 1)));
        }
    }

    #[test]
    fn test_descend_stops_at_unexpanded() {
        let tree = small_tree([0.9, 0.05, 0.05], [0, 0, 0], 1);
        assert_eq!(descend(&tree, 0, 1.0).unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_descend_missing_child_is_error() {
        let mut tree = SearchTree::new();
        let mut root = node(1.0);
        root.expanded = true;
        root.children[0] = Some(5);
        tree.insert(0, root).unwrap();
        assert!(descend(&tree, 0, 1.0).is_err());
    }
}
