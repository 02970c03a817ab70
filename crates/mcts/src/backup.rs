use noughts_core::StateKey;

use crate::error::Result;
use crate::tree::SearchTree;

/// Propagate statistics from the leaf at the end of `path` back to the root.
///
/// Every node on the path gains one visit. Expanded non-terminal nodes take
/// `1 - mean(child values)` over all of their children, since each child's
/// value belongs to the opponent. Terminal values stay pinned.
pub fn backup(tree: &mut SearchTree, path: &[StateKey]) -> Result<()> {
    for &key in path.iter().rev() {
        let node = tree.node(key)?;
        let backed_up = if node.expanded && !node.is_terminal() {
            mean_child_value(tree, key)?.map(|mean| 1.0 - mean)
        } else {
            None
        };

        let node = tree.node_mut(key)?;
        node.visit_count += 1;
        if let Some(value) = backed_up {
            node.value = value;
        }
    }
    Ok(())
}

fn mean_child_value(tree: &SearchTree, key: StateKey) -> Result<Option<f32>> {
    let mut sum = 0.0;
    let mut count = 0;
    for (_, child_key) in tree.node(key)?.child_keys() {
        sum += tree.node(child_key)?.value;
        count += 1;
    }
    Ok((count > 0).then(|| sum / count as f32))
}
