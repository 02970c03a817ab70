use noughts_core::NUM_ACTIONS;

/// Result of a search
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Move selected (0-8)
    pub best_move: usize,

    /// Value of each root action for the player to move (`1 - child value`),
    /// `None` for occupied cells
    pub action_values: [Option<f32>; NUM_ACTIONS],

    /// Visit count of each root child
    pub visit_counts: [u32; NUM_ACTIONS],

    /// Backed-up value of the root
    pub root_value: f32,

    /// Number of iterations run
    pub iterations: u32,
}

impl SearchResult {
    /// Get the value for a specific move
    pub fn value_for_move(&self, move_idx: usize) -> Option<f32> {
        self.action_values.get(move_idx).copied().flatten()
    }

    /// Get the visit count for a specific move
    pub fn visit_count_for_move(&self, move_idx: usize) -> u32 {
        self.visit_counts.get(move_idx).copied().unwrap_or(0)
    }

    /// Get the total number of visits to root children
    pub fn total_visits(&self) -> u32 {
        self.visit_counts.iter().sum()
    }

    /// Visit counts normalised to a distribution over the nine cells
    pub fn policy_distribution(&self) -> [f32; NUM_ACTIONS] {
        let total = self.total_visits();
        let mut policy = [0.0; NUM_ACTIONS];
        if total > 0 {
            for (p, &v) in policy.iter_mut().zip(self.visit_counts.iter()) {
                *p = v as f32 / total as f32;
            }
        }
        policy
    }
}
