use noughts_core::{Reward, StateKey, KEY_SPACE, NUM_ACTIONS};

use crate::error::{MctsError, Result};
use crate::evaluation::Prediction;

/// A single node in the search tree, identified by its canonical key
#[derive(Debug, Clone, PartialEq)]
pub struct SearchNode {
    /// Prior for reaching this node from the parent that created it
    pub prior_probability: f32,

    /// Estimated win probability for the player to move at this node
    pub value: f32,

    /// Number of search iterations that passed through this node
    pub visit_count: u32,

    /// Self-play games in which this position occurred
    pub played: u32,

    /// Games won by the player to move at this node
    pub wins: u32,

    pub draws: u32,

    /// Whether children have been created
    pub expanded: bool,

    /// Terminal outcome for the player to move, if the game is over
    pub terminal: Option<Reward>,

    /// Evaluator priors for this node's own actions
    pub priors: [f32; NUM_ACTIONS],

    /// Child key per action, filled once at expansion
    pub children: [Option<StateKey>; NUM_ACTIONS],
}

impl SearchNode {
    /// Create a non-terminal node from its evaluator output
    pub fn new(prior: f32, prediction: &Prediction) -> Self {
        Self {
            prior_probability: prior,
            value: prediction.value,
            visit_count: 0,
            played: 0,
            wins: 0,
            draws: 0,
            expanded: false,
            terminal: None,
            priors: prediction.priors,
            children: [None; NUM_ACTIONS],
        }
    }

    /// Create a terminal node whose value is pinned to `reward`
    pub fn new_terminal(prior: f32, reward: Reward) -> Self {
        Self {
            prior_probability: prior,
            value: reward.value(),
            visit_count: 0,
            played: 0,
            wins: 0,
            draws: 0,
            expanded: false,
            terminal: Some(reward),
            priors: [0.0; NUM_ACTIONS],
            children: [None; NUM_ACTIONS],
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal.is_some()
    }

    pub fn losses(&self) -> u32 {
        self.played - self.wins - self.draws
    }

    /// Empirical score `(wins + 0.5 * draws) / played`, or the cached value
    /// when the position never occurred in a finished game
    pub fn score(&self) -> f32 {
        if self.played == 0 {
            self.value
        } else {
            (self.wins as f32 + 0.5 * self.draws as f32) / self.played as f32
        }
    }

    /// Count one finished game from the perspective of this node's mover
    pub fn record_outcome(&mut self, outcome: Reward) {
        self.played += 1;
        match outcome {
            Reward::Win => self.wins += 1,
            Reward::Draw => self.draws += 1,
            Reward::Loss => {}
        }
    }

    /// `(action, child key)` pairs in action order
    pub fn child_keys(&self) -> impl Iterator<Item = (usize, StateKey)> + '_ {
        self.children
            .iter()
            .enumerate()
            .filter_map(|(action, child)| child.map(|key| (action, key)))
    }
}

/// Search tree stored as a dense arena indexed by canonical key
pub struct SearchTree {
    nodes: Vec<Option<SearchNode>>,
    len: usize,
}

impl SearchTree {
    /// Create a new empty tree
    pub fn new() -> Self {
        Self {
            nodes: vec![None; KEY_SPACE],
            len: 0,
        }
    }

    /// Insert `node` under `key`, replacing any previous node
    pub fn insert(&mut self, key: StateKey, node: SearchNode) -> Result<()> {
        let slot = self
            .nodes
            .get_mut(key as usize)
            .ok_or(MctsError::UnknownNode(key))?;
        if slot.is_none() {
            self.len += 1;
        }
        *slot = Some(node);
        Ok(())
    }

    pub fn contains(&self, key: StateKey) -> bool {
        self.get(key).is_some()
    }

    pub fn get(&self, key: StateKey) -> Option<&SearchNode> {
        self.nodes.get(key as usize).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, key: StateKey) -> Option<&mut SearchNode> {
        self.nodes.get_mut(key as usize).and_then(Option::as_mut)
    }

    /// Like [`get`](Self::get), but a missing node is an error
    pub fn node(&self, key: StateKey) -> Result<&SearchNode> {
        self.get(key).ok_or(MctsError::UnknownNode(key))
    }

    pub fn node_mut(&mut self, key: StateKey) -> Result<&mut SearchNode> {
        self.get_mut(key).ok_or(MctsError::UnknownNode(key))
    }

    /// Keys of all nodes in ascending order
    pub fn keys(&self) -> impl Iterator<Item = StateKey> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(key, _)| key as StateKey)
    }

    /// Get the number of nodes in the tree
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Clear the tree
    pub fn clear(&mut self) {
        if self.len > 0 {
            self.nodes.iter_mut().for_each(|slot| *slot = None);
            self.len = 0;
        }
    }
}

impl Default for SearchTree {
    fn default() -> Self {
        Self::new()
    }
}
