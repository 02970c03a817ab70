use noughts_core::{Board, Reward, StateKey};
use noughts_mcts::OUTPUT_LEN;

/// Result of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    FirstPlayerWin,
    SecondPlayerWin,
    Draw,
}

/// Record of a single self-play game
#[derive(Debug, Clone)]
pub struct EpisodeRecord {
    /// Canonical key of every position, starting with the empty board and
    /// ending with the terminal position
    pub keys: Vec<StateKey>,
    /// Actual move played from each non-terminal position
    pub moves: Vec<usize>,
    /// Outcome for the player to move at each key (1 win, 0.5 draw, 0 loss)
    pub labels: Vec<f32>,
    /// Final result of the game
    pub result: GameResult,
}

impl EpisodeRecord {
    /// Start a record at the position identified by `initial_key`
    pub fn new(initial_key: StateKey) -> Self {
        Self {
            keys: vec![initial_key],
            moves: Vec::new(),
            labels: Vec::new(),
            result: GameResult::Draw,
        }
    }

    /// Add a move and the canonical key it led to
    pub fn add_move(&mut self, action: usize, next_key: StateKey) {
        self.moves.push(action);
        self.keys.push(next_key);
    }

    /// Set the result and label every key from its own mover's perspective
    pub fn finish(&mut self, result: GameResult) {
        self.result = result;
        self.labels = (0..self.keys.len())
            .map(|i| self.outcome_at(i).value())
            .collect();
    }

    /// Outcome for the player to move at key `index`.
    ///
    /// Even indices belong to the first player.
    pub fn outcome_at(&self, index: usize) -> Reward {
        let first_to_move = index % 2 == 0;
        match (self.result, first_to_move) {
            (GameResult::Draw, _) => Reward::Draw,
            (GameResult::FirstPlayerWin, true) | (GameResult::SecondPlayerWin, false) => {
                Reward::Win
            }
            _ => Reward::Loss,
        }
    }

    /// Get the number of moves in this game
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Check if the record is empty
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

/// Training example for the evaluator
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingExample {
    /// Canonical board
    pub board: Board,
    /// Nine per-action values followed by the position value
    pub target: [f32; OUTPUT_LEN],
}

impl TrainingExample {
    /// Create a new training example
    pub fn new(board: Board, target: [f32; OUTPUT_LEN]) -> Self {
        Self { board, target }
    }
}

/// Supervised `(board, target)` pairs produced by one generation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingSet {
    pub examples: Vec<TrainingExample>,
}

impl TrainingSet {
    pub fn new(examples: Vec<TrainingExample>) -> Self {
        Self { examples }
    }

    pub fn inputs(&self) -> Vec<Board> {
        self.examples.iter().map(|e| e.board).collect()
    }

    pub fn targets(&self) -> Vec<[f32; OUTPUT_LEN]> {
        self.examples.iter().map(|e| e.target).collect()
    }

    /// Example for `board`, if present
    pub fn find(&self, board: &Board) -> Option<&TrainingExample> {
        self.examples.iter().find(|e| e.board == *board)
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }
}
