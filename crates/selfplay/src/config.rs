use noughts_mcts::MctsConfig;

/// Configuration for self-play generations and training
#[derive(Debug, Clone)]
pub struct SelfPlayConfig {
    /// Search settings used for every move
    pub mcts: MctsConfig,

    /// Games played per generation
    pub games: u32,

    /// Share of games whose positions are kept for training (0.0-1.0)
    pub train_fraction: f32,

    /// Mini-batch size passed to the evaluator's fit
    pub batch_size: usize,

    /// Training epochs per generation
    pub epochs: usize,

    /// Seed for game sampling
    pub seed: u64,
}

impl SelfPlayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mcts(mut self, mcts: MctsConfig) -> Self {
        self.mcts = mcts;
        self
    }

    /// Set number of search iterations per move
    pub fn with_iterations(mut self, n: u32) -> Self {
        self.mcts = self.mcts.with_iterations(n);
        self
    }

    /// Set number of games per generation (at least one)
    pub fn with_games(mut self, games: u32) -> Self {
        self.games = games.max(1);
        self
    }

    pub fn with_train_fraction(mut self, fraction: f32) -> Self {
        self.train_fraction = fraction.clamp(0.0, 1.0);
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        Self {
            mcts: MctsConfig::default(),
            games: 100,
            train_fraction: 1.0,
            batch_size: 32,
            epochs: 5,
            seed: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SelfPlayConfig::default();
        assert_eq!(config.games, 100);
        assert_eq!(config.train_fraction, 1.0);
        assert_eq!(config.batch_size, 32);
        assert_eq!(config.epochs, 5);
    }

    #[test]
    fn test_builder_pattern() {
        let config = SelfPlayConfig::default()
            .with_games(0)
            .with_iterations(12)
            .with_train_fraction(1.5)
            .with_batch_size(0)
            .with_epochs(2)
            .with_seed(3);

        assert_eq!(config.games, 1);
        assert_eq!(config.mcts.num_iterations, 12);
        assert_eq!(config.train_fraction, 1.0);
        assert_eq!(config.batch_size, 1);
        assert_eq!(config.epochs, 2);
        assert_eq!(config.seed, 3);
    }
}
