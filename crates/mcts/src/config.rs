/// Configuration for a search run
#[derive(Debug, Clone)]
pub struct MctsConfig {
    /// Number of select/expand/backup iterations per search
    pub num_iterations: u32,

    /// Weight of the visit term in the selection score; 1.0 gives
    /// `prior + sqrt(N_parent) / (N_child + 1)`
    pub exploration: f32,

    /// Temperature for the final move (0.0 = argmax of value, otherwise
    /// sampled proportional to value^(1/t))
    pub temperature: f32,

    /// Seed for move sampling when temperature is non-zero
    pub seed: u64,
}

impl MctsConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set number of iterations (at least one)
    pub fn with_iterations(mut self, n: u32) -> Self {
        self.num_iterations = n.max(1);
        self
    }

    /// Set the exploration weight
    pub fn with_exploration(mut self, c: f32) -> Self {
        self.exploration = c.max(0.0);
        self
    }

    /// Set temperature for move selection
    pub fn with_temperature(mut self, t: f32) -> Self {
        self.temperature = t.max(0.0);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            num_iterations: 50,
            exploration: 1.0,
            temperature: 0.0,
            seed: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MctsConfig::default();
        assert_eq!(config.num_iterations, 50);
        assert_eq!(config.exploration, 1.0);
        assert_eq!(config.temperature, 0.0);
    }

    #[test]
    fn test_builder_pattern() {
        let config = MctsConfig::default()
            .with_iterations(200)
            .with_exploration(1.5)
            .with_temperature(0.5)
            .with_seed(7);

        assert_eq!(config.num_iterations, 200);
        assert_eq!(config.exploration, 1.5);
        assert_eq!(config.temperature, 0.5);
        assert_eq!(config.seed, 7);
    }

    #[test]
    fn test_builder_clamps() {
        let config = MctsConfig::default()
            .with_iterations(0)
            .with_exploration(-1.0)
            .with_temperature(-0.5);

        assert_eq!(config.num_iterations, 1);
        assert_eq!(config.exploration, 0.0);
        assert_eq!(config.temperature, 0.0);
    }
}
