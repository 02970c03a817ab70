use anyhow::{Context, Result};
use noughts_core::{Board, Mark, NUM_CELLS};
use noughts_mcts::{choose_move, Evaluator, MctsConfig};
use tracing::{debug, info};

/// Outcome of a single match between two evaluators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    FirstWins,
    SecondWins,
    Draw,
}

/// Tally of a series of matches, counted per evaluator rather than per seat
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchSummary {
    pub a_wins: u32,
    pub b_wins: u32,
    pub draws: u32,
}

impl MatchSummary {
    pub fn games(&self) -> u32 {
        self.a_wins + self.b_wins + self.draws
    }

    /// Share of points for `a`, counting a draw as half a win
    pub fn a_score(&self) -> f32 {
        match self.games() {
            0 => 0.5,
            n => (self.a_wins as f32 + 0.5 * self.draws as f32) / n as f32,
        }
    }
}

/// Play one game with `first` to move on the empty board
///
/// Every move is picked by a fresh search with the mover's evaluator, so
/// neither side carries statistics from earlier moves.
pub fn play_match<A, B>(first: &A, second: &B, config: &MctsConfig) -> Result<MatchOutcome>
where
    A: Evaluator + ?Sized,
    B: Evaluator + ?Sized,
{
    let mut board = Board::new();

    for ply in 1..=NUM_CELLS {
        let first_to_move = ply % 2 == 1;
        let action = if first_to_move {
            choose_move(&board, first, config)
        } else {
            choose_move(&board, second, config)
        }
        .with_context(|| format!("move search failed at ply {ply}"))?;

        let next = board.apply_move(action, Mark::Mine)?;
        if next.check_win(Mark::Mine) {
            let outcome = if first_to_move {
                MatchOutcome::FirstWins
            } else {
                MatchOutcome::SecondWins
            };
            debug!(plies = ply, ?outcome, "match finished");
            return Ok(outcome);
        }
        board = next.flip();
    }

    debug!(plies = NUM_CELLS, "match drawn");
    Ok(MatchOutcome::Draw)
}

/// Play `games` matches, alternating which evaluator moves first
///
/// `a` starts the even-numbered games. Each game gets its own seed so
/// sampled moves differ when the temperature is non-zero.
pub fn play_series<A, B>(a: &A, b: &B, games: u32, config: &MctsConfig) -> Result<MatchSummary>
where
    A: Evaluator + ?Sized,
    B: Evaluator + ?Sized,
{
    let mut summary = MatchSummary::default();

    for game in 0..games {
        let game_config = config.clone().with_seed(config.seed.wrapping_add(game as u64));
        let a_first = game % 2 == 0;

        let outcome = if a_first {
            play_match(a, b, &game_config)?
        } else {
            play_match(b, a, &game_config)?
        };

        match (outcome, a_first) {
            (MatchOutcome::Draw, _) => summary.draws += 1,
            (MatchOutcome::FirstWins, true) | (MatchOutcome::SecondWins, false) => {
                summary.a_wins += 1
            }
            _ => summary.b_wins += 1,
        }
    }

    info!(
        games,
        a_wins = summary.a_wins,
        b_wins = summary.b_wins,
        draws = summary.draws,
        "match series finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use noughts_core::NUM_ACTIONS;
    use noughts_mcts::{EvaluatorError, UniformEvaluator, OUTPUT_LEN};

    /// Always prefers the lowest empty cell and expects to win
    struct FirstCellEvaluator;

    impl Evaluator for FirstCellEvaluator {
        fn predict(&self, board: &Board) -> std::result::Result<Vec<f32>, EvaluatorError> {
            let mut output = vec![0.0; OUTPUT_LEN];
            if let Some(&action) = board.legal_moves().first() {
                output[action] = 1.0;
            }
            output[NUM_ACTIONS] = 0.5;
            Ok(output)
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

    #[test]
    fn test_summary_score() {
        let summary = MatchSummary {
            a_wins: 2,
            b_wins: 1,
            draws: 1,
        };
        assert_eq!(summary.games(), 4);
        assert_eq!(summary.a_score(), 0.625);
        assert_eq!(MatchSummary::default().a_score(), 0.5);
    }

    #[test]
    fn test_play_match_finishes() {
        let config = MctsConfig::default().with_iterations(20);
        let outcome = play_match(&UniformEvaluator, &FirstCellEvaluator, &config);
        assert!(outcome.is_ok());
    }

    #[test]
    fn test_play_match_is_deterministic() {
        let config = MctsConfig::default().with_iterations(15);
        let a = play_match(&UniformEvaluator, &UniformEvaluator, &config).unwrap();
        let b = play_match(&UniformEvaluator, &UniformEvaluator, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_play_series_counts_every_game() {
        let config = MctsConfig::default().with_iterations(10);
        let summary = play_series(&UniformEvaluator, &FirstCellEvaluator, 4, &config).unwrap();
        assert_eq!(summary.games(), 4);
    }

    #[test]
    fn test_series_between_identical_players_is_symmetric() {
        // Same evaluator on both sides: seat results cancel across each pair
        let config = MctsConfig::default().with_iterations(10);
        let summary = play_series(&UniformEvaluator, &UniformEvaluator, 2, &config).unwrap();
        assert_eq!(summary.a_wins, summary.b_wins);
    }
}
