use anyhow::{Context, Result};
use noughts_core::{Board, Mark, NUM_CELLS};
use noughts_mcts::{Evaluator, Mcts, MctsConfig};
use tracing::debug;

use crate::data::{EpisodeRecord, GameResult};

/// Fewest plies after which a line can be complete
const MIN_WINNING_PLY: usize = 5;

/// Play a single self-play game in the tree held by `mcts`
///
/// Every move comes from a search of the canonical board, so the same
/// engine plays both sides. The tree is not reset here: callers decide
/// whether games share statistics. Once the game ends the outcome is
/// recorded into the node of every position it visited.
///
/// # Returns
/// A complete episode record with keys, moves, per-key labels and the result
pub fn play_game<E: Evaluator + ?Sized>(
    mcts: &mut Mcts,
    evaluator: &E,
    config: &MctsConfig,
) -> Result<EpisodeRecord> {
    let mut board = Board::new();
    let mut record = EpisodeRecord::new(board.encode());
    let mut ply = 0;

    let result = loop {
        let search = mcts
            .search(&board, evaluator, config)
            .with_context(|| format!("search failed at ply {ply}"))?;

        let next = board.apply_move(search.best_move, Mark::Mine)?;
        ply += 1;

        // Keys are always stored from the next mover's perspective
        let canonical = next.flip();
        record.add_move(search.best_move, canonical.encode());

        if ply >= MIN_WINNING_PLY && next.check_win(Mark::Mine) {
            // Odd plies are played by the first player
            break if ply % 2 == 1 {
                GameResult::FirstPlayerWin
            } else {
                GameResult::SecondPlayerWin
            };
        }
        if ply == NUM_CELLS {
            break GameResult::Draw;
        }

        board = canonical;
    };

    record.finish(result);
    record_outcomes(mcts, &record)?;

    debug!(
        moves = record.len(),
        result = ?record.result,
        tree_size = mcts.tree_size(),
        "self-play game finished"
    );

    Ok(record)
}

/// Add the finished game to the outcome counters of each visited node
fn record_outcomes(mcts: &mut Mcts, record: &EpisodeRecord) -> Result<()> {
    for (index, &key) in record.keys.iter().enumerate() {
        mcts.tree_mut()
            .node_mut(key)
            .with_context(|| format!("episode position {key} missing from tree"))?
            .record_outcome(record.outcome_at(index));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use noughts_core::Reward;
    use noughts_mcts::UniformEvaluator;

    #[test]
    fn test_play_game_terminates() {
        let mut mcts = Mcts::new();
        let config = MctsConfig::default().with_iterations(10);

        let record = play_game(&mut mcts, &UniformEvaluator, &config).unwrap();

        assert!(record.len() >= MIN_WINNING_PLY && record.len() <= NUM_CELLS);
        assert_eq!(record.keys.len(), record.len() + 1);
        assert_eq!(record.labels.len(), record.keys.len());
        assert_eq!(record.keys[0], 0);

        let last = Board::decode(*record.keys.last().unwrap()).unwrap();
        let expected = match record.result {
            GameResult::Draw => Reward::Draw,
            _ => Reward::Loss,
        };
        assert_eq!(last.reward(), Some(expected));
    }

    #[test]
    fn test_play_game_records_outcomes() {
        let mut mcts = Mcts::new();
        let config = MctsConfig::default().with_iterations(5);

        let record = play_game(&mut mcts, &UniformEvaluator, &config).unwrap();

        for (i, &key) in record.keys.iter().enumerate() {
            let node = mcts.tree().node(key).unwrap();
            assert_eq!(node.played, 1);
            assert_eq!(node.score(), record.labels[i]);
        }
    }

    #[test]
    fn test_games_share_tree() {
        let mut mcts = Mcts::new();
        let config = MctsConfig::default().with_iterations(5);

        play_game(&mut mcts, &UniformEvaluator, &config).unwrap();
        play_game(&mut mcts, &UniformEvaluator, &config).unwrap();

        let root = mcts.tree().node(0).unwrap();
        assert_eq!(root.played, 2);
        assert_eq!(root.played, root.wins + root.draws + root.losses());
    }

    #[test]
    fn test_moves_replay_to_keys() {
        let mut mcts = Mcts::new();
        let config = MctsConfig::default().with_iterations(8);
        let record = play_game(&mut mcts, &UniformEvaluator, &config).unwrap();

        let mut board = Board::new();
        for (i, &action) in record.moves.iter().enumerate() {
            board = board.apply_move(action, Mark::Mine).unwrap().flip();
            assert_eq!(board.encode(), record.keys[i + 1]);
        }
    }
}
