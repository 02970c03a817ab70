use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use noughts_core::StateKey;
use noughts_mcts::{Evaluator, Mcts};
use rand::seq::index;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::info;

use crate::config::SelfPlayConfig;
use crate::data::{GameResult, TrainingSet};
use crate::game::play_game;
use crate::training::build_training_set;

/// Games between progress log lines
const PROGRESS_INTERVAL: u32 = 10;

/// Summary of one self-play generation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationReport {
    pub generation: usize,
    pub games: u32,
    pub first_player_wins: u32,
    pub second_player_wins: u32,
    pub draws: u32,
    /// Distinct positions in the training set
    pub examples: usize,
    /// Nodes in the shared tree at the end of the generation
    pub tree_size: usize,
    pub self_play_time: Duration,
    pub training_time: Duration,
}

impl GenerationReport {
    fn tally(&mut self, result: GameResult) {
        self.games += 1;
        match result {
            GameResult::FirstPlayerWin => self.first_player_wins += 1,
            GameResult::SecondPlayerWin => self.second_player_wins += 1,
            GameResult::Draw => self.draws += 1,
        }
    }
}

/// Play one generation of self-play games and build its training set
///
/// All games of the generation share a single tree, so positions reached
/// in several games pool their statistics.
pub fn run_self_play_generation<E: Evaluator + ?Sized>(
    evaluator: &E,
    config: &SelfPlayConfig,
) -> Result<TrainingSet> {
    let (training_set, _) = play_generation(evaluator, config)?;
    Ok(training_set)
}

/// Same as [`run_self_play_generation`], also returning game statistics
pub fn play_generation<E: Evaluator + ?Sized>(
    evaluator: &E,
    config: &SelfPlayConfig,
) -> Result<(TrainingSet, GenerationReport)> {
    let start = Instant::now();
    let mut mcts = Mcts::with_seed(config.mcts.seed);
    let mut report = GenerationReport::default();

    let kept = sample_games(config);
    let mut keys: Vec<StateKey> = Vec::new();

    for game in 0..config.games {
        let record = play_game(&mut mcts, evaluator, &config.mcts)
            .with_context(|| format!("self-play game {game} failed"))?;
        report.tally(record.result);

        if kept[game as usize] {
            keys.extend_from_slice(&record.keys);
        }

        if (game + 1) % PROGRESS_INTERVAL == 0 {
            info!(
                games = game + 1,
                elapsed_ms = start.elapsed().as_millis() as u64,
                tree_size = mcts.tree_size(),
                "self-play progress"
            );
        }
    }

    let training_set = build_training_set(mcts.tree(), &keys)?;

    report.examples = training_set.len();
    report.tree_size = mcts.tree_size();
    report.self_play_time = start.elapsed();

    Ok((training_set, report))
}

/// Pick which games contribute positions to the training set
fn sample_games(config: &SelfPlayConfig) -> Vec<bool> {
    let games = config.games as usize;
    let mut kept = vec![false; games];

    let mut amount = ((games as f32) * config.train_fraction).round() as usize;
    if config.train_fraction > 0.0 {
        amount = amount.max(1);
    }
    let amount = amount.min(games);

    let mut rng = ChaCha20Rng::seed_from_u64(config.seed);
    for game in index::sample(&mut rng, games, amount).iter() {
        kept[game] = true;
    }
    kept
}

/// Run one generation of self-play, then fit the evaluator on its targets
pub fn train_generation<E: Evaluator + ?Sized>(
    evaluator: &mut E,
    generation: usize,
    config: &SelfPlayConfig,
) -> Result<(TrainingSet, GenerationReport)> {
    let (training_set, mut report) = play_generation(&*evaluator, config)?;
    report.generation = generation;

    info!(
        generation,
        games = report.games,
        first_player_wins = report.first_player_wins,
        second_player_wins = report.second_player_wins,
        draws = report.draws,
        elapsed_s = report.self_play_time.as_secs_f64(),
        "self-play finished"
    );

    let start = Instant::now();
    if !training_set.is_empty() {
        evaluator
            .fit(
                &training_set.inputs(),
                &training_set.targets(),
                config.batch_size,
                config.epochs,
            )
            .with_context(|| format!("fit failed in generation {generation}"))?;
    }
    report.training_time = start.elapsed();

    info!(
        generation,
        examples = report.examples,
        elapsed_s = report.training_time.as_secs_f64(),
        "training finished"
    );

    Ok((training_set, report))
}

/// Alternate self-play and fitting for `generations` rounds
pub fn train<E: Evaluator + ?Sized>(
    evaluator: &mut E,
    generations: usize,
    config: &SelfPlayConfig,
) -> Result<Vec<GenerationReport>> {
    let mut reports = Vec::with_capacity(generations);
    for generation in 0..generations {
        let (_, report) = train_generation(evaluator, generation, config)?;
        reports.push(report);
    }
    Ok(reports)
}
