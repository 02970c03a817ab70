//! Command line front end: train a tabular evaluator by self-play, pit
//! evaluators against each other, or ask for a move on a given board.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use noughts_core::{Board, Mark};
use noughts_mcts::{choose_move, Evaluator, MctsConfig, UniformEvaluator};
use noughts_nn::TabularEvaluator;
use noughts_selfplay::{play_series, save_training_set, train_generation, SelfPlayConfig};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "noughts")]
#[command(about = "Self-play tree search for noughts and crosses")]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Alternate self-play generations and table fitting
    Train(TrainArgs),
    /// Play a series of games between two evaluators
    Match(MatchArgs),
    /// Pick a move for the player to move on a board
    Advise(AdviseArgs),
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Search iterations per move
    #[arg(long, default_value_t = 50)]
    iterations: u32,

    /// Weight of the visit term in the selection score
    #[arg(long, default_value_t = 1.0)]
    exploration: f32,

    /// Final move temperature (0 picks the best value)
    #[arg(long, default_value_t = 0.0)]
    temperature: f32,

    #[arg(long, default_value_t = 0)]
    seed: u64,
}

impl SearchArgs {
    fn config(&self) -> MctsConfig {
        MctsConfig::default()
            .with_iterations(self.iterations)
            .with_exploration(self.exploration)
            .with_temperature(self.temperature)
            .with_seed(self.seed)
    }
}

#[derive(Args, Debug)]
struct TrainArgs {
    #[arg(long, default_value_t = 1)]
    generations: usize,

    /// Self-play games per generation
    #[arg(long, default_value_t = 100)]
    games: u32,

    /// Share of games whose positions are used for fitting
    #[arg(long, default_value_t = 1.0)]
    train_fraction: f32,

    #[arg(long, default_value_t = 32)]
    batch_size: usize,

    #[arg(long, default_value_t = 5)]
    epochs: usize,

    /// Step size toward each target row
    #[arg(long)]
    learning_rate: Option<f32>,

    /// Table to continue training from
    #[arg(long)]
    model: Option<PathBuf>,

    /// Where the table is written after every generation
    #[arg(long, default_value = "model.npy")]
    output: PathBuf,

    /// Directory for per-generation training sets
    #[arg(long)]
    dump_dir: Option<PathBuf>,

    #[command(flatten)]
    search: SearchArgs,
}

#[derive(Args, Debug)]
struct MatchArgs {
    /// First evaluator: `uniform`, a `.npy` table or (with torch) a `.pt` module
    #[arg(long, default_value = "model.npy")]
    first: String,

    #[arg(long, default_value = "uniform")]
    second: String,

    #[arg(long, default_value_t = 10)]
    games: u32,

    #[command(flatten)]
    search: SearchArgs,
}

#[derive(Args, Debug)]
struct AdviseArgs {
    /// Board from the mover's perspective, e.g. `X-O|-X-|---`
    board: String,

    #[arg(long, default_value = "uniform")]
    model: String,

    #[command(flatten)]
    search: SearchArgs,
}

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    Ok(())
}

/// Load an evaluator from `uniform`, a table file, or a TorchScript module
fn load_evaluator(spec: &str) -> Result<Box<dyn Evaluator>> {
    if spec == "uniform" {
        return Ok(Box::new(UniformEvaluator));
    }

    let path = Path::new(spec);
    match path.extension().and_then(|e| e.to_str()) {
        Some("npy") => {
            let table = TabularEvaluator::load(path)
                .with_context(|| format!("loading table {}", path.display()))?;
            Ok(Box::new(table))
        }
        #[cfg(feature = "torch")]
        Some("pt") => {
            let device = noughts_nn::Device::cuda_if_available();
            let module = noughts_nn::TorchEvaluator::load(path, device)
                .with_context(|| format!("loading module {}", path.display()))?;
            Ok(Box::new(module))
        }
        _ => anyhow::bail!("unsupported evaluator '{spec}'"),
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    let mut evaluator = match &args.model {
        Some(path) => TabularEvaluator::load(path)
            .with_context(|| format!("loading table {}", path.display()))?,
        None => TabularEvaluator::new(),
    };
    if let Some(rate) = args.learning_rate {
        evaluator = evaluator.with_learning_rate(rate);
    }

    let config = SelfPlayConfig::default()
        .with_mcts(args.search.config())
        .with_games(args.games)
        .with_train_fraction(args.train_fraction)
        .with_batch_size(args.batch_size)
        .with_epochs(args.epochs)
        .with_seed(args.search.seed);

    if let Some(dir) = &args.dump_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating {}", dir.display()))?;
    }

    for generation in 0..args.generations {
        let (training_set, report) = train_generation(&mut evaluator, generation, &config)?;

        evaluator
            .save(&args.output)
            .with_context(|| format!("saving table to {}", args.output.display()))?;

        if let Some(dir) = &args.dump_dir {
            if !training_set.is_empty() {
                let base = dir.join(format!("gen_{generation}"));
                save_training_set(&training_set, &base.to_string_lossy())?;
            }
        }

        info!(
            generation,
            first_player_wins = report.first_player_wins,
            second_player_wins = report.second_player_wins,
            draws = report.draws,
            output = %args.output.display(),
            "generation saved"
        );
    }

    Ok(())
}

fn run_match(args: MatchArgs) -> Result<()> {
    let first = load_evaluator(&args.first)?;
    let second = load_evaluator(&args.second)?;

    let summary = play_series(
        first.as_ref(),
        second.as_ref(),
        args.games,
        &args.search.config(),
    )?;

    println!(
        "{} vs {}: {} wins, {} losses, {} draws (score {:.3})",
        args.first,
        args.second,
        summary.a_wins,
        summary.b_wins,
        summary.draws,
        summary.a_score()
    );
    Ok(())
}

fn run_advise(args: AdviseArgs) -> Result<()> {
    let board: Board = args.board.parse()?;
    let evaluator = load_evaluator(&args.model)?;

    let action = choose_move(&board, evaluator.as_ref(), &args.search.config())?;
    let next = board.apply_move(action, Mark::Mine)?;

    println!("move: {action}");
    println!("{next}");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    match cli.command {
        Command::Train(args) => run_train(args),
        Command::Match(args) => run_match(args),
        Command::Advise(args) => run_advise(args),
    }
}
