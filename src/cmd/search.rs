use super::{build_evaluator, rng_from_seed};
use crate::reports;
use clap::Args;
use pictoforge::config::Config;
use pictoforge::error::PfResult;
use pictoforge::grid::loader::{load_layout, save_layout};
use pictoforge::grid::Grid;
use pictoforge::optimizer::history::History;
use pictoforge::optimizer::runner::SEEDED_WORKERS;
use pictoforge::optimizer::{OptimizationOptions, OptimizationResult, Optimizer, ProgressCallback};
use serde::Serialize;
use std::fs::File;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    #[command(flatten)]
    pub config: Config,

    /// Corpus files (.txt, one sentence per line)
    #[arg(long, num_args = 1.., required = true)]
    pub corpus: Vec<String>,

    /// Starting layout; generated from the corpus vocabulary when absent
    #[arg(short, long)]
    pub layout: Option<String>,

    #[arg(long)]
    pub similarity: Option<String>,

    #[arg(long)]
    pub stopwords: Option<String>,

    /// Hyperparameter profiles (config JSON), cycled over workers
    #[arg(long, num_args = 1..)]
    pub profiles: Vec<String>,

    #[arg(short, long)]
    pub output: String,

    /// Write the best-cost history (JSON)
    #[arg(long)]
    pub history_out: Option<String>,

    #[arg(short = 'T', long)]
    pub time: Option<u64>,

    #[arg(short = 'a', long)]
    pub attempts: Option<usize>,

    #[arg(short = 'S', long)]
    pub seed: Option<u64>,
}

struct CliLogger {
    every: usize,
}

impl ProgressCallback for CliLogger {
    fn on_progress(&self, worker: usize, generation: usize, best: f64, generation_best: f64) -> bool {
        if generation % self.every == 0 {
            info!(
                "W{:<3} Gen {:5} | Best: {:.4} | Gen Best: {:.4}",
                worker, generation, best, generation_best
            );
        }
        true
    }
}

#[derive(Serialize)]
struct HistoryDump<'a> {
    cost: f64,
    winner: usize,
    history: &'a [f64],
    workers: Vec<&'a History>,
}

pub fn run(args: SearchArgs, mut config: Config, debug: bool) -> PfResult<()> {
    let evaluator = build_evaluator(
        &args.corpus,
        args.similarity.as_deref(),
        args.stopwords.as_deref(),
        &config.weights,
    )?;

    // 1. Starting layout
    let initial = match &args.layout {
        Some(path) => load_layout(path)?,
        None => {
            let vocabulary = evaluator.corpus.vocabulary();
            let mut rng = rng_from_seed(args.seed);
            Grid::from_vocabulary(&vocabulary, &config.grid, &mut rng)?
        }
    };
    let initial_cost = evaluator.grid_cost(&initial)?;
    if !initial_cost.missing.is_empty() {
        warn!(
            "{} corpus word(s) are not on the starting layout",
            initial_cost.missing.words.len()
        );
    }
    reports::print_cost_report("INITIAL", &initial, &initial_cost);

    // 2. Options and profiles
    if args.seed.is_some() && config.search.workers == 0 {
        config.search.workers = SEEDED_WORKERS;
        info!(
            "Seeded search runs {} workers; pass --workers to change it",
            SEEDED_WORKERS
        );
    }
    let mut options = OptimizationOptions::try_from(&config)?;
    if let Some(t) = args.time {
        options.max_time = Some(Duration::from_secs(t));
    }
    let profiles = args
        .profiles
        .iter()
        .map(|path| -> PfResult<OptimizationOptions> {
            let mut profile = OptimizationOptions::try_from(&Config::load_from_file(path)?)?;
            profile.max_time = options.max_time;
            info!("Loaded profile {}", path);
            Ok(profile)
        })
        .collect::<PfResult<Vec<_>>>()?;

    let optimizer = Optimizer::new(Arc::new(evaluator), options).with_profiles(profiles);
    let logger = CliLogger {
        every: if debug { 1 } else { 10 },
    };

    // 3. Attempts, merged by minimum cost
    let attempts = args.attempts.unwrap_or(1).max(1);
    let mut overall: Option<OptimizationResult> = None;
    for i in 1..=attempts {
        info!("Attempt #{} of {}", i, attempts);
        let seed = args.seed.map(|s| s + (i as u64 * 100));
        let result = optimizer.run_parallel(&initial, seed, &logger)?;
        reports::print_worker_report(&result);

        if overall.as_ref().is_none_or(|best| result.cost < best.cost) {
            overall = Some(result);
        }
    }
    let Some(result) = overall else {
        return Ok(());
    };

    // 4. Persist
    let mut best = result.best.clone();
    optimizer.evaluator().annotate(&mut best);
    save_layout(&best, &args.output)?;

    if let Some(path) = &args.history_out {
        let dump = HistoryDump {
            cost: result.cost,
            winner: result.winner,
            history: &result.history,
            workers: result.workers.iter().map(|w| &w.history).collect(),
        };
        serde_json::to_writer_pretty(File::create(path)?, &dump)?;
        info!("Wrote history to {}", path);
    }

    info!("=== FINAL RESULT ===");
    info!(
        "Cost: {:.4} (initial {:.4})",
        result.cost, initial_cost.total
    );
    let final_cost = optimizer.evaluator().grid_cost(&best)?;
    reports::print_cost_report("OPTIMIZED", &best, &final_cost);
    if debug {
        reports::print_layout_grid("OPTIMIZED", &best);
    }
    Ok(())
}
