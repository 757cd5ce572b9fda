use super::build_evaluator;
use crate::reports;
use clap::Args;
use pictoforge::config::Config;
use pictoforge::error::PfResult;
use pictoforge::grid::loader::load_layout;
use std::path::Path;
use tracing::warn;

#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub config: Config,

    #[arg(short, long)]
    pub layout: String,

    /// Corpus files (.txt, one sentence per line)
    #[arg(long, num_args = 1.., required = true)]
    pub corpus: Vec<String>,

    /// Cached similarity matrix (JSON)
    #[arg(long)]
    pub similarity: Option<String>,

    #[arg(long)]
    pub stopwords: Option<String>,

    #[arg(long, default_value_t = false)]
    pub show_pages: bool,
}

pub fn run(args: EvaluateArgs, config: Config) -> PfResult<()> {
    let grid = load_layout(&args.layout)?;
    let evaluator = build_evaluator(
        &args.corpus,
        args.similarity.as_deref(),
        args.stopwords.as_deref(),
        &config.weights,
    )?;

    let cost = evaluator.grid_cost(&grid)?;
    if !cost.missing.is_empty() {
        warn!(
            "{} word occurrence(s) not found in the layout ({} distinct)",
            cost.missing.count,
            cost.missing.words.len()
        );
    }

    let name = Path::new(&args.layout)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| args.layout.clone());

    if args.show_pages {
        reports::print_layout_grid(&name, &grid);
    }
    reports::print_cost_report(&name, &grid, &cost);
    reports::print_missing_report(&cost.missing);
    Ok(())
}
