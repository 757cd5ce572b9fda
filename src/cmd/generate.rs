use super::rng_from_seed;
use crate::reports;
use clap::Args;
use pictoforge::config::Config;
use pictoforge::error::PfResult;
use pictoforge::grid::loader::save_layout;
use pictoforge::grid::Grid;
use pictoforge::scorer::Corpus;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub config: Config,

    /// Corpus files (.txt, one sentence per line)
    #[arg(long, num_args = 1.., required = true)]
    pub corpus: Vec<String>,

    #[arg(short, long)]
    pub output: String,

    /// Re-tile onto pages of this size after generation (e.g. 3x4)
    #[arg(long)]
    pub cut: Option<String>,

    #[arg(short = 'S', long)]
    pub seed: Option<u64>,
}

fn parse_dims(s: &str) -> Option<(usize, usize)> {
    let (r, c) = s.split_once(['x', 'X'])?;
    Some((r.trim().parse().ok()?, c.trim().parse().ok()?))
}

pub fn run(args: GenerateArgs, config: Config, debug: bool) -> PfResult<()> {
    let corpus = Corpus::load(&args.corpus)?;
    let mut rng = rng_from_seed(args.seed);

    let mut grid = Grid::from_vocabulary(&corpus.vocabulary(), &config.grid, &mut rng)?;
    if let Some(cut) = &args.cut {
        let (rows, cols) = parse_dims(cut).ok_or_else(|| {
            pictoforge::PictoForgeError::Config(format!("Invalid --cut '{}' (expected ROWSxCOLS)", cut))
        })?;
        grid = grid.naive_cut(rows, cols)?;
    }

    info!(
        "Generated {} pages ({}x{}) for {} words",
        grid.page_count(),
        grid.rows(),
        grid.cols(),
        grid.word_count()
    );
    save_layout(&grid, &args.output)?;

    if debug {
        reports::print_layout_grid("GENERATED", &grid);
    }
    Ok(())
}
