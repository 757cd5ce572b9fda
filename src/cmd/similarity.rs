use clap::Args;
use pictoforge::config::Config;
use pictoforge::error::PfResult;
use pictoforge::scorer::loader::load_embeddings;
use pictoforge::scorer::{Corpus, SimilarityMatrix};
use tracing::{info, warn};

#[derive(Args, Debug, Clone)]
pub struct SimilarityArgs {
    #[command(flatten)]
    pub config: Config,

    /// Word vectors, one `word v1 ... vn` line each
    #[arg(long)]
    pub embeddings: String,

    #[arg(long, num_args = 1.., required = true)]
    pub corpus: Vec<String>,

    #[arg(short, long)]
    pub output: String,
}

pub fn run(args: SimilarityArgs) -> PfResult<()> {
    let corpus = Corpus::load(&args.corpus)?;
    let vocabulary = corpus.vocabulary();
    let embeddings = load_embeddings(&args.embeddings)?;

    let matrix = SimilarityMatrix::from_embeddings(&embeddings, &vocabulary);
    let uncovered = vocabulary.len() - matrix.len();
    if uncovered > 0 {
        warn!("{} corpus word(s) have no embedding", uncovered);
    }

    matrix.save(&args.output)?;
    info!(
        "Similarity matrix: {} of {} words covered",
        matrix.len(),
        vocabulary.len()
    );
    Ok(())
}
