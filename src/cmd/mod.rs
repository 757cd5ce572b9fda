pub mod evaluate;
pub mod generate;
pub mod search;
pub mod similarity;

use pictoforge::config::CostWeights;
use pictoforge::error::PfResult;
use pictoforge::scorer::loader::load_stopwords;
use pictoforge::scorer::{Corpus, CostEvaluator, EvaluatorBuildParams, SimilarityMatrix};

pub fn build_evaluator(
    corpus: &[String],
    similarity: Option<&str>,
    stopwords: Option<&str>,
    weights: &CostWeights,
) -> PfResult<CostEvaluator> {
    let corpus = Corpus::load(corpus)?;
    let similarity = similarity.map(SimilarityMatrix::load).transpose()?;
    let stopwords = stopwords.map(load_stopwords).transpose()?.unwrap_or_default();

    EvaluatorBuildParams::builder()
        .weights(weights.clone())
        .corpus(corpus)
        .similarity(similarity)
        .stopwords(stopwords)
        .build()
        .build_evaluator()
}

pub fn rng_from_seed(seed: Option<u64>) -> fastrand::Rng {
    if let Some(s) = seed {
        fastrand::Rng::with_seed(s)
    } else {
        fastrand::Rng::new()
    }
}
