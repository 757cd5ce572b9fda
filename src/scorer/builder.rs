use crate::config::CostWeights;
use crate::error::{PfResult, PictoForgeError};
use crate::scorer::engine::LegWeights;
use crate::scorer::loader::Corpus;
use crate::scorer::similarity::SimilarityMatrix;
use crate::scorer::CostEvaluator;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;
use typed_builder::TypedBuilder;

#[derive(TypedBuilder)]
pub struct EvaluatorBuildParams {
    #[builder(default)]
    pub weights: CostWeights,
    pub corpus: Corpus,
    #[builder(default)]
    pub similarity: Option<SimilarityMatrix>,
    #[builder(default)]
    pub stopwords: HashSet<String>,
}

impl EvaluatorBuildParams {
    pub fn load_from_disk<P: AsRef<Path>, Q: AsRef<Path>>(
        corpus_paths: &[P],
        similarity_path: Option<Q>,
        weights: Option<CostWeights>,
    ) -> PfResult<CostEvaluator> {
        let corpus = Corpus::load(corpus_paths)?;
        let similarity = similarity_path.map(SimilarityMatrix::load).transpose()?;

        EvaluatorBuildParams::builder()
            .weights(weights.unwrap_or_default())
            .corpus(corpus)
            .similarity(similarity)
            .build()
            .build_evaluator()
    }

    pub fn build_evaluator(self) -> PfResult<CostEvaluator> {
        let weights = self.weights;

        // 1. Weights
        let formula = weights.formula()?;
        if !(0.0..=1.0).contains(&weights.similarity_coef) {
            return Err(PictoForgeError::Config(format!(
                "similarity_coef must be between 0 and 1 (got {})",
                weights.similarity_coef
            )));
        }
        if weights.movement_weight < 0.0 || weights.selection_weight < 0.0 {
            return Err(PictoForgeError::Config(
                "Cost weights must be non-negative".to_string(),
            ));
        }

        // 2. Similarity term needs a matrix
        if weights.similarity_coef > 0.0 && self.similarity.is_none() {
            return Err(PictoForgeError::Config(format!(
                "similarity_coef is {} but no similarity matrix was provided",
                weights.similarity_coef
            )));
        }

        let stopwords: HashSet<String> = self.stopwords.iter().map(|w| w.to_lowercase()).collect();

        debug!(
            "Evaluator: {} sentences, formula {}, movement {:.2}, selection {:.2}, similarity coef {:.2}, {} stopwords",
            self.corpus.len(),
            formula,
            weights.movement_weight,
            weights.selection_weight,
            weights.similarity_coef,
            stopwords.len()
        );

        Ok(CostEvaluator {
            legs: LegWeights {
                movement: weights.movement_weight,
                selection: weights.selection_weight,
                formula,
            },
            weights,
            corpus: self.corpus,
            similarity: self.similarity,
            stopwords,
        })
    }
}
