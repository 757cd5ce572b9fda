pub mod builder;
pub mod engine;
pub mod loader;
pub mod physics;
pub mod similarity;

pub use self::builder::EvaluatorBuildParams;
pub use self::engine::{LegWeights, MismatchMode, MissingWords};
pub use self::loader::Corpus;
pub use self::similarity::SimilarityMatrix;

use self::engine::SentenceOptions;
use crate::config::CostWeights;
use crate::error::PfResult;
use crate::grid::Grid;
use serde::Serialize;
use std::collections::HashSet;

/// Breakdown of one grid evaluation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GridCost {
    /// Aggregated production cost (mean or sum over sentences).
    pub distance: f64,
    /// Page dissimilarity, 0 when the similarity term is off.
    pub similarity: f64,
    pub total: f64,
    pub sentences: Vec<f64>,
    pub missing: MissingWords,
}

/// Blends the production cost with the page dissimilarity.
///
/// `coef == 0` is the pure production cost, `coef == 1` the dissimilarity
/// per page; anything in between mixes both on a log scale.
pub fn blend_costs(coef: f64, distance: f64, similarity: f64, pages: usize) -> f64 {
    let per_page = similarity / pages.max(1) as f64;
    if coef <= 0.0 {
        distance
    } else if coef >= 1.0 {
        per_page
    } else {
        coef * (1.0 + per_page).log10() + (1.0 - coef) * (1.0 + distance).log10()
    }
}

pub struct CostEvaluator {
    pub weights: CostWeights,
    pub legs: LegWeights,
    pub corpus: Corpus,
    pub similarity: Option<SimilarityMatrix>,
    pub stopwords: HashSet<String>,
}

impl CostEvaluator {
    pub fn mismatch_mode(&self) -> MismatchMode {
        self.weights.mismatch_mode.into()
    }

    fn options(&self, mode: MismatchMode) -> SentenceOptions<'_> {
        SentenceOptions {
            mode,
            count_lead_in: self.weights.count_lead_in,
            stopwords: Some(&self.stopwords),
        }
    }

    pub fn sentence_cost<S: AsRef<str>>(
        &self,
        grid: &Grid,
        sentence: &[S],
        missing: &mut MissingWords,
    ) -> PfResult<f64> {
        self.sentence_cost_with(grid, sentence, self.mismatch_mode(), missing)
    }

    /// Same as [`sentence_cost`](Self::sentence_cost) with an explicit mismatch mode.
    pub fn sentence_cost_with<S: AsRef<str>>(
        &self,
        grid: &Grid,
        sentence: &[S],
        mode: MismatchMode,
        missing: &mut MissingWords,
    ) -> PfResult<f64> {
        engine::sentence_cost(grid, sentence, &self.legs, &self.options(mode), missing)
    }

    pub fn grid_cost(&self, grid: &Grid) -> PfResult<GridCost> {
        self.grid_cost_with(grid, self.mismatch_mode())
    }

    pub fn grid_cost_with(&self, grid: &Grid, mode: MismatchMode) -> PfResult<GridCost> {
        let mut missing = MissingWords::default();
        let mut sentences = Vec::with_capacity(self.corpus.len());
        let mut sum = 0.0;

        for sentence in &self.corpus.sentences {
            let cost = self.sentence_cost_with(grid, sentence, mode, &mut missing)?;
            sum += cost;
            sentences.push(cost);
        }

        let distance = if self.weights.cost_average && !sentences.is_empty() {
            sum / sentences.len() as f64
        } else {
            sum
        };

        let coef = self.weights.similarity_coef;
        let similarity = if coef > 0.0 {
            self.grid_similarity_cost(grid).unwrap_or(0.0)
        } else {
            0.0
        };

        Ok(GridCost {
            distance,
            similarity,
            total: blend_costs(coef, distance, similarity, grid.page_count()),
            sentences,
            missing,
        })
    }

    /// Scalar to minimise.
    pub fn fitness(&self, grid: &Grid) -> PfResult<f64> {
        Ok(self.grid_cost(grid)?.total)
    }

    pub fn grid_similarity_cost(&self, grid: &Grid) -> Option<f64> {
        self.similarity
            .as_ref()
            .map(|m| similarity::grid_similarity_cost(grid, m))
    }

    pub fn annotate(&self, grid: &mut Grid) {
        if let Some(m) = &self.similarity {
            similarity::annotate_similarity(grid, m);
        }
    }
}
