pub mod crossover;
pub mod history;
pub mod initialization;
pub mod mutation;
pub mod runner;

pub use self::runner::{
    NoProgress, OptimizationOptions, OptimizationResult, Optimizer, ProgressCallback, WorkerResult,
};

use crate::grid::Grid;

/// One candidate layout and its cost (`None` until evaluated).
#[derive(Debug, Clone)]
pub struct Individual {
    pub grid: Grid,
    pub fitness: Option<f64>,
}

impl Individual {
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            fitness: None,
        }
    }

    pub fn invalidate(&mut self) {
        self.fitness = None;
    }

    pub fn is_valid(&self) -> bool {
        self.fitness.is_some()
    }

    /// Cost for ranking; unevaluated individuals rank last.
    #[inline(always)]
    pub fn cost(&self) -> f64 {
        self.fitness.unwrap_or(f64::INFINITY)
    }
}

/// Truncation selection: the `k` cheapest individuals, ties kept in
/// population order.
pub fn select_k_best(population: &[Individual], k: usize) -> Vec<Individual> {
    let mut order: Vec<usize> = (0..population.len()).collect();
    order.sort_by(|&a, &b| population[a].cost().total_cmp(&population[b].cost()));
    order
        .into_iter()
        .take(k)
        .map(|i| population[i].clone())
        .collect()
}

/// Index of the cheapest individual (first on ties).
pub fn best_index(population: &[Individual]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, ind) in population.iter().enumerate() {
        if best.is_none_or(|b| ind.cost() < population[b].cost()) {
            best = Some(i);
        }
    }
    best
}
