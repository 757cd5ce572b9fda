use super::crossover::crossover_swap;
use super::history::{merge_curves, History, HistoryMode};
use super::initialization::init_population;
use super::mutation::{mutate, MutationKind};
use super::{best_index, select_k_best, Individual};
use crate::config::Config;
use crate::error::{PfResult, PictoForgeError};
use crate::grid::Grid;
use crate::scorer::CostEvaluator;
use fastrand::Rng;
use rayon::prelude::*;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Worker count a seeded command-line search uses when none is given.
pub const SEEDED_WORKERS: usize = 4;

#[derive(Debug, Clone)]
pub struct OptimizationOptions {
    pub pop_size: usize,
    pub select_number: usize,
    pub gen_number: usize,
    pub cross_proba: f32,
    pub cross_info_rate: f32,
    pub mutation_proba: f32,
    pub max_occurrences: usize,
    pub mutations: Vec<MutationKind>,
    pub randomize_population: bool,
    /// Resolved from the core count when the config asks for 0, so a seeded
    /// `run_parallel` only repeats across machines with an explicit count.
    pub workers: usize,
    pub history: HistoryMode,
    pub max_time: Option<Duration>,
}

impl TryFrom<&Config> for OptimizationOptions {
    type Error = PictoForgeError;

    fn try_from(cfg: &Config) -> PfResult<Self> {
        cfg.validate()?;
        let s = &cfg.search;
        Ok(Self {
            pop_size: s.pop_size,
            select_number: s.select_number,
            gen_number: s.gen_number,
            cross_proba: s.cross_proba,
            cross_info_rate: s.cross_info_rate,
            mutation_proba: s.mutation_proba,
            max_occurrences: s.max_occurrences,
            mutations: s.mutation_kinds()?,
            randomize_population: s.randomize_population,
            workers: if s.workers == 0 {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(4)
            } else {
                s.workers
            },
            history: s.history_mode()?,
            max_time: None, // Set manually if needed
        })
    }
}

/// Outcome of one independent search.
#[derive(Debug, Clone)]
pub struct WorkerResult {
    pub worker: usize,
    pub seed: Option<u64>,
    pub best: Grid,
    pub cost: f64,
    pub history: History,
    pub generations: usize,
}

#[derive(Debug, Clone)]
pub struct OptimizationResult {
    pub best: Grid,
    pub cost: f64,
    /// Index of the worker that found `best`.
    pub winner: usize,
    pub history: Vec<f64>,
    pub workers: Vec<WorkerResult>,
}

/// A trait for receiving updates during optimization.
/// Boolean return value indicates if the search should continue (true) or abort (false).
pub trait ProgressCallback: Send + Sync {
    fn on_progress(&self, worker: usize, generation: usize, best: f64, generation_best: f64) -> bool;
}

pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_progress(&self, _: usize, _: usize, _: f64, _: f64) -> bool {
        true
    }
}

pub struct Optimizer {
    evaluator: Arc<CostEvaluator>,
    options: OptimizationOptions,
    profiles: Vec<OptimizationOptions>,
}

impl Optimizer {
    pub fn new(evaluator: Arc<CostEvaluator>, options: OptimizationOptions) -> Self {
        Self {
            evaluator,
            options,
            profiles: Vec::new(),
        }
    }

    /// Worker `i` of [`run_parallel`](Self::run_parallel) uses profile `i % len`.
    pub fn with_profiles(mut self, profiles: Vec<OptimizationOptions>) -> Self {
        self.profiles = profiles;
        self
    }

    pub fn options(&self) -> &OptimizationOptions {
        &self.options
    }

    pub fn evaluator(&self) -> &CostEvaluator {
        &self.evaluator
    }

    /// One search with the main options.
    pub fn run<CB: ProgressCallback>(
        &self,
        initial: &Grid,
        seed: Option<u64>,
        callback: &CB,
    ) -> PfResult<WorkerResult> {
        self.run_worker(0, &self.options, initial, seed, callback)
    }

    /// Independent searches on the rayon pool, merged by minimum cost.
    pub fn run_parallel<CB: ProgressCallback>(
        &self,
        initial: &Grid,
        seed: Option<u64>,
        callback: &CB,
    ) -> PfResult<OptimizationResult> {
        let workers = self.options.workers.max(1);
        info!("Starting {} worker(s)", workers);

        let results: Vec<WorkerResult> = (0..workers)
            .into_par_iter()
            .map(|i| {
                let opts = if self.profiles.is_empty() {
                    &self.options
                } else {
                    &self.profiles[i % self.profiles.len()]
                };
                self.run_worker(i, opts, initial, seed.map(|s| s + i as u64), callback)
            })
            .collect::<PfResult<Vec<_>>>()?;

        // Ties go to the lowest worker index.
        let mut winner = 0;
        for (i, r) in results.iter().enumerate() {
            if r.cost < results[winner].cost {
                winner = i;
            }
        }

        let curves: Vec<&[f64]> = results
            .iter()
            .map(|r| r.history.best_history.as_slice())
            .collect();
        let history = merge_curves(self.options.history, &curves, winner);

        let best = results
            .get(winner)
            .ok_or_else(|| PictoForgeError::Structure("No worker produced a result".into()))?;
        Ok(OptimizationResult {
            best: best.best.clone(),
            cost: best.cost,
            winner,
            history,
            workers: results,
        })
    }

    fn evaluate(&self, population: &mut [Individual]) -> PfResult<()> {
        let evaluator = &self.evaluator;
        population
            .par_iter_mut()
            .filter(|ind| !ind.is_valid())
            .try_for_each(|ind| {
                ind.fitness = Some(evaluator.fitness(&ind.grid)?);
                Ok(())
            })
    }

    fn run_worker<CB: ProgressCallback>(
        &self,
        worker: usize,
        opts: &OptimizationOptions,
        initial: &Grid,
        seed: Option<u64>,
        callback: &CB,
    ) -> PfResult<WorkerResult> {
        let mut rng = if let Some(s) = seed {
            Rng::with_seed(s)
        } else {
            Rng::new()
        };
        let pop_size = opts.pop_size.max(1);
        let select_number = opts.select_number.clamp(1, pop_size);

        // 1. Initial population
        let mut population = init_population(initial, pop_size, opts.randomize_population, &mut rng);
        self.evaluate(&mut population)?;

        let mut history = History::default();
        let start = best_index(&population).map(|i| population[i].clone());
        let Some(mut best) = start else {
            return Err(PictoForgeError::Structure("Empty population".into()));
        };
        history.record(population.iter().map(Individual::cost).collect(), best.cost());

        let start_time = Instant::now();
        let mut generations = 0;

        // 2. Main Loop
        for generation in 1..=opts.gen_number {
            if let Some(limit) = opts.max_time {
                if start_time.elapsed() >= limit {
                    debug!("Worker {} hit the time limit at generation {}", worker, generation);
                    break;
                }
            }

            // A. Select and refill
            let parents = select_k_best(&population, select_number);
            let mut offspring: Vec<Individual> = parents.iter().cycle().take(pop_size).cloned().collect();

            // B. Crossover
            for pair in offspring.chunks_exact_mut(2) {
                if rng.f32() < opts.cross_proba {
                    let (a, b) = crossover_swap(&pair[0].grid, &pair[1].grid, opts.cross_info_rate, &mut rng);
                    pair[0] = Individual::new(a);
                    pair[1] = Individual::new(b);
                }
            }

            // C. Mutation
            for ind in offspring.iter_mut() {
                if rng.f32() < opts.mutation_proba
                    && mutate(&mut ind.grid, &opts.mutations, opts.max_occurrences, &mut rng)
                {
                    ind.invalidate();
                }
            }

            // D. Evaluate invalid individuals, replace
            self.evaluate(&mut offspring)?;
            population = offspring;
            generations = generation;

            // E. Record
            let generation_best = best_index(&population)
                .map(|i| population[i].cost())
                .unwrap_or(f64::INFINITY);
            if let Some(i) = best_index(&population) {
                if population[i].cost() < best.cost() {
                    best = population[i].clone();
                }
            }
            history.record(population.iter().map(Individual::cost).collect(), best.cost());

            debug!(
                "Worker {} gen {}: best {:.4}, generation best {:.4}",
                worker,
                generation,
                best.cost(),
                generation_best
            );

            if !callback.on_progress(worker, generation, best.cost(), generation_best) {
                break;
            }
        }

        info!(
            "Worker {} finished after {} generation(s): best cost {:.4}",
            worker,
            generations,
            best.cost()
        );

        Ok(WorkerResult {
            worker,
            seed,
            cost: best.cost(),
            best: best.grid,
            history,
            generations,
        })
    }
}
