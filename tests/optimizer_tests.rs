mod common;

use common::{evaluator, small_config, sorted_vocabulary, GridBuilder, SENTENCES};
use fastrand::Rng;
use pictoforge::config::{CostWeights, GridParams};
use pictoforge::grid::loader::write_layout;
use pictoforge::grid::Grid;
use pictoforge::optimizer::{NoProgress, OptimizationOptions, Optimizer};
use std::sync::Arc;
use std::time::Duration;

fn layout_text(g: &Grid) -> String {
    let mut buf = Vec::new();
    write_layout(g, &mut buf).unwrap();
    String::from_utf8(buf).unwrap()
}

fn sentence_setup(pop: usize, gen: usize) -> (Optimizer, Grid) {
    let e = evaluator(SENTENCES, CostWeights::default());
    let params = GridParams {
        row_size: 3,
        col_size: 3,
        randomize: false,
        ..GridParams::default()
    };
    let initial = Grid::from_vocabulary(&e.corpus.vocabulary(), &params, &mut Rng::with_seed(1)).unwrap();
    let options = OptimizationOptions::try_from(&small_config(pop, gen)).unwrap();
    (Optimizer::new(Arc::new(e), options), initial)
}

#[test]
fn test_mutation_only_generation_keeps_vocabulary() {
    let e = evaluator("a b c d\nd c b a\n", CostWeights::default());
    let initial = GridBuilder::new(2, 2).words("home", &["a", "b", "c", "d"]).build();

    let mut cfg = small_config(2, 1);
    cfg.search.select_number = 2;
    cfg.search.mutation_proba = 1.0;
    cfg.search.cross_proba = 0.0;
    let options = OptimizationOptions::try_from(&cfg).unwrap();

    let result = Optimizer::new(Arc::new(e), options)
        .run(&initial, Some(3), &NoProgress)
        .unwrap();

    assert_eq!(result.generations, 1);
    assert_eq!(sorted_vocabulary(&result.best), sorted_vocabulary(&initial));
    assert_eq!(result.best.page_count(), 1);
    result.best.check_consistency().unwrap();
}

#[test]
fn test_same_seed_same_search() {
    let (optimizer, initial) = sentence_setup(6, 5);
    let a = optimizer.run(&initial, Some(42), &NoProgress).unwrap();
    let b = optimizer.run(&initial, Some(42), &NoProgress).unwrap();

    assert_eq!(a.history.best_history, b.history.best_history);
    assert_eq!(a.history.generation_fitness, b.history.generation_fitness);
    assert_eq!(a.cost, b.cost);
    assert_eq!(layout_text(&a.best), layout_text(&b.best));
}

#[test]
fn test_search_never_loses_the_initial_layout() {
    let (optimizer, initial) = sentence_setup(8, 6);
    let start = optimizer.evaluator().fitness(&initial).unwrap();
    let result = optimizer.run(&initial, Some(9), &NoProgress).unwrap();

    assert!(result.cost <= start);
    assert!(result.history.best_history.windows(2).all(|w| w[1] <= w[0]));
    assert_eq!(result.history.len(), result.generations + 1);
    assert!((optimizer.evaluator().fitness(&result.best).unwrap() - result.cost).abs() < 1e-9);
    result.best.check_consistency().unwrap();
}

#[test]
fn test_time_limit_stops_before_first_generation() {
    let (optimizer, initial) = sentence_setup(4, 50);
    let mut options = optimizer.options().clone();
    options.max_time = Some(Duration::ZERO);
    let limited = Optimizer::new(Arc::new(evaluator(SENTENCES, CostWeights::default())), options);

    let result = limited.run(&initial, Some(1), &NoProgress).unwrap();
    assert_eq!(result.generations, 0);
    assert_eq!(result.history.len(), 1);
}

#[test]
fn test_parallel_workers_get_offset_seeds() {
    let (optimizer, initial) = sentence_setup(4, 3);
    let mut options = optimizer.options().clone();
    options.workers = 3;
    let parallel = Optimizer::new(Arc::new(evaluator(SENTENCES, CostWeights::default())), options);

    let result = parallel.run_parallel(&initial, Some(100), &NoProgress).unwrap();
    let seeds: Vec<_> = result.workers.iter().map(|w| w.seed).collect();
    assert_eq!(seeds, vec![Some(100), Some(101), Some(102)]);

    let min = result.workers.iter().map(|w| w.cost).fold(f64::INFINITY, f64::min);
    assert_eq!(result.cost, min);
    assert_eq!(result.workers[result.winner].cost, min);
    assert_eq!(result.history, result.workers[result.winner].history.best_history);
}

#[test]
fn test_parallel_search_repeats_with_explicit_workers() {
    let (optimizer, initial) = sentence_setup(4, 4);
    let mut options = optimizer.options().clone();
    options.workers = 3;
    let parallel = Optimizer::new(Arc::new(evaluator(SENTENCES, CostWeights::default())), options);

    let a = parallel.run_parallel(&initial, Some(7), &NoProgress).unwrap();
    let b = parallel.run_parallel(&initial, Some(7), &NoProgress).unwrap();
    assert_eq!(a.winner, b.winner);
    assert_eq!(a.cost, b.cost);
    assert_eq!(a.history, b.history);
    assert_eq!(layout_text(&a.best), layout_text(&b.best));
    for (x, y) in a.workers.iter().zip(&b.workers) {
        assert_eq!(x.cost, y.cost);
    }
}

#[test]
fn test_strict_mismatch_aborts_the_search() {
    let e = evaluator("a zebra\n", CostWeights::default());
    let initial = GridBuilder::new(2, 2).words("home", &["a", "b"]).build();
    let options = OptimizationOptions::try_from(&small_config(2, 1)).unwrap();

    assert!(Optimizer::new(Arc::new(e), options)
        .run(&initial, Some(0), &NoProgress)
        .is_err());
}
