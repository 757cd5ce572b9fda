use super::mutation::global_swap;
use super::Individual;
use crate::grid::Grid;
use fastrand::Rng;

/// Seeds a population from one layout.
///
/// Individual 0 is always `initial` itself. With `randomize`, every other
/// individual gets as many random swaps as the grid has words.
pub fn init_population(initial: &Grid, size: usize, randomize: bool, rng: &mut Rng) -> Vec<Individual> {
    (0..size.max(1))
        .map(|i| {
            let mut grid = initial.clone();
            if randomize && i > 0 {
                for _ in 0..initial.word_count() {
                    global_swap(&mut grid, rng);
                }
            }
            Individual::new(grid)
        })
        .collect()
}
