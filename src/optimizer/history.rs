use serde::Serialize;
use strum_macros::{Display, EnumIter, EnumString};

/// How per-worker best-cost curves are folded into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, EnumString, Display)]
#[strum(serialize_all = "snake_case")]
pub enum HistoryMode {
    /// The winning worker's curve.
    #[default]
    OnlyBest,
    /// Element-wise mean across workers.
    Average,
    /// Element-wise minimum across workers.
    GenBest,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct History {
    /// Fitness of every individual, one list per generation.
    pub generation_fitness: Vec<Vec<f64>>,
    /// Best-ever cost after each generation.
    pub best_history: Vec<f64>,
}

impl History {
    pub fn record(&mut self, fitness: Vec<f64>, best_ever: f64) {
        self.generation_fitness.push(fitness);
        self.best_history.push(best_ever);
    }

    pub fn len(&self) -> usize {
        self.best_history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.best_history.is_empty()
    }
}

/// Folds several curves into one. Curves may differ in length (time-limited
/// workers); each position only uses the curves that reach it.
pub fn merge_curves(mode: HistoryMode, curves: &[&[f64]], winner: usize) -> Vec<f64> {
    if let HistoryMode::OnlyBest = mode {
        return curves.get(winner).map(|c| c.to_vec()).unwrap_or_default();
    }

    let longest = curves.iter().map(|c| c.len()).max().unwrap_or(0);
    (0..longest)
        .map(|i| {
            let column = curves.iter().filter_map(|c| c.get(i).copied());
            match mode {
                HistoryMode::GenBest => column.fold(f64::INFINITY, f64::min),
                _ => {
                    let (sum, n) = column.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
                    sum / n as f64
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_merge_modes() {
        let a = [5.0, 4.0, 3.0];
        let b = [6.0, 2.0];
        let curves: [&[f64]; 2] = [&a, &b];

        assert_eq!(merge_curves(HistoryMode::OnlyBest, &curves, 1), vec![6.0, 2.0]);
        assert_eq!(merge_curves(HistoryMode::GenBest, &curves, 0), vec![5.0, 2.0, 3.0]);
        assert_eq!(merge_curves(HistoryMode::Average, &curves, 0), vec![5.5, 3.0, 3.0]);
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(HistoryMode::from_str("gen_best").unwrap(), HistoryMode::GenBest);
        assert_eq!(HistoryMode::OnlyBest.to_string(), "only_best");
        assert!(HistoryMode::from_str("median").is_err());
    }
}
