use crate::error::{PfResult, PictoForgeError};
use crate::optimizer::history::HistoryMode;
use crate::optimizer::mutation::MutationKind;
use crate::scorer::physics::DistanceFormula;
use clap::{parser::ValueSource, ArgAction, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    #[command(flatten)]
    pub search: SearchParams,
    #[command(flatten)]
    pub weights: CostWeights,
    #[command(flatten)]
    pub grid: GridParams,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    #[arg(long, default_value_t = 10)]
    pub pop_size: usize,
    #[arg(long, default_value_t = 2)]
    pub select_number: usize,
    #[arg(long, default_value_t = 10)]
    pub gen_number: usize,
    #[arg(long, default_value_t = 0.5)]
    pub cross_proba: f32,
    #[arg(long, default_value_t = 0.5)]
    pub cross_info_rate: f32,
    #[arg(long, default_value_t = 0.5)]
    pub mutation_proba: f32,

    // 0 = no cap on copies of one word
    #[arg(long, default_value_t = 2)]
    pub max_occurrences: usize,

    // 0 = one worker per core; seeded searches pin SEEDED_WORKERS instead
    #[arg(long, default_value_t = 0)]
    pub workers: usize,

    #[arg(long, default_value = "only_best")]
    pub history: String,

    #[arg(long, default_value = "intra_swap,inter_swap,duplicate,export")]
    pub mutations: String,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub randomize_population: bool,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            pop_size: 10,
            select_number: 2,
            gen_number: 10,
            cross_proba: 0.5,
            cross_info_rate: 0.5,
            mutation_proba: 0.5,
            max_occurrences: 2,
            workers: 0,
            history: "only_best".to_string(),
            mutations: "intra_swap,inter_swap,duplicate,export".to_string(),
            randomize_population: true,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CostWeights {
    #[arg(long, default_value_t = 1.0)]
    pub movement_weight: f64,
    #[arg(long, default_value_t = 1.0)]
    pub selection_weight: f64,
    #[arg(long, default_value = "euclidean")]
    pub distance_formula: String,

    // 0 = pure distance cost, 1 = pure similarity cost
    #[arg(long, default_value_t = 0.0)]
    pub similarity_coef: f64,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub cost_average: bool,
    #[arg(long, default_value_t = false)]
    pub mismatch_mode: bool,
    #[arg(long, default_value_t = false)]
    pub count_lead_in: bool,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            movement_weight: 1.0,
            selection_weight: 1.0,
            distance_formula: "euclidean".to_string(),
            similarity_coef: 0.0,
            cost_average: true,
            mismatch_mode: false,
            count_lead_in: false,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridParams {
    #[arg(long, default_value = "home")]
    pub root_name: String,
    #[arg(long, default_value_t = 5)]
    pub row_size: usize,
    #[arg(long, default_value_t = 5)]
    pub col_size: usize,
    #[arg(long, default_value_t = false)]
    pub dynamic_size: bool,
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub randomize: bool,
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            root_name: "home".to_string(),
            row_size: 5,
            col_size: 5,
            dynamic_size: false,
            randomize: true,
        }
    }
}

impl SearchParams {
    pub fn history_mode(&self) -> PfResult<HistoryMode> {
        HistoryMode::from_str(self.history.trim()).map_err(|_| {
            PictoForgeError::Config(format!(
                "Unknown history mode '{}' (expected only_best, average or gen_best)",
                self.history
            ))
        })
    }

    pub fn mutation_kinds(&self) -> PfResult<Vec<MutationKind>> {
        let kinds = self
            .mutations
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                MutationKind::from_str(s).map_err(|_| {
                    PictoForgeError::Config(format!("Unknown mutation operator '{}'", s))
                })
            })
            .collect::<PfResult<Vec<_>>>()?;

        if kinds.is_empty() {
            return Err(PictoForgeError::Config(
                "At least one mutation operator is required".to_string(),
            ));
        }
        Ok(kinds)
    }
}

impl CostWeights {
    pub fn formula(&self) -> PfResult<DistanceFormula> {
        DistanceFormula::from_str(self.distance_formula.trim()).map_err(|_| {
            PictoForgeError::Config(format!(
                "Unknown distance formula '{}' (expected euclidean or manhattan)",
                self.distance_formula
            ))
        })
    }
}

fn check_unit_interval(name: &str, value: f64) -> PfResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(PictoForgeError::Config(format!(
            "{} must be between 0 and 1 (got {})",
            name, value
        )))
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> PfResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn validate(&self) -> PfResult<()> {
        let s = &self.search;
        check_unit_interval("cross_proba", s.cross_proba as f64)?;
        check_unit_interval("cross_info_rate", s.cross_info_rate as f64)?;
        check_unit_interval("mutation_proba", s.mutation_proba as f64)?;
        check_unit_interval("similarity_coef", self.weights.similarity_coef)?;

        if s.pop_size == 0 {
            return Err(PictoForgeError::Config(
                "pop_size must be at least 1".to_string(),
            ));
        }
        if s.select_number == 0 {
            return Err(PictoForgeError::Config(
                "select_number must be at least 1".to_string(),
            ));
        }
        if !self.grid.dynamic_size && self.grid.row_size * self.grid.col_size < 2 {
            return Err(PictoForgeError::Config(format!(
                "Pages of {}x{} cannot hold a directory and a word",
                self.grid.row_size, self.grid.col_size
            )));
        }
        if self.weights.movement_weight < 0.0 || self.weights.selection_weight < 0.0 {
            return Err(PictoForgeError::Config(
                "Cost weights must be non-negative".to_string(),
            ));
        }

        self.weights.formula()?;
        s.history_mode()?;
        s.mutation_kinds()?;
        Ok(())
    }

    /// Overrides file-provided values with every flag the user typed explicitly.
    pub fn merge_from_cli(&mut self, cli: &Config, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($group:ident . $field:ident) => {
                if matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
                    self.$group.$field = cli.$group.$field.clone();
                }
            };
        }

        update_if_present!(search.pop_size);
        update_if_present!(search.select_number);
        update_if_present!(search.gen_number);
        update_if_present!(search.cross_proba);
        update_if_present!(search.cross_info_rate);
        update_if_present!(search.mutation_proba);
        update_if_present!(search.max_occurrences);
        update_if_present!(search.workers);
        update_if_present!(search.history);
        update_if_present!(search.mutations);
        update_if_present!(search.randomize_population);

        update_if_present!(weights.movement_weight);
        update_if_present!(weights.selection_weight);
        update_if_present!(weights.distance_formula);
        update_if_present!(weights.similarity_coef);
        update_if_present!(weights.cost_average);
        update_if_present!(weights.mismatch_mode);
        update_if_present!(weights.count_lead_in);

        update_if_present!(grid.root_name);
        update_if_present!(grid.row_size);
        update_if_present!(grid.col_size);
        update_if_present!(grid.dynamic_size);
        update_if_present!(grid.randomize);
    }
}
