#![allow(dead_code)]

use pictoforge::config::{Config, CostWeights};
use pictoforge::grid::loader::read_layout;
use pictoforge::grid::Grid;
use pictoforge::scorer::{Corpus, CostEvaluator, EvaluatorBuildParams};

/// Builder for hand-made grids.
pub struct GridBuilder {
    grid: Grid,
}

impl GridBuilder {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            grid: Grid::new("home", rows, cols).unwrap(),
        }
    }

    /// Adds words to an existing page, in slot order.
    pub fn words(mut self, page: &str, words: &[&str]) -> Self {
        let id = self.grid.page_id(page).unwrap();
        for w in words {
            assert!(self.grid.add_pictogram(id, w), "page '{}' is full", page);
        }
        self
    }

    /// Adds a child page (its directory takes the parent's next slot).
    pub fn page(mut self, name: &str, parent: &str) -> Self {
        assert!(self.grid.add_page(name, parent).unwrap(), "'{}' is full", parent);
        self
    }

    pub fn build(self) -> Grid {
        self.grid.check_consistency().unwrap();
        self.grid
    }
}

pub const CAT_MOUSE_LAYOUT: &str = "home\t2\t2\n\
word\trow\tcol\tpage\tidentifier\tis_directory\tlink_target\tsimilarity_score\n\
cat\t0\t0\thome\tcat@home\tfalse\t\t\n\
dog\t0\t1\thome\tdog@home\tfalse\t\t\n\
more\t1\t0\thome\tmore@home\ttrue\tp1\t\n\
mouse\t0\t0\tp1\tmouse@p1\tfalse\t\t\n";

/// home: cat (0,0), dog (0,1), more -> p1 (1,0) ; p1: mouse (0,0)
pub fn cat_mouse_grid() -> Grid {
    read_layout(CAT_MOUSE_LAYOUT.as_bytes()).unwrap()
}

pub fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

pub fn sorted_vocabulary(g: &Grid) -> Vec<String> {
    let mut v = g.vocabulary();
    v.sort();
    v
}

pub fn evaluator(text: &str, weights: CostWeights) -> CostEvaluator {
    EvaluatorBuildParams::builder()
        .weights(weights)
        .corpus(Corpus::from_text(text))
        .build()
        .build_evaluator()
        .unwrap()
}

pub fn small_config(pop_size: usize, gen_number: usize) -> Config {
    let mut cfg = Config::default();
    cfg.search.pop_size = pop_size;
    cfg.search.gen_number = gen_number;
    cfg.search.workers = 1;
    cfg
}

pub const SENTENCES: &str = "i want to eat\n\
i want to drink water\n\
more water please\n\
i want more bread\n\
stop it please\n\
go outside\n\
i want to go outside\n\
eat bread\n";
