use super::physics::{DistanceFormula, ORIGIN};
use crate::error::{PfResult, PictoForgeError};
use crate::grid::Grid;
use crate::tree::NodeId;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegWeights {
    pub movement: f64,
    pub selection: f64,
    pub formula: DistanceFormula,
}

impl Default for LegWeights {
    fn default() -> Self {
        Self {
            movement: 1.0,
            selection: 1.0,
            formula: DistanceFormula::Euclidean,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchMode {
    /// Unknown words abort the evaluation.
    Strict,
    /// Unknown words are skipped and reported.
    Tolerant,
}

impl From<bool> for MismatchMode {
    fn from(tolerant: bool) -> Self {
        if tolerant {
            Self::Tolerant
        } else {
            Self::Strict
        }
    }
}

/// Words a corpus asked for that the grid does not hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MissingWords {
    pub count: usize,
    pub words: BTreeSet<String>,
}

impl MissingWords {
    pub fn record(&mut self, word: &str) {
        self.count += 1;
        if !self.words.contains(word) {
            self.words.insert(word.to_string());
        }
    }

    pub fn merge(&mut self, other: &MissingWords) {
        self.count += other.count;
        self.words.extend(other.words.iter().cloned());
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Where the user's attention is: a page and a slot on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub page: NodeId,
    pub pos: (usize, usize),
}

impl Cursor {
    pub fn start(grid: &Grid) -> Self {
        Self {
            page: grid.root(),
            pos: ORIGIN,
        }
    }
}

/// One transition from a cursor to a pictogram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leg {
    pub page: NodeId,
    pub pos: (usize, usize),
    pub hops: usize,
    pub movement: f64,
    pub selections: usize,
}

impl Leg {
    #[inline(always)]
    pub fn cost(&self, w: &LegWeights) -> f64 {
        self.movement * w.movement + self.selections as f64 * w.selection
    }
}

/// Cost of moving from `from` to the slot `target` on `page`.
///
/// Up hops travel to the page origin (return pictogram), down hops travel to
/// the directory leading to the child; each page change drops the cursor on
/// the new page's origin.
pub fn leg_to(
    grid: &Grid,
    from: Cursor,
    page: NodeId,
    target: (usize, usize),
    w: &LegWeights,
) -> PfResult<Leg> {
    let tree = grid.tree();
    let path = tree.path_finding(from.page, page)?;

    let mut pos = from.pos;
    let mut movement = 0.0;
    for hop in path.nodes.windows(2) {
        let (current, next) = (hop[0], hop[1]);
        if tree.parent(current) == Some(next) {
            movement += w.formula.distance(pos, ORIGIN);
        } else {
            let current_page = grid.page(current).ok_or_else(|| {
                PictoForgeError::Structure(format!("No page for node #{}", current))
            })?;
            let next_name = tree.name(next).ok_or_else(|| {
                PictoForgeError::Structure(format!("No tree node #{}", next))
            })?;
            let (slot, _) = current_page.directory_to(next_name).ok_or_else(|| {
                PictoForgeError::Structure(format!(
                    "Page '{}' has no directory to '{}'",
                    current_page.name(),
                    next_name
                ))
            })?;
            movement += w.formula.distance(pos, current_page.position_of(slot));
        }
        pos = ORIGIN;
    }
    movement += w.formula.distance(pos, target);

    Ok(Leg {
        page,
        pos: target,
        hops: path.distance,
        movement,
        selections: path.distance + 1,
    })
}

/// Cheapest leg over every page holding `word`; ties keep the lowest page id.
pub fn best_leg(grid: &Grid, from: Cursor, word: &str, w: &LegWeights) -> PfResult<Option<Leg>> {
    let mut best: Option<(f64, Leg)> = None;
    for &page in grid.pages_containing(word) {
        let target = grid
            .page(page)
            .and_then(|p| p.slot_of(word).map(|s| p.position_of(s)))
            .ok_or_else(|| {
                PictoForgeError::Structure(format!("Index points '{}' to a page without it", word))
            })?;
        let leg = leg_to(grid, from, page, target, w)?;
        let cost = leg.cost(w);
        if best.is_none_or(|(b, _)| cost < b) {
            best = Some((cost, leg));
        }
    }
    Ok(best.map(|(_, leg)| leg))
}

#[derive(Debug, Clone, Copy)]
pub struct SentenceOptions<'a> {
    pub mode: MismatchMode,
    /// Charge the walk from the start cursor to the first word.
    pub count_lead_in: bool,
    pub stopwords: Option<&'a HashSet<String>>,
}

impl Default for SentenceOptions<'_> {
    fn default() -> Self {
        Self {
            mode: MismatchMode::Strict,
            count_lead_in: false,
            stopwords: None,
        }
    }
}

/// Production cost of one sentence.
///
/// One leg is charged per consecutive pair of words. The first word is
/// located from the start cursor (root page origin); that lead-in leg is only
/// charged with `count_lead_in`. Unknown words either abort (strict) or are
/// skipped without moving the cursor (tolerant).
pub fn sentence_cost<S: AsRef<str>>(
    grid: &Grid,
    sentence: &[S],
    w: &LegWeights,
    opts: &SentenceOptions,
    missing: &mut MissingWords,
) -> PfResult<f64> {
    let mut cursor = Cursor::start(grid);
    let mut started = false;
    let mut cost = 0.0;

    for word in sentence {
        let word = word.as_ref();
        if word.is_empty() || opts.stopwords.is_some_and(|s| s.contains(word)) {
            continue;
        }
        match best_leg(grid, cursor, word, w)? {
            Some(leg) => {
                if started || opts.count_lead_in {
                    cost += leg.cost(w);
                }
                started = true;
                cursor = Cursor {
                    page: leg.page,
                    pos: leg.pos,
                };
            }
            None => match opts.mode {
                MismatchMode::Strict => {
                    return Err(PictoForgeError::VocabularyMismatch(word.to_string()))
                }
                MismatchMode::Tolerant => missing.record(word),
            },
        }
    }
    Ok(cost)
}
