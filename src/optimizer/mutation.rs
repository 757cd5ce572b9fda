use crate::grid::{Grid, SlotRef};
use crate::tree::NodeId;
use fastrand::Rng;
use strum_macros::{Display, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display)]
#[strum(serialize_all = "snake_case")]
pub enum MutationKind {
    IntraSwap,
    InterSwap,
    Duplicate,
    Export,
}

/// Applies one operator drawn uniformly from `kinds`.
/// Returns whether the grid changed.
pub fn mutate(grid: &mut Grid, kinds: &[MutationKind], max_occurrences: usize, rng: &mut Rng) -> bool {
    if kinds.is_empty() {
        return false;
    }
    match kinds[rng.usize(..kinds.len())] {
        MutationKind::IntraSwap => intra_page_swap(grid, rng),
        MutationKind::InterSwap => inter_page_swap(grid, rng),
        MutationKind::Duplicate => duplicate_word(grid, max_occurrences, rng),
        MutationKind::Export => export_word(grid, rng),
    }
}

/// Two pictograms of one page trade places.
pub fn intra_page_swap(grid: &mut Grid, rng: &mut Rng) -> bool {
    let candidates: Vec<NodeId> = grid
        .pages()
        .filter(|(_, p)| p.len() >= 2)
        .map(|(id, _)| id)
        .collect();
    if candidates.is_empty() {
        return false;
    }
    let page = candidates[rng.usize(..candidates.len())];
    let slots: Vec<usize> = match grid.page(page) {
        Some(p) => p.pictograms().map(|(s, _)| s).collect(),
        None => return false,
    };

    let i = rng.usize(..slots.len());
    let mut j = rng.usize(..slots.len() - 1);
    if j >= i {
        j += 1;
    }
    grid.swap_pictograms(SlotRef { page, slot: slots[i] }, SlotRef { page, slot: slots[j] })
}

/// Two pictograms on different pages trade places; the grid declines
/// duplicates and depth-changing directory moves.
pub fn inter_page_swap(grid: &mut Grid, rng: &mut Rng) -> bool {
    if grid.page_count() < 2 {
        return false;
    }
    let slots = grid.all_slots();
    if slots.is_empty() {
        return false;
    }
    let a = slots[rng.usize(..slots.len())];
    let others: Vec<SlotRef> = slots.into_iter().filter(|s| s.page != a.page).collect();
    if others.is_empty() {
        return false;
    }
    let b = others[rng.usize(..others.len())];
    grid.swap_pictograms(a, b)
}

/// Any two pictograms of the grid trade places.
pub fn global_swap(grid: &mut Grid, rng: &mut Rng) -> bool {
    let slots = grid.all_slots();
    if slots.len() < 2 {
        return false;
    }
    let a = slots[rng.usize(..slots.len())];
    let b = slots[rng.usize(..slots.len())];
    grid.swap_pictograms(a, b)
}

/// Pages that could receive `word`: free slot and no copy yet.
fn receivers(grid: &Grid, word: &str, except: NodeId) -> Vec<NodeId> {
    grid.pages()
        .filter(|(id, p)| *id != except && !p.is_full() && !p.contains_word(word))
        .map(|(id, _)| id)
        .collect()
}

fn random_word(grid: &Grid, rng: &mut Rng) -> Option<(String, NodeId)> {
    let slots = grid.word_slots();
    if slots.is_empty() {
        return None;
    }
    let at = slots[rng.usize(..slots.len())];
    grid.get(at).map(|p| (p.word.clone(), at.page))
}

/// Copies a random word onto another page with room for it.
pub fn duplicate_word(grid: &mut Grid, max_occurrences: usize, rng: &mut Rng) -> bool {
    let Some((word, page)) = random_word(grid, rng) else {
        return false;
    };
    let targets = receivers(grid, &word, page);
    if targets.is_empty() {
        return false;
    }
    let target = targets[rng.usize(..targets.len())];
    grid.duplicate_pictogram(&word, target, max_occurrences)
}

/// Moves a random word occurrence to another page with room for it.
pub fn export_word(grid: &mut Grid, rng: &mut Rng) -> bool {
    let Some((word, page)) = random_word(grid, rng) else {
        return false;
    };
    let targets = receivers(grid, &word, page);
    if targets.is_empty() {
        return false;
    }
    let target = targets[rng.usize(..targets.len())];
    grid.export_pictogram(&word, page, target)
}
