use crate::grid::{Grid, SlotRef};
use fastrand::Rng;

/// Position-swap crossover.
///
/// Each child starts as a copy of one parent and, for every word pictogram of
/// the other parent, adopts that parent's (page, slot) for the word with
/// probability `rate`. Adoption is a swap inside the child, so the word
/// multiset of each child equals its starting parent's.
pub fn crossover_swap(x: &Grid, y: &Grid, rate: f32, rng: &mut Rng) -> (Grid, Grid) {
    let mut cx = x.clone();
    let mut cy = y.clone();
    adopt_positions(&mut cx, y, rate, rng);
    adopt_positions(&mut cy, x, rate, rng);
    (cx, cy)
}

/// Returns the number of swaps the child accepted.
pub fn adopt_positions(child: &mut Grid, donor: &Grid, rate: f32, rng: &mut Rng) -> usize {
    let mut accepted = 0;
    for at in donor.word_slots() {
        if rng.f32() >= rate {
            continue;
        }
        let (Some(picto), Some(page)) = (donor.get(at), donor.page(at.page)) else {
            continue;
        };
        let Some(target_page) = child.page_id(page.name()) else {
            continue;
        };
        let target = SlotRef {
            page: target_page,
            slot: at.slot,
        };
        if child.get(target).is_some_and(|p| p.word == picto.word && !p.is_directory()) {
            continue;
        }

        // Prefer the occurrence already on the target page.
        let source = child.locate(&picto.word, target_page).or_else(|| {
            child
                .pages_containing(&picto.word)
                .first()
                .and_then(|&p| child.locate(&picto.word, p))
        });
        if let Some(source) = source {
            if child.swap_pictograms(source, target) {
                accepted += 1;
            }
        }
    }
    accepted
}
