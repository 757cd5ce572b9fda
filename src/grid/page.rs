use super::pictogram::Pictogram;
use crate::error::{PfResult, PictoForgeError};
use std::collections::HashMap;

/// Fixed-size slot array, filled row-major.
///
/// Word pictograms are indexed by word; directory pictograms live in the
/// slots only and are found through `directory_to`.
#[derive(Debug, Clone)]
pub struct Page {
    name: String,
    rows: usize,
    cols: usize,
    slots: Vec<Option<Pictogram>>,
    words: HashMap<String, usize>,
    cursor: usize,
}

impl Page {
    pub fn new(name: &str, rows: usize, cols: usize) -> Self {
        Self {
            name: name.to_string(),
            rows,
            cols,
            slots: vec![None; rows * cols],
            words: HashMap::new(),
            cursor: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|s| s.is_none())
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Next slot `add_pictogram` would fill. Holes left by a loaded layout are
    /// reused once the cursor has run off the end.
    pub fn free_slot(&self) -> Option<usize> {
        if self.cursor < self.slots.len() && self.slots[self.cursor].is_none() {
            return Some(self.cursor);
        }
        self.slots.iter().position(|s| s.is_none())
    }

    pub fn is_full(&self) -> bool {
        self.free_slot().is_none()
    }

    pub fn free_slots(&self) -> usize {
        self.capacity() - self.len()
    }

    pub fn position_of(&self, slot: usize) -> (usize, usize) {
        (slot / self.cols, slot % self.cols)
    }

    pub fn contains_word(&self, word: &str) -> bool {
        self.words.contains_key(word)
    }

    pub fn slot_of(&self, word: &str) -> Option<usize> {
        self.words.get(word).copied()
    }

    pub fn get(&self, slot: usize) -> Option<&Pictogram> {
        self.slots.get(slot).and_then(|s| s.as_ref())
    }

    pub fn pictograms(&self) -> impl Iterator<Item = (usize, &Pictogram)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|p| (i, p)))
    }

    /// Word pictograms in slot order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.pictograms()
            .filter(|(_, p)| !p.is_directory())
            .map(|(_, p)| p.word.as_str())
    }

    pub fn directories(&self) -> impl Iterator<Item = (usize, &Pictogram)> {
        self.pictograms().filter(|(_, p)| p.is_directory())
    }

    pub fn directory_to(&self, target: &str) -> Option<(usize, &Pictogram)> {
        self.directories()
            .find(|(_, p)| p.link.as_deref() == Some(target))
    }

    /// Puts a new pictogram in the next free slot.
    ///
    /// Returns `false` and leaves the page untouched when the page is full or
    /// already holds `word` as a word pictogram.
    pub fn add_pictogram(&mut self, word: &str, link: Option<&str>) -> bool {
        if link.is_none() && self.contains_word(word) {
            return false;
        }
        let Some(slot) = self.free_slot() else {
            return false;
        };

        let (row, col) = self.position_of(slot);
        let picto = match link {
            Some(target) => Pictogram::directory(word, row, col, &self.name, target),
            None => Pictogram::new(word, row, col, &self.name),
        };
        if !picto.is_directory() {
            self.words.insert(picto.word.clone(), slot);
        }
        self.slots[slot] = Some(picto);
        self.cursor = self.cursor.max(slot + 1);
        true
    }

    /// Places a pictogram at its own (row, col). Used when loading a layout.
    pub fn place(&mut self, mut picto: Pictogram) -> PfResult<()> {
        if picto.row >= self.rows || picto.col >= self.cols {
            return Err(PictoForgeError::Layout(format!(
                "'{}' at ({}, {}) is outside page '{}' ({}x{})",
                picto.word, picto.row, picto.col, self.name, self.rows, self.cols
            )));
        }
        let slot = picto.row * self.cols + picto.col;
        if self.slots[slot].is_some() {
            return Err(PictoForgeError::Layout(format!(
                "Slot ({}, {}) of page '{}' is used twice",
                picto.row, picto.col, self.name
            )));
        }
        if !picto.is_directory() {
            if self.contains_word(&picto.word) {
                return Err(PictoForgeError::Layout(format!(
                    "Word '{}' appears twice in page '{}'",
                    picto.word, self.name
                )));
            }
            self.words.insert(picto.word.clone(), slot);
        }
        picto.page = self.name.clone();
        self.slots[slot] = Some(picto);
        self.cursor = self.cursor.max(slot + 1);
        Ok(())
    }

    pub fn remove_word(&mut self, word: &str) -> Option<Pictogram> {
        let slot = self.slot_of(word)?;
        self.remove_slot(slot)
    }

    /// Removes a slot's pictogram and shifts every later slot one step back
    /// so the page stays packed from the origin.
    pub fn remove_slot(&mut self, slot: usize) -> Option<Pictogram> {
        let removed = self.slots.get_mut(slot)?.take()?;
        for i in slot + 1..self.slots.len() {
            self.slots[i - 1] = self.slots[i].take();
        }
        if slot < self.cursor {
            self.cursor -= 1;
        }
        self.reindex();
        Some(removed)
    }

    pub fn swap_slots(&mut self, a: usize, b: usize) {
        if a == b || a >= self.slots.len() || b >= self.slots.len() {
            return;
        }
        self.slots.swap(a, b);
        self.sync_slot(a);
        self.sync_slot(b);
    }

    /// Takes a pictogram out without compacting. Paired with `put` by
    /// cross-page swaps.
    pub(crate) fn take(&mut self, slot: usize) -> Option<Pictogram> {
        let picto = self.slots.get_mut(slot)?.take()?;
        if !picto.is_directory() {
            self.words.remove(&picto.word);
        }
        Some(picto)
    }

    pub(crate) fn put(&mut self, slot: usize, mut picto: Pictogram) {
        let (row, col) = self.position_of(slot);
        picto.row = row;
        picto.col = col;
        picto.page = self.name.clone();
        if !picto.is_directory() {
            self.words.insert(picto.word.clone(), slot);
        }
        self.slots[slot] = Some(picto);
        self.cursor = self.cursor.max(slot + 1);
    }

    pub(crate) fn set_similarity(&mut self, slot: usize, value: Option<f32>) -> bool {
        match self.slots.get_mut(slot).and_then(|s| s.as_mut()) {
            Some(p) => {
                p.similarity = value;
                true
            }
            None => false,
        }
    }

    fn sync_slot(&mut self, slot: usize) {
        let (row, col) = self.position_of(slot);
        if let Some(p) = self.slots[slot].as_mut() {
            p.row = row;
            p.col = col;
            if !p.is_directory() {
                self.words.insert(p.word.clone(), slot);
            }
        }
    }

    fn reindex(&mut self) {
        self.words.clear();
        for slot in 0..self.slots.len() {
            self.sync_slot(slot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(words: &[&str]) -> Page {
        let mut page = Page::new("p", 2, 3);
        for w in words {
            assert!(page.add_pictogram(w, None));
        }
        page
    }

    #[test]
    fn test_row_major_fill_and_capacity() {
        let mut page = filled(&["a", "b", "c", "d", "e", "f"]);
        assert_eq!(page.get(3).unwrap().position(), (1, 0));
        assert!(page.is_full());
        assert!(!page.add_pictogram("g", None), "full page must refuse");
        assert_eq!(page.len(), 6);
    }

    #[test]
    fn test_duplicate_word_refused() {
        let mut page = filled(&["a"]);
        assert!(!page.add_pictogram("a", None));
        // A directory may share a label with a word.
        assert!(page.add_pictogram("a", Some("child")));
        assert_eq!(page.len(), 2);
    }

    #[test]
    fn test_remove_compacts() {
        let mut page = filled(&["a", "b", "c", "d"]);
        let removed = page.remove_word("b").unwrap();
        assert_eq!(removed.word, "b");
        assert_eq!(page.words().collect::<Vec<_>>(), vec!["a", "c", "d"]);
        assert_eq!(page.slot_of("c"), Some(1));
        assert_eq!(page.get(2).unwrap().position(), (0, 2));
        assert_eq!(page.cursor(), 3);

        assert!(page.add_pictogram("b", None));
        assert_eq!(page.slot_of("b"), Some(3));
        assert_eq!(page.len(), 4);
    }

    #[test]
    fn test_swap_slots_updates_positions() {
        let mut page = filled(&["a", "b", "c", "d"]);
        page.swap_slots(0, 3);
        assert_eq!(page.slot_of("a"), Some(3));
        assert_eq!(page.slot_of("d"), Some(0));
        assert_eq!(page.get(3).unwrap().position(), (1, 0));
    }

    #[test]
    fn test_place_rejects_collisions() {
        let mut page = Page::new("p", 2, 2);
        page.place(Pictogram::new("a", 1, 1, "p")).unwrap();
        assert!(page.place(Pictogram::new("b", 1, 1, "p")).is_err());
        assert!(page.place(Pictogram::new("c", 2, 0, "p")).is_err());
        // The hole at the origin is reused once the cursor is exhausted.
        assert_eq!(page.free_slot(), Some(0));
    }
}
