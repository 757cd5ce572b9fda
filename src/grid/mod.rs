pub mod loader;
pub mod page;
pub mod pictogram;

pub use self::page::Page;
pub use self::pictogram::Pictogram;

use crate::config::GridParams;
use crate::error::{PfResult, PictoForgeError};
use crate::tree::{NodeId, PageTree};
use fastrand::Rng;
use itertools::Itertools;
use std::collections::BTreeMap;

/// Address of one slot: page node + row-major slot index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotRef {
    pub page: NodeId,
    pub slot: usize,
}

/// A full communication board: pages, their hierarchy, and the word index.
///
/// `pages[i]` is the page of tree node `i`. The word index lists, for every
/// word, the pages holding it as a word pictogram (ascending node ids).
#[derive(Debug, Clone)]
pub struct Grid {
    tree: PageTree,
    pages: Vec<Page>,
    word_index: BTreeMap<String, Vec<NodeId>>,
    rows: usize,
    cols: usize,
}

impl Grid {
    pub fn new(root_name: &str, rows: usize, cols: usize) -> PfResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(PictoForgeError::Config(format!(
                "Page size {}x{} is empty",
                rows, cols
            )));
        }
        Ok(Self {
            tree: PageTree::new(root_name),
            pages: vec![Page::new(root_name, rows, cols)],
            word_index: BTreeMap::new(),
            rows,
            cols,
        })
    }

    /// Builds a grid holding every distinct word of `words` once.
    pub fn from_vocabulary(words: &[String], params: &GridParams, rng: &mut Rng) -> PfResult<Self> {
        let mut vocab: Vec<String> = words.iter().unique().cloned().collect();
        if params.randomize {
            rng.shuffle(&mut vocab);
        }

        let (rows, cols) = if params.dynamic_size {
            let side = (vocab.len() as f64).sqrt().ceil().max(1.0) as usize;
            (side, side)
        } else {
            (params.row_size, params.col_size)
        };

        Self::paginate(&params.root_name, rows, cols, vocab)
    }

    /// Lays `words` out on `rows x cols` pages.
    ///
    /// Overflow pages `default{k}` are created first, each hanging off the
    /// earliest page that still has a free slot (its directory takes that
    /// slot), until the free capacity covers the vocabulary. Words then fill
    /// pages in creation order.
    pub fn paginate(root_name: &str, rows: usize, cols: usize, words: Vec<String>) -> PfResult<Self> {
        let mut grid = Self::new(root_name, rows, cols)?;
        let capacity = rows * cols;
        if words.len() > capacity && capacity < 2 {
            return Err(PictoForgeError::Config(format!(
                "{} words do not fit on {}x{} pages",
                words.len(),
                rows,
                cols
            )));
        }

        let mut free = capacity;
        let mut k = 0;
        while free < words.len() {
            let parent = grid
                .pages
                .iter()
                .position(|p| !p.is_full())
                .ok_or_else(|| PictoForgeError::Structure("No page left to grow from".into()))?;
            let mut name = format!("default{}", k);
            while grid.tree.find_node(&name).is_some() {
                k += 1;
                name = format!("default{}", k);
            }
            grid.add_page_under(parent, &name)?;
            free = free - 1 + capacity;
            k += 1;
        }

        let mut page = 0;
        for word in words {
            while !grid.add_pictogram(page, &word) {
                page += 1;
                if page >= grid.pages.len() {
                    return Err(PictoForgeError::Structure(format!(
                        "Ran out of slots while placing '{}'",
                        word
                    )));
                }
            }
        }
        Ok(grid)
    }

    /// Re-tiles the current vocabulary onto `dim_x x dim_y` pages.
    pub fn naive_cut(&self, dim_x: usize, dim_y: usize) -> PfResult<Self> {
        Self::paginate(self.root_name(), dim_x, dim_y, self.vocabulary())
    }

    pub fn tree(&self) -> &PageTree {
        &self.tree
    }

    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn root_name(&self) -> &str {
        self.tree.name(self.tree.root()).unwrap_or_default()
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn page(&self, id: NodeId) -> Option<&Page> {
        self.pages.get(id)
    }

    pub fn page_id(&self, name: &str) -> Option<NodeId> {
        self.tree.find_node(name)
    }

    pub fn page_by_name(&self, name: &str) -> Option<&Page> {
        self.page_id(name).and_then(|id| self.pages.get(id))
    }

    pub fn pages(&self) -> impl Iterator<Item = (NodeId, &Page)> {
        self.pages.iter().enumerate()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn get(&self, at: SlotRef) -> Option<&Pictogram> {
        self.pages.get(at.page).and_then(|p| p.get(at.slot))
    }

    pub fn pages_containing(&self, word: &str) -> &[NodeId] {
        self.word_index
            .get(word)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn occurrences(&self, word: &str) -> usize {
        self.pages_containing(word).len()
    }

    pub fn contains_word(&self, word: &str) -> bool {
        self.word_index.contains_key(word)
    }

    pub fn locate(&self, word: &str, page: NodeId) -> Option<SlotRef> {
        let slot = self.pages.get(page)?.slot_of(word)?;
        Some(SlotRef { page, slot })
    }

    /// Distinct words, pages breadth-first and slots row-major.
    pub fn vocabulary(&self) -> Vec<String> {
        self.tree
            .nodes_bfs()
            .into_iter()
            .filter_map(|id| self.pages.get(id))
            .flat_map(|p| p.words())
            .unique()
            .map(str::to_string)
            .collect()
    }

    pub fn word_count(&self) -> usize {
        self.word_index.len()
    }

    pub fn pictogram_count(&self) -> usize {
        self.pages.iter().map(|p| p.len()).sum()
    }

    pub fn word_slots(&self) -> Vec<SlotRef> {
        self.all_slots()
            .into_iter()
            .filter(|s| self.get(*s).is_some_and(|p| !p.is_directory()))
            .collect()
    }

    pub fn all_slots(&self) -> Vec<SlotRef> {
        self.pages
            .iter()
            .enumerate()
            .flat_map(|(page, p)| p.pictograms().map(move |(slot, _)| SlotRef { page, slot }))
            .collect()
    }

    /// Adds a child page below `parent` with a directory pictogram leading to
    /// it. `Ok(false)` when the parent has no free slot.
    pub fn add_page(&mut self, name: &str, parent: &str) -> PfResult<bool> {
        let parent_id = self.page_id(parent).ok_or_else(|| {
            PictoForgeError::Structure(format!("Unknown parent page '{}'", parent))
        })?;
        Ok(self.add_page_under(parent_id, name)?.is_some())
    }

    fn add_page_under(&mut self, parent: NodeId, name: &str) -> PfResult<Option<NodeId>> {
        if self.pages[parent].is_full() {
            return Ok(None);
        }
        let id = self.add_detached_page(name)?;
        self.tree.insert_child(parent, id)?;
        self.pages[parent].add_pictogram(name, Some(name));
        Ok(Some(id))
    }

    pub(crate) fn add_detached_page(&mut self, name: &str) -> PfResult<NodeId> {
        let id = self.tree.add_node(name)?;
        self.pages.push(Page::new(name, self.rows, self.cols));
        Ok(id)
    }

    pub fn add_pictogram(&mut self, page: NodeId, word: &str) -> bool {
        let Some(p) = self.pages.get_mut(page) else {
            return false;
        };
        if !p.add_pictogram(word, None) {
            return false;
        }
        self.index_add(word, page);
        true
    }

    pub fn remove_pictogram(&mut self, page: NodeId, word: &str) -> bool {
        let removed = self
            .pages
            .get_mut(page)
            .and_then(|p| p.remove_word(word))
            .is_some();
        if removed {
            self.index_remove(word, page);
        }
        removed
    }

    /// Exchanges the pages/positions of two pictograms.
    ///
    /// Declines (returns `false`, grid untouched) when a slot is empty, when a
    /// word would land on a page that already holds it, or when a directory
    /// would change depth. Directory moves re-parent the target subtree.
    pub fn swap_pictograms(&mut self, a: SlotRef, b: SlotRef) -> bool {
        if a == b {
            return false;
        }
        let (Some(pa), Some(pb)) = (self.get(a), self.get(b)) else {
            return false;
        };
        if a.page == b.page {
            self.pages[a.page].swap_slots(a.slot, b.slot);
            return true;
        }

        let (word_a, link_a) = (pa.word.clone(), pa.link.clone());
        let (word_b, link_b) = (pb.word.clone(), pb.link.clone());

        if link_a.is_none() && self.pages[b.page].contains_word(&word_a) {
            return false;
        }
        if link_b.is_none() && self.pages[a.page].contains_word(&word_b) {
            return false;
        }

        let target_a = match &link_a {
            Some(t) => match self.page_id(t) {
                Some(id) => Some(id),
                None => return false,
            },
            None => None,
        };
        let target_b = match &link_b {
            Some(t) => match self.page_id(t) {
                Some(id) => Some(id),
                None => return false,
            },
            None => None,
        };

        if target_a.is_some() || target_b.is_some() {
            let depth_a = self.tree.depth(a.page);
            if depth_a.is_none() || depth_a != self.tree.depth(b.page) {
                return false;
            }
            if target_a.is_some_and(|t| self.tree.is_ancestor(t, b.page))
                || target_b.is_some_and(|t| self.tree.is_ancestor(t, a.page))
            {
                return false;
            }
            if let Some(t) = target_a {
                if self.tree.reparent(t, b.page).is_err() {
                    return false;
                }
            }
            if let Some(t) = target_b {
                if self.tree.reparent(t, a.page).is_err() {
                    if let Some(ta) = target_a {
                        let _ = self.tree.reparent(ta, a.page);
                    }
                    return false;
                }
            }
        }

        let (Some(pa), Some(pb)) = (self.pages[a.page].take(a.slot), self.pages[b.page].take(b.slot))
        else {
            return false;
        };
        self.pages[a.page].put(a.slot, pb);
        self.pages[b.page].put(b.slot, pa);

        if link_a.is_none() {
            self.index_remove(&word_a, a.page);
            self.index_add(&word_a, b.page);
        }
        if link_b.is_none() {
            self.index_remove(&word_b, b.page);
            self.index_add(&word_b, a.page);
        }
        true
    }

    /// Adds another occurrence of `word` on `target`.
    ///
    /// `max_occurrences == 0` means no cap.
    pub fn duplicate_pictogram(&mut self, word: &str, target: NodeId, max_occurrences: usize) -> bool {
        let count = self.occurrences(word);
        if count == 0 || (max_occurrences > 0 && count >= max_occurrences) {
            return false;
        }
        self.add_pictogram(target, word)
    }

    /// Moves one occurrence of `word` from `from` to `to`.
    pub fn export_pictogram(&mut self, word: &str, from: NodeId, to: NodeId) -> bool {
        if from == to || !self.pages.get(from).is_some_and(|p| p.contains_word(word)) {
            return false;
        }
        if !self.add_pictogram(to, word) {
            return false;
        }
        self.remove_pictogram(from, word)
    }

    pub fn set_similarity(&mut self, at: SlotRef, value: Option<f32>) -> bool {
        self.pages
            .get_mut(at.page)
            .is_some_and(|p| p.set_similarity(at.slot, value))
    }

    pub(crate) fn page_mut(&mut self, id: NodeId) -> Option<&mut Page> {
        self.pages.get_mut(id)
    }

    pub(crate) fn tree_mut(&mut self) -> &mut PageTree {
        &mut self.tree
    }

    pub(crate) fn index_add(&mut self, word: &str, page: NodeId) {
        let entry = self.word_index.entry(word.to_string()).or_default();
        if let Err(pos) = entry.binary_search(&page) {
            entry.insert(pos, page);
        }
    }

    fn index_remove(&mut self, word: &str, page: NodeId) {
        if let Some(entry) = self.word_index.get_mut(word) {
            entry.retain(|&p| p != page);
            if entry.is_empty() {
                self.word_index.remove(word);
            }
        }
    }

    /// Cross-checks the word index, the pages and the tree.
    pub fn check_consistency(&self) -> PfResult<()> {
        if self.pages.len() != self.tree.len() {
            return Err(PictoForgeError::Structure(format!(
                "{} pages for {} tree nodes",
                self.pages.len(),
                self.tree.len()
            )));
        }

        for (id, page) in self.pages() {
            let node = self.tree.name(id).unwrap_or_default();
            if page.name() != node {
                return Err(PictoForgeError::Structure(format!(
                    "Page '{}' sits on tree node '{}'",
                    page.name(),
                    node
                )));
            }
            for word in page.words() {
                if !self.pages_containing(word).contains(&id) {
                    return Err(PictoForgeError::Structure(format!(
                        "'{}' on page '{}' is missing from the index",
                        word,
                        page.name()
                    )));
                }
            }
            for (_, dir) in page.directories() {
                let target = dir.link.as_deref().and_then(|t| self.page_id(t));
                if target.and_then(|t| self.tree.parent(t)) != Some(id) {
                    return Err(PictoForgeError::Structure(format!(
                        "Directory '{}' on '{}' does not match the tree",
                        dir.word,
                        page.name()
                    )));
                }
            }
            for &child in self.tree.children(id) {
                let child_name = self.tree.name(child).unwrap_or_default();
                if page.directory_to(child_name).is_none() {
                    return Err(PictoForgeError::Structure(format!(
                        "Page '{}' has no directory to its child '{}'",
                        page.name(),
                        child_name
                    )));
                }
            }
        }

        for (word, pages) in &self.word_index {
            for &p in pages {
                if !self.pages[p].contains_word(word) {
                    return Err(PictoForgeError::Structure(format!(
                        "Index lists '{}' on '{}' but the page does not hold it",
                        word,
                        self.pages[p].name()
                    )));
                }
            }
        }
        Ok(())
    }
}
