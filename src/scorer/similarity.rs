use crate::error::{PfResult, PictoForgeError};
use crate::grid::{Grid, SlotRef};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::info;

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let (mut dot, mut na, mut nb) = (0.0f32, 0.0f32, 0.0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot / (na.sqrt() * nb.sqrt())
}

/// Dense symmetric cosine-similarity table over a vocabulary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimilarityMatrix {
    words: Vec<String>,
    values: Vec<f32>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl SimilarityMatrix {
    /// Builds the table for every word of `vocabulary` that has an embedding.
    /// Words without a vector are left out (their pairs read as unknown).
    pub fn from_embeddings(embeddings: &HashMap<String, Vec<f32>>, vocabulary: &[String]) -> Self {
        let mut words: Vec<String> = Vec::new();
        for w in vocabulary {
            if embeddings.contains_key(w) && !words.contains(w) {
                words.push(w.clone());
            }
        }
        let vectors: Vec<&[f32]> = words
            .iter()
            .filter_map(|w| embeddings.get(w).map(Vec::as_slice))
            .collect();
        let n = vectors.len();

        let values: Vec<f32> = (0..n)
            .into_par_iter()
            .flat_map_iter(|i| {
                let vectors = &vectors;
                (0..n).map(move |j| {
                    if i == j {
                        1.0
                    } else {
                        cosine_similarity(vectors[i], vectors[j])
                    }
                })
            })
            .collect();

        let mut matrix = Self {
            words,
            values,
            index: HashMap::new(),
        };
        matrix.rebuild_index();
        info!("Computed similarity matrix over {} words", n);
        matrix
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .words
            .iter()
            .enumerate()
            .map(|(i, w)| (w.clone(), i))
            .collect();
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f32> {
        let i = *self.index.get(a)?;
        let j = *self.index.get(b)?;
        self.values.get(i * self.words.len() + j).copied()
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> PfResult<()> {
        let writer = BufWriter::new(File::create(path.as_ref())?);
        serde_json::to_writer(writer, self)?;
        info!("Saved similarity matrix to {:?}", path.as_ref());
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> PfResult<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let mut matrix: Self = serde_json::from_reader(reader)?;
        let n = matrix.words.len();
        if matrix.values.len() != n * n {
            return Err(PictoForgeError::Validation(format!(
                "Similarity matrix holds {} values for {} words",
                matrix.values.len(),
                n
            )));
        }
        matrix.rebuild_index();
        info!("Loaded similarity matrix {:?} ({} words)", path.as_ref(), n);
        Ok(matrix)
    }
}

/// Sum over pages of the mean pairwise dissimilarity (1 - cos) of the word
/// pictograms sharing the page. Pairs involving unknown words are skipped.
pub fn grid_similarity_cost(grid: &Grid, matrix: &SimilarityMatrix) -> f64 {
    let mut total = 0.0;
    for (_, page) in grid.pages() {
        let words: Vec<&str> = page.words().collect();
        let mut sum = 0.0;
        let mut pairs = 0usize;
        for (i, a) in words.iter().enumerate() {
            for b in &words[i + 1..] {
                if let Some(s) = matrix.get(a, b) {
                    sum += 1.0 - s as f64;
                    pairs += 1;
                }
            }
        }
        if pairs > 0 {
            total += sum / pairs as f64;
        }
    }
    total
}

/// Stores on each word pictogram its mean similarity to its page mates.
pub fn annotate_similarity(grid: &mut Grid, matrix: &SimilarityMatrix) {
    let mut updates: Vec<(SlotRef, Option<f32>)> = Vec::new();
    for (id, page) in grid.pages() {
        let words: Vec<(usize, &str)> = page
            .pictograms()
            .filter(|(_, p)| !p.is_directory())
            .map(|(slot, p)| (slot, p.word.as_str()))
            .collect();
        for &(slot, word) in &words {
            let scores: Vec<f32> = words
                .iter()
                .filter(|(other, _)| *other != slot)
                .filter_map(|(_, mate)| matrix.get(word, mate))
                .collect();
            let mean = (!scores.is_empty()).then(|| scores.iter().sum::<f32>() / scores.len() as f32);
            updates.push((SlotRef { page: id, slot }, mean));
        }
    }
    for (at, value) in updates {
        grid.set_similarity(at, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embeddings() -> HashMap<String, Vec<f32>> {
        [
            ("cat", vec![1.0, 0.0]),
            ("dog", vec![0.8, 0.6]),
            ("car", vec![0.0, 1.0]),
        ]
        .into_iter()
        .map(|(w, v)| (w.to_string(), v))
        .collect()
    }

    fn vocab(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_cosine_bounds() {
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 3.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_matrix_is_symmetric_and_skips_unknown() {
        let m = SimilarityMatrix::from_embeddings(&embeddings(), &vocab(&["cat", "dog", "yak", "car"]));
        assert_eq!(m.len(), 3);
        assert!(!m.contains("yak"));
        assert_eq!(m.get("cat", "dog"), m.get("dog", "cat"));
        assert!((m.get("cat", "dog").unwrap() - 0.8).abs() < 1e-6);
        assert_eq!(m.get("cat", "yak"), None);
    }

    #[test]
    fn test_page_dissimilarity() {
        let m = SimilarityMatrix::from_embeddings(&embeddings(), &vocab(&["cat", "dog", "car"]));
        let mut g = Grid::new("home", 2, 2).unwrap();
        g.add_pictogram(0, "cat");
        g.add_pictogram(0, "dog");
        // one pair: 1 - 0.8
        assert!((grid_similarity_cost(&g, &m) - 0.2).abs() < 1e-6);

        annotate_similarity(&mut g, &m);
        let cat = g.locate("cat", 0).unwrap();
        assert!((g.get(cat).unwrap().similarity.unwrap() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_save_and_load_rebuilds_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.json");
        let m = SimilarityMatrix::from_embeddings(&embeddings(), &vocab(&["cat", "car"]));
        m.save(&path).unwrap();
        let loaded = SimilarityMatrix::load(&path).unwrap();
        assert_eq!(loaded.get("car", "cat"), m.get("car", "cat"));
    }
}
