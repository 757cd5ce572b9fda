use crate::error::{PfResult, PictoForgeError};
use itertools::Itertools;
use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::path::Path;
use tracing::{debug, info, warn};

/// Sentences to be produced on the board, one tokenized line each.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    pub sentences: Vec<Vec<String>>,
}

impl Corpus {
    /// Lower-cases and splits on whitespace; blank lines are dropped.
    pub fn from_text(text: &str) -> Self {
        let sentences = text
            .lines()
            .map(|line| {
                line.split_whitespace()
                    .map(str::to_lowercase)
                    .collect::<Vec<_>>()
            })
            .filter(|s| !s.is_empty())
            .collect();
        Self { sentences }
    }

    /// Reads and concatenates `.txt` corpora.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> PfResult<Self> {
        let mut corpus = Self::default();
        for path in paths {
            let path = path.as_ref();
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if !ext.eq_ignore_ascii_case("txt") {
                return Err(PictoForgeError::Config(format!(
                    "Unsupported corpus file {:?} (expected .txt)",
                    path
                )));
            }
            let part = Self::from_text(&fs::read_to_string(path)?);
            debug!("Corpus {:?}: {} sentences", path, part.len());
            corpus.sentences.extend(part.sentences);
        }
        info!(
            "Loaded {} sentences ({} distinct words) from {} file(s)",
            corpus.len(),
            corpus.vocabulary().len(),
            paths.len()
        );
        Ok(corpus)
    }

    /// Distinct words in order of first appearance.
    pub fn vocabulary(&self) -> Vec<String> {
        self.sentences.iter().flatten().unique().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }
}

/// Whitespace-separated word list, lower-cased.
pub fn load_stopwords<P: AsRef<Path>>(path: P) -> PfResult<HashSet<String>> {
    let text = fs::read_to_string(path.as_ref())?;
    let words: HashSet<String> = text.split_whitespace().map(str::to_lowercase).collect();
    debug!("Loaded {} stopwords from {:?}", words.len(), path.as_ref());
    Ok(words)
}

/// Reads `word v1 v2 ... vn` lines (word2vec text format; the optional
/// `count dim` header line is skipped).
pub fn load_embeddings<P: AsRef<Path>>(path: P) -> PfResult<HashMap<String, Vec<f32>>> {
    let path = path.as_ref();
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .from_reader(File::open(path)?);

    let mut vectors = HashMap::new();
    let mut dim: Option<usize> = None;
    let mut skipped = 0;

    for (i, result) in rdr.records().enumerate() {
        let rec = result?;
        let fields: Vec<&str> = rec.iter().filter(|f| !f.is_empty()).collect();
        if fields.len() < 2 {
            skipped += 1;
            continue;
        }
        if i == 0 && fields.len() == 2 && fields.iter().all(|f| f.parse::<usize>().is_ok()) {
            continue;
        }

        let word = fields[0].to_lowercase();
        let values = fields[1..]
            .iter()
            .map(|v| v.parse::<f32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                PictoForgeError::Validation(format!("Embedding for '{}' is not numeric: {}", word, e))
            })?;

        match dim {
            None => dim = Some(values.len()),
            Some(d) if d != values.len() => {
                return Err(PictoForgeError::Validation(format!(
                    "Embedding for '{}' has {} dimensions, expected {}",
                    word,
                    values.len(),
                    d
                )))
            }
            _ => {}
        }
        vectors.entry(word).or_insert(values);
    }

    if skipped > 0 {
        warn!("Skipped {} malformed embedding rows", skipped);
    }
    info!(
        "Loaded {} embeddings ({} dimensions) from {:?}",
        vectors.len(),
        dim.unwrap_or(0),
        path
    );
    Ok(vectors)
}
