use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pictogram {
    pub word: String,
    pub row: usize,
    pub col: usize,
    pub page: String,
    /// Target page for directory pictograms.
    pub link: Option<String>,
    pub similarity: Option<f32>,
}

impl Pictogram {
    pub fn new(word: &str, row: usize, col: usize, page: &str) -> Self {
        Self {
            word: word.to_string(),
            row,
            col,
            page: page.to_string(),
            link: None,
            similarity: None,
        }
    }

    pub fn directory(label: &str, row: usize, col: usize, page: &str, target: &str) -> Self {
        Self {
            link: Some(target.to_string()),
            ..Self::new(label, row, col, page)
        }
    }

    pub fn identifier(&self) -> String {
        format!("{}@{}", self.word, self.page)
    }

    #[inline(always)]
    pub fn is_directory(&self) -> bool {
        self.link.is_some()
    }

    pub fn position(&self) -> (usize, usize) {
        (self.row, self.col)
    }
}
