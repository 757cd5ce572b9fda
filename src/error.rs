use thiserror::Error;

#[derive(Error, Debug)]
pub enum PictoForgeError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Parsing Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Data Validation Error: {0}")]
    Validation(String),

    #[error("Vocabulary Mismatch: '{0}' is not in the grid")]
    VocabularyMismatch(String),

    #[error("Layout Error: {0}")]
    Layout(String),

    #[error("Structure Error: {0}")]
    Structure(String),
}

pub type PfResult<T> = Result<T, PictoForgeError>;
