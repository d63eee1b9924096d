use thiserror::Error;

use crate::types::DocId;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    Dimension { expected: usize, actual: usize },

    #[error("Embedding row {row} has length {actual}, expected {expected}")]
    InconsistentRows { row: usize, expected: usize, actual: usize },

    #[error("Embedding table is empty")]
    EmptyEmbeddings,

    #[error("Corpus has no documents")]
    EmptyCorpus,

    #[error("Relevance judgments are empty")]
    EmptyJudgments,

    #[error("Duplicate document id: {0}")]
    DuplicateId(DocId),

    #[error("Index snapshot mismatch: {0}")]
    SnapshotMismatch(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Embedding provider failed: {0}")]
    Embedding(String),
}

impl Error {
    pub fn invalid_top_k(top_k: usize) -> Self {
        Error::InvalidArgument(format!("top_k must be positive, got {top_k}"))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
