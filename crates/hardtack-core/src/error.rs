use thiserror::Error;

use crate::types::DimensionFailure;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid update: {0}")]
    InvalidUpdate(String),

    #[error("All {} searched dimensions failed: {}", .failures.len(), join_failures(.failures))]
    QueryFailed { failures: Vec<DimensionFailure> },

    #[error("Operation failed: {0}")]
    Operation(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn join_failures(failures: &[DimensionFailure]) -> String {
    failures.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

pub type Result<T> = std::result::Result<T, Error>;
