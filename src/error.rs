//! Crate error type

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A race or progression query referenced a course that does not exist
    #[error("course index {index} out of range ({count} courses configured)")]
    UnknownCourse { index: usize, count: usize },

    /// Tuning or course JSON could not be parsed
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
