use std::{io, path::PathBuf};
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse question bank: {0}")]
    BankFormat(#[from] serde_json::Error),

    #[error("invalid question bank: {0}")]
    InvalidBank(String),

    #[error("failed to parse config: {0}")]
    ConfigFormat(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("value estimator failure: {0}")]
    Estimator(String),

    #[error("non-finite value in {0}")]
    NonFinite(&'static str),

    #[error("{what} has length {actual}, expected {expected}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("action {action} is out of range for {count} actions")]
    InvalidAction { action: usize, count: usize },

    #[error("failed to sample action: {0}")]
    Sampling(String),

    #[error("learner input failed: {0}")]
    Learner(#[source] io::Error),
}

impl Error {
    pub(crate) fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(Error::DimensionMismatch {
                what,
                expected,
                actual,
            })
        }
    }
}
