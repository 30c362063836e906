//! Structured pipeline errors (spec §7): one closed enum covering every
//! way a run can fail terminally, with `#[from]` conversions so `?` works
//! across the store, filesystem, and config layers without manual wrapping.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("configuration invalid: {0}")]
    ConfigInvalid(String),

    #[error("symbol store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("graph store unreachable: {0}")]
    StoreUnreachable(String),

    #[error("graph store write error: {0}")]
    GraphWrite(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

impl PipelineError {
    /// Maps a terminal pipeline error to the §6 CLI exit code. Non-fatal
    /// kinds from §7 never construct a `PipelineError` at all — they are
    /// tracked as counters on `PipelineSummary` instead.
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::ConfigInvalid(_) => 2,
            PipelineError::StoreUnreachable(_) => 3,
            _ => 4,
        }
    }
}
