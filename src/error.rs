use thiserror::Error;

/// Errors surfaced at the store/engine construction boundary. Everything
/// past construction degrades to empty subsets and no-data answers instead
/// of erroring.
#[derive(Debug, Error)]
pub enum QaError {
    #[error("failed to read record snapshot: {0}")]
    SnapshotIo(#[from] std::io::Error),

    #[error("record snapshot is malformed: {0}")]
    SnapshotFormat(#[from] serde_json::Error),

    #[error("record source failed: {0}")]
    Source(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}
