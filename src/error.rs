use std::path::PathBuf;

/// Failure talking to the Spotify Web API.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Failed to send http request: {0}")]
    FailedToSendRequest(#[from] reqwest::Error),
    #[error("Spotify responded with status {status}: {reason}")]
    UnexpectedStatus { status: u16, reason: String },
}

/// Failure reading or writing a cached playlist snapshot.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to read snapshot {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write snapshot {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Snapshot {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum CurationError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
