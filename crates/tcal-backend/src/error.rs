use std::path::PathBuf;

/// Failure kinds a backend can report back to TCAL.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("backend failed to open {path}: {reason}")]
    CreateFailed { path: PathBuf, reason: String },

    #[error("backend failed to decode frame {index}: {reason}")]
    DecodeFailed { index: usize, reason: String },

    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
