use std::path::PathBuf;

/// Failure kinds surfaced by the trajectory façade (spec §7). Every variant
/// is a value, never an exception; logging (via `tracing`) is a side
/// channel alongside the returned error, not a substitute for it.
#[derive(Debug, thiserror::Error)]
pub enum FacadeError {
    #[error("no backend registered for extension of {path}")]
    UnsupportedExtension { path: PathBuf },

    #[error("backend failed to open {path}: {source}")]
    BackendCreateFailed {
        path: PathBuf,
        #[source]
        source: tcal_backend::BackendError,
    },

    #[error("backend reports {backend_atoms} atoms, molecule has {molecule_atoms}")]
    TopologyMismatch {
        backend_atoms: usize,
        molecule_atoms: usize,
    },

    #[error("failed to decode frame {index}: {source}")]
    DecodeFailed {
        index: usize,
        #[source]
        source: tcal_backend::BackendError,
    },

    #[error("frame index {index} out of range [0, {num_frames})")]
    FrameIndexOutOfRange { index: usize, num_frames: usize },

    #[error("handle {0:?} is not open")]
    UnknownHandle(crate::handle::TrajectoryHandle),

    #[error("open-trajectories table is full (capacity {capacity})")]
    CapacityExceeded { capacity: usize },
}
