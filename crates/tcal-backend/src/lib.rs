//! Capability traits consumed and exposed by the trajectory access layer
//! (spec §6), plus a deterministic in-memory backend used by tests and the
//! demo CLI so none of this crate depends on a real MD file parser (those
//! are explicitly out of scope per spec §1).

mod error;
mod memory;
mod traits;

pub use error::BackendError;
pub use memory::{MemoryBackend, MemoryMoleculeBackend, MemoryTrajectoryBackendFactory};
pub use traits::{MoleculeBackend, TrajectoryBackend, TrajectoryBackendFactory};
