use std::path::Path;
use std::sync::Arc;

use tcal_model::{Allocator, FrameHeader, Molecule};

use crate::error::BackendError;

/// A molecule backend: given a path, produces the read-only topology TCAL
/// needs (atom count via mass array length, connected components). Spec §6.
pub trait MoleculeBackend: Send + Sync {
    fn create(&self, path: &Path, alloc: &Allocator) -> Result<Arc<Molecule>, BackendError>;
}

/// Factory that opens a trajectory file into a live [`TrajectoryBackend`]
/// handle. Kept separate from `TrajectoryBackend` itself because the
/// factory is the thing registered per-extension (spec §4.1), while the
/// handle it returns is the thing the façade wraps (spec §4.4).
pub trait TrajectoryBackendFactory: Send + Sync {
    fn create(
        &self,
        path: &Path,
        alloc: &Allocator,
    ) -> Result<Box<dyn TrajectoryBackend>, BackendError>;
}

/// The capability set exposed by an open trajectory, consumed by the façade
/// and re-exposed by it in identical shape (spec §4.4, §6) so a façade
/// handle is drop-in wherever a backend handle is expected.
pub trait TrajectoryBackend: Send + Sync {
    fn num_atoms(&self) -> usize;

    fn num_frames(&self) -> usize;

    fn get_header(&self, idx: usize) -> Result<FrameHeader, BackendError>;

    /// Writes the encoded frame into `out` when provided and always returns
    /// its byte size; passing `None` lets a caller size a scratch buffer
    /// before allocating it.
    fn fetch_frame_data(
        &self,
        idx: usize,
        out: Option<&mut Vec<u8>>,
    ) -> Result<usize, BackendError>;

    fn decode_frame_data(
        &self,
        blob: &[u8],
        header: &mut FrameHeader,
        x: &mut [f32],
        y: &mut [f32],
        z: &mut [f32],
    ) -> Result<(), BackendError>;

    /// Convenience wrapper combining `fetch_frame_data` + `decode_frame_data`
    /// into a single call (spec §4.4: "`load_frame` is its convenience
    /// wrapper").
    fn load_frame(
        &self,
        idx: usize,
        header: &mut FrameHeader,
        x: &mut [f32],
        y: &mut [f32],
        z: &mut [f32],
    ) -> Result<(), BackendError> {
        let mut scratch = Vec::new();
        self.fetch_frame_data(idx, Some(&mut scratch))?;
        self.decode_frame_data(&scratch, header, x, y, z)
    }
}
