use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tcal_model::{Allocator, FrameHeader, Molecule, StructureIndex, UnitCell};

use crate::error::BackendError;
use crate::traits::{MoleculeBackend, TrajectoryBackend, TrajectoryBackendFactory};

/// A deterministic, file-free molecule backend: atoms sit on the integer
/// line (`atom i` at `x = i`), so tests can assert exact post-decode
/// transform results without depending on a real parser (none of which are
/// in scope per spec §1).
pub struct MemoryMoleculeBackend {
    masses: Vec<f32>,
    structures: StructureIndex,
}

impl MemoryMoleculeBackend {
    pub fn new(masses: Vec<f32>) -> Self {
        Self {
            masses,
            structures: StructureIndex::default(),
        }
    }

    pub fn with_structures(mut self, structures: StructureIndex) -> Self {
        self.structures = structures;
        self
    }
}

impl MoleculeBackend for MemoryMoleculeBackend {
    fn create(&self, _path: &Path, alloc: &Allocator) -> Result<Arc<Molecule>, BackendError> {
        alloc.note_alloc(self.masses.len() * std::mem::size_of::<f32>());
        Ok(Arc::new(Molecule::new(
            self.masses.clone(),
            self.structures.clone(),
        )))
    }
}

/// A deterministic, file-free trajectory factory. Frame `i`'s atom `a` sits
/// at `(a as f32, i as f32 * 0.0, 0.0)` by default so tests can assert exact
/// coordinates; `decode_call_count` lets concurrency tests confirm a given
/// frame index was decoded exactly once even under contention.
pub struct MemoryTrajectoryBackendFactory {
    num_frames: usize,
    num_atoms: usize,
    cell: UnitCell,
    decode_calls: Arc<AtomicUsize>,
    decode_delay: Duration,
}

impl MemoryTrajectoryBackendFactory {
    pub fn new(num_frames: usize, num_atoms: usize, cell: UnitCell) -> Self {
        Self {
            num_frames,
            num_atoms,
            cell,
            decode_calls: Arc::new(AtomicUsize::new(0)),
            decode_delay: Duration::ZERO,
        }
    }

    /// Sleeps for `delay` inside `decode_frame_data`, widening the race
    /// window for concurrent-miss tests (spec §8 scenario 2).
    pub fn with_decode_delay(mut self, delay: Duration) -> Self {
        self.decode_delay = delay;
        self
    }

    pub fn decode_call_count(&self) -> usize {
        self.decode_calls.load(Ordering::SeqCst)
    }
}

impl TrajectoryBackendFactory for MemoryTrajectoryBackendFactory {
    fn create(
        &self,
        _path: &Path,
        _alloc: &Allocator,
    ) -> Result<Box<dyn TrajectoryBackend>, BackendError> {
        Ok(Box::new(MemoryTrajectoryBackend {
            num_frames: self.num_frames,
            num_atoms: self.num_atoms,
            cell: self.cell,
            decode_calls: self.decode_calls.clone(),
            decode_delay: self.decode_delay,
        }))
    }
}

struct MemoryTrajectoryBackend {
    num_frames: usize,
    num_atoms: usize,
    cell: UnitCell,
    decode_calls: Arc<AtomicUsize>,
    decode_delay: Duration,
}

impl MemoryTrajectoryBackend {
    fn check_index(&self, idx: usize) -> Result<(), BackendError> {
        if idx >= self.num_frames {
            return Err(BackendError::DecodeFailed {
                index: idx,
                reason: format!("frame index out of range (num_frames = {})", self.num_frames),
            });
        }
        Ok(())
    }
}

impl TrajectoryBackend for MemoryTrajectoryBackend {
    fn num_atoms(&self) -> usize {
        self.num_atoms
    }

    fn num_frames(&self) -> usize {
        self.num_frames
    }

    fn get_header(&self, idx: usize) -> Result<FrameHeader, BackendError> {
        self.check_index(idx)?;
        Ok(FrameHeader {
            atom_count: self.num_atoms,
            time: idx as f64,
            step: idx as i64,
            cell: self.cell,
        })
    }

    fn fetch_frame_data(
        &self,
        idx: usize,
        out: Option<&mut Vec<u8>>,
    ) -> Result<usize, BackendError> {
        self.check_index(idx)?;
        if let Some(buf) = out {
            buf.clear();
            buf.extend_from_slice(&(idx as u64).to_le_bytes());
        }
        Ok(8)
    }

    fn decode_frame_data(
        &self,
        blob: &[u8],
        header: &mut FrameHeader,
        x: &mut [f32],
        y: &mut [f32],
        z: &mut [f32],
    ) -> Result<(), BackendError> {
        self.decode_calls.fetch_add(1, Ordering::SeqCst);
        if !self.decode_delay.is_zero() {
            std::thread::sleep(self.decode_delay);
        }
        if blob.len() != 8 {
            return Err(BackendError::DecodeFailed {
                index: 0,
                reason: format!("expected an 8-byte index blob, got {} bytes", blob.len()),
            });
        }
        let idx = u64::from_le_bytes(blob.try_into().expect("checked len == 8")) as usize;
        self.check_index(idx)?;

        *header = FrameHeader {
            atom_count: self.num_atoms,
            time: idx as f64,
            step: idx as i64,
            cell: self.cell,
        };
        for a in 0..self.num_atoms {
            x[a] = a as f32;
            y[a] = 0.0;
            z[a] = 0.0;
        }
        Ok(())
    }
}

/// Convenience bundle pairing a molecule backend and trajectory factory of
/// matching atom count, for quick test/demo setup.
pub struct MemoryBackend;

impl MemoryBackend {
    pub fn matched_pair(
        num_frames: usize,
        num_atoms: usize,
        cell: UnitCell,
    ) -> (MemoryMoleculeBackend, MemoryTrajectoryBackendFactory) {
        let masses = vec![1.0; num_atoms];
        (
            MemoryMoleculeBackend::new(masses),
            MemoryTrajectoryBackendFactory::new(num_frames, num_atoms, cell),
        )
    }
}
