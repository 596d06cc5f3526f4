use std::path::Path;
use std::sync::Arc;

use tcal_backend::{TrajectoryBackend, TrajectoryBackendFactory};
use tcal_cache::EvictionPolicy;
use tcal_model::{Allocator, Molecule};
use tcal_registry::FormatRegistry;

use crate::error::FacadeError;
use crate::facade::TrajectoryFacade;
use crate::handle::TrajectoryHandle;

/// Bound on simultaneously open trajectories (spec §4.6).
pub const CAPACITY: usize = 8;

/// Process-wide (or, here, caller-owned) table of open trajectories, keyed
/// by an opaque [`TrajectoryHandle`]. Not safe for concurrent mutation
/// (spec §4.6): `open_file`/`close`/reconfigure are assumed to be called
/// under external serialization, matching every other mutation path this
/// spec describes.
#[derive(Default)]
pub struct OpenTrajectories {
    entries: Vec<Option<(TrajectoryHandle, TrajectoryFacade)>>,
    next_id: u64,
}

impl OpenTrajectories {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Opens `path` against the registry's backends, wraps it in a façade,
    /// and allocates an entry for it (spec §4.4 steps 1-4).
    pub fn open_file(
        &mut self,
        path: &Path,
        format_registry: &FormatRegistry,
        molecule: Arc<Molecule>,
        alloc: &Allocator,
        available_bytes: u64,
        eviction_policy: EvictionPolicy,
    ) -> Result<TrajectoryHandle, FacadeError> {
        if self.len() >= CAPACITY {
            return Err(FacadeError::CapacityExceeded { capacity: CAPACITY });
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let factory = format_registry
            .traj_loader_from_ext(&ext)
            .ok_or_else(|| FacadeError::UnsupportedExtension { path: path.to_path_buf() })?;

        self.open_with_factory(path, factory, molecule, alloc, available_bytes, eviction_policy)
    }

    /// Like [`Self::open_file`] but with an explicit backend factory,
    /// matching spec §4.4 step 1's "if `backend` null, look up by
    /// extension" branch for the case a caller already has one in hand.
    pub fn open_with_factory(
        &mut self,
        path: &Path,
        factory: Arc<dyn TrajectoryBackendFactory>,
        molecule: Arc<Molecule>,
        alloc: &Allocator,
        available_bytes: u64,
        eviction_policy: EvictionPolicy,
    ) -> Result<TrajectoryHandle, FacadeError> {
        if self.len() >= CAPACITY {
            return Err(FacadeError::CapacityExceeded { capacity: CAPACITY });
        }

        let backend = factory
            .create(path, alloc)
            .map_err(|source| FacadeError::BackendCreateFailed {
                path: path.to_path_buf(),
                source,
            })?;

        let backend_atoms = backend.num_atoms();
        let molecule_atoms = molecule.atom_count();
        if backend_atoms != molecule_atoms {
            return Err(FacadeError::TopologyMismatch {
                backend_atoms,
                molecule_atoms,
            });
        }

        let cache = TrajectoryFacade::cache_with_policy(
            backend.num_frames(),
            molecule_atoms,
            available_bytes,
            eviction_policy,
        );
        let facade = TrajectoryFacade::new(backend, molecule, cache, alloc.child("trajectory-facade"));

        let handle = TrajectoryHandle(self.next_id);
        self.next_id += 1;

        let slot = self.entries.iter_mut().find(|e| e.is_none());
        match slot {
            Some(slot) => *slot = Some((handle, facade)),
            None => self.entries.push(Some((handle, facade))),
        }
        Ok(handle)
    }

    pub fn find_entry(&self, handle: TrajectoryHandle) -> Option<&TrajectoryFacade> {
        self.entries
            .iter()
            .flatten()
            .find(|(h, _)| *h == handle)
            .map(|(_, facade)| facade)
    }

    /// Removes and returns the entry for `handle` by swap-with-last then
    /// pop (spec §4.6), dropping its backend and cache.
    pub fn remove_entry(&mut self, handle: TrajectoryHandle) -> Result<(), FacadeError> {
        let pos = self
            .entries
            .iter()
            .position(|e| matches!(e, Some((h, _)) if *h == handle))
            .ok_or(FacadeError::UnknownHandle(handle))?;
        let last = self.entries.len() - 1;
        self.entries.swap(pos, last);
        self.entries.pop();
        Ok(())
    }

    pub fn close(&mut self, handle: TrajectoryHandle) -> Result<(), FacadeError> {
        self.remove_entry(handle)
    }

    /// Looks `handle` up and loads frame `idx` through its façade, translating
    /// lookup and bounds failures into [`FacadeError`] so a caller working
    /// purely against this registry never has to reach into `tcal_backend`'s
    /// error type (spec §8 boundary behavior: `load_frame(h, num_frames)`
    /// must fail rather than panic).
    pub fn load_frame(
        &self,
        handle: TrajectoryHandle,
        idx: usize,
        header: &mut tcal_model::FrameHeader,
        x: &mut [f32],
        y: &mut [f32],
        z: &mut [f32],
    ) -> Result<(), FacadeError> {
        let facade = self.find_entry(handle).ok_or(FacadeError::UnknownHandle(handle))?;
        let num_frames = facade.num_frames();
        if idx >= num_frames {
            return Err(FacadeError::FrameIndexOutOfRange { index: idx, num_frames });
        }
        facade
            .load_frame(idx, header, x, y, z)
            .map_err(|source| FacadeError::DecodeFailed { index: idx, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tcal_backend::MemoryBackend;
    use tcal_model::UnitCell;

    fn registry_with_backend() -> (FormatRegistry, Arc<Molecule>) {
        let mut registry = FormatRegistry::new();
        let (mol_backend, traj_factory) = MemoryBackend::matched_pair(10, 4, UnitCell::none());
        registry.register_molecule("XYZ", Arc::new(mol_backend));
        registry.register_trajectory("XYZ", Arc::new(traj_factory));
        let molecule = Arc::new(Molecule::new(vec![1.0; 4], Default::default()));
        (registry, molecule)
    }

    #[test]
    fn open_then_close_leaves_table_empty() {
        let (registry, molecule) = registry_with_backend();
        let mut open = OpenTrajectories::new();
        let alloc = Allocator::default();
        let handle = open
            .open_file(
                Path::new("traj.xyz"),
                &registry,
                molecule,
                &alloc,
                64 * 1024 * 1024,
                EvictionPolicy::Clock,
            )
            .unwrap();
        assert_eq!(open.len(), 1);
        open.close(handle).unwrap();
        assert_eq!(open.len(), 0);
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let (registry, molecule) = registry_with_backend();
        let mut open = OpenTrajectories::new();
        let alloc = Allocator::default();
        let err = open
            .open_file(
                Path::new("traj.unknownfmt"),
                &registry,
                molecule,
                &alloc,
                64 * 1024 * 1024,
                EvictionPolicy::Clock,
            )
            .unwrap_err();
        assert!(matches!(err, FacadeError::UnsupportedExtension { .. }));
    }

    #[test]
    fn topology_mismatch_is_rejected_without_registering_an_entry() {
        let (registry, _molecule) = registry_with_backend();
        let mismatched_molecule = Arc::new(Molecule::new(vec![1.0; 99], Default::default()));
        let mut open = OpenTrajectories::new();
        let alloc = Allocator::default();
        let err = open
            .open_file(
                Path::new("traj.xyz"),
                &registry,
                mismatched_molecule,
                &alloc,
                64 * 1024 * 1024,
                EvictionPolicy::Clock,
            )
            .unwrap_err();
        assert!(matches!(err, FacadeError::TopologyMismatch { .. }));
        assert_eq!(open.len(), 0);
    }

    #[test]
    fn ninth_open_fails_with_capacity_exceeded() {
        let mut open = OpenTrajectories::new();
        let alloc = Allocator::default();
        for _ in 0..CAPACITY {
            let (registry, molecule) = registry_with_backend();
            open.open_file(
                Path::new("traj.xyz"),
                &registry,
                molecule,
                &alloc,
                64 * 1024 * 1024,
                EvictionPolicy::Clock,
            )
            .unwrap();
        }
        let (registry, molecule) = registry_with_backend();
        let err = open
            .open_file(
                Path::new("traj.xyz"),
                &registry,
                molecule,
                &alloc,
                64 * 1024 * 1024,
                EvictionPolicy::Clock,
            )
            .unwrap_err();
        assert!(matches!(err, FacadeError::CapacityExceeded { .. }));
    }

    #[test]
    fn unknown_handle_on_close_is_an_error() {
        let mut open = OpenTrajectories::new();
        let bogus = TrajectoryHandle(999);
        let err = open.close(bogus).unwrap_err();
        assert!(matches!(err, FacadeError::UnknownHandle(_)));
    }

    /// Boundary behavior (spec §8): `load_frame(h, num_frames)` fails rather
    /// than panicking; so does an index far past it (standing in for the
    /// spec's `-1`, which `usize` cannot represent).
    #[test]
    fn load_frame_rejects_out_of_range_index() {
        let (registry, molecule) = registry_with_backend();
        let mut open = OpenTrajectories::new();
        let alloc = Allocator::default();
        let handle = open
            .open_file(
                Path::new("traj.xyz"),
                &registry,
                molecule,
                &alloc,
                64 * 1024 * 1024,
                EvictionPolicy::Clock,
            )
            .unwrap();

        let mut header = tcal_model::FrameHeader::empty(4);
        let mut x = vec![0.0f32; 4];
        let mut y = vec![0.0f32; 4];
        let mut z = vec![0.0f32; 4];

        let err = open
            .load_frame(handle, 10, &mut header, &mut x, &mut y, &mut z)
            .unwrap_err();
        assert!(matches!(err, FacadeError::FrameIndexOutOfRange { index: 10, num_frames: 10 }));

        let err = open
            .load_frame(handle, usize::MAX, &mut header, &mut x, &mut y, &mut z)
            .unwrap_err();
        assert!(matches!(err, FacadeError::FrameIndexOutOfRange { .. }));

        open.load_frame(handle, 0, &mut header, &mut x, &mut y, &mut z)
            .expect("frame 0 is in range");
    }

    #[test]
    fn load_frame_on_unknown_handle_is_an_error() {
        let open = OpenTrajectories::new();
        let bogus = TrajectoryHandle(999);
        let mut header = tcal_model::FrameHeader::empty(0);
        let err = open
            .load_frame(bogus, 0, &mut header, &mut [], &mut [], &mut [])
            .unwrap_err();
        assert!(matches!(err, FacadeError::UnknownHandle(_)));
    }
}
