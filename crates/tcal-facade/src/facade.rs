use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tcal_backend::{BackendError, TrajectoryBackend};
use tcal_cache::{CacheEntry, EvictionPolicy, FrameCache};
use tcal_model::{Allocator, AtomMask, FrameHeader, Molecule};

use std::sync::Arc;

/// Wraps a backend trajectory with a frame cache, recenter mask, and
/// deperiodize flag, exposing the identical [`TrajectoryBackend`] capability
/// set so it is drop-in wherever a raw backend handle is expected (spec
/// §4.4, §6).
///
/// The recenter mask and deperiodize flag are read by every decode and
/// mutated only by the reconfiguration methods; spec §5 says their mutation
/// "is not guarded and must be externally serialized" by the caller, but
/// Rust still requires memory safety regardless of caller discipline, so
/// they live behind a `Mutex`/`AtomicBool` rather than bare fields.
pub struct TrajectoryFacade {
    backend: Box<dyn TrajectoryBackend>,
    molecule: Arc<Molecule>,
    cache: FrameCache,
    recenter_mask: Mutex<AtomMask>,
    deperiodize: AtomicBool,
    #[allow(dead_code)]
    alloc: Allocator,
}

impl TrajectoryFacade {
    pub(crate) fn new(
        backend: Box<dyn TrajectoryBackend>,
        molecule: Arc<Molecule>,
        cache: FrameCache,
        alloc: Allocator,
    ) -> Self {
        let atom_count = molecule.atom_count();
        Self {
            backend,
            molecule,
            cache,
            recenter_mask: Mutex::new(AtomMask::new(atom_count)),
            deperiodize: AtomicBool::new(false),
            alloc,
        }
    }

    pub(crate) fn cache_with_policy(
        num_frames: usize,
        atom_count: usize,
        available_bytes: u64,
        policy: EvictionPolicy,
    ) -> FrameCache {
        FrameCache::sized_for(num_frames, atom_count, available_bytes, policy)
    }

    pub fn set_recenter_target(&self, mask: Option<AtomMask>) {
        let mut guard = self.recenter_mask.lock().expect("recenter mask mutex poisoned");
        *guard = mask.unwrap_or_else(|| AtomMask::new(self.molecule.atom_count()));
        self.cache.clear();
    }

    pub fn set_recenter_target_no_invalidate(&self, mask: Option<AtomMask>) {
        let mut guard = self.recenter_mask.lock().expect("recenter mask mutex poisoned");
        *guard = mask.unwrap_or_else(|| AtomMask::new(self.molecule.atom_count()));
    }

    pub fn set_deperiodize(&self, enabled: bool) {
        self.deperiodize.store(enabled, Ordering::SeqCst);
        self.cache.clear();
    }

    pub fn set_deperiodize_no_invalidate(&self, enabled: bool) {
        self.deperiodize.store(enabled, Ordering::SeqCst);
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn num_cache_frames(&self) -> usize {
        self.cache.num_frames()
    }

    pub fn molecule(&self) -> &Arc<Molecule> {
        &self.molecule
    }
}

impl TrajectoryBackend for TrajectoryFacade {
    fn num_atoms(&self) -> usize {
        self.backend.num_atoms()
    }

    fn num_frames(&self) -> usize {
        self.backend.num_frames()
    }

    fn get_header(&self, idx: usize) -> Result<FrameHeader, BackendError> {
        self.backend.get_header(idx)
    }

    /// Emits the 8-byte index blob only this façade's `decode_frame_data`
    /// understands (spec §4.4).
    fn fetch_frame_data(&self, idx: usize, out: Option<&mut Vec<u8>>) -> Result<usize, BackendError> {
        if let Some(buf) = out {
            buf.clear();
            buf.extend_from_slice(&(idx as u64).to_le_bytes());
        }
        Ok(8)
    }

    /// The real work (spec §4.4 algorithm): cache lookup, backend decode on
    /// miss, post-decode transform, then copy-out to caller buffers.
    fn decode_frame_data(
        &self,
        blob: &[u8],
        header: &mut FrameHeader,
        x: &mut [f32],
        y: &mut [f32],
        z: &mut [f32],
    ) -> Result<(), BackendError> {
        assert_eq!(blob.len(), 8, "façade frame blob must be the 8-byte index");
        let idx = u64::from_le_bytes(blob.try_into().expect("length checked above")) as usize;
        let num_frames = self.backend.num_frames();
        if idx >= num_frames {
            return Err(BackendError::DecodeFailed {
                index: idx,
                reason: format!("frame index out of range [0, {num_frames})"),
            });
        }

        match self.cache.find_or_reserve(idx) {
            CacheEntry::Hit(hit) => {
                *header = hit.header();
                x.copy_from_slice(hit.x());
                y.copy_from_slice(hit.y());
                z.copy_from_slice(hit.z());
            }
            CacheEntry::Reserved(reservation) => {
                let atom_count = self.backend.num_atoms();
                let mut decoded_header = FrameHeader::empty(atom_count);
                let mut dx = vec![0.0f32; atom_count];
                let mut dy = vec![0.0f32; atom_count];
                let mut dz = vec![0.0f32; atom_count];

                let mut scratch = Vec::new();
                self.backend.fetch_frame_data(idx, Some(&mut scratch))?;
                self.backend
                    .decode_frame_data(&scratch, &mut decoded_header, &mut dx, &mut dy, &mut dz)?;

                let mask = self.recenter_mask.lock().expect("recenter mask mutex poisoned");
                tcal_transform::apply(
                    &mut dx,
                    &mut dy,
                    &mut dz,
                    &self.molecule,
                    &decoded_header.cell,
                    &mask,
                    self.deperiodize.load(Ordering::SeqCst),
                );
                drop(mask);

                *header = decoded_header;
                x.copy_from_slice(&dx);
                y.copy_from_slice(&dy);
                z.copy_from_slice(&dz);
                reservation.populate(decoded_header, dx, dy, dz);
            }
        }
        Ok(())
    }
}
