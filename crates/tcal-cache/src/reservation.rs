use std::sync::{RwLockReadGuard, RwLockWriteGuard};

use tcal_model::FrameHeader;

use crate::FrameCache;
use crate::slot::SlotBody;

/// Result of [`FrameCache::find_or_reserve`]: either the frame was already
/// present (`Hit`, read-only) or this call became responsible for decoding
/// it (`Reserved`, write-only until [`CacheReservation::populate`] is
/// called).
pub enum CacheEntry<'a> {
    Hit(CacheHit<'a>),
    Reserved(CacheReservation<'a>),
}

impl<'a> CacheEntry<'a> {
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheEntry::Hit(_))
    }
}

/// A read-only view of a populated slot.
pub struct CacheHit<'a> {
    pub(crate) guard: RwLockReadGuard<'a, SlotBody>,
}

impl<'a> CacheHit<'a> {
    pub fn header(&self) -> FrameHeader {
        self.guard.frame.header.expect("hit implies populated")
    }

    pub fn x(&self) -> &[f32] {
        &self.guard.frame.x
    }

    pub fn y(&self) -> &[f32] {
        &self.guard.frame.y
    }

    pub fn z(&self) -> &[f32] {
        &self.guard.frame.z
    }
}

/// A slot this call reserved and must populate (or implicitly abort by
/// dropping without populating). Spec §4.3: "The caller is then obligated
/// to populate it and release the lock, or on failure to clear the
/// reservation" — the `Drop` impl performs that clearing automatically so a
/// caller that bails out early via `?` can't leave a stuck reservation
/// behind.
pub struct CacheReservation<'a> {
    pub(crate) cache: &'a FrameCache,
    pub(crate) slot_idx: usize,
    pub(crate) index: usize,
    pub(crate) guard: Option<RwLockWriteGuard<'a, SlotBody>>,
    pub(crate) populated: bool,
}

impl<'a> CacheReservation<'a> {
    pub fn frame_index(&self) -> usize {
        self.index
    }

    /// Writes the decoded frame into the reserved slot, marking it
    /// populated. Consumes `self`; the write lock is released when the
    /// returned guard (held internally) goes out of scope at the end of
    /// this call.
    pub fn populate(mut self, header: FrameHeader, x: Vec<f32>, y: Vec<f32>, z: Vec<f32>) {
        let guard = self.guard.as_mut().expect("guard present until drop");
        guard.frame.header = Some(header);
        guard.frame.x = x;
        guard.frame.y = y;
        guard.frame.z = z;
        guard.frame_index = Some(self.index);
        guard.populated = true;
        self.populated = true;
        self.cache.note_populated();
    }
}

impl<'a> Drop for CacheReservation<'a> {
    fn drop(&mut self) {
        if self.populated {
            return;
        }
        if let Some(mut guard) = self.guard.take() {
            guard.frame_index = None;
            guard.populated = false;
            guard.frame.clear();
        }
        self.cache.clear_reservation(self.slot_idx, self.index);
    }
}
