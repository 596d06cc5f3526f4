//! Fixed-capacity frame cache (spec §4.3): a concurrent, keyed-by-frame-index
//! slot table supporting many simultaneous readers across distinct indices
//! and at most one in-flight decode per index.

mod directory;
mod reservation;
mod slot;
mod sizing;

pub use directory::EvictionPolicy;
pub use reservation::{CacheEntry, CacheHit, CacheReservation};
pub use sizing::{approx_frame_bytes, capacity_for};

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use directory::Directory;
use slot::Slot;

pub struct FrameCache {
    slots: Vec<Slot>,
    directory: Mutex<Directory>,
    populated_count: AtomicUsize,
}

impl FrameCache {
    pub fn new(capacity: usize, policy: EvictionPolicy) -> Self {
        let slots = (0..capacity).map(|_| Slot::empty()).collect();
        Self {
            slots,
            directory: Mutex::new(Directory::new(capacity, policy)),
            populated_count: AtomicUsize::new(0),
        }
    }

    /// Builds a cache sized per spec §3: `min(num_frames, available_bytes /
    /// approx_frame_bytes)`.
    pub fn sized_for(
        num_frames: usize,
        atom_count: usize,
        available_bytes: u64,
        policy: EvictionPolicy,
    ) -> Self {
        Self::new(capacity_for(num_frames, atom_count, available_bytes), policy)
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn num_frames(&self) -> usize {
        self.populated_count.load(Ordering::SeqCst)
    }

    /// The key primitive (spec §4.3). Blocks on a slot's lock when another
    /// caller already owns the reservation for `index`; never blocks on
    /// unrelated frame indices.
    pub fn find_or_reserve(&self, index: usize) -> CacheEntry<'_> {
        if self.slots.is_empty() {
            panic!("frame cache has zero capacity");
        }
        loop {
            let mut dir = self.directory.lock().expect("directory mutex poisoned");
            if let Some(&slot_idx) = dir.by_frame.get(&index) {
                dir.touch(slot_idx);
                drop(dir);
                let guard = self.slots[slot_idx].lock.read().expect("slot lock poisoned");
                if guard.populated && guard.frame_index == Some(index) {
                    return CacheEntry::Hit(CacheHit { guard });
                }
                // The reservation holder aborted between our directory
                // lookup and taking the read lock; retry from scratch.
                drop(guard);
                continue;
            }

            let (slot_idx, guard) = self.pick_victim(&mut dir);
            dir.occupied[slot_idx] = true;
            dir.touch(slot_idx);
            dir.by_frame.insert(index, slot_idx);
            drop(dir);
            return CacheEntry::Reserved(CacheReservation {
                cache: self,
                slot_idx,
                index,
                guard: Some(guard),
                populated: false,
            });
        }
    }

    /// Chooses a victim slot and returns it pre-locked for writing, so no
    /// other caller can observe it between selection and reservation
    /// (`dir` stays locked for the whole call). Slots currently locked by
    /// another reader or an in-flight decode are skipped rather than
    /// evicted.
    fn pick_victim<'a>(&'a self, dir: &mut Directory) -> (usize, std::sync::RwLockWriteGuard<'a, slot::SlotBody>) {
        use directory::EvictionPolicy::*;
        let n = self.slots.len();
        let mut attempts: u64 = 0;
        loop {
            let candidate = match dir.policy {
                Clock => self.clock_candidate(dir),
                Lru => self.lru_candidate(dir),
            };
            if let Some(i) = candidate {
                if let Ok(guard) = self.slots[i].lock.try_write() {
                    if let Some(old_index) = guard.frame_index {
                        dir.by_frame.remove(&old_index);
                        if guard.populated {
                            self.populated_count.fetch_sub(1, Ordering::SeqCst);
                        }
                    }
                    dir.occupied[i] = false;
                    return (i, guard);
                }
            }
            attempts += 1;
            if attempts > (n as u64) * 8 + 64 {
                std::thread::yield_now();
            }
            if attempts > (n as u64) * 64 + 1024 {
                panic!(
                    "frame cache capacity exhausted: {n} slots are all locked by \
                     concurrent in-flight decodes or readers"
                );
            }
        }
    }

    fn clock_candidate(&self, dir: &mut Directory) -> Option<usize> {
        let n = self.slots.len();
        for _ in 0..n {
            let i = dir.clock_hand;
            dir.clock_hand = (dir.clock_hand + 1) % n;
            if !dir.occupied[i] {
                return Some(i);
            }
            if dir.reference[i] {
                dir.reference[i] = false;
                continue;
            }
            return Some(i);
        }
        // Every slot got a reference-bit reprieve this sweep; fall back to
        // the slot the hand now points at.
        Some(dir.clock_hand)
    }

    fn lru_candidate(&self, dir: &Directory) -> Option<usize> {
        (0..self.slots.len())
            .find(|&i| !dir.occupied[i])
            .or_else(|| (0..self.slots.len()).min_by_key(|&i| dir.last_access[i]))
    }

    /// Called from [`CacheReservation`]'s `Drop` when a reservation is
    /// abandoned without populating: removes the slot's claim so a future
    /// call can retry the decode.
    pub(crate) fn clear_reservation(&self, slot_idx: usize, index: usize) {
        let mut dir = self.directory.lock().expect("directory mutex poisoned");
        if dir.by_frame.get(&index) == Some(&slot_idx) {
            dir.by_frame.remove(&index);
        }
        dir.occupied[slot_idx] = false;
        dir.reference[slot_idx] = false;
    }

    /// Marks a just-populated slot as counted; called once by
    /// `CacheReservation::populate`.
    pub(crate) fn note_populated(&self) {
        self.populated_count.fetch_add(1, Ordering::SeqCst);
    }

    /// Drops all slots. Callers must hold no locks (spec §4.3).
    pub fn clear(&self) {
        let mut dir = self.directory.lock().expect("directory mutex poisoned");
        for slot in &self.slots {
            let mut guard = slot.lock.write().expect("slot lock poisoned");
            guard.frame_index = None;
            guard.populated = false;
            guard.frame.clear();
        }
        dir.clear();
        self.populated_count.store(0, Ordering::SeqCst);
    }
}
