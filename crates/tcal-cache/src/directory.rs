use std::collections::HashMap;

/// Eviction policy selectable at cache construction (spec §9 open
/// question: "eviction policy is unspecified ... pick one and document
/// it"). Kept as a closed enum rather than an open trait because picking a
/// victim must interleave with the per-slot lock attempts living in
/// [`crate::FrameCache`]; see DESIGN.md.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvictionPolicy {
    /// Second-chance CLOCK: a reference bit per slot, cleared on a second
    /// sweep before the slot is considered for eviction. Default.
    #[default]
    Clock,
    /// Strict least-recently-used, tracked by a monotonic access tick.
    Lru,
}

/// Directory bookkeeping: which slot (if any) holds a given frame index,
/// which slots are occupied (reserved or populated), and per-slot recency
/// state for whichever `EvictionPolicy` is active. Guarded by a single
/// mutex; never held while a slot is being decoded (spec §5: "the only
/// blocking point inside the façade is acquisition of a slot lock").
pub(crate) struct Directory {
    pub(crate) by_frame: HashMap<usize, usize>,
    pub(crate) occupied: Vec<bool>,
    pub(crate) reference: Vec<bool>,
    pub(crate) last_access: Vec<u64>,
    pub(crate) clock_hand: usize,
    pub(crate) tick: u64,
    pub(crate) policy: EvictionPolicy,
}

impl Directory {
    pub(crate) fn new(capacity: usize, policy: EvictionPolicy) -> Self {
        Self {
            by_frame: HashMap::with_capacity(capacity),
            occupied: vec![false; capacity],
            reference: vec![false; capacity],
            last_access: vec![0; capacity],
            clock_hand: 0,
            tick: 0,
            policy,
        }
    }

    pub(crate) fn touch(&mut self, slot_idx: usize) {
        self.tick += 1;
        self.reference[slot_idx] = true;
        self.last_access[slot_idx] = self.tick;
    }

    pub(crate) fn clear(&mut self) {
        self.by_frame.clear();
        self.occupied.iter_mut().for_each(|o| *o = false);
        self.reference.iter_mut().for_each(|r| *r = false);
        self.last_access.iter_mut().for_each(|t| *t = 0);
        self.clock_hand = 0;
    }
}
