use std::sync::RwLock;

use tcal_model::FrameData;

/// A single cache slot: its payload plus enough bookkeeping to tell an
/// in-progress reservation apart from a fully decoded frame. Guarded by its
/// own `RwLock` so distinct slots never contend with each other (spec §4.3,
/// §5).
pub(crate) struct Slot {
    pub(crate) lock: RwLock<SlotBody>,
}

pub(crate) struct SlotBody {
    pub(crate) frame_index: Option<usize>,
    pub(crate) populated: bool,
    pub(crate) frame: FrameData,
}

impl Slot {
    pub(crate) fn empty() -> Self {
        Self {
            lock: RwLock::new(SlotBody {
                frame_index: None,
                populated: false,
                frame: FrameData::default(),
            }),
        }
    }
}
