use crate::cell::UnitCell;

/// Fixed metadata for one decoded frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameHeader {
    pub atom_count: usize,
    pub time: f64,
    pub step: i64,
    pub cell: UnitCell,
}

impl FrameHeader {
    pub fn empty(atom_count: usize) -> Self {
        Self {
            atom_count,
            time: 0.0,
            step: 0,
            cell: UnitCell::none(),
        }
    }
}

/// A decoded frame: header plus the three coordinate arrays. Owned by a
/// frame-cache slot; borrowed by readers under that slot's lock.
#[derive(Debug, Clone, Default)]
pub struct FrameData {
    pub header: Option<FrameHeader>,
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub z: Vec<f32>,
}

impl FrameData {
    pub fn with_capacity(atom_count: usize) -> Self {
        Self {
            header: None,
            x: vec![0.0; atom_count],
            y: vec![0.0; atom_count],
            z: vec![0.0; atom_count],
        }
    }

    /// A frame is internally consistent when its header's atom count agrees
    /// with every coordinate array's length (spec §3 invariant).
    pub fn is_consistent(&self) -> bool {
        match &self.header {
            Some(h) => {
                h.atom_count == self.x.len() && h.atom_count == self.y.len() && h.atom_count == self.z.len()
            }
            None => self.x.is_empty() && self.y.is_empty() && self.z.is_empty(),
        }
    }

    pub fn clear(&mut self) {
        self.header = None;
        self.x.clear();
        self.y.clear();
        self.z.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_frame_with_capacity_is_consistent_once_header_set() {
        let mut frame = FrameData::with_capacity(4);
        assert!(!frame.is_consistent(), "no header yet");
        frame.header = Some(FrameHeader::empty(4));
        assert!(frame.is_consistent());
    }

    #[test]
    fn mismatched_lengths_are_inconsistent() {
        let mut frame = FrameData::with_capacity(4);
        frame.header = Some(FrameHeader::empty(4));
        frame.x.push(0.0);
        assert!(!frame.is_consistent());
    }
}
