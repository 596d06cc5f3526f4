/// A bitfield over a molecule's atoms, used to select the recenter target
/// subset. Backed by a `Vec<u64>` rather than `Vec<bool>` to keep it cheap to
/// clone and to make "is this mask empty" a handful of word comparisons.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtomMask {
    words: Vec<u64>,
    len: usize,
}

const BITS: usize = u64::BITS as usize;

impl AtomMask {
    pub fn new(atom_count: usize) -> Self {
        Self {
            words: vec![0; atom_count.div_ceil(BITS)],
            len: atom_count,
        }
    }

    pub fn from_indices(atom_count: usize, indices: impl IntoIterator<Item = u32>) -> Self {
        let mut mask = Self::new(atom_count);
        for idx in indices {
            mask.set(idx);
        }
        mask
    }

    pub fn set(&mut self, atom: u32) {
        let atom = atom as usize;
        assert!(atom < self.len, "atom index {atom} out of range {}", self.len);
        self.words[atom / BITS] |= 1 << (atom % BITS);
    }

    pub fn contains(&self, atom: u32) -> bool {
        let atom = atom as usize;
        if atom >= self.len {
            return false;
        }
        self.words[atom / BITS] & (1 << (atom % BITS)) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn indices(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.len as u32).filter(move |i| self.contains(*i))
    }

    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_mask_has_no_indices() {
        let mask = AtomMask::new(10);
        assert!(mask.is_empty());
        assert_eq!(mask.indices().count(), 0);
    }

    #[test]
    fn set_bits_round_trip_through_indices() {
        let mask = AtomMask::from_indices(130, [0, 5, 64, 129]);
        assert!(!mask.is_empty());
        assert_eq!(mask.count(), 4);
        let collected: Vec<u32> = mask.indices().collect();
        assert_eq!(collected, vec![0, 5, 64, 129]);
    }

    #[test]
    fn contains_is_false_out_of_range() {
        let mask = AtomMask::new(4);
        assert!(!mask.contains(100));
    }

    #[test]
    #[should_panic]
    fn set_out_of_range_panics() {
        let mut mask = AtomMask::new(4);
        mask.set(10);
    }
}
