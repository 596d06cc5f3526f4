/// A connected-component partition of a molecule's atoms, flattened into a
/// single index array (CSR-style: `offsets[i]..offsets[i + 1]` indexes into
/// `indices` for structure `i`).
#[derive(Debug, Clone, Default)]
pub struct StructureIndex {
    offsets: Vec<usize>,
    indices: Vec<u32>,
}

impl StructureIndex {
    /// Builds a structure index from already-grouped atom index lists.
    pub fn from_components(components: &[Vec<u32>]) -> Self {
        let mut offsets = Vec::with_capacity(components.len() + 1);
        let mut indices = Vec::new();
        offsets.push(0);
        for component in components {
            indices.extend_from_slice(component);
            offsets.push(indices.len());
        }
        Self { offsets, indices }
    }

    pub fn num_structures(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// Atom indices belonging to structure `i`, or `None` if out of range.
    pub fn structure(&self, i: usize) -> Option<&[u32]> {
        let start = *self.offsets.get(i)?;
        let end = *self.offsets.get(i + 1)?;
        Some(&self.indices[start..end])
    }

    pub fn structures(&self) -> impl Iterator<Item = &[u32]> {
        (0..self.num_structures()).map(move |i| self.structure(i).expect("i < num_structures"))
    }
}

/// Read-only molecular topology: atom count, per-atom mass, and the
/// connected-component partition used by deperiodization.
///
/// TCAL never mutates a `Molecule`. Backends are expected to hand one back
/// wrapped in an `Arc` so every façade opened against it can share ownership
/// without TCAL needing to reason about raw lifetimes.
#[derive(Debug, Clone)]
pub struct Molecule {
    masses: Vec<f32>,
    structures: StructureIndex,
}

impl Molecule {
    pub fn new(masses: Vec<f32>, structures: StructureIndex) -> Self {
        Self { masses, structures }
    }

    pub fn atom_count(&self) -> usize {
        self.masses.len()
    }

    pub fn mass(&self, atom: u32) -> Option<f32> {
        self.masses.get(atom as usize).copied()
    }

    pub fn masses(&self) -> &[f32] {
        &self.masses
    }

    pub fn structures(&self) -> &StructureIndex {
        &self.structures
    }
}
