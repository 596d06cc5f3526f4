use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tcal_backend::{MoleculeBackend, TrajectoryBackendFactory};

use crate::descriptor::{BUILTIN_FORMATS, descriptor_for_ext};
use crate::preflight::{Preflight, PreflightOutcome};

/// Maps a file extension to a molecule and/or trajectory backend, and holds
/// each registered backend's preflight hook (spec §4.1).
///
/// The extension table (names, capability flags) is fixed at compile time;
/// the concrete backend implementations behind each format name are
/// supplied by the host application via [`FormatRegistry::register_molecule`]
/// / [`FormatRegistry::register_trajectory`], since per-format parsers are
/// external collaborators this crate never implements (spec §1).
#[derive(Default)]
pub struct FormatRegistry {
    molecule_backends: HashMap<&'static str, Arc<dyn MoleculeBackend>>,
    trajectory_backends: HashMap<&'static str, Arc<dyn TrajectoryBackendFactory>>,
    preflights: HashMap<&'static str, Arc<dyn Preflight>>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_molecule(&mut self, format_name: &'static str, backend: Arc<dyn MoleculeBackend>) {
        self.molecule_backends.insert(format_name, backend);
    }

    pub fn register_trajectory(
        &mut self,
        format_name: &'static str,
        factory: Arc<dyn TrajectoryBackendFactory>,
    ) {
        self.trajectory_backends.insert(format_name, factory);
    }

    pub fn register_preflight(&mut self, format_name: &'static str, preflight: Arc<dyn Preflight>) {
        self.preflights.insert(format_name, preflight);
    }

    pub fn loader_count(&self) -> usize {
        BUILTIN_FORMATS.len()
    }

    pub fn loader_names(&self) -> Vec<&'static str> {
        BUILTIN_FORMATS.iter().map(|d| d.name).collect()
    }

    pub fn loader_extensions(&self) -> Vec<&'static str> {
        BUILTIN_FORMATS.iter().map(|d| d.extensions).collect()
    }

    pub fn mol_loader_from_ext(&self, ext: &str) -> Option<Arc<dyn MoleculeBackend>> {
        let descriptor = descriptor_for_ext(ext)?;
        if !descriptor.molecule_capable {
            return None;
        }
        self.molecule_backends.get(descriptor.name).cloned()
    }

    pub fn traj_loader_from_ext(&self, ext: &str) -> Option<Arc<dyn TrajectoryBackendFactory>> {
        let descriptor = descriptor_for_ext(ext)?;
        if !descriptor.trajectory_capable {
            return None;
        }
        self.trajectory_backends.get(descriptor.name).cloned()
    }

    /// Runs the preflight hook registered for `ext`'s format, if any, over
    /// `path`. Formats with no registered hook behave as the spec's "no-op"
    /// backends.
    pub fn preflight(&self, ext: &str, path: &Path) -> PreflightOutcome {
        let Some(descriptor) = descriptor_for_ext(ext) else {
            return PreflightOutcome::NoOp;
        };
        match self.preflights.get(descriptor.name) {
            Some(hook) => hook.run(path),
            None => PreflightOutcome::NoOp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preflight::{LammpsAtomFormat, LammpsAtomFormatSniff};
    use std::io::Write;
    use tcal_backend::{BackendError, MemoryBackend};
    use tcal_model::Allocator;

    #[test]
    fn unregistered_format_returns_none_even_when_capable() {
        let registry = FormatRegistry::new();
        assert!(registry.mol_loader_from_ext("pdb").is_none());
        assert!(registry.traj_loader_from_ext("xtc").is_none());
    }

    #[test]
    fn registered_backend_is_returned_for_every_alias() {
        let mut registry = FormatRegistry::new();
        let (mol, traj) = MemoryBackend::matched_pair(10, 4, tcal_model::UnitCell::none());
        registry.register_molecule("XYZ", Arc::new(mol));
        registry.register_trajectory("XYZ", Arc::new(traj));

        assert!(registry.mol_loader_from_ext("xyz").is_some());
        assert!(registry.mol_loader_from_ext("xmol").is_some());
        assert!(registry.mol_loader_from_ext("arc").is_some());
        assert!(registry.traj_loader_from_ext("XYZ").is_some());
    }

    #[test]
    fn capability_mismatch_returns_none() {
        let mut registry = FormatRegistry::new();
        let (mol, _traj) = MemoryBackend::matched_pair(10, 4, tcal_model::UnitCell::none());
        registry.register_molecule("GRO", Arc::new(mol));
        // GRO is not trajectory-capable even though a molecule backend is registered.
        assert!(registry.traj_loader_from_ext("gro").is_none());
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let registry = FormatRegistry::new();
        assert!(registry.mol_loader_from_ext("docx").is_none());
        assert!(registry.traj_loader_from_ext("docx").is_none());
    }

    #[test]
    fn loader_enumeration_matches_builtin_table_size() {
        let registry = FormatRegistry::new();
        assert_eq!(registry.loader_count(), BUILTIN_FORMATS.len());
        assert_eq!(registry.loader_names().len(), registry.loader_count());
        assert_eq!(registry.loader_extensions().len(), registry.loader_count());
    }

    #[test]
    fn lammps_preflight_runs_through_registry() {
        let mut registry = FormatRegistry::new();
        registry.register_preflight("LAMMPS Data", Arc::new(LammpsAtomFormatSniff::default()));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Atoms # charge\n").unwrap();
        let outcome = registry.preflight("data", file.path());
        assert_eq!(
            outcome,
            PreflightOutcome::LammpsAtomFormat(LammpsAtomFormat::Charge)
        );
    }

    #[test]
    fn unhooked_format_preflight_is_noop() {
        let registry = FormatRegistry::new();
        let outcome = registry.preflight("pdb", Path::new("whatever.pdb"));
        assert_eq!(outcome, PreflightOutcome::NoOp);
    }

    #[test]
    fn memory_backend_satisfies_trait_object_dispatch() {
        // Sanity: the deterministic test backend really does implement the
        // traits the registry stores as trait objects.
        let mut registry = FormatRegistry::new();
        let (mol, traj) = MemoryBackend::matched_pair(5, 2, tcal_model::UnitCell::none());
        registry.register_molecule("PDB", Arc::new(mol));
        registry.register_trajectory("PDB", Arc::new(traj));
        let alloc = Allocator::default();
        let mol_backend = registry.mol_loader_from_ext("pdb").unwrap();
        let molecule = mol_backend.create(Path::new("x.pdb"), &alloc).unwrap();
        assert_eq!(molecule.atom_count(), 2);

        let traj_factory = registry.traj_loader_from_ext("pdb").unwrap();
        let handle = traj_factory.create(Path::new("x.pdb"), &alloc).unwrap();
        assert_eq!(handle.num_frames(), 5);
        let _: Result<_, BackendError> = Ok(());
    }
}
