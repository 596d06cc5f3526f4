use std::path::Path;

/// LAMMPS `Atoms` section styles this build can recognize by sniffing the
/// data file header, per spec §4.1's LAMMPS preflight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LammpsAtomFormat {
    Atomic,
    Full,
    Molecular,
    Charge,
}

impl LammpsAtomFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LammpsAtomFormat::Atomic => "atomic",
            LammpsAtomFormat::Full => "full",
            LammpsAtomFormat::Molecular => "molecular",
            LammpsAtomFormat::Charge => "charge",
        }
    }
}

/// Result of running a backend's preflight hook over a candidate file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreflightOutcome {
    /// Nothing to sniff; proceed straight to `create`.
    NoOp,
    /// Atom format was sniffed; encode it into the loader-state argument
    /// blob (spec supplement: surfaced rather than only consumed opaquely).
    LammpsAtomFormat(LammpsAtomFormat),
    /// Could not determine enough to proceed silently; the UI must ask the
    /// user to disambiguate before commit.
    RequiresDialogue,
}

/// A per-backend preflight hook (spec §4.1).
pub trait Preflight: Send + Sync {
    fn run(&self, path: &Path) -> PreflightOutcome;
}

/// Sniffs a LAMMPS `data` file's `Atoms` section comment (e.g. `Atoms # full`)
/// for a recognized atom-style keyword. Only reads the file's header lines;
/// full LAMMPS parsing is out of scope (spec §1).
pub struct LammpsAtomFormatSniff {
    max_lines: usize,
}

impl Default for LammpsAtomFormatSniff {
    fn default() -> Self {
        Self { max_lines: 128 }
    }
}

impl Preflight for LammpsAtomFormatSniff {
    fn run(&self, path: &Path) -> PreflightOutcome {
        let Ok(contents) = std::fs::read_to_string(path) else {
            return PreflightOutcome::RequiresDialogue;
        };
        for line in contents.lines().take(self.max_lines) {
            let lower = line.to_ascii_lowercase();
            if !lower.trim_start().starts_with("atoms") {
                continue;
            }
            if lower.contains("full") {
                return PreflightOutcome::LammpsAtomFormat(LammpsAtomFormat::Full);
            }
            if lower.contains("molecular") {
                return PreflightOutcome::LammpsAtomFormat(LammpsAtomFormat::Molecular);
            }
            if lower.contains("charge") {
                return PreflightOutcome::LammpsAtomFormat(LammpsAtomFormat::Charge);
            }
            if lower.contains("atomic") {
                return PreflightOutcome::LammpsAtomFormat(LammpsAtomFormat::Atomic);
            }
        }
        PreflightOutcome::RequiresDialogue
    }
}

/// A backend with nothing to sniff (every non-LAMMPS molecule/trajectory
/// backend per spec §4.1: "Others: no-op").
pub struct NoOpPreflight;

impl Preflight for NoOpPreflight {
    fn run(&self, _path: &Path) -> PreflightOutcome {
        PreflightOutcome::NoOp
    }
}
