//! Format-dispatch registry: maps a file extension to a molecule and/or
//! trajectory backend, and runs each backend's preflight hook (spec §4.1).

mod descriptor;
mod preflight;
mod registry;

pub use descriptor::{BUILTIN_FORMATS, FormatDescriptor, descriptor_for_ext};
pub use preflight::{LammpsAtomFormat, LammpsAtomFormatSniff, NoOpPreflight, Preflight, PreflightOutcome};
pub use registry::FormatRegistry;
