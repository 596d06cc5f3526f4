//! Shared data types for the trajectory cache & access layer.
//!
//! Everything here is read-only from the point of view of the cache and
//! façade crates: a [`Molecule`] is produced once by a molecule backend and
//! then shared (via [`std::sync::Arc`], not a raw borrow) with every
//! trajectory opened against it. Rust's ownership model makes the spec's
//! "lifetime must strictly exceed any open trajectory" requirement automatic
//! once the molecule is behind an `Arc`: a trajectory holding a clone keeps
//! it alive for exactly as long as it needs it.

mod alloc;
mod cell;
mod frame;
mod mask;
mod molecule;

pub use alloc::Allocator;
pub use cell::UnitCell;
pub use frame::{FrameData, FrameHeader};
pub use mask::AtomMask;
pub use molecule::{Molecule, StructureIndex};
