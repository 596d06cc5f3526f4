//! Trajectory façade (spec §4.4) and the open-trajectories registry that
//! keys its instances by opaque handle (spec §4.6).

mod error;
mod facade;
mod handle;
mod registry;

pub use error::FacadeError;
pub use facade::TrajectoryFacade;
pub use handle::TrajectoryHandle;
pub use registry::{CAPACITY, OpenTrajectories};
