use std::fmt;

/// An opaque handle to an open trajectory, issued by
/// [`crate::registry::OpenTrajectories`]. Backed by a monotonically
/// increasing counter rather than a pointer (spec §9: "Rearchitect as an
/// explicit registry ... with handle = opaque integer").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrajectoryHandle(pub(crate) u64);

impl fmt::Display for TrajectoryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trajectory#{}", self.0)
    }
}
