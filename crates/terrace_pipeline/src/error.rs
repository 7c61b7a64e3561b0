use terrace_geometry::MeshError;
use thiserror::Error;

use crate::job::JobId;
use crate::phase::Phase;

/// Unrecoverable job failures. Everything recoverable is clamped or substituted
/// inside the geometry phases and never shows up here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TerrainError {
    #[error("{phase} could not reserve room for {requested} elements")]
    Allocation { phase: Phase, requested: usize },
    #[error("{phase} produced invalid geometry: {source}")]
    Invariant {
        phase: Phase,
        #[source]
        source: MeshError,
    },
    #[error("{phase} has no input geometry")]
    MissingBuffers { phase: Phase },
    #[error("no job with id {0}")]
    UnknownJob(JobId),
    #[error("job {id} is in {phase}, not ready for mesh creation")]
    NotReady { id: JobId, phase: Phase },
}
