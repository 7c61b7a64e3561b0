//! Phase-by-phase orchestration of terraced terrain jobs.
//!
//! A [`GenerationJob`] walks a strict linear state machine
//! (`NotStarted -> ShapeGeneration -> Fragmentation -> Sculpting -> Terracing -> MeshCreation -> Complete`),
//! running exactly one geometry phase per step so frame-budgeted callers can spread the work out.

pub mod phase;
pub mod error;
pub mod job;
pub mod orchestrator;
pub mod batch;

pub use phase::Phase;
pub use error::TerrainError;
pub use job::{FinishedTerrain, GenerationJob, GenerationRequest, JobId, PhaseStats};
pub use orchestrator::{Orchestrator, TickOutcome};
pub use batch::advance_batch;
