use std::collections::BTreeMap;

use terrace_geometry::GenerationParameters;

use crate::error::TerrainError;
use crate::job::{FinishedTerrain, GenerationJob, GenerationRequest, JobId};
use crate::phase::Phase;

/// What a single [`Orchestrator::tick`] did
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Fresh jobs were moved into their first phase
    Initialized(Vec<JobId>),
    /// One job ran one phase and is now in `phase`
    Advanced { id: JobId, phase: Phase },
    /// One job failed and is now in [`Phase::Error`]
    Failed { id: JobId, error: TerrainError },
    /// Nothing had pending core work
    Idle,
}

/// Drives terrain jobs through their phases, at most one transition per tick.
///
/// Jobs are advanced oldest first. A failing job is parked in [`Phase::Error`]
/// and never retried; resubmit a fresh job instead.
#[derive(Debug, Default)]
pub struct Orchestrator {
    jobs: BTreeMap<JobId, GenerationJob>,
    next_id: u64,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a new job; it is initialized on the next tick
    pub fn submit(&mut self, params: GenerationParameters, request: GenerationRequest) -> JobId {
        self.next_id += 1;
        let id = JobId(self.next_id);
        self.jobs.insert(id, GenerationJob::new(id, params, request));
        log::info!("Job {} submitted ({:?}, {:?})", id, self.jobs[&id].params().kind, request);
        id
    }

    pub fn job(&self, id: JobId) -> Option<&GenerationJob> {
        self.jobs.get(&id)
    }

    pub fn jobs(&self) -> impl Iterator<Item = &GenerationJob> {
        self.jobs.values()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn current_phase(&self, id: JobId) -> Option<Phase> {
        self.job(id).map(GenerationJob::current_phase)
    }

    pub fn is_complete(&self, id: JobId) -> bool {
        self.job(id).is_some_and(GenerationJob::is_complete)
    }

    pub fn has_error(&self, id: JobId) -> bool {
        self.job(id).is_some_and(GenerationJob::has_error)
    }

    /// Jobs waiting for the external mesh builder
    pub fn ready_jobs(&self) -> Vec<JobId> {
        self.jobs
            .values()
            .filter(|job| job.is_ready())
            .map(GenerationJob::id)
            .collect()
    }

    /// True while any job still has core work to do
    pub fn has_pending_work(&self) -> bool {
        self.jobs
            .values()
            .any(|job| job.current_phase() == Phase::NotStarted || job.current_phase().is_geometry())
    }

    /// Initialize every fresh job, or else advance exactly one job by one phase
    pub fn tick(&mut self) -> TickOutcome {
        let initialized: Vec<JobId> = self
            .jobs
            .values_mut()
            .filter_map(|job| job.start().then(|| job.id()))
            .collect();
        if !initialized.is_empty() {
            return TickOutcome::Initialized(initialized);
        }

        let Some(job) = self
            .jobs
            .values_mut()
            .find(|job| job.current_phase().is_geometry())
        else {
            return TickOutcome::Idle;
        };

        let id = job.id();
        match job.advance() {
            Ok(Some(phase)) => TickOutcome::Advanced { id, phase },
            Ok(None) => TickOutcome::Idle,
            Err(error) => TickOutcome::Failed { id, error },
        }
    }

    /// Advance one job until its geometry is ready, what a caller does for
    /// [`GenerationRequest::Synchronous`]
    pub fn run_until_ready(&mut self, id: JobId) -> Result<&GenerationJob, TerrainError> {
        let job = self.jobs.get_mut(&id).ok_or(TerrainError::UnknownJob(id))?;

        loop {
            match job.current_phase() {
                Phase::MeshCreation | Phase::Complete => return Ok(job),
                Phase::Error => {
                    return Err(job
                        .error()
                        .cloned()
                        .unwrap_or(TerrainError::NotReady { id, phase: Phase::Error }))
                }
                _ => {
                    job.advance()?;
                }
            }
        }
    }

    /// Transfer a finished job's geometry to the caller and mark it complete
    pub fn take_mesh(&mut self, id: JobId) -> Result<FinishedTerrain, TerrainError> {
        self.jobs
            .get_mut(&id)
            .ok_or(TerrainError::UnknownJob(id))?
            .take_finished()
    }

    /// Drop a job at whatever phase it is in, releasing its buffers
    pub fn discard(&mut self, id: JobId) -> Option<GenerationJob> {
        let job = self.jobs.remove(&id);
        if let Some(job) = &job {
            log::info!("Job {} discarded during {}", id, job.current_phase());
        }
        job
    }

    /// Forget complete and failed jobs. Returns how many were removed.
    pub fn remove_finished(&mut self) -> usize {
        let before = self.jobs.len();
        self.jobs.retain(|_, job| !job.current_phase().is_terminal());
        before - self.jobs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_transition_per_tick() {
        let mut orchestrator = Orchestrator::new();
        let first = orchestrator.submit(GenerationParameters::planar(), GenerationRequest::Deferred);
        let second =
            orchestrator.submit(GenerationParameters::spherical(), GenerationRequest::Deferred);

        assert_eq!(orchestrator.tick(), TickOutcome::Initialized(vec![first, second]));
        let ids: Vec<JobId> = orchestrator.jobs().map(GenerationJob::id).collect();
        assert_eq!(ids, vec![first, second]);
        assert_eq!(orchestrator.current_phase(first), Some(Phase::ShapeGeneration));
        assert_eq!(orchestrator.current_phase(second), Some(Phase::ShapeGeneration));

        assert_eq!(
            orchestrator.tick(),
            TickOutcome::Advanced { id: first, phase: Phase::Fragmentation }
        );
        // The second job did not move
        assert_eq!(orchestrator.current_phase(second), Some(Phase::ShapeGeneration));
    }

    #[test]
    fn test_jobs_finish_in_order() {
        let mut orchestrator = Orchestrator::new();
        let first = orchestrator.submit(GenerationParameters::planar(), GenerationRequest::Deferred);
        let second = orchestrator.submit(GenerationParameters::planar(), GenerationRequest::Deferred);

        let mut ticks = 0;
        while orchestrator.has_pending_work() {
            orchestrator.tick();
            ticks += 1;
        }

        // One initialization tick plus four geometry phases per job
        assert_eq!(ticks, 1 + 4 * 2);
        assert_eq!(orchestrator.ready_jobs(), vec![first, second]);
        assert_eq!(orchestrator.tick(), TickOutcome::Idle);
    }

    #[test]
    fn test_take_mesh_completes_job() {
        let mut orchestrator = Orchestrator::new();
        let id = orchestrator.submit(GenerationParameters::spherical(), GenerationRequest::Synchronous);

        let job = orchestrator.run_until_ready(id).unwrap();
        assert_eq!(job.request(), GenerationRequest::Synchronous);
        let finished = orchestrator.take_mesh(id).unwrap();

        assert!(orchestrator.is_complete(id));
        assert!(!orchestrator.has_error(id));
        assert!(finished.mesh.buffers.vertex_count() > 0);
        assert_eq!(orchestrator.remove_finished(), 1);
        assert!(orchestrator.is_empty());
    }

    #[test]
    fn test_unknown_job() {
        let mut orchestrator = Orchestrator::new();
        assert_eq!(
            orchestrator.take_mesh(JobId(42)),
            Err(TerrainError::UnknownJob(JobId(42)))
        );
        assert!(orchestrator.run_until_ready(JobId(42)).is_err());
        assert!(orchestrator.discard(JobId(42)).is_none());
    }

    #[test]
    fn test_take_mesh_before_ready() {
        let mut orchestrator = Orchestrator::new();
        let id = orchestrator.submit(GenerationParameters::planar(), GenerationRequest::Deferred);
        orchestrator.tick();

        assert_eq!(
            orchestrator.take_mesh(id),
            Err(TerrainError::NotReady { id, phase: Phase::ShapeGeneration })
        );
    }

    #[test]
    fn test_discard_mid_pipeline() {
        let mut orchestrator = Orchestrator::new();
        let id = orchestrator.submit(GenerationParameters::planar(), GenerationRequest::Deferred);
        orchestrator.tick();
        orchestrator.tick();

        let job = orchestrator.discard(id).unwrap();
        assert_eq!(job.current_phase(), Phase::Fragmentation);
        assert!(job.buffers().is_some());
        assert_eq!(orchestrator.tick(), TickOutcome::Idle);
    }
}
