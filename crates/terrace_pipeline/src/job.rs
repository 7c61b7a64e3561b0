use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use terrace_geometry::{
    fragment_with_report, sculpt, shape, terrace, FragmentReport, GenerationParameters,
    MeshBuffers, TerraceHeights, TerracedMesh, TRIANGLE_CEILING,
};

use crate::error::TerrainError;
use crate::phase::Phase;

/// Identifier handed out by the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub u64);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How the caller wants a job driven. The core phases ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationRequest {
    /// Run every phase back to back as soon as the job is submitted
    Synchronous,
    /// Advance one phase per orchestrator tick
    #[default]
    Deferred,
}

/// Timing and size of one executed phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseStats {
    pub phase: Phase,
    pub vertex_count: usize,
    pub triangle_count: usize,
    pub elapsed: Duration,
}

/// Geometry handed to the external mesh builder
#[derive(Debug, Clone, PartialEq)]
pub struct FinishedTerrain {
    pub id: JobId,
    /// Floor triangles first, then walls, split at `mesh.floor_triangle_count`
    pub mesh: TerracedMesh,
    pub fragment_report: Option<FragmentReport>,
}

/// One terrain request and the buffers of its most recent phase
#[derive(Debug, Clone)]
pub struct GenerationJob {
    id: JobId,
    params: GenerationParameters,
    request: GenerationRequest,
    terrace_heights: TerraceHeights,
    phase: Phase,
    buffers: Option<MeshBuffers>,
    floor_triangle_count: Option<usize>,
    fragment_report: Option<FragmentReport>,
    stats: Vec<PhaseStats>,
    error: Option<TerrainError>,
}

impl GenerationJob {
    /// Parameters are clamped here, once; terrace heights are fixed for the job's lifetime
    pub fn new(id: JobId, params: GenerationParameters, request: GenerationRequest) -> Self {
        let params = params.sanitized();
        let terrace_heights = params.terrace_heights();

        Self {
            id,
            params,
            request,
            terrace_heights,
            phase: Phase::NotStarted,
            buffers: None,
            floor_triangle_count: None,
            fragment_report: None,
            stats: Vec::new(),
            error: None,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn params(&self) -> &GenerationParameters {
        &self.params
    }

    pub fn request(&self) -> GenerationRequest {
        self.request
    }

    pub fn terrace_heights(&self) -> &TerraceHeights {
        &self.terrace_heights
    }

    pub fn current_phase(&self) -> Phase {
        self.phase
    }

    /// Geometry is finished and waiting to be taken
    pub fn is_ready(&self) -> bool {
        self.phase == Phase::MeshCreation
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    pub fn has_error(&self) -> bool {
        self.phase == Phase::Error
    }

    pub fn error(&self) -> Option<&TerrainError> {
        self.error.as_ref()
    }

    pub fn buffers(&self) -> Option<&MeshBuffers> {
        self.buffers.as_ref()
    }

    pub fn floor_triangle_count(&self) -> Option<usize> {
        self.floor_triangle_count
    }

    pub fn fragment_report(&self) -> Option<FragmentReport> {
        self.fragment_report
    }

    pub fn stats(&self) -> &[PhaseStats] {
        &self.stats
    }

    /// Move a fresh job into its first phase. Returns false if it was already started.
    pub fn start(&mut self) -> bool {
        if self.phase != Phase::NotStarted {
            return false;
        }
        self.phase = Phase::ShapeGeneration;
        log::debug!("Job {} initialized", self.id);
        true
    }

    /// Perform exactly one transition.
    ///
    /// # Returns
    /// The new phase, `None` if the job has no work left for the core,
    /// or the error that moved the job into [`Phase::Error`]
    pub fn advance(&mut self) -> Result<Option<Phase>, TerrainError> {
        let phase = self.phase;
        if self.start() {
            return Ok(Some(self.phase));
        }
        if !phase.is_geometry() {
            return Ok(None);
        }

        let started = Instant::now();
        if let Err(error) = self.run_phase(phase) {
            log::error!("Job {} failed during {}: {}", self.id, phase, error);
            self.fail(error.clone());
            return Err(error);
        }

        let elapsed = started.elapsed();
        let (vertex_count, triangle_count) = self
            .buffers
            .as_ref()
            .map(|b| (b.vertex_count(), b.triangle_count()))
            .unwrap_or_default();
        self.stats.push(PhaseStats {
            phase,
            vertex_count,
            triangle_count,
            elapsed,
        });

        let next = phase.next().unwrap_or(Phase::Error);
        log::info!(
            "Job {} finished {} in {:.2?} ({} vertices, {} triangles) -> {}",
            self.id,
            phase,
            elapsed,
            vertex_count,
            triangle_count,
            next
        );
        self.phase = next;
        Ok(Some(next))
    }

    fn run_phase(&mut self, phase: Phase) -> Result<(), TerrainError> {
        let buffers = match phase {
            Phase::ShapeGeneration => shape::generate(&self.params),
            Phase::Fragmentation => {
                let input = self.take_buffers(phase)?;
                let projected =
                    projected_fragment_vertices(input.triangle_count(), self.params.depth);
                reserve_probe::<[f32; 3]>(phase, projected)?;

                let (mesh, report) =
                    fragment_with_report(input, self.params.depth, self.params.kind);
                self.fragment_report = Some(report);
                mesh
            }
            Phase::Sculpting => {
                let input = self.take_buffers(phase)?;
                sculpt(input, &self.params)
            }
            Phase::Terracing => {
                let input = self.take_buffers(phase)?;
                let projected =
                    projected_terrace_indices(input.triangle_count(), self.terrace_heights.len());
                reserve_probe::<u32>(phase, projected)?;

                let terraced = terrace(input, &self.terrace_heights, &self.params);
                self.floor_triangle_count = Some(terraced.floor_triangle_count);
                terraced.buffers
            }
            _ => return Ok(()),
        };

        buffers
            .validate()
            .map_err(|source| TerrainError::Invariant { phase, source })?;
        self.buffers = Some(buffers);
        Ok(())
    }

    fn take_buffers(&mut self, phase: Phase) -> Result<MeshBuffers, TerrainError> {
        self.buffers
            .take()
            .ok_or(TerrainError::MissingBuffers { phase })
    }

    fn fail(&mut self, error: TerrainError) {
        self.buffers = None;
        self.floor_triangle_count = None;
        self.error = Some(error);
        self.phase = Phase::Error;
    }

    /// Hand the finished geometry over and mark the job complete
    pub fn take_finished(&mut self) -> Result<FinishedTerrain, TerrainError> {
        if self.phase != Phase::MeshCreation {
            return Err(TerrainError::NotReady {
                id: self.id,
                phase: self.phase,
            });
        }

        let buffers = self.take_buffers(Phase::MeshCreation)?;
        let floor_triangle_count = self
            .floor_triangle_count
            .take()
            .unwrap_or_else(|| buffers.triangle_count());
        self.phase = Phase::Complete;
        log::info!("Job {} handed off for mesh creation", self.id);

        Ok(FinishedTerrain {
            id: self.id,
            mesh: TerracedMesh {
                buffers,
                floor_triangle_count,
            },
            fragment_report: self.fragment_report,
        })
    }
}

/// Upper bound on fragmenter output vertices
fn projected_fragment_vertices(triangles: usize, depth: u32) -> usize {
    let growth = 4usize.saturating_pow(depth.saturating_sub(1));
    let projected = triangles.saturating_mul(growth);
    projected.min(TRIANGLE_CEILING.max(triangles)).saturating_mul(3)
}

/// Upper bound on terracer output indices: every plane can add a floor quad and a wall quad
fn projected_terrace_indices(triangles: usize, planes: usize) -> usize {
    triangles.saturating_mul(3 + 12 * planes)
}

/// Check that `requested` elements of `T` can be allocated before a phase builds them
fn reserve_probe<T>(phase: Phase, requested: usize) -> Result<(), TerrainError> {
    let mut probe: Vec<T> = Vec::new();
    probe
        .try_reserve_exact(requested)
        .map_err(|_| TerrainError::Allocation { phase, requested })
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrace_geometry::TerrainKind;

    fn run_to_ready(job: &mut GenerationJob) {
        while !job.is_ready() {
            job.advance().unwrap();
        }
    }

    #[test]
    fn test_phase_sequence() {
        let mut job = GenerationJob::new(
            JobId(1),
            GenerationParameters::planar(),
            GenerationRequest::Deferred,
        );
        assert_eq!(job.current_phase(), Phase::NotStarted);

        let mut phases = vec![job.current_phase()];
        while let Some(phase) = job.advance().unwrap() {
            phases.push(phase);
        }

        assert_eq!(
            phases,
            vec![
                Phase::NotStarted,
                Phase::ShapeGeneration,
                Phase::Fragmentation,
                Phase::Sculpting,
                Phase::Terracing,
                Phase::MeshCreation,
            ]
        );
        assert!(job.is_ready());
        assert!(!job.is_complete());
        assert_eq!(job.stats().len(), 4);
    }

    #[test]
    fn test_take_finished() {
        let mut job = GenerationJob::new(
            JobId(2),
            GenerationParameters::spherical(),
            GenerationRequest::Synchronous,
        );
        assert!(matches!(
            job.take_finished(),
            Err(TerrainError::NotReady { phase: Phase::NotStarted, .. })
        ));

        run_to_ready(&mut job);
        let finished = job.take_finished().unwrap();

        assert!(job.is_complete());
        assert!(job.buffers().is_none());
        assert_eq!(finished.id, JobId(2));
        assert!(finished.mesh.floor_triangle_count <= finished.mesh.buffers.triangle_count());
        assert!(finished.fragment_report.is_some());
        assert!(finished.mesh.buffers.validate().is_ok());

        // Second hand-off is refused
        assert!(job.take_finished().is_err());
    }

    #[test]
    fn test_parameters_clamped_on_creation() {
        let params = GenerationParameters {
            depth: 40,
            sides: 0,
            ..GenerationParameters::planar()
        };
        let job = GenerationJob::new(JobId(3), params, GenerationRequest::Deferred);
        assert_eq!(job.params().depth, 6);
        assert_eq!(job.params().sides, 3);
    }

    #[test]
    fn test_missing_buffers_is_an_error() {
        let mut job = GenerationJob::new(
            JobId(4),
            GenerationParameters::planar(),
            GenerationRequest::Deferred,
        );
        job.advance().unwrap();
        job.advance().unwrap();
        assert_eq!(job.current_phase(), Phase::Fragmentation);

        job.buffers = None;
        let error = job.advance().unwrap_err();

        assert_eq!(error, TerrainError::MissingBuffers { phase: Phase::Fragmentation });
        assert!(job.has_error());
        assert_eq!(job.error(), Some(&error));
        // Error is terminal
        assert_eq!(job.advance(), Ok(None));
        assert_eq!(job.current_phase(), Phase::Error);
    }

    #[test]
    fn test_invalid_geometry_is_an_error() {
        let mut job = GenerationJob::new(
            JobId(5),
            GenerationParameters::planar(),
            GenerationRequest::Deferred,
        );
        job.advance().unwrap();
        job.advance().unwrap();
        job.advance().unwrap();
        assert_eq!(job.current_phase(), Phase::Sculpting);

        if let Some(buffers) = job.buffers.as_mut() {
            buffers.indices.push(0);
        }
        let error = job.advance().unwrap_err();
        assert!(matches!(error, TerrainError::Invariant { phase: Phase::Sculpting, .. }));
        assert!(job.buffers().is_none());
    }

    #[test]
    fn test_fragment_report_recorded() {
        let params = GenerationParameters {
            kind: TerrainKind::Planar,
            sides: 10,
            depth: 6,
            ..GenerationParameters::planar()
        };
        let mut job = GenerationJob::new(JobId(6), params, GenerationRequest::Deferred);
        run_to_ready(&mut job);

        let report = job.fragment_report().unwrap();
        // 8 * 4^5 = 8192, under the ceiling
        assert_eq!(report.triangle_count, 8192);
        assert!(!report.truncated);
        assert!(!job.has_error());
    }

    #[test]
    fn test_projections() {
        assert_eq!(projected_fragment_vertices(4, 1), 12);
        assert_eq!(projected_fragment_vertices(4, 3), 4 * 16 * 3);
        assert_eq!(projected_fragment_vertices(20, 7), TRIANGLE_CEILING * 3);
        assert_eq!(projected_terrace_indices(10, 0), 30);
    }

    #[test]
    fn test_reserve_probe() {
        assert_eq!(reserve_probe::<u32>(Phase::Terracing, 1024), Ok(()));
        // 12-byte positions overflow the address space at this count
        let count = isize::MAX as usize / 8;
        assert!(matches!(
            reserve_probe::<[f32; 3]>(Phase::Fragmentation, count),
            Err(TerrainError::Allocation { phase: Phase::Fragmentation, requested }) if requested == count
        ));
        assert_eq!(
            reserve_probe::<u32>(Phase::Terracing, usize::MAX),
            Err(TerrainError::Allocation { phase: Phase::Terracing, requested: usize::MAX })
        );
    }
}
