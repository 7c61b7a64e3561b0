use rayon::prelude::*;

use crate::error::TerrainError;
use crate::job::GenerationJob;
use crate::phase::Phase;

/// Advance every job by exactly one phase, in parallel.
///
/// Jobs share nothing but their own read-only parameters, so each one runs on
/// whichever worker picks it up. Results are returned in input order.
pub fn advance_batch(jobs: &mut [GenerationJob]) -> Vec<Result<Option<Phase>, TerrainError>> {
    jobs.par_iter_mut().map(GenerationJob::advance).collect()
}
