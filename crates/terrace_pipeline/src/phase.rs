/// Where a job is in the generation pipeline.
/// A phase names the work still to be done: a job in `Sculpting` has been fragmented
/// and will be sculpted on its next step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    NotStarted,
    ShapeGeneration,
    Fragmentation,
    Sculpting,
    Terracing,
    /// Geometry is done and waits for the external mesh builder
    MeshCreation,
    Complete,
    /// Terminal; reachable from any phase
    Error,
}

impl Phase {
    /// Returns the name of the phase.
    pub fn name(&self) -> &'static str {
        match self {
            Phase::NotStarted => "not started",
            Phase::ShapeGeneration => "shape generation",
            Phase::Fragmentation => "fragmentation",
            Phase::Sculpting => "sculpting",
            Phase::Terracing => "terracing",
            Phase::MeshCreation => "mesh creation",
            Phase::Complete => "complete",
            Phase::Error => "error",
        }
    }

    /// The phase that follows this one; `None` for terminal phases
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::NotStarted => Some(Phase::ShapeGeneration),
            Phase::ShapeGeneration => Some(Phase::Fragmentation),
            Phase::Fragmentation => Some(Phase::Sculpting),
            Phase::Sculpting => Some(Phase::Terracing),
            Phase::Terracing => Some(Phase::MeshCreation),
            Phase::MeshCreation => Some(Phase::Complete),
            Phase::Complete | Phase::Error => None,
        }
    }

    /// Phases the core runs itself
    pub fn is_geometry(self) -> bool {
        matches!(
            self,
            Phase::ShapeGeneration | Phase::Fragmentation | Phase::Sculpting | Phase::Terracing
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Complete | Phase::Error)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
