use std::path::Path;

use serde::{Deserialize, Serialize};
use terrace_geometry::GenerationParameters;
use terrace_pipeline::GenerationRequest;

/// One terrain to generate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    #[serde(default)]
    pub request: GenerationRequest,
    #[serde(default)]
    pub parameters: GenerationParameters,
}

/// Demo settings, loaded from JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Orchestrator ticks per simulated frame
    pub ticks_per_frame: usize,
    /// Give up after this many frames
    pub max_frames: usize,
    pub jobs: Vec<JobConfig>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            ticks_per_frame: 1,
            max_frames: 1000,
            jobs: vec![
                JobConfig {
                    request: GenerationRequest::Deferred,
                    parameters: GenerationParameters::planar(),
                },
                JobConfig {
                    request: GenerationRequest::Deferred,
                    parameters: GenerationParameters::spherical(),
                },
            ],
        }
    }
}

impl DemoConfig {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let text = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&text)?;
        log::info!("Loaded demo config from {}", path.display());
        Ok(config)
    }
}
