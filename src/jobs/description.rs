use serde_json::Value;
use std::path::{Path, PathBuf};

/// Where the network to construct comes from. Exactly one source per job.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkSource {
    /// File persisted in the caller's folder
    Filepath(PathBuf),
    /// Network object embedded in the request body
    Inline(Value),
}

/// Normalized, validated request ready for dispatch.
///
/// Consumed by [`dispatch`](crate::jobs::dispatch), which stamps it with the
/// submission timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct JobDescription {
    pub threshold: f64,
    pub calibration: bool,
    pub directed: bool,
    pub source: NetworkSource,
}

impl JobDescription {
    pub fn filepath(&self) -> Option<&Path> {
        match &self.source {
            NetworkSource::Filepath(path) => Some(path),
            NetworkSource::Inline(_) => None,
        }
    }

    pub fn inline_network(&self) -> Option<&Value> {
        match &self.source {
            NetworkSource::Inline(network) => Some(network),
            NetworkSource::Filepath(_) => None,
        }
    }
}
