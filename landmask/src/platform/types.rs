//! Platform collaborator traits and shared types.

use std::fmt;
use std::future::Future;

use geojson::FeatureCollection;
use thiserror::Error;

use crate::expr::AssetId;
use crate::export::ExportJob;

/// Errors reported by platform collaborators.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PlatformError {
    /// Transport-level failure (connection, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(String),

    /// An input asset does not exist or is not accessible.
    #[error("cannot resolve input {asset}: {reason}")]
    InputResolution { asset: AssetId, reason: String },

    /// The platform refused an export submission.
    #[error("export {name} rejected (HTTP {status}): {reason}")]
    SubmissionRejected {
        name: String,
        status: u16,
        reason: String,
    },

    /// The platform answered with something we could not interpret.
    #[error("unexpected response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

/// Source of polygon feature collections.
pub trait FeatureSource: Send + Sync {
    /// Fetch every feature of a table asset.
    ///
    /// # Errors
    ///
    /// [`PlatformError::InputResolution`] when the asset is missing or not
    /// readable.
    fn list_features(
        &self,
        asset: &AssetId,
    ) -> impl Future<Output = Result<FeatureCollection, PlatformError>> + Send;
}

/// Sink for export submissions.
///
/// Submitting hands the job to the platform's scheduler and returns as soon
/// as the platform has accepted or refused it. Completion is never awaited.
pub trait ExportSubmitter: Send + Sync {
    /// Submit one export job.
    fn submit(
        &self,
        job: &ExportJob,
    ) -> impl Future<Output = Result<JobHandle, PlatformError>> + Send;
}

/// Handle of an accepted export job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    /// Export name the job was submitted under.
    pub name: String,

    /// Platform operation id, usable for opt-in status queries.
    pub operation: String,
}

impl JobHandle {
    pub fn new(name: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operation: operation.into(),
        }
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.operation)
    }
}

/// Platform-side state of an export job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Running,
    Succeeded,
    Failed(String),
    Cancelled,
    Unknown(String),
}

impl JobState {
    /// Map a platform state name.
    pub fn from_platform(state: &str) -> Self {
        match state {
            "PENDING" | "READY" => Self::Pending,
            "RUNNING" | "CANCELLING" => Self::Running,
            "SUCCEEDED" | "COMPLETED" => Self::Succeeded,
            "FAILED" => Self::Failed(String::new()),
            "CANCELLED" => Self::Cancelled,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Whether the job will not change state any more.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed(_) | Self::Cancelled)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed(msg) if msg.is_empty() => write!(f, "failed"),
            Self::Failed(msg) => write!(f, "failed: {}", msg),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Unknown(state) => write!(f, "unknown ({})", state),
        }
    }
}
