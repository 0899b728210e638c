//! Per-job submission outcomes.

use crate::platform::{JobHandle, PlatformError};

/// Result of submitting one export job.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionOutcome {
    /// Export name.
    pub name: String,

    /// Handle on acceptance, the platform's refusal otherwise.
    pub result: Result<JobHandle, PlatformError>,
}

impl SubmissionOutcome {
    pub fn is_submitted(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcomes of one fan-out, in plan order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionReport {
    pub outcomes: Vec<SubmissionOutcome>,
}

impl SubmissionReport {
    /// Number of accepted submissions.
    pub fn submitted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_submitted()).count()
    }

    /// Number of refused submissions.
    pub fn rejected(&self) -> usize {
        self.outcomes.len() - self.submitted()
    }

    /// Whether every planned job was accepted.
    ///
    /// An empty plan counts as a success.
    pub fn is_complete_success(&self) -> bool {
        self.rejected() == 0
    }

    /// Handles of the accepted jobs.
    pub fn handles(&self) -> impl Iterator<Item = &JobHandle> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    /// Names and errors of the refused jobs.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &PlatformError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.name.as_str(), e)))
    }
}
