//! Export fan-out
//!
//! Binds the workflow inputs, optionally presents them on a map, then
//! submits one export job per (area, year) pair.
//!
//! ```text
//!   FeatureSource ──► Workflow::bind ──► BoundInputs
//!                                            │
//!                        MapDisplay ◄── present (optional)
//!                                            │
//!                                       plan_exports
//!                                            │
//!              ExportSubmitter ◄── submit, one call per job, plan order
//!                                            │
//!                                    SubmissionReport
//! ```
//!
//! Submission is fire-and-forget: each call returns once the platform has
//! accepted or refused the job. A refused job is recorded and the fan-out
//! moves on. Nothing is retried.

mod report;
mod workflow;

pub use report::{SubmissionOutcome, SubmissionReport};
pub use workflow::{BoundInputs, InputSpec, Workflow, WorkflowError};

use tracing::{debug, info, warn};

use crate::display::{present, MapDisplay};
use crate::export::{plan_exports, ExportJob, ExportParams};
use crate::platform::ExportSubmitter;

/// Submits planned export jobs.
pub struct ExportDriver<S> {
    submitter: S,
    params: ExportParams,
}

impl<S: ExportSubmitter> ExportDriver<S> {
    pub fn new(submitter: S, params: ExportParams) -> Self {
        Self { submitter, params }
    }

    /// The underlying submitter.
    pub fn submitter(&self) -> &S {
        &self.submitter
    }

    pub fn params(&self) -> &ExportParams {
        &self.params
    }

    /// Export jobs for the bound inputs, areas outer, years inner.
    pub fn plan(&self, inputs: &BoundInputs) -> Vec<ExportJob> {
        plan_exports(&inputs.aois, &inputs.catalog, &inputs.mask, &self.params)
    }

    /// Submit every job once, in order.
    pub async fn submit_all(&self, jobs: &[ExportJob]) -> SubmissionReport {
        self.submit_each(jobs, |_| {}).await
    }

    /// Like [`submit_all`](Self::submit_all), calling `on_outcome` after
    /// each submission returns.
    pub async fn submit_each<F>(&self, jobs: &[ExportJob], mut on_outcome: F) -> SubmissionReport
    where
        F: FnMut(&SubmissionOutcome),
    {
        let mut outcomes = Vec::with_capacity(jobs.len());

        for job in jobs {
            let result = self.submitter.submit(job).await;
            match &result {
                Ok(handle) => {
                    debug!(job = %job.name, operation = %handle.operation, "Export submitted")
                }
                Err(e) => warn!(job = %job.name, error = %e, "Export submission failed"),
            }

            let outcome = SubmissionOutcome {
                name: job.name.clone(),
                result,
            };
            on_outcome(&outcome);
            outcomes.push(outcome);
        }

        let report = SubmissionReport { outcomes };
        info!(
            submitted = report.submitted(),
            rejected = report.rejected(),
            "Export fan-out finished"
        );
        report
    }

    /// Present (when a display is given), plan and submit.
    pub async fn run(
        &self,
        inputs: &BoundInputs,
        display: Option<&mut dyn MapDisplay>,
    ) -> SubmissionReport {
        if let Some(display) = display {
            present(display, &inputs.aois, &inputs.mask);
        }

        let jobs = self.plan(inputs);
        info!(jobs = jobs.len(), "Submitting exports");
        self.submit_all(&jobs).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aoi::AoiCollection;
    use crate::display::RecordingDisplay;
    use crate::platform::{PlatformError, RecordingSubmitter};

    fn inputs() -> BoundInputs {
        let aois = AoiCollection::from_geojson_str(
            "test/polygons",
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{"Area":1},
                 "geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,1],[0,0]]]}},
                {"type":"Feature","properties":{"Area":2},
                 "geometry":{"type":"Polygon","coordinates":[[[2,2],[3,2],[3,3],[2,3],[2,2]]]}}
            ]}"#,
        )
        .unwrap();
        BoundInputs::with_defaults(aois)
    }

    #[tokio::test]
    async fn test_run_submits_every_pair_once() {
        let driver = ExportDriver::new(RecordingSubmitter::new(), ExportParams::default());
        let report = driver.run(&inputs(), None).await;

        assert_eq!(report.submitted(), 12);
        assert!(report.is_complete_success());

        let names: Vec<_> = driver
            .submitter()
            .submitted()
            .into_iter()
            .map(|job| job.name)
            .collect();
        assert_eq!(names.first().map(String::as_str), Some("NDFI_Masked_2013_1"));
        assert_eq!(names.get(6).map(String::as_str), Some("NDFI_Masked_2013_2"));
        assert_eq!(names.last().map(String::as_str), Some("NDFI_Masked_2023_2"));
    }

    #[tokio::test]
    async fn test_rejection_does_not_stop_fan_out() {
        let submitter = RecordingSubmitter::rejecting(["NDFI_Masked_2017_1"]);
        let driver = ExportDriver::new(submitter, ExportParams::default());
        let report = driver.run(&inputs(), None).await;

        assert_eq!(report.outcomes.len(), 12);
        assert_eq!(report.submitted(), 11);
        assert_eq!(report.rejected(), 1);
        assert!(matches!(
            report.outcomes[2].result,
            Err(PlatformError::SubmissionRejected { .. })
        ));
        assert_eq!(driver.submitter().count(), 11);
    }

    #[tokio::test]
    async fn test_display_does_not_change_jobs() {
        let with_display = ExportDriver::new(RecordingSubmitter::new(), ExportParams::default());
        let mut display = RecordingDisplay::new();
        with_display.run(&inputs(), Some(&mut display)).await;

        let without = ExportDriver::new(RecordingSubmitter::new(), ExportParams::default());
        without.run(&inputs(), None).await;

        assert_eq!(display.layers.len(), 2);
        assert!(display.center.is_some());
        assert_eq!(
            with_display.submitter().submitted(),
            without.submitter().submitted()
        );
    }

    #[tokio::test]
    async fn test_submit_each_reports_progress() {
        let driver = ExportDriver::new(RecordingSubmitter::new(), ExportParams::default());
        let jobs = driver.plan(&inputs());

        let mut seen = Vec::new();
        driver
            .submit_each(&jobs, |outcome| seen.push(outcome.name.clone()))
            .await;

        let planned: Vec<_> = jobs.iter().map(|j| j.name.clone()).collect();
        assert_eq!(seen, planned);
    }

    #[tokio::test]
    async fn test_empty_plan() {
        let aois = AoiCollection::from_geojson_str(
            "test/empty",
            r#"{"type":"FeatureCollection","features":[]}"#,
        )
        .unwrap();
        let driver = ExportDriver::new(RecordingSubmitter::new(), ExportParams::default());
        let report = driver.run(&BoundInputs::with_defaults(aois), None).await;

        assert!(report.outcomes.is_empty());
        assert!(report.is_complete_success());
    }
}
