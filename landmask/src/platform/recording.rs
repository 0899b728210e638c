//! In-memory export submitter.
//!
//! Accepts every job without contacting the platform and keeps a copy of
//! what was submitted. Backs `--dry-run` and driver tests.

use std::collections::HashSet;

use parking_lot::Mutex;

use super::types::{ExportSubmitter, JobHandle, PlatformError};
use crate::export::ExportJob;

/// Operation prefix of handles issued by [`RecordingSubmitter`].
pub const DRY_RUN_OPERATION_PREFIX: &str = "dry-run/";

/// Submitter that records jobs instead of sending them.
#[derive(Debug, Default)]
pub struct RecordingSubmitter {
    submitted: Mutex<Vec<ExportJob>>,
    reject: HashSet<String>,
}

impl RecordingSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse submissions of the named jobs (HTTP 409-style rejection).
    pub fn rejecting(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            submitted: Mutex::new(Vec::new()),
            reject: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Jobs accepted so far, in submission order.
    pub fn submitted(&self) -> Vec<ExportJob> {
        self.submitted.lock().clone()
    }

    /// Number of jobs accepted so far.
    pub fn count(&self) -> usize {
        self.submitted.lock().len()
    }
}

impl ExportSubmitter for RecordingSubmitter {
    async fn submit(&self, job: &ExportJob) -> Result<JobHandle, PlatformError> {
        if self.reject.contains(&job.name) {
            return Err(PlatformError::SubmissionRejected {
                name: job.name.clone(),
                status: 409,
                reason: "rejected by recording submitter".to_string(),
            });
        }

        self.submitted.lock().push(job.clone());
        Ok(JobHandle::new(
            job.name.clone(),
            format!("{}{}", DRY_RUN_OPERATION_PREFIX, job.name),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aoi::AoiCollection;
    use crate::catalog::ImageCatalog;
    use crate::export::{plan_exports, ExportParams};
    use crate::mask::LandCoverMask;

    fn jobs() -> Vec<ExportJob> {
        let aois = AoiCollection::from_geojson_str(
            "t",
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{"Area":9},
                 "geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,1],[0,0]]]}}
            ]}"#,
        )
        .unwrap();
        plan_exports(
            &aois,
            &ImageCatalog::default(),
            &LandCoverMask::default(),
            &ExportParams::default(),
        )
    }

    #[tokio::test]
    async fn test_records_and_issues_handles() {
        let submitter = RecordingSubmitter::new();
        let jobs = jobs();

        let handle = submitter.submit(&jobs[0]).await.unwrap();
        assert_eq!(handle.operation, "dry-run/NDFI_Masked_2013_9");
        assert_eq!(submitter.count(), 1);
        assert_eq!(submitter.submitted()[0], jobs[0]);
    }

    #[tokio::test]
    async fn test_rejects_named_jobs() {
        let submitter = RecordingSubmitter::rejecting(["NDFI_Masked_2015_9"]);
        let jobs = jobs();

        assert!(submitter.submit(&jobs[0]).await.is_ok());
        assert!(matches!(
            submitter.submit(&jobs[1]).await,
            Err(PlatformError::SubmissionRejected { status: 409, .. })
        ));
        assert_eq!(submitter.count(), 1);
    }
}
