//! REST client for the remote imagery platform.
//!
//! # Endpoints
//!
//! | Operation            | Request                                              |
//! |----------------------|------------------------------------------------------|
//! | list table features  | `GET  {base}/v1/{asset}:listFeatures[?pageToken=..]` |
//! | submit image export  | `POST {base}/v1/projects/{project}/image:export`     |
//! | query an operation   | `GET  {base}/v1/{operation}`                         |
//!
//! Feature listings are paged; pages are followed until the platform stops
//! returning a `nextPageToken`. A listing that is still paging after the
//! page limit fails as a whole. An export submission answers with a
//! long-running operation that this client never waits for.

use geojson::{FeatureCollection, GeoJson};
use serde_json::json;
use tracing::{debug, info};

use super::http::{AsyncHttpClient, HttpResponse};
use super::types::{ExportSubmitter, FeatureSource, JobHandle, JobState, PlatformError};
use crate::config::PlatformConfig;
use crate::export::ExportJob;
use crate::expr::AssetId;

/// Default upper bound on followed feature pages.
const MAX_PAGES: usize = 10_000;

/// Platform client speaking the v1 REST surface.
pub struct RestPlatform<C: AsyncHttpClient> {
    http: C,
    base_url: String,
    project: String,
    max_pages: usize,
}

impl<C: AsyncHttpClient> RestPlatform<C> {
    /// Creates a client for the configured endpoint and project.
    pub fn new(http: C, config: &PlatformConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            project: config.project.clone(),
            max_pages: MAX_PAGES,
        }
    }

    /// Limit the number of feature pages followed for one listing.
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Builds the feature listing URL for an asset.
    fn features_url(
        &self,
        asset: &AssetId,
        page_token: Option<&str>,
    ) -> Result<String, PlatformError> {
        let url = format!("{}/v1/{}:listFeatures", self.base_url, asset);
        match page_token {
            Some(token) => reqwest::Url::parse_with_params(&url, &[("pageToken", token)])
                .map(String::from)
                .map_err(|e| PlatformError::Decode {
                    url,
                    reason: e.to_string(),
                }),
            None => Ok(url),
        }
    }

    /// Builds the export submission URL.
    fn export_url(&self) -> String {
        format!("{}/v1/projects/{}/image:export", self.base_url, self.project)
    }

    /// Builds the request body for an export job.
    pub fn export_body(job: &ExportJob) -> serde_json::Value {
        json!({
            "expression": job.export_expression(),
            "description": job.name,
            "fileExportOptions": {
                "fileFormat": job.file_format.as_str(),
                "driveDestination": {
                    "folder": job.folder,
                    "filenamePrefix": job.name,
                },
            },
            // int64 values travel as decimal strings
            "maxPixels": job.max_pixels.to_string(),
        })
    }

    /// Query the platform state of a previously submitted job.
    ///
    /// The export driver never calls this; it is offered to callers that
    /// want to track completion themselves.
    pub async fn operation_status(&self, handle: &JobHandle) -> Result<JobState, PlatformError> {
        let url = format!("{}/v1/{}", self.base_url, handle.operation);
        let response = self.http.get(&url).await?;
        if !response.is_success() {
            return Err(PlatformError::Http(format!(
                "HTTP {} from {}: {}",
                response.status,
                url,
                response.body_snippet()
            )));
        }

        let operation = parse_json(&url, &response)?;
        if let Some(message) = operation
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return Ok(JobState::Failed(message.to_string()));
        }

        let state = operation
            .get("metadata")
            .and_then(|m| m.get("state"))
            .and_then(|s| s.as_str());
        let done = operation
            .get("done")
            .and_then(|d| d.as_bool())
            .unwrap_or(false);

        Ok(match state {
            Some(state) => JobState::from_platform(state),
            None if done => JobState::Succeeded,
            None => JobState::Pending,
        })
    }
}

impl<C: AsyncHttpClient> FeatureSource for RestPlatform<C> {
    async fn list_features(&self, asset: &AssetId) -> Result<FeatureCollection, PlatformError> {
        let mut features = Vec::new();
        let mut page_token: Option<String> = None;

        for page in 0..self.max_pages {
            let url = self.features_url(asset, page_token.as_deref())?;
            debug!(asset = %asset, page, "Listing features");

            let response = self.http.get(&url).await?;
            if !response.is_success() {
                return Err(PlatformError::InputResolution {
                    asset: asset.clone(),
                    reason: format!("HTTP {}: {}", response.status, response.body_snippet()),
                });
            }

            let mut body = parse_json(&url, &response)?;
            let next = body
                .as_object_mut()
                .and_then(|o| o.remove("nextPageToken"))
                .and_then(|t| t.as_str().map(str::to_string))
                .filter(|t| !t.is_empty());

            let collection = GeoJson::from_json_value(body)
                .and_then(FeatureCollection::try_from)
                .map_err(|e| PlatformError::Decode {
                    url: url.clone(),
                    reason: e.to_string(),
                })?;
            features.extend(collection.features);

            match next {
                Some(token) if page_token.as_deref() != Some(token.as_str()) => {
                    page_token = Some(token)
                }
                _ => {
                    info!(asset = %asset, count = features.len(), "Resolved feature collection");
                    return Ok(FeatureCollection {
                        bbox: None,
                        features,
                        foreign_members: None,
                    });
                }
            }
        }

        // Never hand back a partial collection
        Err(PlatformError::InputResolution {
            asset: asset.clone(),
            reason: format!(
                "listing still paging after {} pages ({} features read)",
                self.max_pages,
                features.len()
            ),
        })
    }
}

impl<C: AsyncHttpClient> ExportSubmitter for RestPlatform<C> {
    async fn submit(&self, job: &ExportJob) -> Result<JobHandle, PlatformError> {
        let url = self.export_url();
        let response = self.http.post_json(&url, &Self::export_body(job)).await?;

        if !response.is_success() {
            return Err(PlatformError::SubmissionRejected {
                name: job.name.clone(),
                status: response.status,
                reason: error_message(&response),
            });
        }

        let operation = parse_json(&url, &response)?;
        let operation = operation
            .get("name")
            .and_then(|n| n.as_str())
            .ok_or_else(|| PlatformError::Decode {
                url: url.clone(),
                reason: "operation has no name".to_string(),
            })?;

        Ok(JobHandle::new(job.name.clone(), operation))
    }
}

fn parse_json(url: &str, response: &HttpResponse) -> Result<serde_json::Value, PlatformError> {
    serde_json::from_slice(&response.body).map_err(|e| PlatformError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// Extract `error.message` from a platform error body, or fall back to the raw body.
fn error_message(response: &HttpResponse) -> String {
    serde_json::from_slice::<serde_json::Value>(&response.body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| response.body_snippet())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aoi::AoiCollection;
    use crate::catalog::ImageCatalog;
    use crate::export::{plan_exports, ExportParams};
    use crate::expr::geometry_node;
    use crate::mask::LandCoverMask;
    use crate::platform::MockAsyncHttpClient;

    const FEATURES_PAGE: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","properties":{"Area":1},
         "geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,1],[0,0]]]}}
    ]}"#;

    fn config() -> PlatformConfig {
        PlatformConfig {
            base_url: "https://platform.test/".to_string(),
            project: "demo".to_string(),
            ..PlatformConfig::default()
        }
    }

    fn sample_job() -> ExportJob {
        let aois = AoiCollection::from_geojson_str("t", FEATURES_PAGE).unwrap();
        plan_exports(
            &aois,
            &ImageCatalog::default(),
            &LandCoverMask::default(),
            &ExportParams::default(),
        )
        .remove(0)
    }

    #[test]
    fn test_url_construction() {
        let platform = RestPlatform::new(MockAsyncHttpClient::new(Ok(HttpResponse::new(200, ""))), &config());
        assert_eq!(
            platform
                .features_url(&AssetId::new("projects/p/assets/t"), None)
                .unwrap(),
            "https://platform.test/v1/projects/p/assets/t:listFeatures"
        );
        assert_eq!(
            platform
                .features_url(&AssetId::new("projects/p/assets/t"), Some("a b/c=d"))
                .unwrap(),
            "https://platform.test/v1/projects/p/assets/t:listFeatures?pageToken=a+b%2Fc%3Dd"
        );
        assert_eq!(
            platform.export_url(),
            "https://platform.test/v1/projects/demo/image:export"
        );
    }

    #[test]
    fn test_export_body() {
        let job = sample_job();
        let body = RestPlatform::<MockAsyncHttpClient>::export_body(&job);

        let mut keys: Vec<_> = body.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            vec!["description", "expression", "fileExportOptions", "maxPixels"]
        );

        assert_eq!(body["description"], "NDFI_Masked_2013_1");
        assert_eq!(body["maxPixels"], "10000000000000");
        assert_eq!(body["fileExportOptions"]["fileFormat"], "GEO_TIFF");
        assert_eq!(
            body["fileExportOptions"]["driveDestination"]["folder"],
            "earthengine"
        );
        assert_eq!(
            body["fileExportOptions"]["driveDestination"]["filenamePrefix"],
            "NDFI_Masked_2013_1"
        );

        let root = &body["expression"]["values"]["0"]["functionInvocationValue"];
        assert_eq!(root["functionName"], "Image.clipToBoundsAndScale");
        assert_eq!(root["arguments"]["scale"]["constantValue"], 100.0);
        assert_eq!(
            root["arguments"]["geometry"],
            serde_json::to_value(geometry_node(&job.region)).unwrap()
        );
        assert_eq!(
            root["arguments"]["input"]["functionInvocationValue"]["functionName"],
            "Image.clip"
        );
    }

    #[tokio::test]
    async fn test_list_features_single_page() {
        let mock = MockAsyncHttpClient::new(Ok(HttpResponse::new(200, FEATURES_PAGE)));
        let platform = RestPlatform::new(mock, &config());

        let collection = platform
            .list_features(&AssetId::new("projects/p/assets/t"))
            .await
            .unwrap();
        assert_eq!(collection.features.len(), 1);
    }

    #[tokio::test]
    async fn test_list_features_follows_pages() {
        let mut first: serde_json::Value = serde_json::from_str(FEATURES_PAGE).unwrap();
        first["nextPageToken"] = serde_json::json!("page-2");

        let mock = MockAsyncHttpClient::new(Ok(HttpResponse::new(200, FEATURES_PAGE)));
        mock.push(Ok(HttpResponse::new(200, first.to_string())));
        let platform = RestPlatform::new(mock, &config());

        let collection = platform
            .list_features(&AssetId::new("projects/p/assets/t"))
            .await
            .unwrap();
        assert_eq!(collection.features.len(), 2);

        let requests = platform.http.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[1].url.ends_with("?pageToken=page-2"));
    }

    #[tokio::test]
    async fn test_list_features_endless_paging_is_an_error() {
        let mock = MockAsyncHttpClient::new(Ok(HttpResponse::new(200, FEATURES_PAGE)));
        for page in 0..3 {
            let mut body: serde_json::Value = serde_json::from_str(FEATURES_PAGE).unwrap();
            body["nextPageToken"] = serde_json::json!(format!("page-{}", page + 2));
            mock.push(Ok(HttpResponse::new(200, body.to_string())));
        }
        let platform = RestPlatform::new(mock, &config()).with_max_pages(3);

        match platform.list_features(&AssetId::new("projects/p/assets/t")).await {
            Err(PlatformError::InputResolution { asset, reason }) => {
                assert_eq!(asset.as_str(), "projects/p/assets/t");
                assert!(reason.contains("3 pages"));
                assert!(reason.contains("3 features"));
            }
            other => panic!("Expected InputResolution, got {:?}", other),
        }
        assert_eq!(platform.http.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_list_features_missing_asset() {
        let mock = MockAsyncHttpClient::new(Ok(HttpResponse::new(404, "not found")));
        let platform = RestPlatform::new(mock, &config());

        match platform.list_features(&AssetId::new("projects/p/assets/nope")).await {
            Err(PlatformError::InputResolution { asset, reason }) => {
                assert_eq!(asset.as_str(), "projects/p/assets/nope");
                assert!(reason.contains("404"));
            }
            other => panic!("Expected InputResolution, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_features_bad_json() {
        let mock = MockAsyncHttpClient::new(Ok(HttpResponse::new(200, "<html>")));
        let platform = RestPlatform::new(mock, &config());

        let result = platform.list_features(&AssetId::new("a")).await;
        assert!(matches!(result, Err(PlatformError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_submit_accepted() {
        let mock = MockAsyncHttpClient::ok_json(
            200,
            serde_json::json!({"name": "projects/demo/operations/OP1", "done": false}),
        );
        let platform = RestPlatform::new(mock, &config());

        let handle = platform.submit(&sample_job()).await.unwrap();
        assert_eq!(handle.name, "NDFI_Masked_2013_1");
        assert_eq!(handle.operation, "projects/demo/operations/OP1");

        let requests = platform.http.requests();
        assert_eq!(requests[0].method, "POST");
        assert_eq!(
            requests[0].body.as_ref().map(|b| b["description"].clone()),
            Some(serde_json::json!("NDFI_Masked_2013_1"))
        );
    }

    #[tokio::test]
    async fn test_submit_rejected() {
        let mock = MockAsyncHttpClient::ok_json(
            429,
            serde_json::json!({"error": {"code": 429, "message": "Too many tasks"}}),
        );
        let platform = RestPlatform::new(mock, &config());

        match platform.submit(&sample_job()).await {
            Err(PlatformError::SubmissionRejected { name, status, reason }) => {
                assert_eq!(name, "NDFI_Masked_2013_1");
                assert_eq!(status, 429);
                assert_eq!(reason, "Too many tasks");
            }
            other => panic!("Expected SubmissionRejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_submit_network_error() {
        let mock = MockAsyncHttpClient::new(Err(PlatformError::Http("Connection refused".to_string())));
        let platform = RestPlatform::new(mock, &config());

        match platform.submit(&sample_job()).await {
            Err(PlatformError::Http(msg)) => assert!(msg.contains("Connection refused")),
            other => panic!("Expected Http error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_operation_status() {
        let mock = MockAsyncHttpClient::ok_json(
            200,
            serde_json::json!({"name": "op", "metadata": {"state": "RUNNING"}}),
        );
        mock.push(Ok(HttpResponse::new(
            200,
            serde_json::json!({"name": "op", "done": true, "error": {"message": "No valid pixels"}})
                .to_string(),
        )));
        let platform = RestPlatform::new(mock, &config());
        let handle = JobHandle::new("job", "projects/demo/operations/op");

        assert_eq!(
            platform.operation_status(&handle).await.unwrap(),
            JobState::Failed("No valid pixels".to_string())
        );
        assert_eq!(
            platform.operation_status(&handle).await.unwrap(),
            JobState::Running
        );
        assert!(platform.http.requests()[0]
            .url
            .ends_with("/v1/projects/demo/operations/op"));
    }
}
