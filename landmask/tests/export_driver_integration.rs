//! Integration tests for the export workflow.
//!
//! These tests drive the complete flow through the public API:
//! - feature source → input binding → plan → submission
//! - the REST platform against a scripted HTTP client
//! - repeatability of the submitted descriptors
//!
//! Run with: `cargo test --test export_driver_integration`

use std::sync::atomic::{AtomicUsize, Ordering};

use geojson::FeatureCollection;
use serde_json::{json, Value};

use landmask::config::ConfigFile;
use landmask::display::RecordingDisplay;
use landmask::driver::{ExportDriver, InputSpec, Workflow, WorkflowError};
use landmask::export::ExportParams;
use landmask::expr::AssetId;
use landmask::platform::{
    AsyncHttpClient, FeatureSource, HttpResponse, PlatformError, RecordingSubmitter, RestPlatform,
};

// ============================================================================
// Helper Functions
// ============================================================================

const POLYGONS: &str = "projects/test/assets/polygons";

/// Two square polygons with `Area` 1 and 2.
fn two_features() -> Value {
    json!({
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "Area": 1 },
                "geometry": { "type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]] }
            },
            {
                "type": "Feature",
                "properties": { "Area": 2 },
                "geometry": { "type": "Polygon", "coordinates": [[[2.0, 2.0], [3.0, 2.0], [3.0, 3.0], [2.0, 3.0], [2.0, 2.0]]] }
            }
        ]
    })
}

/// Feature source serving a fixed collection for one asset.
struct StaticFeatures {
    asset: AssetId,
    collection: FeatureCollection,
}

impl StaticFeatures {
    fn new(asset: &str, value: Value) -> Self {
        Self {
            asset: AssetId::new(asset),
            collection: serde_json::from_value(value).unwrap(),
        }
    }
}

impl FeatureSource for StaticFeatures {
    async fn list_features(&self, asset: &AssetId) -> Result<FeatureCollection, PlatformError> {
        if *asset != self.asset {
            return Err(PlatformError::InputResolution {
                asset: asset.clone(),
                reason: "not found".to_string(),
            });
        }
        Ok(self.collection.clone())
    }
}

/// HTTP client answering like the platform's REST surface.
#[derive(Default)]
struct ScriptedPlatform {
    operations: AtomicUsize,
}

impl AsyncHttpClient for ScriptedPlatform {
    async fn get(&self, url: &str) -> Result<HttpResponse, PlatformError> {
        if url.contains(":listFeatures") {
            let body = serde_json::to_vec(&two_features()).unwrap();
            return Ok(HttpResponse::new(200, body));
        }
        Ok(HttpResponse::new(404, r#"{"error":{"message":"not found"}}"#))
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse, PlatformError> {
        assert!(url.ends_with("/v1/projects/ee-komba/image:export"));
        assert_eq!(body["maxPixels"], "10000000000000");
        assert!(body.get("scale").is_none() && body.get("region").is_none());
        let root = &body["expression"]["values"]["0"]["functionInvocationValue"];
        assert_eq!(root["functionName"], "Image.clipToBoundsAndScale");
        assert_eq!(root["arguments"]["scale"]["constantValue"], 100.0);
        let id = self.operations.fetch_add(1, Ordering::SeqCst);
        let operation = json!({ "name": format!("projects/test/operations/OP{}", id), "done": false });
        Ok(HttpResponse::new(200, serde_json::to_vec(&operation).unwrap()))
    }
}

fn spec() -> InputSpec {
    InputSpec::default().with_polygons(POLYGONS)
}

// ============================================================================
// End-to-end fan-out
// ============================================================================

#[tokio::test]
async fn test_two_features_six_years_twelve_submissions() {
    let source = StaticFeatures::new(POLYGONS, two_features());
    let inputs = Workflow::bind(&source, &spec()).await.unwrap();

    let driver = ExportDriver::new(RecordingSubmitter::new(), ExportParams::default());
    let report = driver.run(&inputs, None).await;

    assert_eq!(report.submitted(), 12);
    assert!(report.is_complete_success());

    let jobs = driver.submitter().submitted();
    let names: Vec<_> = jobs.iter().map(|j| j.name.as_str()).collect();
    let expected: Vec<String> = [1, 2]
        .iter()
        .flat_map(|area| {
            [2013, 2015, 2017, 2019, 2021, 2023]
                .iter()
                .map(move |year| format!("NDFI_Masked_{}_{}", year, area))
        })
        .collect();
    assert_eq!(names, expected);

    for job in &jobs {
        assert_eq!(job.scale, 100.0);
        assert_eq!(job.folder, "earthengine");
        assert_eq!(job.max_pixels, 10_000_000_000_000);
    }
}

#[tokio::test]
async fn test_resubmission_is_identical() {
    let source = StaticFeatures::new(POLYGONS, two_features());

    let first = ExportDriver::new(RecordingSubmitter::new(), ExportParams::default());
    first
        .run(&Workflow::bind(&source, &spec()).await.unwrap(), None)
        .await;

    let second = ExportDriver::new(RecordingSubmitter::new(), ExportParams::default());
    second
        .run(&Workflow::bind(&source, &spec()).await.unwrap(), None)
        .await;

    assert_eq!(first.submitter().submitted(), second.submitter().submitted());
}

#[tokio::test]
async fn test_display_is_optional() {
    let source = StaticFeatures::new(POLYGONS, two_features());
    let inputs = Workflow::bind(&source, &spec()).await.unwrap();

    let driver = ExportDriver::new(RecordingSubmitter::new(), ExportParams::default());
    let mut display = RecordingDisplay::new();
    let report = driver.run(&inputs, Some(&mut display)).await;

    assert_eq!(report.submitted(), 12);
    assert_eq!(display.layer_names(), vec!["Original Polygons", "Land Cover Mask"]);
}

#[tokio::test]
async fn test_unknown_polygon_asset_aborts_before_submission() {
    let source = StaticFeatures::new(POLYGONS, two_features());
    let spec = InputSpec::default().with_polygons("projects/test/assets/missing");

    let result = Workflow::bind(&source, &spec).await;
    assert!(matches!(
        result,
        Err(WorkflowError::Platform(PlatformError::InputResolution { .. }))
    ));
}

#[tokio::test]
async fn test_polygon_without_pixels_still_exported() {
    // Far outside any Landsat scene; emptiness is only known server-side.
    let source = StaticFeatures::new(
        POLYGONS,
        json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": { "Area": 99 },
                "geometry": { "type": "Polygon", "coordinates": [[[179.0, -89.0], [179.5, -89.0], [179.5, -88.5], [179.0, -88.5], [179.0, -89.0]]] }
            }]
        }),
    );
    let inputs = Workflow::bind(&source, &spec().with_years(vec![2013]))
        .await
        .unwrap();

    let driver = ExportDriver::new(RecordingSubmitter::new(), ExportParams::default());
    let report = driver.run(&inputs, None).await;

    assert_eq!(report.submitted(), 1);
    assert_eq!(driver.submitter().submitted()[0].name, "NDFI_Masked_2013_99");
}

// ============================================================================
// REST platform
// ============================================================================

#[tokio::test]
async fn test_rest_platform_round_trip() {
    let config = ConfigFile::default();
    let platform = RestPlatform::new(ScriptedPlatform::default(), &config.platform);

    let inputs = Workflow::bind(&platform, &InputSpec::from_config(&config))
        .await
        .unwrap();
    assert_eq!(inputs.aois.len(), 2);

    let driver = ExportDriver::new(platform, config.export_params());
    let report = driver.run(&inputs, None).await;

    assert_eq!(report.submitted(), 12);
    let operations: Vec<_> = report.handles().map(|h| h.operation.clone()).collect();
    assert_eq!(operations[0], "projects/test/operations/OP0");
    assert_eq!(operations[11], "projects/test/operations/OP11");
}
