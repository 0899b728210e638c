//! Remote platform collaborators.
//!
//! This module provides the traits the export workflow talks to and their
//! implementations:
//!
//! - [`FeatureSource`]: resolves a polygon table asset into GeoJSON features
//!   ([`RestPlatform`], [`LocalFeatureSource`])
//! - [`ExportSubmitter`]: hands an [`ExportJob`](crate::export::ExportJob) to
//!   the platform's scheduler ([`RestPlatform`], [`RecordingSubmitter`])
//!
//! All HTTP goes through [`AsyncHttpClient`] so tests can swap in a mock.
//!
//! # Example
//!
//! ```ignore
//! use landmask::platform::{ReqwestClient, RestPlatform};
//!
//! let http = ReqwestClient::from_config(&config.platform)?;
//! let platform = RestPlatform::new(http, &config.platform);
//! let features = platform.list_features(&asset).await?;
//! ```

mod http;
mod local;
mod recording;
mod rest;
mod types;

pub use http::{AsyncHttpClient, HttpResponse, ReqwestClient};
pub use local::LocalFeatureSource;
pub use recording::{RecordingSubmitter, DRY_RUN_OPERATION_PREFIX};
pub use rest::RestPlatform;
pub use types::{ExportSubmitter, FeatureSource, JobHandle, JobState, PlatformError};

#[cfg(test)]
pub use http::tests::{MockAsyncHttpClient, RecordedRequest};
