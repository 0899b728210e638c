//! Landmask - land-cover masked exports on a remote imagery platform
//!
//! This library describes a small batch workflow and hands it to a remote
//! geospatial platform for execution:
//!
//! 1. Bind a polygon collection, a land-cover classification and a yearly
//!    image catalog ([`driver::Workflow::bind`]).
//! 2. Derive a boolean mask from a set of target class codes
//!    ([`mask::LandCoverMask`]).
//! 3. For every polygon and every year, mask and clip the yearly image and
//!    submit an export job ([`driver::ExportDriver`]).
//!
//! No pixels are processed locally. Every raster operation is expressed as a
//! declarative [`expr::ImageExpr`] and serialized into the request body of
//! an export submission.
//!
//! # Example
//!
//! ```ignore
//! use landmask::config::ConfigFile;
//! use landmask::driver::{ExportDriver, InputSpec, Workflow};
//! use landmask::platform::{RestPlatform, ReqwestClient};
//!
//! let config = ConfigFile::load()?;
//! let http = ReqwestClient::from_config(&config.platform)?;
//! let platform = RestPlatform::new(http, &config.platform);
//!
//! let inputs = Workflow::bind(&platform, &InputSpec::from_config(&config)).await?;
//! let driver = ExportDriver::new(platform, config.export_params());
//! let report = driver.run(&inputs, None).await;
//! println!("{} submitted, {} rejected", report.submitted(), report.rejected());
//! ```

pub mod aoi;
pub mod catalog;
pub mod config;
pub mod display;
pub mod driver;
pub mod export;
pub mod expr;
pub mod logging;
pub mod mask;
pub mod platform;

/// Library version, taken from the crate manifest.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
