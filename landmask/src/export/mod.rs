//! Export job descriptors.
//!
//! An [`ExportJob`] is the immutable description of one masked, clipped
//! raster to be written to cloud storage by the platform. Jobs are produced
//! by [`plan_exports`], a pure function of its inputs: the same areas,
//! catalog, mask and parameters always yield the same list of jobs, in the
//! same order, with the same names.
//!
//! # Fan-out
//!
//! ```text
//! for area in aois            (input order)
//!     for year in catalog     (ascending)
//!         clip(updateMask(image[year], mask), area.geometry)  ─► ExportJob
//!
//! On submission the job image is wrapped in
//! `clipToBoundsAndScale(image, region, scale)`; see [`ExportJob::export_expression`].
//! ```

mod naming;

pub use naming::{export_name, DEFAULT_NAME_PREFIX};

use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::aoi::{AoiCollection, AoiGeometry, AreaId};
use crate::catalog::{ImageCatalog, Year};
use crate::expr::{Expression, ImageExpr};
use crate::mask::LandCoverMask;

/// Default sampling resolution in meters.
pub const DEFAULT_SCALE: f64 = 100.0;

/// Default destination folder.
pub const DEFAULT_FOLDER: &str = "earthengine";

/// Default pixel ceiling per export (1e13).
pub const DEFAULT_MAX_PIXELS: u64 = 10_000_000_000_000;

/// Output file format of an export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileFormat {
    #[default]
    GeoTiff,
    TfRecordImage,
}

impl FileFormat {
    /// Platform name of the format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GeoTiff => "GEO_TIFF",
            Self::TfRecordImage => "TF_RECORD_IMAGE",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['_', '-'], "").as_str() {
            "geotiff" | "tif" | "tiff" => Ok(Self::GeoTiff),
            "tfrecord" | "tfrecordimage" => Ok(Self::TfRecordImage),
            _ => Err(format!(
                "unknown file format '{}' (expected GeoTIFF or TFRecord)",
                s
            )),
        }
    }
}

/// Parameters shared by every export of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportParams {
    /// Prefix of every export name.
    pub name_prefix: String,

    /// Sampling resolution in meters per pixel.
    pub scale: f64,

    /// Destination folder in cloud storage.
    pub folder: String,

    /// Maximum number of pixels the platform may write per export.
    pub max_pixels: u64,

    /// Output file format.
    pub file_format: FileFormat,
}

impl Default for ExportParams {
    fn default() -> Self {
        Self {
            name_prefix: DEFAULT_NAME_PREFIX.to_string(),
            scale: DEFAULT_SCALE,
            folder: DEFAULT_FOLDER.to_string(),
            max_pixels: DEFAULT_MAX_PIXELS,
            file_format: FileFormat::default(),
        }
    }
}

impl ExportParams {
    /// Set the export name prefix.
    pub fn with_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = prefix.into();
        self
    }

    /// Set the sampling resolution.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Set the destination folder.
    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = folder.into();
        self
    }

    /// Set the pixel ceiling.
    pub fn with_max_pixels(mut self, max_pixels: u64) -> Self {
        self.max_pixels = max_pixels;
        self
    }

    /// Set the output file format.
    pub fn with_file_format(mut self, file_format: FileFormat) -> Self {
        self.file_format = file_format;
        self
    }
}

/// One masked, clipped raster export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportJob {
    /// Unique, deterministic name (also the description and file prefix).
    pub name: String,

    /// Year of the source image.
    pub year: Year,

    /// Area the image is clipped to.
    pub area: AreaId,

    /// Raster to export.
    pub image: ImageExpr,

    /// Sampling resolution in meters per pixel.
    pub scale: f64,

    /// Export region.
    pub region: AoiGeometry,

    /// Destination folder.
    pub folder: String,

    /// Pixel ceiling.
    pub max_pixels: u64,

    /// Output file format.
    pub file_format: FileFormat,
}

impl ExportJob {
    /// Expression submitted for this job.
    ///
    /// The job image is wrapped so that the platform writes exactly the
    /// job region at the job scale.
    pub fn export_expression(&self) -> Expression {
        self.image
            .clone()
            .clip_to_bounds_and_scale(self.region.clone(), self.scale)
            .to_expression()
    }
}

impl Serialize for ExportJob {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ExportJob", 9)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("year", &self.year)?;
        state.serialize_field("area", &self.area.to_string())?;
        state.serialize_field("scale", &self.scale)?;
        state.serialize_field("folder", &self.folder)?;
        state.serialize_field("maxPixels", &self.max_pixels)?;
        state.serialize_field("fileFormat", &self.file_format)?;
        state.serialize_field("region", &self.region.to_geojson())?;
        state.serialize_field("expression", &self.export_expression())?;
        state.end()
    }
}

/// Build one export job per (area, year) pair.
///
/// Areas form the outer loop (input order), years the inner loop (ascending).
/// No pair is skipped, whatever the overlap between area and image.
pub fn plan_exports(
    aois: &AoiCollection,
    catalog: &ImageCatalog,
    mask: &LandCoverMask,
    params: &ExportParams,
) -> Vec<ExportJob> {
    let mask = mask.expression();
    let mut jobs = Vec::with_capacity(aois.len() * catalog.len());

    for area in aois.iter() {
        for (year, asset) in catalog.iter() {
            let image = ImageExpr::load(asset.clone())
                .update_mask(mask.clone())
                .clip(area.geometry().clone());

            jobs.push(ExportJob {
                name: export_name(&params.name_prefix, year, area.id()),
                year,
                area: area.id(),
                image,
                scale: params.scale,
                region: area.geometry().clone(),
                folder: params.folder.clone(),
                max_pixels: params.max_pixels,
                file_format: params.file_format,
            });
        }
    }

    jobs
}
