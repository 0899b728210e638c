//! Input binding.

use thiserror::Error;
use tracing::info;

use crate::aoi::{AoiCollection, AoiError};
use crate::catalog::{CatalogError, ImageCatalog, Year};
use crate::config::ConfigFile;
use crate::expr::AssetId;
use crate::mask::{ClassCode, LandCoverMask, MaskError};
use crate::platform::{FeatureSource, PlatformError};

/// Errors that abort a run before any job is submitted.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error("invalid polygon collection: {0}")]
    Aoi(#[from] AoiError),

    #[error("invalid mask: {0}")]
    Mask(#[from] MaskError),

    #[error("invalid image catalog: {0}")]
    Catalog(#[from] CatalogError),
}

/// Unresolved workflow inputs: asset references and parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct InputSpec {
    /// Polygon table asset.
    pub polygons: AssetId,

    /// Land-cover classification collection.
    pub classification: AssetId,

    /// Target class codes.
    pub classes: Vec<ClassCode>,

    /// Yearly image asset template.
    pub image_template: String,

    /// Years to export.
    pub years: Vec<Year>,
}

impl Default for InputSpec {
    fn default() -> Self {
        Self::from_config(&ConfigFile::default())
    }
}

impl InputSpec {
    /// Inputs named by a configuration file.
    pub fn from_config(config: &ConfigFile) -> Self {
        Self {
            polygons: AssetId::new(config.inputs.polygons.clone()),
            classification: AssetId::new(config.inputs.classification.clone()),
            classes: config.mask.classes.clone(),
            image_template: config.inputs.image_template.clone(),
            years: config.inputs.years.clone(),
        }
    }

    /// Replace the polygon asset.
    pub fn with_polygons(mut self, polygons: impl Into<AssetId>) -> Self {
        self.polygons = polygons.into();
        self
    }

    /// Replace the year list.
    pub fn with_years(mut self, years: Vec<Year>) -> Self {
        self.years = years;
        self
    }
}

/// Resolved, validated inputs ready for planning.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundInputs {
    pub aois: AoiCollection,
    pub catalog: ImageCatalog,
    pub mask: LandCoverMask,
}

/// Input binding entry point.
pub struct Workflow;

impl Workflow {
    /// Resolve the polygon collection and build the mask and catalog.
    ///
    /// Mask and catalog are validated before any I/O, so a bad
    /// configuration fails without touching the platform.
    ///
    /// # Errors
    ///
    /// Any binding error aborts the run; nothing has been submitted yet.
    pub async fn bind<F: FeatureSource>(
        source: &F,
        spec: &InputSpec,
    ) -> Result<BoundInputs, WorkflowError> {
        let mask = LandCoverMask::new(spec.classification.clone(), spec.classes.iter().copied())?;
        let catalog = ImageCatalog::from_template(&spec.image_template, spec.years.iter().copied())?;

        let features = source.list_features(&spec.polygons).await?;
        let aois = AoiCollection::from_features(spec.polygons.clone(), features)?;

        info!(
            polygons = %spec.polygons,
            areas = aois.len(),
            years = catalog.len(),
            classes = ?mask.classes(),
            "Inputs bound"
        );

        Ok(BoundInputs {
            aois,
            catalog,
            mask,
        })
    }
}

impl BoundInputs {
    /// Stock catalog and mask around an already validated collection.
    pub fn with_defaults(aois: AoiCollection) -> Self {
        Self {
            aois,
            catalog: ImageCatalog::default(),
            mask: LandCoverMask::default(),
        }
    }
}
