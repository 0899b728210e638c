//! Yearly image catalog.
//!
//! Maps a year label to the image asset holding that year's composite. The
//! catalog is static for a run and iterates in ascending year order.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::expr::AssetId;

/// Year label of a yearly image.
pub type Year = u16;

/// Placeholder substituted by [`ImageCatalog::from_template`].
pub const YEAR_PLACEHOLDER: &str = "{year}";

/// Default image asset template.
pub const DEFAULT_IMAGE_TEMPLATE: &str = "projects/ee-komba/assets/kaya/bbox-wirong-Landsat-{year}";

/// Default years (biennial Landsat composites).
pub const DEFAULT_YEARS: [Year; 6] = [2013, 2015, 2017, 2019, 2021, 2023];

/// Errors raised while building a catalog.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("image catalog needs at least one year")]
    NoYears,

    #[error("image template '{0}' does not contain {{year}}")]
    MissingYearPlaceholder(String),
}

/// Ordered mapping from year to image asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCatalog {
    images: BTreeMap<Year, AssetId>,
}

impl ImageCatalog {
    /// Build a catalog from explicit `(year, asset)` pairs.
    ///
    /// A year listed twice keeps its last asset.
    pub fn new(images: impl IntoIterator<Item = (Year, AssetId)>) -> Result<Self, CatalogError> {
        let images: BTreeMap<_, _> = images.into_iter().collect();
        if images.is_empty() {
            return Err(CatalogError::NoYears);
        }
        Ok(Self { images })
    }

    /// Build a catalog by substituting each year into `template`.
    ///
    /// # Example
    ///
    /// ```
    /// use landmask::catalog::ImageCatalog;
    ///
    /// let catalog = ImageCatalog::from_template("landsat-{year}", [2015, 2013]).unwrap();
    /// let assets: Vec<_> = catalog.iter().map(|(y, a)| (y, a.to_string())).collect();
    /// assert_eq!(assets, vec![(2013, "landsat-2013".to_string()), (2015, "landsat-2015".to_string())]);
    /// ```
    pub fn from_template(
        template: &str,
        years: impl IntoIterator<Item = Year>,
    ) -> Result<Self, CatalogError> {
        if !template.contains(YEAR_PLACEHOLDER) {
            return Err(CatalogError::MissingYearPlaceholder(template.to_string()));
        }

        Self::new(years.into_iter().map(|year| {
            let asset = template.replace(YEAR_PLACEHOLDER, &year.to_string());
            (year, AssetId::new(asset))
        }))
    }

    /// Asset for `year`, if catalogued.
    pub fn get(&self, year: Year) -> Option<&AssetId> {
        self.images.get(&year)
    }

    /// Catalogued years in ascending order.
    pub fn years(&self) -> impl Iterator<Item = Year> + '_ {
        self.images.keys().copied()
    }

    /// `(year, asset)` pairs in ascending year order.
    pub fn iter(&self) -> impl Iterator<Item = (Year, &AssetId)> {
        self.images.iter().map(|(year, asset)| (*year, asset))
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl Default for ImageCatalog {
    fn default() -> Self {
        let images = DEFAULT_YEARS
            .iter()
            .map(|year| {
                let asset = DEFAULT_IMAGE_TEMPLATE.replace(YEAR_PLACEHOLDER, &year.to_string());
                (*year, AssetId::new(asset))
            })
            .collect();
        Self { images }
    }
}
