//! Land-cover mask derivation.
//!
//! The mask keeps a pixel iff its land-cover class code is one of a fixed set
//! of target codes:
//!
//! ```text
//! mask[p] = OR over c in classes of (classification[p] == c)
//! ```
//!
//! The mask is built once per run and shared, read-only, by every export job.
//! It is sent to the platform as an expression; [`LandCoverMask::evaluate`]
//! exists only to make the predicate inspectable without the platform.

use std::collections::HashSet;

use thiserror::Error;

use crate::expr::{AssetId, ImageExpr};

/// A land-cover class code as stored in the classification raster.
pub type ClassCode = i32;

/// Default classification: ESA WorldCover 10m v200, first image.
pub const DEFAULT_CLASSIFICATION: &str = "ESA/WorldCover/v200";

/// Default target classes (20: shrubland, 30: grassland, 60: bare/sparse vegetation).
pub const DEFAULT_CLASSES: [ClassCode; 3] = [20, 30, 60];

/// Errors raised while building a mask.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MaskError {
    #[error("at least one target class code is required")]
    EmptyClassSet,
}

/// Boolean mask derived from a classification raster.
#[derive(Debug, Clone, PartialEq)]
pub struct LandCoverMask {
    classification: AssetId,
    classes: Vec<ClassCode>,
}

impl LandCoverMask {
    /// Create a mask over the first image of `classification`.
    ///
    /// Class order is kept as given; repeated codes are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`MaskError::EmptyClassSet`] when `classes` is empty.
    pub fn new(
        classification: impl Into<AssetId>,
        classes: impl IntoIterator<Item = ClassCode>,
    ) -> Result<Self, MaskError> {
        let mut seen = HashSet::new();
        let classes: Vec<ClassCode> = classes.into_iter().filter(|c| seen.insert(*c)).collect();

        if classes.is_empty() {
            return Err(MaskError::EmptyClassSet);
        }

        Ok(Self {
            classification: classification.into(),
            classes,
        })
    }

    /// The collection whose first image supplies the class codes.
    pub fn classification(&self) -> &AssetId {
        &self.classification
    }

    /// Target class codes in declaration order.
    pub fn classes(&self) -> &[ClassCode] {
        &self.classes
    }

    /// Whether a pixel with class `code` is kept.
    pub fn includes(&self, code: ClassCode) -> bool {
        self.classes.iter().fold(false, |kept, c| kept | (*c == code))
    }

    /// Evaluate the predicate over a slice of class codes.
    pub fn evaluate(&self, pixels: &[ClassCode]) -> Vec<bool> {
        pixels.iter().map(|code| self.includes(*code)).collect()
    }

    /// Server-side mask expression: `eq(c0) OR eq(c1) OR ...`.
    pub fn expression(&self) -> ImageExpr {
        let source = ImageExpr::first_of(self.classification.clone());
        let mut classes = self.classes.iter();

        // `new` guarantees at least one class
        let first = classes
            .next()
            .map(|c| source.clone().eq_constant(i64::from(*c)))
            .unwrap_or_else(|| ImageExpr::Constant(0));

        classes.fold(first, |acc, c| {
            acc.or(source.clone().eq_constant(i64::from(*c)))
        })
    }
}

impl Default for LandCoverMask {
    fn default() -> Self {
        Self {
            classification: AssetId::new(DEFAULT_CLASSIFICATION),
            classes: DEFAULT_CLASSES.to_vec(),
        }
    }
}
