//! Areas of interest.
//!
//! An area of interest (AOI) is a polygonal region that is processed
//! independently of every other region. AOIs arrive as GeoJSON features whose
//! `Area` property carries a numeric identifier. The untyped property bag is
//! validated once, at the input boundary, into an [`AreaOfInterest`].
//!
//! # Validation
//!
//! | Problem                         | Error                               |
//! |---------------------------------|-------------------------------------|
//! | no `Area` property              | [`AoiError::MissingArea`]           |
//! | `Area` is not a number          | [`AoiError::NonNumericArea`]        |
//! | no geometry                     | [`AoiError::MissingGeometry`]       |
//! | point or line geometry          | [`AoiError::UnsupportedGeometry`]   |
//! | ring with fewer than 4 vertices | [`AoiError::InvalidGeometry`]       |
//! | two features share an `Area`    | [`AoiError::DuplicateArea`]         |

mod feature;

pub use feature::AREA_PROPERTY;

use std::fmt;

use geo::BoundingRect;
use geo_types::{coord, LineString, MultiPolygon, Polygon, Rect};
use serde_json::json;
use thiserror::Error;

use crate::expr::AssetId;

/// Errors raised while validating areas of interest.
#[derive(Debug, Error)]
pub enum AoiError {
    #[error("feature #{index} has no 'Area' property")]
    MissingArea { index: usize },

    #[error("feature #{index} has a non-numeric 'Area' property: {value}")]
    NonNumericArea {
        index: usize,
        value: serde_json::Value,
    },

    #[error("area {area} has no geometry")]
    MissingGeometry { area: AreaId },

    #[error("area {area} has unsupported geometry type {kind} (expected Polygon or MultiPolygon)")]
    UnsupportedGeometry { area: AreaId, kind: &'static str },

    #[error("area {area} has invalid geometry: {reason}")]
    InvalidGeometry { area: AreaId, reason: String },

    #[error("area {area} appears more than once")]
    DuplicateArea { area: AreaId },

    #[error("invalid GeoJSON: {0}")]
    Parse(#[from] geojson::Error),
}

/// Numeric identifier of an area of interest.
///
/// Rendered the way it appears in export names, following the number to
/// string rules of the scripting platform: shortest round-trip digits,
/// integral values without a fractional part (`7`), exponent form below
/// `1e-6` and from `1e21` on (`1e-7`, `1e+21`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaId(f64);

impl AreaId {
    /// Create an identifier from a finite number.
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    /// Numeric value of the identifier.
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl From<i64> for AreaId {
    fn from(value: i64) -> Self {
        Self(value as f64)
    }
}

impl fmt::Display for AreaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.0;
        if value == 0.0 || !value.is_finite() {
            // -0 prints as 0
            return write!(f, "{}", value.abs());
        }
        if value < 0.0 {
            f.write_str("-")?;
        }

        // `{:e}` yields the shortest round-trip digits, e.g. `1.25e-7`
        let scientific = format!("{:e}", value.abs());
        let (mantissa, exponent) = scientific
            .split_once('e')
            .unwrap_or((scientific.as_str(), "0"));
        let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
        let exponent: i32 = exponent.parse().map_err(|_| fmt::Error)?;
        let k = digits.len() as i32;
        let n = exponent + 1;

        if k <= n && n <= 21 {
            write!(f, "{}{}", digits, "0".repeat((n - k) as usize))
        } else if 0 < n && n <= 21 {
            let (int, frac) = digits.split_at(n as usize);
            write!(f, "{}.{}", int, frac)
        } else if -6 < n && n <= 0 {
            write!(f, "0.{}{}", "0".repeat((-n) as usize), digits)
        } else {
            let (lead, rest) = digits.split_at(1);
            let sign = if n - 1 < 0 { '-' } else { '+' };
            if rest.is_empty() {
                write!(f, "{}e{}{}", lead, sign, (n - 1).abs())
            } else {
                write!(f, "{}.{}e{}{}", lead, rest, sign, (n - 1).abs())
            }
        }
    }
}

/// Polygonal geometry of an area of interest (planar coordinates).
#[derive(Debug, Clone, PartialEq)]
pub enum AoiGeometry {
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
}

impl AoiGeometry {
    /// GeoJSON type name of this geometry.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Polygon(_) => "Polygon",
            Self::MultiPolygon(_) => "MultiPolygon",
        }
    }

    /// GeoJSON `coordinates` member for this geometry.
    pub fn coordinates(&self) -> serde_json::Value {
        match self {
            Self::Polygon(polygon) => polygon_coordinates(polygon),
            Self::MultiPolygon(multi) => {
                serde_json::Value::Array(multi.iter().map(polygon_coordinates).collect())
            }
        }
    }

    /// Convert to a GeoJSON geometry object.
    pub fn to_geojson(&self) -> geojson::Geometry {
        let value = match self {
            Self::Polygon(polygon) => geojson::Value::from(polygon),
            Self::MultiPolygon(multi) => geojson::Value::from(multi),
        };
        geojson::Geometry::new(value)
    }

    /// Bounding rectangle, `None` for an empty geometry.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        match self {
            Self::Polygon(polygon) => polygon.bounding_rect(),
            Self::MultiPolygon(multi) => multi.bounding_rect(),
        }
    }
}

fn ring_coordinates(ring: &LineString<f64>) -> serde_json::Value {
    serde_json::Value::Array(ring.coords().map(|c| json!([c.x, c.y])).collect())
}

fn polygon_coordinates(polygon: &Polygon<f64>) -> serde_json::Value {
    let mut rings = vec![ring_coordinates(polygon.exterior())];
    rings.extend(polygon.interiors().iter().map(ring_coordinates));
    serde_json::Value::Array(rings)
}

/// A validated area of interest.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaOfInterest {
    id: AreaId,
    geometry: AoiGeometry,
}

impl AreaOfInterest {
    /// Create an area of interest from already-validated parts.
    pub fn new(id: AreaId, geometry: AoiGeometry) -> Self {
        Self { id, geometry }
    }

    /// The `Area` identifier.
    pub fn id(&self) -> AreaId {
        self.id
    }

    /// The region geometry.
    pub fn geometry(&self) -> &AoiGeometry {
        &self.geometry
    }
}

/// An ordered, validated set of areas of interest.
#[derive(Debug, Clone, PartialEq)]
pub struct AoiCollection {
    source: AssetId,
    areas: Vec<AreaOfInterest>,
}

impl AoiCollection {
    /// The asset (or file) the areas were read from.
    pub fn source(&self) -> &AssetId {
        &self.source
    }

    /// Areas in input order.
    pub fn areas(&self) -> &[AreaOfInterest] {
        &self.areas
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AreaOfInterest> {
        self.areas.iter()
    }

    /// Bounding rectangle of all areas, `None` when there are none.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.areas
            .iter()
            .filter_map(|area| area.geometry().bounds())
            .reduce(|a, b| {
                Rect::new(
                    coord! { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                    coord! { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
                )
            })
    }
}
