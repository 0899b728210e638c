//! GeoJSON feature validation.

use std::collections::HashSet;

use geo_types::{Coord, LineString, MultiPolygon, Polygon};
use geojson::{Feature, FeatureCollection, GeoJson, PolygonType};

use super::{AoiCollection, AoiError, AoiGeometry, AreaId, AreaOfInterest};
use crate::expr::AssetId;

/// Name of the feature property that carries the area identifier.
pub const AREA_PROPERTY: &str = "Area";

/// Minimum number of positions in a closed linear ring.
const MIN_RING_POSITIONS: usize = 4;

impl AoiCollection {
    /// Validate a feature collection into areas of interest.
    ///
    /// Feature order is preserved. The first invalid feature aborts
    /// validation.
    pub fn from_features(
        source: impl Into<AssetId>,
        collection: FeatureCollection,
    ) -> Result<Self, AoiError> {
        let mut seen = HashSet::new();
        let mut areas = Vec::with_capacity(collection.features.len());

        for (index, feature) in collection.features.iter().enumerate() {
            let area = area_of_interest(index, feature)?;
            if !seen.insert(area.id().to_string()) {
                return Err(AoiError::DuplicateArea { area: area.id() });
            }
            areas.push(area);
        }

        Ok(Self {
            source: source.into(),
            areas,
        })
    }

    /// Parse and validate a GeoJSON `FeatureCollection` document.
    pub fn from_geojson_str(source: impl Into<AssetId>, text: &str) -> Result<Self, AoiError> {
        let geojson: GeoJson = text.parse()?;
        let collection = FeatureCollection::try_from(geojson)?;
        Self::from_features(source, collection)
    }
}

fn area_of_interest(index: usize, feature: &Feature) -> Result<AreaOfInterest, AoiError> {
    let value = feature
        .property(AREA_PROPERTY)
        .ok_or(AoiError::MissingArea { index })?;
    let id = value
        .as_f64()
        .map(AreaId::new)
        .ok_or_else(|| AoiError::NonNumericArea {
            index,
            value: value.clone(),
        })?;

    let geometry = feature
        .geometry
        .as_ref()
        .ok_or(AoiError::MissingGeometry { area: id })?;

    let geometry = match &geometry.value {
        geojson::Value::Polygon(rings) => AoiGeometry::Polygon(polygon(id, rings)?),
        geojson::Value::MultiPolygon(polygons) => {
            let polygons = polygons
                .iter()
                .map(|rings| polygon(id, rings))
                .collect::<Result<Vec<_>, _>>()?;
            if polygons.is_empty() {
                return Err(AoiError::InvalidGeometry {
                    area: id,
                    reason: "MultiPolygon has no members".to_string(),
                });
            }
            AoiGeometry::MultiPolygon(MultiPolygon::new(polygons))
        }
        other => {
            return Err(AoiError::UnsupportedGeometry {
                area: id,
                kind: geometry_kind(other),
            })
        }
    };

    Ok(AreaOfInterest::new(id, geometry))
}

fn polygon(area: AreaId, rings: &PolygonType) -> Result<Polygon<f64>, AoiError> {
    let mut rings = rings.iter().map(|ring| line_string(area, ring));
    let exterior = rings.next().ok_or_else(|| AoiError::InvalidGeometry {
        area,
        reason: "polygon has no exterior ring".to_string(),
    })??;
    let interiors = rings.collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn line_string(area: AreaId, ring: &[Vec<f64>]) -> Result<LineString<f64>, AoiError> {
    if ring.len() < MIN_RING_POSITIONS {
        return Err(AoiError::InvalidGeometry {
            area,
            reason: format!(
                "ring has {} positions (minimum {})",
                ring.len(),
                MIN_RING_POSITIONS
            ),
        });
    }

    ring.iter()
        .map(|position| match position.as_slice() {
            [x, y, ..] if x.is_finite() && y.is_finite() => Ok(Coord { x: *x, y: *y }),
            _ => Err(AoiError::InvalidGeometry {
                area,
                reason: format!("invalid position {:?}", position),
            }),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(LineString::new)
}

fn geometry_kind(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}
