//! Optional map presentation.
//!
//! The export workflow can show its inputs on an interactive map: the raw
//! polygons and the land-cover mask, centered on the polygons. Presentation
//! is a side channel. Nothing a [`MapDisplay`] does feeds back into the
//! export jobs, and the driver runs the same with or without one.
//!
//! | Layer                | Source                  | Style              |
//! |----------------------|-------------------------|--------------------|
//! | `Original Polygons`  | polygon table asset     | color `blue`       |
//! | `Land Cover Mask`    | `selfMask(mask)`        | palette `[green]`  |

use std::fmt;

use geo_types::Rect;
use tracing::info;

use crate::aoi::AoiCollection;
use crate::expr::{AssetId, ImageExpr};
use crate::mask::LandCoverMask;

/// Name of the polygon layer.
pub const POLYGON_LAYER: &str = "Original Polygons";

/// Name of the mask layer.
pub const MASK_LAYER: &str = "Land Cover Mask";

/// What a layer draws.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerSource {
    /// A feature collection asset, drawn as outlines.
    Features(AssetId),
    /// A raster expression.
    Image(ImageExpr),
}

impl fmt::Display for LayerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Features(asset) => write!(f, "features({})", asset),
            Self::Image(image) => write!(f, "{}", image),
        }
    }
}

/// How a layer is drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerStyle {
    Color(String),
    Palette(Vec<String>),
}

impl fmt::Display for LayerStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Color(color) => write!(f, "color={}", color),
            Self::Palette(colors) => write!(f, "palette=[{}]", colors.join(",")),
        }
    }
}

/// A named map layer.
#[derive(Debug, Clone, PartialEq)]
pub struct MapLayer {
    pub name: String,
    pub source: LayerSource,
    pub style: LayerStyle,
}

impl MapLayer {
    pub fn new(name: impl Into<String>, source: LayerSource, style: LayerStyle) -> Self {
        Self {
            name: name.into(),
            source,
            style,
        }
    }
}

/// Sink for map presentation.
pub trait MapDisplay: Send {
    /// Add a layer on top of the existing ones.
    fn add_layer(&mut self, layer: MapLayer);

    /// Center the view on a bounding box.
    fn center_on(&mut self, bounds: Rect<f64>);
}

/// Add the polygon and mask layers, then center on the polygons.
///
/// An empty collection has no bounds; the view is left where it is.
pub fn present(display: &mut dyn MapDisplay, aois: &AoiCollection, mask: &LandCoverMask) {
    display.add_layer(MapLayer::new(
        POLYGON_LAYER,
        LayerSource::Features(aois.source().clone()),
        LayerStyle::Color("blue".to_string()),
    ));
    display.add_layer(MapLayer::new(
        MASK_LAYER,
        LayerSource::Image(mask.expression().self_mask()),
        LayerStyle::Palette(vec!["green".to_string()]),
    ));

    if let Some(bounds) = aois.bounds() {
        display.center_on(bounds);
    }
}

/// Display that reports layers through `tracing`.
#[derive(Debug, Default)]
pub struct LoggingDisplay;

impl MapDisplay for LoggingDisplay {
    fn add_layer(&mut self, layer: MapLayer) {
        info!(
            layer = %layer.name,
            source = %layer.source,
            style = %layer.style,
            "Map layer added"
        );
    }

    fn center_on(&mut self, bounds: Rect<f64>) {
        let center = bounds.center();
        info!(
            lon = center.x,
            lat = center.y,
            width = bounds.width(),
            height = bounds.height(),
            "Map centered"
        );
    }
}

/// Display that keeps everything it is given.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecordingDisplay {
    pub layers: Vec<MapLayer>,
    pub center: Option<Rect<f64>>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the layers in the order they were added.
    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.name.as_str()).collect()
    }
}

impl MapDisplay for RecordingDisplay {
    fn add_layer(&mut self, layer: MapLayer) {
        self.layers.push(layer);
    }

    fn center_on(&mut self, bounds: Rect<f64>) {
        self.center = Some(bounds);
    }
}
