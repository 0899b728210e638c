//! Declarative raster expressions.
//!
//! Nothing in this crate computes pixels for an export. Raster operations are
//! described as an [`ImageExpr`] tree and serialized into the platform's
//! expression graph ([`Expression`]), which is evaluated remotely when the
//! export job runs.
//!
//! # Wire Format
//!
//! ```text
//! {
//!   "result": "0",
//!   "values": {
//!     "0": { "functionInvocationValue": {
//!              "functionName": "Image.clip",
//!              "arguments": { "input": {...}, "geometry": {...} } } }
//!   }
//! }
//! ```
//!
//! Leaf values are `constantValue` nodes, everything else is a
//! `functionInvocationValue` naming a platform function.

mod graph;

pub use graph::{Expression, FunctionInvocation, ValueNode};

use std::fmt;

use crate::aoi::AoiGeometry;

/// Identifier of an asset on the remote platform.
///
/// Asset ids are path-like, e.g. `projects/ee-komba/assets/kaya/wirong/mask_5_8`
/// or `ESA/WorldCover/v200`. They are opaque to this crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(String);

impl AssetId {
    /// Wrap an asset path.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The asset path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AssetId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A server-side raster computation.
///
/// Values are immutable; builder methods consume `self` and wrap it in a new
/// node, so a shared sub-expression (like the land-cover mask) is cloned into
/// every tree that uses it.
///
/// # Example
///
/// ```
/// use landmask::expr::ImageExpr;
///
/// let worldcover = ImageExpr::first_of("ESA/WorldCover/v200");
/// let mask = worldcover.clone().eq_constant(20).or(worldcover.eq_constant(30));
/// let masked = ImageExpr::load("projects/p/assets/landsat-2013").update_mask(mask);
///
/// assert_eq!(masked.to_expression().result, "0");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum ImageExpr {
    /// A single image asset.
    Load(AssetId),
    /// The first image of an image collection asset.
    FirstOfCollection(AssetId),
    /// A constant image.
    Constant(i64),
    /// Per-pixel equality, 1 where both inputs are equal.
    Eq(Box<ImageExpr>, Box<ImageExpr>),
    /// Per-pixel logical OR.
    Or(Box<ImageExpr>, Box<ImageExpr>),
    /// Restrict `image` to the pixels where `mask` is non-zero.
    UpdateMask {
        image: Box<ImageExpr>,
        mask: Box<ImageExpr>,
    },
    /// Mask an image with itself (zero pixels become transparent).
    SelfMask(Box<ImageExpr>),
    /// Restrict an image's spatial domain to a geometry.
    Clip {
        image: Box<ImageExpr>,
        geometry: AoiGeometry,
    },
    /// Clip to the bounds of a geometry and resample to `scale` meters.
    ///
    /// Export requests carry no region or scale of their own; both travel
    /// inside the exported expression through this node.
    ClipToBoundsAndScale {
        image: Box<ImageExpr>,
        geometry: AoiGeometry,
        scale: f64,
    },
}

impl ImageExpr {
    /// Reference a single image asset.
    pub fn load(asset: impl Into<AssetId>) -> Self {
        Self::Load(asset.into())
    }

    /// Reference the first image of an image collection asset.
    pub fn first_of(collection: impl Into<AssetId>) -> Self {
        Self::FirstOfCollection(collection.into())
    }

    /// Compare every pixel against a constant.
    pub fn eq_constant(self, value: i64) -> Self {
        Self::Eq(Box::new(self), Box::new(Self::Constant(value)))
    }

    /// Per-pixel logical OR with another image.
    pub fn or(self, other: ImageExpr) -> Self {
        Self::Or(Box::new(self), Box::new(other))
    }

    /// Apply `mask` to this image.
    pub fn update_mask(self, mask: ImageExpr) -> Self {
        Self::UpdateMask {
            image: Box::new(self),
            mask: Box::new(mask),
        }
    }

    /// Mask this image with itself.
    pub fn self_mask(self) -> Self {
        Self::SelfMask(Box::new(self))
    }

    /// Clip this image to a geometry.
    pub fn clip(self, geometry: AoiGeometry) -> Self {
        Self::Clip {
            image: Box::new(self),
            geometry,
        }
    }

    /// Fix the output region and resolution of this image.
    pub fn clip_to_bounds_and_scale(self, geometry: AoiGeometry, scale: f64) -> Self {
        Self::ClipToBoundsAndScale {
            image: Box::new(self),
            geometry,
            scale,
        }
    }

    /// Serialize into the platform's expression graph.
    ///
    /// The whole tree is emitted as a single nested value under key `"0"`.
    pub fn to_expression(&self) -> Expression {
        Expression::single(self.to_node())
    }

    /// Convert this tree into a nested value node.
    pub fn to_node(&self) -> ValueNode {
        match self {
            Self::Load(asset) => {
                ValueNode::invoke("Image.load", [("id", ValueNode::constant(asset.as_str()))])
            }
            Self::FirstOfCollection(collection) => {
                let load = ValueNode::invoke(
                    "ImageCollection.load",
                    [("id", ValueNode::constant(collection.as_str()))],
                );
                ValueNode::invoke("Collection.first", [("collection", load)])
            }
            Self::Constant(value) => {
                ValueNode::invoke("Image.constant", [("value", ValueNode::constant(*value))])
            }
            Self::Eq(a, b) => {
                ValueNode::invoke("Image.eq", [("image1", a.to_node()), ("image2", b.to_node())])
            }
            Self::Or(a, b) => {
                ValueNode::invoke("Image.or", [("image1", a.to_node()), ("image2", b.to_node())])
            }
            Self::UpdateMask { image, mask } => ValueNode::invoke(
                "Image.updateMask",
                [("image", image.to_node()), ("mask", mask.to_node())],
            ),
            Self::SelfMask(image) => {
                ValueNode::invoke("Image.selfMask", [("image", image.to_node())])
            }
            Self::Clip { image, geometry } => ValueNode::invoke(
                "Image.clip",
                [("input", image.to_node()), ("geometry", geometry_node(geometry))],
            ),
            Self::ClipToBoundsAndScale {
                image,
                geometry,
                scale,
            } => ValueNode::invoke(
                "Image.clipToBoundsAndScale",
                [
                    ("input", image.to_node()),
                    ("geometry", geometry_node(geometry)),
                    ("scale", ValueNode::constant(*scale)),
                ],
            ),
        }
    }
}

/// Build the constructor node for a polygonal geometry.
pub fn geometry_node(geometry: &AoiGeometry) -> ValueNode {
    let constructor = match geometry {
        AoiGeometry::Polygon(_) => "GeometryConstructors.Polygon",
        AoiGeometry::MultiPolygon(_) => "GeometryConstructors.MultiPolygon",
    };
    ValueNode::invoke(
        constructor,
        [
            ("coordinates", ValueNode::Constant(geometry.coordinates())),
            ("geodesic", ValueNode::constant(false)),
        ],
    )
}

impl fmt::Display for ImageExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load(asset) => write!(f, "load({})", asset),
            Self::FirstOfCollection(collection) => write!(f, "first({})", collection),
            Self::Constant(value) => write!(f, "{}", value),
            Self::Eq(a, b) => write!(f, "eq({}, {})", a, b),
            Self::Or(a, b) => write!(f, "or({}, {})", a, b),
            Self::UpdateMask { image, mask } => write!(f, "updateMask({}, {})", image, mask),
            Self::SelfMask(image) => write!(f, "selfMask({})", image),
            Self::Clip { image, geometry } => write!(f, "clip({}, {})", image, geometry.kind()),
            Self::ClipToBoundsAndScale {
                image,
                geometry,
                scale,
            } => write!(f, "clipToBoundsAndScale({}, {}, {})", image, geometry.kind(), scale),
        }
    }
}
