#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Heat field, grid cell, and selection shape types.
//!
//! These types are shared by the field generator, the HTTP API, and the
//! CLI. Coordinates are plain WGS84 degrees with no wraparound handling;
//! every field covers a small regional bounding box, so latitude and
//! longitude are treated as a flat Cartesian plane.

pub mod legend;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use legend::{HeatBucket, color_for};

/// A geographic point in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude (WGS84).
    pub lat: f64,
    /// Longitude (WGS84).
    pub lng: f64,
}

impl GeoPoint {
    /// Creates a new point from latitude and longitude.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Euclidean distance in degrees, treating lat/lng as a flat plane.
    #[must_use]
    pub fn planar_distance(&self, other: &Self) -> f64 {
        self.planar_distance_squared(other).sqrt()
    }

    /// Squared planar distance in degrees².
    ///
    /// Nearest-cell searches compare this value so that every search
    /// strategy sees bit-identical distances and breaks ties the same way.
    #[must_use]
    #[allow(clippy::suboptimal_flops)]
    pub fn planar_distance_squared(&self, other: &Self) -> f64 {
        let dlat = self.lat - other.lat;
        let dlng = self.lng - other.lng;
        dlat * dlat + dlng * dlng
    }

    /// Midpoint of two points (arithmetic mean of each coordinate).
    #[must_use]
    pub fn midpoint(&self, other: &Self) -> Self {
        Self {
            lat: (self.lat + other.lat) / 2.0,
            lng: (self.lng + other.lng) / 2.0,
        }
    }
}

/// An axis-aligned geographic bounding box.
///
/// A well-formed box has `north > south` and `east > west`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Northern latitude boundary.
    pub north: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Western longitude boundary.
    pub west: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// Latitude extent in degrees.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Longitude extent in degrees.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Midpoint of the south-west and north-east corners.
    #[must_use]
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.north + self.south) / 2.0,
            (self.east + self.west) / 2.0,
        )
    }

    /// Whether `point` lies inside the box, edges included.
    #[must_use]
    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.lat >= self.south
            && point.lat <= self.north
            && point.lng >= self.west
            && point.lng <= self.east
    }

    /// Whether all four edges are finite and `north > south`, `east > west`.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        [self.north, self.south, self.east, self.west]
            .iter()
            .all(|v| v.is_finite())
            && self.north > self.south
            && self.east > self.west
    }
}

/// One square cell of a generated heat field.
///
/// Corners are stored in generation order: south-west, south-east,
/// north-east, north-west.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    /// The four corners of the cell.
    pub polygon: [GeoPoint; 4],
    /// Heat island intensity in °C above the rural baseline.
    pub intensity: f64,
    /// Name of the region rule that produced the intensity.
    pub label: String,
}

impl GridCell {
    /// Center of the cell, taken as the midpoint of two opposite corners.
    #[must_use]
    pub fn center(&self) -> GeoPoint {
        self.polygon[0].midpoint(&self.polygon[2])
    }

    /// Bounding box of the cell.
    #[must_use]
    pub fn bounds(&self) -> BoundingBox {
        let sw = self.polygon[0];
        let ne = self.polygon[2];
        BoundingBox::new(sw.lng, sw.lat, ne.lng, ne.lat)
    }
}

/// The result of classifying a single point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Heat island intensity in °C.
    pub intensity: f64,
    /// Region label.
    pub label: String,
}

/// The kind of a [`SelectionShape`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ShapeKind {
    /// Free-form polygon.
    Polygon,
    /// Axis-aligned rectangle.
    Rectangle,
    /// Circle with a radius in meters.
    Circle,
    /// Single clicked point.
    Point,
}

impl ShapeKind {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Polygon, Self::Rectangle, Self::Circle, Self::Point]
    }

    /// Human-readable, capitalized name (e.g. `"Rectangle"`).
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Polygon => "Polygon",
            Self::Rectangle => "Rectangle",
            Self::Circle => "Circle",
            Self::Point => "Point",
        }
    }
}

/// A user-drawn selection on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "lowercase",
    rename_all_fields = "camelCase"
)]
pub enum SelectionShape {
    /// Closed polygon; the ring is implicitly closed.
    Polygon {
        /// Polygon vertices in drawing order.
        vertices: Vec<GeoPoint>,
    },
    /// Axis-aligned rectangle.
    Rectangle {
        /// Rectangle edges.
        bounds: BoundingBox,
    },
    /// Circle on the Earth's surface.
    Circle {
        /// Circle center.
        center: GeoPoint,
        /// Radius in meters.
        radius_meters: f64,
    },
    /// Single point.
    Point {
        /// The clicked point.
        point: GeoPoint,
    },
}

impl SelectionShape {
    /// Returns the [`ShapeKind`] of this shape.
    #[must_use]
    pub const fn kind(&self) -> ShapeKind {
        match self {
            Self::Polygon { .. } => ShapeKind::Polygon,
            Self::Rectangle { .. } => ShapeKind::Rectangle,
            Self::Circle { .. } => ShapeKind::Circle,
            Self::Point { .. } => ShapeKind::Point,
        }
    }
}

/// How an [`AggregateResult`] was obtained.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AggregateSource {
    /// At least one cell had a vertex inside the shape.
    Overlap,
    /// No cell overlapped; the cell nearest the shape's centroid was used.
    NearestCell,
    /// The field was empty (or the shape had no centroid).
    NoData,
}

/// Summary of cell intensities within a selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    /// Arithmetic mean intensity.
    pub average: f64,
    /// Highest intensity.
    pub maximum: f64,
    /// Lowest intensity.
    pub minimum: f64,
    /// Number of contributing cells.
    pub cell_count: usize,
    /// How the result was obtained.
    pub source: AggregateSource,
}

impl AggregateResult {
    /// A synthetic result backed by one cell.
    #[must_use]
    pub const fn single_cell(intensity: f64) -> Self {
        Self {
            average: intensity,
            maximum: intensity,
            minimum: intensity,
            cell_count: 1,
            source: AggregateSource::NearestCell,
        }
    }

    /// The "no data available" result: zero intensity, zero cells.
    #[must_use]
    pub const fn no_data() -> Self {
        Self {
            average: 0.0,
            maximum: 0.0,
            minimum: 0.0,
            cell_count: 0,
            source: AggregateSource::NoData,
        }
    }
}

/// Intensity produced by a region rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IntensityValue {
    /// Always the same value.
    Fixed {
        /// Intensity in °C.
        value: f64,
    },
    /// `base + U[0, 1) * spread`.
    Jittered {
        /// Lower bound of the range.
        base: f64,
        /// Width of the range.
        spread: f64,
    },
}

impl IntensityValue {
    /// Half-open range of values this rule can produce, as `(min, max)`.
    ///
    /// For fixed values both ends are equal.
    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        match *self {
            Self::Fixed { value } => (value, value),
            Self::Jittered { base, spread } => (base, base + spread),
        }
    }
}

/// A rectangular region with its intensity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRule {
    /// Region name (e.g. "Financial District").
    pub label: String,
    /// Southern edge, inclusive.
    pub lat_min: f64,
    /// Northern edge, inclusive.
    pub lat_max: f64,
    /// Western edge, inclusive.
    pub lng_min: f64,
    /// Eastern edge, inclusive.
    pub lng_max: f64,
    /// Intensity for points in this region.
    pub intensity: IntensityValue,
}

impl RegionRule {
    /// Whether `point` falls inside this rule's box, edges included.
    ///
    /// `NaN` coordinates never match.
    #[must_use]
    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.lat >= self.lat_min
            && point.lat <= self.lat_max
            && point.lng >= self.lng_min
            && point.lng <= self.lng_max
    }

    /// Whether this rule's box lies entirely within `other`'s box.
    #[must_use]
    pub fn is_within(&self, other: &Self) -> bool {
        self.lat_min >= other.lat_min
            && self.lat_max <= other.lat_max
            && self.lng_min >= other.lng_min
            && self.lng_max <= other.lng_max
    }
}

/// Intensity used when no region rule matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackRule {
    /// Label for unmatched points (e.g. "Toronto Area").
    pub label: String,
    /// Intensity for unmatched points.
    pub intensity: IntensityValue,
}

/// A complete heat field: extent, resolution, and region rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Unique identifier (e.g. `"toronto"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Area covered by the generated grid.
    pub bounds: BoundingBox,
    /// Default side length of a grid cell, in degrees.
    pub cell_size_degrees: f64,
    /// Rule applied when nothing in `rules` matches.
    pub fallback: FallbackRule,
    /// Region rules in priority order; the first match wins.
    #[serde(default)]
    pub rules: Vec<RegionRule>,
}

/// Lifecycle of a map selection.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SelectionStatus {
    /// Nothing selected.
    Idle,
    /// Waiting for the user to finish drawing.
    Selecting,
    /// A shape has been drawn and summarized.
    Selected,
}

impl SelectionStatus {
    /// Status line shown next to the map.
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Self::Idle => "No area selected",
            Self::Selecting => "Selecting area...",
            Self::Selected => "Area selected",
        }
    }
}

/// A completed selection with its heat summary.
///
/// This is the document exported as `selected-area.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaSelection {
    /// Shape kind.
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    /// The drawn shape.
    pub shape: SelectionShape,
    /// Display coordinates (rectangle corners, circle center, ...).
    pub coordinates: Vec<GeoPoint>,
    /// Surface area in square kilometers.
    pub area_km2: f64,
    /// Bounding box of the shape, if it has extent.
    pub bounds: Option<BoundingBox>,
    /// Heat intensity summary.
    pub heat: AggregateResult,
}
