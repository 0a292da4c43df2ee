#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the heat map server.
//!
//! These types define the JSON contract between the Rust backend and
//! the map front end.

use serde::{Deserialize, Serialize};
use uhi_map_field_models::{
    AreaSelection, BoundingBox, GeoPoint, GridCell, HeatBucket, IntensityValue, RegionRule,
    color_for,
};

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
    /// Identifier of the field being served.
    pub field: String,
    /// Whether generated fields are reused across requests.
    pub cached: bool,
}

/// One row of the map legend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLegendEntry {
    /// Bucket identifier.
    pub bucket: HeatBucket,
    /// Legend text (e.g. "3-4°C hotter").
    pub label: String,
    /// Fill color as `#RRGGBB`.
    pub color: String,
}

impl From<HeatBucket> for ApiLegendEntry {
    fn from(bucket: HeatBucket) -> Self {
        Self {
            bucket,
            label: bucket.label().to_string(),
            color: bucket.color().to_string(),
        }
    }
}

/// A region rule as presented to the front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRegion {
    /// Region name.
    pub label: String,
    /// Region extent.
    pub bounds: BoundingBox,
    /// How the intensity is produced.
    pub intensity: IntensityValue,
    /// Lowest intensity the region can produce.
    pub min_intensity: f64,
    /// Highest intensity the region can produce (exclusive for jittered
    /// regions).
    pub max_intensity: f64,
    /// Legend color of the lowest intensity.
    pub color: String,
    /// Label of an earlier region whose box fully covers this one, making
    /// it unreachable.
    pub shadowed_by: Option<String>,
}

impl ApiRegion {
    /// Builds the API view of `rule`.
    #[must_use]
    pub fn new(rule: &RegionRule, shadowed_by: Option<&RegionRule>) -> Self {
        let (min_intensity, max_intensity) = rule.intensity.range();
        Self {
            label: rule.label.clone(),
            bounds: BoundingBox::new(rule.lng_min, rule.lat_min, rule.lng_max, rule.lat_max),
            intensity: rule.intensity,
            min_intensity,
            max_intensity,
            color: color_for(min_intensity).to_string(),
            shadowed_by: shadowed_by.map(|r| r.label.clone()),
        }
    }
}

/// Response from the regions endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRegions {
    /// Field identifier.
    pub id: String,
    /// Human-readable field name.
    pub name: String,
    /// Area covered by the grid.
    pub bounds: BoundingBox,
    /// Default cell size in degrees.
    pub cell_size_degrees: f64,
    /// Label used when no region matches.
    pub fallback_label: String,
    /// Intensity used when no region matches.
    pub fallback_intensity: IntensityValue,
    /// Regions in priority order.
    pub regions: Vec<ApiRegion>,
}

/// Query parameters naming a single coordinate.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointQueryParams {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl From<PointQueryParams> for GeoPoint {
    fn from(params: PointQueryParams) -> Self {
        Self::new(params.lat, params.lng)
    }
}

/// Query parameters for the grid endpoint.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridQueryParams {
    /// Cell size override in degrees.
    pub cell_size: Option<f64>,
}

/// Response from the classify endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiClassification {
    /// The classified point.
    pub point: GeoPoint,
    /// Intensity in °C above the rural baseline.
    pub intensity: f64,
    /// Region label.
    pub label: String,
    /// Legend color for the intensity.
    pub color: String,
}

/// Response from the nearest-cell endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiNearestCell {
    /// The cell whose center is closest to the query point.
    pub cell: GridCell,
    /// Center of that cell.
    pub center: GeoPoint,
    /// Planar distance from the query point to the center, in degrees.
    pub distance_degrees: f64,
    /// Hover text for the cell.
    pub description: String,
    /// Legend color for the cell.
    pub color: String,
}

/// Response from the aggregate endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSelection {
    /// Full selection summary.
    #[serde(flatten)]
    pub selection: AreaSelection,
    /// Average intensity rounded for display.
    pub average_text: String,
    /// Area with display units.
    pub area_text: String,
    /// Legend color for the average intensity.
    pub color: String,
}

/// Response from the regenerate endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRegenerated {
    /// Number of cells in the new field.
    pub cell_count: usize,
    /// Whether the new field will be reused by later requests.
    pub cached: bool,
}

/// Error body returned with 4xx and 5xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// What went wrong.
    pub error: String,
}

impl ApiError {
    /// Creates an error body.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
