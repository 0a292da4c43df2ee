//! Display strings for intensities, areas, and coordinates.

use std::fmt::Write as _;

use uhi_map_field_models::{GeoPoint, GridCell};

/// Intensity rounded to one decimal place (e.g. `"5.5"`).
#[must_use]
pub fn format_intensity(intensity: f64) -> String {
    format!("{intensity:.1}")
}

/// Area with a unit suited to its size.
///
/// Below 1 km² the value is shown in m²; below 100 km² with two decimals;
/// otherwise with one.
#[must_use]
pub fn format_area(area_km2: f64) -> String {
    if area_km2 < 1.0 {
        format!("{:.2} m²", area_km2 * 1_000_000.0)
    } else if area_km2 < 100.0 {
        format!("{area_km2:.2} km²")
    } else {
        format!("{area_km2:.1} km²")
    }
}

/// Numbered coordinate list, one `"n. lat, lng"` line per point with six
/// decimals.
#[must_use]
pub fn format_coordinates(coordinates: &[GeoPoint]) -> String {
    if coordinates.is_empty() {
        return "No coordinates".to_string();
    }

    let mut out = String::new();
    for (i, c) in coordinates.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = write!(out, "{}. {:.6}, {:.6}", i + 1, c.lat, c.lng);
    }
    out
}

/// Hover text for a grid cell.
#[must_use]
pub fn describe_cell(cell: &GridCell) -> String {
    format!(
        "{}: Feels {}°C hotter than rural average",
        cell.label,
        format_intensity(cell.intensity)
    )
}
