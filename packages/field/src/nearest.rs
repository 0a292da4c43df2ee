//! Nearest-cell lookup by linear scan.
//!
//! Fields hold a few thousand cells at most, so a brute-force scan is
//! fast enough. See `uhi_map_spatial` for an R-tree backed index that
//! returns the same answers.

use uhi_map_field_models::{GeoPoint, GridCell};

/// Returns the cell whose center is closest to `point` in planar degrees.
///
/// Equidistant cells resolve to the one that appears first in `cells`.
/// Returns `None` only when `cells` is empty, which callers should treat
/// as "no data available".
#[must_use]
pub fn nearest<'a>(point: &GeoPoint, cells: &'a [GridCell]) -> Option<&'a GridCell> {
    nearest_with_distance(point, cells).map(|(cell, _)| cell)
}

/// Like [`nearest`], also returning the planar distance in degrees.
#[must_use]
pub fn nearest_with_distance<'a>(
    point: &GeoPoint,
    cells: &'a [GridCell],
) -> Option<(&'a GridCell, f64)> {
    let mut best: Option<(&GridCell, f64)> = None;

    for cell in cells {
        let distance_2 = point.planar_distance_squared(&cell.center());
        match best {
            Some((_, best_distance_2)) if distance_2 >= best_distance_2 => {}
            _ => best = Some((cell, distance_2)),
        }
    }

    best.map(|(cell, distance_2)| (cell, distance_2.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(lat: f64, lng: f64, intensity: f64, label: &str) -> GridCell {
        sized_cell(lat, lng, 0.02, intensity, label)
    }

    fn sized_cell(lat: f64, lng: f64, size: f64, intensity: f64, label: &str) -> GridCell {
        GridCell {
            polygon: [
                GeoPoint::new(lat, lng),
                GeoPoint::new(lat, lng + size),
                GeoPoint::new(lat + size, lng + size),
                GeoPoint::new(lat + size, lng),
            ],
            intensity,
            label: label.to_string(),
        }
    }

    fn fixture() -> Vec<GridCell> {
        vec![
            cell(43.60, -79.40, 1.0, "a"),
            cell(43.60, -79.38, 2.0, "b"),
            cell(43.62, -79.40, 3.0, "c"),
            cell(43.62, -79.38, 4.0, "d"),
            cell(43.70, -79.20, 5.0, "e"),
        ]
    }

    #[test]
    fn empty_field_has_no_nearest() {
        assert!(nearest(&GeoPoint::new(43.65, -79.38), &[]).is_none());
    }

    #[test]
    fn picks_closest_center() {
        let cells = fixture();
        assert_eq!(nearest(&GeoPoint::new(43.631, -79.371), &cells).unwrap().label, "d");
        assert_eq!(nearest(&GeoPoint::new(43.80, -79.10), &cells).unwrap().label, "e");
        assert_eq!(nearest(&GeoPoint::new(43.0, -80.0), &cells).unwrap().label, "a");
    }

    #[test]
    fn no_other_center_is_closer() {
        let cells = fixture();
        for i in 0..=40 {
            for j in 0..=40 {
                let p = GeoPoint::new(
                    f64::from(i).mul_add(0.005, 43.55),
                    f64::from(j).mul_add(0.01, -79.45),
                );
                let (found, distance) = nearest_with_distance(&p, &cells).unwrap();
                for other in &cells {
                    assert!(
                        distance <= p.planar_distance(&other.center()) + 1e-15,
                        "{p:?}: {} is closer than {}",
                        other.label,
                        found.label
                    );
                }
            }
        }
    }

    #[test]
    fn ties_go_to_first_cell() {
        let cells = vec![
            sized_cell(0.0, 0.0, 1.0, 1.0, "a"),
            sized_cell(0.0, 1.0, 1.0, 2.0, "b"),
            sized_cell(1.0, 0.0, 1.0, 3.0, "c"),
            sized_cell(1.0, 1.0, 1.0, 4.0, "d"),
        ];
        // Equidistant from all four centers.
        let p = GeoPoint::new(1.0, 1.0);
        assert_eq!(nearest(&p, &cells).unwrap().label, "a");

        let mut reversed = cells;
        reversed.reverse();
        assert_eq!(nearest(&p, &reversed).unwrap().label, "d");
    }
}
