//! Intensity statistics for a selection shape.
//!
//! A cell counts toward a selection when any of its four corners lies
//! inside the shape. Cells whose body crosses the shape without a corner
//! inside are missed; true polygon intersection would change reported
//! averages, so the corner test is kept.

use uhi_map_field_models::{AggregateResult, AggregateSource, GeoPoint, GridCell, SelectionShape};

use crate::geometry;
use crate::nearest::nearest;

/// Summarizes the intensities of cells that overlap `shape`.
///
/// When no cell has a corner inside the shape (common for selections
/// smaller than one cell), the cell nearest the shape's centroid stands
/// in as a single-cell result. An empty field, or a shape without a
/// centroid, yields [`AggregateResult::no_data`].
///
/// Values are returned at full precision; rounding is left to display.
#[must_use]
pub fn aggregate(shape: &SelectionShape, cells: &[GridCell]) -> AggregateResult {
    aggregate_with(cells, shape, geometry::containment(shape))
}

/// [`aggregate`] with a caller-supplied point-in-shape predicate.
///
/// `shape` is only used to find the centroid for the nearest-cell
/// fallback.
pub fn aggregate_with(
    cells: &[GridCell],
    shape: &SelectionShape,
    contains: impl Fn(&GeoPoint) -> bool,
) -> AggregateResult {
    let mut total = 0.0;
    let mut maximum = f64::NEG_INFINITY;
    let mut minimum = f64::INFINITY;
    let mut count = 0_usize;

    for cell in overlapping(cells, &contains) {
        total += cell.intensity;
        maximum = maximum.max(cell.intensity);
        minimum = minimum.min(cell.intensity);
        count += 1;
    }

    if count > 0 {
        #[allow(clippy::cast_precision_loss)]
        let average = total / count as f64;
        return AggregateResult {
            average,
            maximum,
            minimum,
            cell_count: count,
            source: AggregateSource::Overlap,
        };
    }

    let Some(center) = geometry::centroid(shape) else {
        log::debug!("Selection has no centroid, reporting no data");
        return AggregateResult::no_data();
    };

    nearest(&center, cells).map_or_else(
        || {
            log::debug!("Heat field is empty, reporting no data");
            AggregateResult::no_data()
        },
        |cell| {
            log::debug!(
                "No cell overlaps the {} selection, using nearest cell '{}'",
                shape.kind(),
                cell.label
            );
            AggregateResult::single_cell(cell.intensity)
        },
    )
}

/// Cells with at least one corner for which `contains` holds, in field
/// order.
pub fn overlapping<'a, F>(
    cells: &'a [GridCell],
    contains: &'a F,
) -> impl Iterator<Item = &'a GridCell>
where
    F: Fn(&GeoPoint) -> bool,
{
    cells
        .iter()
        .filter(move |cell| cell.polygon.iter().any(|corner| contains(corner)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::generate_field;
    use crate::registry;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use uhi_map_field_models::BoundingBox;

    fn cell(lat: f64, lng: f64, intensity: f64) -> GridCell {
        GridCell {
            polygon: [
                GeoPoint::new(lat, lng),
                GeoPoint::new(lat, lng + 1.0),
                GeoPoint::new(lat + 1.0, lng + 1.0),
                GeoPoint::new(lat + 1.0, lng),
            ],
            intensity,
            label: format!("{lat},{lng}"),
        }
    }

    /// 3x3 block of unit cells with intensities 1..=9.
    fn block() -> Vec<GridCell> {
        let mut cells = Vec::new();
        for row in 0..3 {
            for col in 0..3 {
                cells.push(cell(
                    f64::from(row),
                    f64::from(col),
                    f64::from(row * 3 + col + 1),
                ));
            }
        }
        cells
    }

    #[test]
    fn averages_overlapping_cells() {
        // Strictly inside the center cell's north-east quadrant, covering
        // only the shared corner at (2, 2).
        let shape = SelectionShape::Rectangle {
            bounds: BoundingBox::new(1.5, 1.5, 2.5, 2.5),
        };
        let result = aggregate(&shape, &block());
        assert_eq!(result.cell_count, 4);
        assert_eq!(result.source, AggregateSource::Overlap);
        // Cells 5, 6, 8, 9 share the corner (2, 2).
        assert!((result.average - 7.0).abs() < 1e-12);
        assert!((result.maximum - 9.0).abs() < 1e-12);
        assert!((result.minimum - 5.0).abs() < 1e-12);
    }

    #[test]
    fn small_selection_falls_back_to_nearest() {
        let cells = block();
        let shape = SelectionShape::Rectangle {
            bounds: BoundingBox::new(0.2, 2.2, 0.4, 2.4),
        };
        let result = aggregate(&shape, &cells);
        assert_eq!(result.cell_count, 1);
        assert_eq!(result.source, AggregateSource::NearestCell);
        assert!((result.average - result.maximum).abs() < f64::EPSILON);
        assert!((result.average - result.minimum).abs() < f64::EPSILON);
        // Centroid (2.3, 0.3) is inside the north-west cell (intensity 7).
        assert!((result.average - 7.0).abs() < 1e-12);
    }

    #[test]
    fn point_selection_uses_nearest_cell() {
        let result = aggregate(
            &SelectionShape::Point {
                point: GeoPoint::new(0.4, 1.6),
            },
            &block(),
        );
        assert_eq!(result.cell_count, 1);
        assert!((result.average - 2.0).abs() < 1e-12);
    }

    #[test]
    fn body_overlap_without_corner_is_missed() {
        // A thin strip through the middle of the center cell touches no
        // corner, so only the nearest-cell fallback applies.
        let shape = SelectionShape::Polygon {
            vertices: vec![
                GeoPoint::new(1.4, 0.5),
                GeoPoint::new(1.4, 2.5),
                GeoPoint::new(1.6, 2.5),
                GeoPoint::new(1.6, 0.5),
            ],
        };
        let result = aggregate(&shape, &block());
        assert_eq!(result.source, AggregateSource::NearestCell);
        assert!((result.average - 5.0).abs() < 1e-12);
    }

    #[test]
    fn non_finite_polygon_does_not_panic() {
        let shape = SelectionShape::Polygon {
            vertices: vec![
                GeoPoint::new(f64::NAN, 0.5),
                GeoPoint::new(0.5, 2.5),
                GeoPoint::new(2.5, 1.5),
            ],
        };
        let result = aggregate(&shape, &block());
        // No corner can be inside, so the centroid fallback decides.
        assert_ne!(result.source, AggregateSource::Overlap);
    }

    #[test]
    fn empty_field_reports_no_data() {
        let shape = SelectionShape::Circle {
            center: GeoPoint::new(43.65, -79.38),
            radius_meters: 500.0,
        };
        assert_eq!(aggregate(&shape, &[]), AggregateResult::no_data());
    }

    #[test]
    fn shape_without_centroid_reports_no_data() {
        let shape = SelectionShape::Polygon { vertices: vec![] };
        assert_eq!(aggregate(&shape, &block()), AggregateResult::no_data());
    }

    #[test]
    fn custom_predicate() {
        let shape = SelectionShape::Point {
            point: GeoPoint::new(0.0, 0.0),
        };
        let result = aggregate_with(&block(), &shape, |p| p.lat <= 1.0);
        // Rows 0 and 1 both have a corner at lat <= 1.
        assert_eq!(result.cell_count, 6);
        assert!((result.average - 3.5).abs() < 1e-12);
    }

    /// Independent reference: loop over every cell and corner directly.
    fn reference_count(cells: &[GridCell], bounds: &BoundingBox) -> usize {
        let mut count = 0;
        for cell in cells {
            let mut inside = false;
            for v in &cell.polygon {
                if v.lat >= bounds.south
                    && v.lat <= bounds.north
                    && v.lng >= bounds.west
                    && v.lng <= bounds.east
                {
                    inside = true;
                }
            }
            if inside {
                count += 1;
            }
        }
        count
    }

    #[test]
    fn toronto_rectangle_over_one_cell_and_neighbor_corner() {
        let field = registry::default_field();
        let cells = generate_field(&field, &mut StdRng::seed_from_u64(42)).unwrap();

        // One full cell in the middle of the grid, extended just far
        // enough north-east to touch the corner of the diagonal neighbor.
        let target = &cells[5 * 20 + 7];
        let b = target.bounds();
        let ne_neighbor = &cells[6 * 20 + 8];
        let touch = ne_neighbor.polygon[0];
        assert_eq!(touch, target.polygon[2]);

        let bounds = BoundingBox::new(b.west, b.south, touch.lng + 1e-4, touch.lat + 1e-4);
        let shape = SelectionShape::Rectangle { bounds };
        let result = aggregate(&shape, &cells);

        let expected = reference_count(&cells, &bounds);
        assert_eq!(result.cell_count, expected);
        assert_eq!(result.source, AggregateSource::Overlap);
        // The target, its eight neighbors: all share a corner with the box.
        assert_eq!(expected, 9);

        let overlapping: Vec<&GridCell> = cells
            .iter()
            .filter(|c| c.polygon.iter().any(|v| bounds.contains(v)))
            .collect();
        #[allow(clippy::cast_precision_loss)]
        let mean = overlapping.iter().map(|c| c.intensity).sum::<f64>() / overlapping.len() as f64;
        assert!((result.average - mean).abs() < 1e-9);
    }
}
