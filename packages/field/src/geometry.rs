//! Point-in-shape tests, centroids, areas, and extents for selection
//! shapes.
//!
//! Containment and area use the `geo` crate. Centroids are plain
//! coordinate averages in degrees, not area-weighted.

use geo::{ChamberlainDuquetteArea, Distance, Haversine, Intersects, LineString, Point, Polygon};
use uhi_map_field_models::{BoundingBox, GeoPoint, SelectionShape};

/// Mean Earth radius in meters, as used by haversine distance.
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

const SQ_METERS_PER_SQ_KM: f64 = 1_000_000.0;

/// Whether `point` lies inside `shape`.
///
/// Polygon and rectangle boundaries count as inside. Circles compare the
/// haversine distance to the radius. A point shape only contains the
/// identical coordinate. Polygons with fewer than three vertices, or with
/// a non-finite vertex, contain nothing.
///
/// For many tests against one shape use [`containment`], which builds the
/// polygon only once.
#[must_use]
pub fn contains(shape: &SelectionShape, point: &GeoPoint) -> bool {
    match shape {
        SelectionShape::Polygon { vertices } => {
            valid_polygon(vertices).is_some_and(|polygon| polygon.intersects(&to_point(point)))
        }
        SelectionShape::Rectangle { bounds } => bounds.contains(point),
        SelectionShape::Circle {
            center,
            radius_meters,
        } => Haversine.distance(to_point(center), to_point(point)) <= *radius_meters,
        SelectionShape::Point { point: p } => p == point,
    }
}

/// Point-in-shape predicate for `shape`, with the same answers as
/// [`contains`].
pub fn containment(shape: &SelectionShape) -> impl Fn(&GeoPoint) -> bool + '_ {
    let polygon = match shape {
        SelectionShape::Polygon { vertices } => valid_polygon(vertices),
        _ => None,
    };

    move |point: &GeoPoint| match shape {
        SelectionShape::Polygon { .. } => polygon
            .as_ref()
            .is_some_and(|polygon| polygon.intersects(&to_point(point))),
        _ => contains(shape, point),
    }
}

/// Representative center of a shape.
///
/// Circles use their center, rectangles the midpoint of opposite corners,
/// and polygons the arithmetic mean of their vertices. Returns `None` for
/// a polygon with no vertices.
#[must_use]
pub fn centroid(shape: &SelectionShape) -> Option<GeoPoint> {
    match shape {
        SelectionShape::Polygon { vertices } => {
            if vertices.is_empty() {
                return None;
            }
            #[allow(clippy::cast_precision_loss)]
            let n = vertices.len() as f64;
            let (lat, lng) = vertices
                .iter()
                .fold((0.0, 0.0), |(lat, lng), v| (lat + v.lat, lng + v.lng));
            Some(GeoPoint::new(lat / n, lng / n))
        }
        SelectionShape::Rectangle { bounds } => Some(bounds.center()),
        SelectionShape::Circle { center, .. } => Some(*center),
        SelectionShape::Point { point } => Some(*point),
    }
}

/// Surface area of a shape in square kilometers.
#[must_use]
pub fn area_km2(shape: &SelectionShape) -> f64 {
    let square_meters = match shape {
        SelectionShape::Polygon { vertices } => {
            valid_polygon(vertices).map_or(0.0, |p| p.chamberlain_duquette_unsigned_area())
        }
        SelectionShape::Point { .. } => 0.0,
        SelectionShape::Rectangle { bounds } => valid_polygon(&rectangle_corners(bounds))
            .map_or(0.0, |p| p.chamberlain_duquette_unsigned_area()),
        SelectionShape::Circle { radius_meters, .. } => {
            std::f64::consts::PI * radius_meters * radius_meters
        }
    };
    square_meters / SQ_METERS_PER_SQ_KM
}

/// Bounding box of a shape.
///
/// Circle extents use a flat degrees-per-meter approximation around the
/// center. Points and polygons with no vertices have no extent.
#[must_use]
pub fn bounds(shape: &SelectionShape) -> Option<BoundingBox> {
    match shape {
        SelectionShape::Polygon { vertices } => {
            let first = vertices.first()?;
            let init = BoundingBox::new(first.lng, first.lat, first.lng, first.lat);
            Some(vertices.iter().fold(init, |b, v| BoundingBox {
                north: b.north.max(v.lat),
                south: b.south.min(v.lat),
                east: b.east.max(v.lng),
                west: b.west.min(v.lng),
            }))
        }
        SelectionShape::Rectangle { bounds } => Some(*bounds),
        SelectionShape::Circle {
            center,
            radius_meters,
        } => {
            let dlat = (radius_meters / EARTH_RADIUS_METERS).to_degrees();
            let dlng = dlat / center.lat.to_radians().cos();
            Some(BoundingBox::new(
                center.lng - dlng,
                center.lat - dlat,
                center.lng + dlng,
                center.lat + dlat,
            ))
        }
        SelectionShape::Point { .. } => None,
    }
}

/// Coordinates shown for a selection: polygon vertices, rectangle
/// corners (north-west, north-east, south-east, south-west), a circle's
/// center, or the point itself.
#[must_use]
pub fn display_coordinates(shape: &SelectionShape) -> Vec<GeoPoint> {
    match shape {
        SelectionShape::Polygon { vertices } => vertices.clone(),
        SelectionShape::Rectangle { bounds } => vec![
            GeoPoint::new(bounds.north, bounds.west),
            GeoPoint::new(bounds.north, bounds.east),
            GeoPoint::new(bounds.south, bounds.east),
            GeoPoint::new(bounds.south, bounds.west),
        ],
        SelectionShape::Circle { center, .. } => vec![*center],
        SelectionShape::Point { point } => vec![*point],
    }
}

fn rectangle_corners(bounds: &BoundingBox) -> [GeoPoint; 4] {
    [
        GeoPoint::new(bounds.south, bounds.west),
        GeoPoint::new(bounds.south, bounds.east),
        GeoPoint::new(bounds.north, bounds.east),
        GeoPoint::new(bounds.north, bounds.west),
    ]
}

fn to_point(p: &GeoPoint) -> Point<f64> {
    Point::new(p.lng, p.lat)
}

/// The `geo` polygon for `vertices`, or `None` when there are fewer than
/// three vertices or any coordinate is not finite. A `NaN` vertex would
/// leave the ring unclosed, which `geo` does not accept.
fn valid_polygon(vertices: &[GeoPoint]) -> Option<Polygon<f64>> {
    let finite = vertices
        .iter()
        .all(|v| v.lat.is_finite() && v.lng.is_finite());
    (vertices.len() >= 3 && finite).then(|| to_polygon(vertices))
}

/// Builds a `geo` polygon (x = longitude, y = latitude). The ring is
/// closed automatically.
fn to_polygon(vertices: &[GeoPoint]) -> Polygon<f64> {
    let ring: LineString<f64> = vertices.iter().map(|v| (v.lng, v.lat)).collect();
    Polygon::new(ring, Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> SelectionShape {
        SelectionShape::Polygon {
            vertices: vec![
                GeoPoint::new(43.60, -79.40),
                GeoPoint::new(43.60, -79.30),
                GeoPoint::new(43.70, -79.35),
            ],
        }
    }

    #[test]
    fn polygon_containment() {
        let shape = triangle();
        assert!(contains(&shape, &GeoPoint::new(43.62, -79.35)));
        assert!(!contains(&shape, &GeoPoint::new(43.69, -79.39)));
        // Vertices and edges are inside.
        assert!(contains(&shape, &GeoPoint::new(43.60, -79.40)));
        assert!(contains(&shape, &GeoPoint::new(43.60, -79.35)));
    }

    #[test]
    fn degenerate_polygon_contains_nothing() {
        let shape = SelectionShape::Polygon {
            vertices: vec![GeoPoint::new(43.6, -79.4), GeoPoint::new(43.7, -79.3)],
        };
        assert!(!contains(&shape, &GeoPoint::new(43.6, -79.4)));
        assert!(centroid(&SelectionShape::Polygon { vertices: vec![] }).is_none());
    }

    #[test]
    fn non_finite_polygon_is_degenerate() {
        let shape = SelectionShape::Polygon {
            vertices: vec![
                GeoPoint::new(f64::NAN, -79.40),
                GeoPoint::new(43.60, -79.30),
                GeoPoint::new(43.70, -79.35),
            ],
        };
        let inside = GeoPoint::new(43.62, -79.35);
        assert!(!contains(&shape, &inside));
        assert!(!containment(&shape)(&inside));
        assert!(area_km2(&shape).abs() < f64::EPSILON);

        let infinite = SelectionShape::Polygon {
            vertices: vec![
                GeoPoint::new(43.60, f64::INFINITY),
                GeoPoint::new(43.60, -79.30),
                GeoPoint::new(43.70, -79.35),
            ],
        };
        assert!(!contains(&infinite, &inside));

        let rect = SelectionShape::Rectangle {
            bounds: BoundingBox::new(f64::NAN, 43.64, -79.38, 43.66),
        };
        assert!(area_km2(&rect).abs() < f64::EPSILON);
    }

    #[test]
    fn containment_matches_contains() {
        let circle = SelectionShape::Circle {
            center: GeoPoint::new(43.65, -79.38),
            radius_meters: 1_000.0,
        };
        let degenerate = SelectionShape::Polygon {
            vertices: vec![GeoPoint::new(43.6, -79.4), GeoPoint::new(43.7, -79.3)],
        };
        for shape in [triangle(), circle, degenerate] {
            let predicate = containment(&shape);
            for i in 0..20 {
                for j in 0..20 {
                    let p = GeoPoint::new(
                        f64::from(i).mul_add(0.006, 43.58),
                        f64::from(j).mul_add(0.008, -79.45),
                    );
                    assert_eq!(predicate(&p), contains(&shape, &p), "{shape:?} at {p:?}");
                }
            }
        }
    }

    #[test]
    fn rectangle_containment_is_edge_inclusive() {
        let shape = SelectionShape::Rectangle {
            bounds: BoundingBox::new(-79.40, 43.64, -79.38, 43.66),
        };
        assert!(contains(&shape, &GeoPoint::new(43.64, -79.40)));
        assert!(contains(&shape, &GeoPoint::new(43.65, -79.39)));
        assert!(!contains(&shape, &GeoPoint::new(43.67, -79.39)));
    }

    #[test]
    fn circle_containment_uses_meters() {
        let center = GeoPoint::new(43.65, -79.38);
        let shape = SelectionShape::Circle {
            center,
            radius_meters: 1_000.0,
        };
        // ~0.005° of latitude is ~556 m.
        assert!(contains(&shape, &GeoPoint::new(43.655, -79.38)));
        // ~0.01° of latitude is ~1112 m.
        assert!(!contains(&shape, &GeoPoint::new(43.66, -79.38)));
        assert!(contains(&shape, &center));
    }

    #[test]
    fn point_contains_only_itself() {
        let p = GeoPoint::new(43.65, -79.38);
        let shape = SelectionShape::Point { point: p };
        assert!(contains(&shape, &p));
        assert!(!contains(&shape, &GeoPoint::new(43.65, -79.380_001)));
    }

    #[test]
    fn centroids() {
        let c = centroid(&triangle()).unwrap();
        assert!((c.lat - 43.633_333_333).abs() < 1e-6);
        assert!((c.lng - -79.35).abs() < 1e-9);

        let rect = SelectionShape::Rectangle {
            bounds: BoundingBox::new(-79.40, 43.64, -79.38, 43.66),
        };
        let c = centroid(&rect).unwrap();
        assert!((c.lat - 43.65).abs() < 1e-9);
        assert!((c.lng - -79.39).abs() < 1e-9);

        let center = GeoPoint::new(43.7, -79.4);
        assert_eq!(
            centroid(&SelectionShape::Circle {
                center,
                radius_meters: 10.0
            }),
            Some(center)
        );
    }

    #[test]
    fn polygon_centroid_is_vertex_mean_not_area_weighted() {
        // Extra vertices bunched on one edge pull the mean toward it.
        let shape = SelectionShape::Polygon {
            vertices: vec![
                GeoPoint::new(0.0, 0.0),
                GeoPoint::new(0.0, 1.0),
                GeoPoint::new(0.0, 2.0),
                GeoPoint::new(0.0, 3.0),
                GeoPoint::new(4.0, 3.0),
                GeoPoint::new(4.0, 0.0),
            ],
        };
        let c = centroid(&shape).unwrap();
        assert!((c.lat - 8.0 / 6.0).abs() < 1e-12);
        assert!((c.lng - 1.5).abs() < 1e-12);
    }

    #[test]
    fn areas() {
        let circle = SelectionShape::Circle {
            center: GeoPoint::new(43.65, -79.38),
            radius_meters: 1_000.0,
        };
        assert!((area_km2(&circle) - std::f64::consts::PI).abs() < 1e-9);

        // A 0.02° x 0.02° cell in Toronto is roughly 2.22 km x 1.61 km.
        let rect = SelectionShape::Rectangle {
            bounds: BoundingBox::new(-79.40, 43.64, -79.38, 43.66),
        };
        let area = area_km2(&rect);
        assert!((3.3..3.8).contains(&area), "rectangle area {area}");

        assert!(area_km2(&SelectionShape::Point {
            point: GeoPoint::new(43.65, -79.38)
        })
        .abs()
            < f64::EPSILON);
    }

    #[test]
    fn bounds_of_shapes() {
        let b = bounds(&triangle()).unwrap();
        assert!((b.north - 43.70).abs() < 1e-12);
        assert!((b.south - 43.60).abs() < 1e-12);
        assert!((b.east - -79.30).abs() < 1e-12);
        assert!((b.west - -79.40).abs() < 1e-12);

        let circle = SelectionShape::Circle {
            center: GeoPoint::new(43.65, -79.38),
            radius_meters: 1_000.0,
        };
        let b = bounds(&circle).unwrap();
        assert!(b.is_well_formed());
        assert!((b.height() - 0.017_986).abs() < 1e-4, "{}", b.height());
        assert!(b.width() > b.height());

        assert!(
            bounds(&SelectionShape::Point {
                point: GeoPoint::new(1.0, 1.0)
            })
            .is_none()
        );
    }

    #[test]
    fn rectangle_display_order() {
        let shape = SelectionShape::Rectangle {
            bounds: BoundingBox::new(-79.40, 43.64, -79.38, 43.66),
        };
        assert_eq!(
            display_coordinates(&shape),
            vec![
                GeoPoint::new(43.66, -79.40),
                GeoPoint::new(43.66, -79.38),
                GeoPoint::new(43.64, -79.38),
                GeoPoint::new(43.64, -79.40),
            ]
        );
    }
}
