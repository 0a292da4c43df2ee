#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory spatial index for nearest heat-cell lookups.
//!
//! Bulk-loads grid cell centers into an R-tree. Answers match the linear
//! scan in `uhi_map_field::nearest` exactly, including the rule that
//! equidistant cells resolve to the one generated first. Distances are
//! planar in degrees.

use rstar::{AABB, PointDistance, RTree, RTreeObject};
use uhi_map_field_models::{GeoPoint, GridCell};

/// A cell center stored in the R-tree with its position in the field.
struct CenterEntry {
    /// `[lng, lat]`
    center: [f64; 2],
    index: usize,
}

impl RTreeObject for CenterEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.center)
    }
}

impl PointDistance for CenterEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        GeoPoint::new(point[1], point[0])
            .planar_distance_squared(&GeoPoint::new(self.center[1], self.center[0]))
    }
}

/// Pre-built index over one generated field.
///
/// Borrows the cells it was built from, so it cannot outlive the field.
pub struct CellIndex<'a> {
    cells: &'a [GridCell],
    tree: RTree<CenterEntry>,
}

impl<'a> CellIndex<'a> {
    /// Builds an index over `cells`.
    #[must_use]
    pub fn build(cells: &'a [GridCell]) -> Self {
        let entries = cells
            .iter()
            .enumerate()
            .map(|(index, cell)| {
                let center = cell.center();
                CenterEntry {
                    center: [center.lng, center.lat],
                    index,
                }
            })
            .collect();
        let tree = RTree::bulk_load(entries);
        log::debug!("Indexed {} cell centers", tree.size());
        Self { cells, tree }
    }

    /// Number of indexed cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Whether the index holds no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// The cell whose center is closest to `point`.
    ///
    /// Among equidistant centers the earliest generated cell wins.
    /// Returns `None` only for an empty index.
    #[must_use]
    pub fn nearest(&self, point: &GeoPoint) -> Option<&'a GridCell> {
        let query = [point.lng, point.lat];
        let mut candidates = self.tree.nearest_neighbor_iter_with_distance_2(&query);

        let (first, best_distance) = candidates.next()?;
        let mut best_index = first.index;

        // The iterator yields in non-decreasing distance order, so only the
        // leading run of equal distances can tie.
        for (entry, distance) in candidates {
            if distance > best_distance {
                break;
            }
            best_index = best_index.min(entry.index);
        }

        self.cells.get(best_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use uhi_map_field::grid::generate_field;
    use uhi_map_field::registry;

    fn unit_cell(lat: f64, lng: f64, label: &str) -> GridCell {
        GridCell {
            polygon: [
                GeoPoint::new(lat, lng),
                GeoPoint::new(lat, lng + 1.0),
                GeoPoint::new(lat + 1.0, lng + 1.0),
                GeoPoint::new(lat + 1.0, lng),
            ],
            intensity: 1.0,
            label: label.to_string(),
        }
    }

    #[test]
    fn empty_index() {
        let index = CellIndex::build(&[]);
        assert!(index.is_empty());
        assert!(index.nearest(&GeoPoint::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn matches_linear_scan_on_toronto_field() {
        let field = registry::default_field();
        let cells = generate_field(&field, &mut StdRng::seed_from_u64(7)).unwrap();
        let index = CellIndex::build(&cells);
        assert_eq!(index.len(), cells.len());

        for i in 0..=60 {
            for j in 0..=60 {
                let p = GeoPoint::new(
                    f64::from(i).mul_add(0.005, 43.55),
                    f64::from(j).mul_add(0.008, -79.60),
                );
                let linear = uhi_map_field::nearest(&p, &cells).unwrap();
                let indexed = index.nearest(&p).unwrap();
                assert!(
                    std::ptr::eq(linear, indexed),
                    "{p:?}: linear {:?} vs indexed {:?}",
                    linear.center(),
                    indexed.center()
                );
            }
        }
    }

    #[test]
    fn ties_go_to_first_cell() {
        let cells = vec![
            unit_cell(0.0, 0.0, "a"),
            unit_cell(0.0, 1.0, "b"),
            unit_cell(1.0, 0.0, "c"),
            unit_cell(1.0, 1.0, "d"),
        ];
        let index = CellIndex::build(&cells);
        assert_eq!(index.nearest(&GeoPoint::new(1.0, 1.0)).unwrap().label, "a");

        let reversed: Vec<GridCell> = cells.into_iter().rev().collect();
        let index = CellIndex::build(&reversed);
        assert_eq!(index.nearest(&GeoPoint::new(1.0, 1.0)).unwrap().label, "d");
    }
}
