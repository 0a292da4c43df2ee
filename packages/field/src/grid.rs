//! Heat field grid generation.

use rand::Rng;
use uhi_map_field_models::{BoundingBox, FieldDefinition, GeoPoint, GridCell};

use crate::{FieldError, IntensityClassifier};

/// Slack used when counting cells so that floating point noise in
/// `extent / cell_size` does not add a sliver row or column.
const STEP_EPSILON: f64 = 1e-9;

/// Largest field [`generate`] will build. A 0.0005° grid over the whole
/// GTA box is about 430 000 cells.
pub const MAX_CELLS: usize = 1_000_000;

/// Tiles `bbox` into square cells of `cell_size` degrees and classifies
/// each cell's center.
///
/// Rows run south to north and columns west to east. Every cell starts
/// strictly inside the box, so when `cell_size` does not evenly divide an
/// extent the last row or column overhangs the north or east edge.
/// Cells whose intensity is not positive are dropped.
///
/// Each call draws fresh jitter from `rng`; two calls with differently
/// seeded generators yield different fields.
///
/// # Errors
///
/// Returns [`FieldError::InvalidBounds`] if `bbox` is not well formed, or
/// [`FieldError::InvalidCellSize`] if `cell_size` is not a positive
/// finite number, and [`FieldError::TooManyCells`] if the grid would
/// hold more than [`MAX_CELLS`] cells.
pub fn generate(
    classifier: &IntensityClassifier,
    bbox: &BoundingBox,
    cell_size: f64,
    rng: &mut impl Rng,
) -> Result<Vec<GridCell>, FieldError> {
    if !bbox.is_well_formed() {
        return Err(FieldError::InvalidBounds);
    }
    if !(cell_size.is_finite() && cell_size > 0.0) {
        return Err(FieldError::InvalidCellSize { cell_size });
    }

    let rows = step_count(bbox.height(), cell_size);
    let cols = step_count(bbox.width(), cell_size);
    let count = rows.saturating_mul(cols);
    if count > MAX_CELLS {
        return Err(FieldError::TooManyCells {
            count,
            limit: MAX_CELLS,
        });
    }
    let mut cells = Vec::with_capacity(count);
    let mut dropped = 0_usize;

    for row in 0..rows {
        let south = offset(bbox.south, row, cell_size);
        let north = offset(bbox.south, row + 1, cell_size);

        for col in 0..cols {
            let west = offset(bbox.west, col, cell_size);
            let east = offset(bbox.west, col + 1, cell_size);

            let center = GeoPoint::new(south + cell_size / 2.0, west + cell_size / 2.0);
            let classification = classifier.classify(&center, rng);

            if classification.intensity <= 0.0 {
                dropped += 1;
                continue;
            }

            cells.push(GridCell {
                polygon: [
                    GeoPoint::new(south, west),
                    GeoPoint::new(south, east),
                    GeoPoint::new(north, east),
                    GeoPoint::new(north, west),
                ],
                intensity: classification.intensity,
                label: classification.label,
            });
        }
    }

    if dropped > 0 {
        log::debug!("Dropped {dropped} cells with non-positive intensity");
    }
    log::debug!(
        "Generated {} cells ({rows} rows x {cols} cols, {cell_size}° cells)",
        cells.len()
    );

    Ok(cells)
}

/// Generates the grid for a field definition at its configured cell size.
///
/// # Errors
///
/// Returns any error from [`generate`].
pub fn generate_field(
    definition: &FieldDefinition,
    rng: &mut impl Rng,
) -> Result<Vec<GridCell>, FieldError> {
    let classifier = IntensityClassifier::from_definition(definition);
    generate(
        &classifier,
        &definition.bounds,
        definition.cell_size_degrees,
        rng,
    )
}

/// Number of cells of `size` that start strictly before `extent`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn step_count(extent: f64, size: f64) -> usize {
    (extent / size - STEP_EPSILON).ceil().max(0.0) as usize
}

/// `origin + index * size`, computed from the index so shared edges of
/// neighboring cells are bit-identical.
#[allow(clippy::cast_precision_loss)]
fn offset(origin: f64, index: usize, size: f64) -> f64 {
    (index as f64).mul_add(size, origin)
}
