//! HTTP handler functions for the heat map API.

use actix_web::{HttpResponse, web};
use uhi_map_field::nearest::nearest_with_distance;
use uhi_map_field::{FieldError, export, format, selection};
use uhi_map_field_models::{GeoPoint, HeatBucket, SelectionShape, color_for};
use uhi_map_server_models::{
    ApiClassification, ApiError, ApiHealth, ApiLegendEntry, ApiNearestCell, ApiRegenerated,
    ApiRegion, ApiRegions, ApiSelection, GridQueryParams, PointQueryParams,
};

use crate::{AppState, bad_request};

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        field: state.definition.id.clone(),
        cached: state.is_cached(),
    })
}

/// `GET /api/legend`
///
/// Returns the color ramp, coolest bucket first.
pub async fn legend() -> HttpResponse {
    let entries: Vec<ApiLegendEntry> = HeatBucket::all()
        .iter()
        .copied()
        .map(ApiLegendEntry::from)
        .collect();

    HttpResponse::Ok().json(entries)
}

/// `GET /api/regions`
///
/// Lists the field's region rules in priority order, flagging rules that
/// an earlier rule fully covers.
pub async fn regions(state: web::Data<AppState>) -> HttpResponse {
    let shadowed = state.classifier.shadowed_rules();
    let regions = state
        .classifier
        .rules()
        .iter()
        .map(|rule| {
            let shadowed_by = shadowed
                .iter()
                .find(|(r, _)| std::ptr::eq(*r, rule))
                .map(|(_, by)| *by);
            ApiRegion::new(rule, shadowed_by)
        })
        .collect();

    let fallback = state.classifier.fallback();
    HttpResponse::Ok().json(ApiRegions {
        id: state.definition.id.clone(),
        name: state.definition.name.clone(),
        bounds: state.definition.bounds,
        cell_size_degrees: state.definition.cell_size_degrees,
        fallback_label: fallback.label.clone(),
        fallback_intensity: fallback.intensity,
        regions,
    })
}

/// `GET /api/grid`
///
/// Returns the heat field as a `GeoJSON` `FeatureCollection`.
pub async fn grid(
    state: web::Data<AppState>,
    params: web::Query<GridQueryParams>,
) -> HttpResponse {
    match state.cells(params.cell_size) {
        Ok(cells) => HttpResponse::Ok().json(export::grid_feature_collection(&cells)),
        Err(e) => field_error(&e),
    }
}

/// `GET /api/classify`
///
/// Classifies a single coordinate without generating a field.
pub async fn classify(
    state: web::Data<AppState>,
    params: web::Query<PointQueryParams>,
) -> HttpResponse {
    let point = match parse_point(params.into_inner()) {
        Ok(p) => p,
        Err(response) => return response,
    };

    let classification = state.classifier.classify(&point, &mut rand::rng());
    HttpResponse::Ok().json(ApiClassification {
        point,
        color: color_for(classification.intensity).to_string(),
        intensity: classification.intensity,
        label: classification.label,
    })
}

/// `GET /api/nearest`
///
/// Returns the grid cell whose center is closest to the coordinate.
pub async fn nearest(
    state: web::Data<AppState>,
    params: web::Query<PointQueryParams>,
) -> HttpResponse {
    let point = match parse_point(params.into_inner()) {
        Ok(p) => p,
        Err(response) => return response,
    };

    let cells = match state.cells(None) {
        Ok(cells) => cells,
        Err(e) => return field_error(&e),
    };

    match nearest_with_distance(&point, &cells) {
        Some((cell, distance_degrees)) => HttpResponse::Ok().json(ApiNearestCell {
            center: cell.center(),
            distance_degrees,
            description: format::describe_cell(cell),
            color: color_for(cell.intensity).to_string(),
            cell: cell.clone(),
        }),
        None => HttpResponse::NotFound().json(ApiError::new("Heat field has no cells")),
    }
}

/// `POST /api/aggregate`
///
/// Summarizes the heat intensities under a drawn shape.
pub async fn aggregate(
    state: web::Data<AppState>,
    body: web::Json<SelectionShape>,
) -> HttpResponse {
    let shape = body.into_inner();
    if let Err(message) = check_shape(&shape) {
        return bad_request(message);
    }

    let cells = match state.cells(None) {
        Ok(cells) => cells,
        Err(e) => return field_error(&e),
    };

    let selection = selection::summarize(shape, &cells);
    HttpResponse::Ok().json(ApiSelection {
        average_text: format::format_intensity(selection.heat.average),
        area_text: format::format_area(selection.area_km2),
        color: color_for(selection.heat.average).to_string(),
        selection,
    })
}

/// `POST /api/field/regenerate`
///
/// Generates a new field. Only has a lasting effect when caching is on.
pub async fn regenerate(state: web::Data<AppState>) -> HttpResponse {
    match state.regenerate() {
        Ok(cells) => HttpResponse::Ok().json(ApiRegenerated {
            cell_count: cells.len(),
            cached: state.is_cached(),
        }),
        Err(e) => field_error(&e),
    }
}

fn parse_point(params: PointQueryParams) -> Result<GeoPoint, HttpResponse> {
    if !(params.lat.is_finite() && params.lng.is_finite()) {
        return Err(bad_request("lat and lng must be finite numbers".to_string()));
    }
    Ok(params.into())
}

fn check_shape(shape: &SelectionShape) -> Result<(), String> {
    let finite = |p: &GeoPoint| p.lat.is_finite() && p.lng.is_finite();
    match shape {
        SelectionShape::Polygon { vertices } => {
            if vertices.iter().all(finite) {
                Ok(())
            } else {
                Err("polygon vertices must be finite".to_string())
            }
        }
        SelectionShape::Rectangle { bounds } => {
            if bounds.is_well_formed() {
                Ok(())
            } else {
                Err("rectangle bounds must be finite with north > south and east > west"
                    .to_string())
            }
        }
        SelectionShape::Circle {
            center,
            radius_meters,
        } => {
            if finite(center) && radius_meters.is_finite() && *radius_meters >= 0.0 {
                Ok(())
            } else {
                Err("circle needs a finite center and a non-negative radius".to_string())
            }
        }
        SelectionShape::Point { point } => {
            if finite(point) {
                Ok(())
            } else {
                Err("point must be finite".to_string())
            }
        }
    }
}

fn field_error(e: &FieldError) -> HttpResponse {
    match e {
        FieldError::InvalidBounds
        | FieldError::InvalidCellSize { .. }
        | FieldError::TooManyCells { .. } => bad_request(e.to_string()),
        _ => {
            log::error!("Failed to generate heat field: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to generate heat field"))
        }
    }
}
