//! Interactive menu shown when no subcommand is given.

use std::path::Path;

use dialoguer::{Confirm, Input, Select};
use uhi_map_field_models::{BoundingBox, GeoPoint, SelectionShape, ShapeKind};

use crate::commands::{self, Context};

/// Top-level actions.
enum Action {
    Grid,
    Classify,
    Nearest,
    Select,
    Legend,
    Regions,
    Server,
}

impl Action {
    const ALL: &[Self] = &[
        Self::Grid,
        Self::Classify,
        Self::Nearest,
        Self::Select,
        Self::Legend,
        Self::Regions,
        Self::Server,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Grid => "Generate heat field GeoJSON",
            Self::Classify => "Classify a point",
            Self::Nearest => "Find the nearest cell",
            Self::Select => "Summarize a selected area",
            Self::Legend => "Show legend",
            Self::Regions => "List regions",
            Self::Server => "Start server",
        }
    }
}

/// Prompts for an action and runs it.
pub async fn run(
    field_id: &str,
    field_path: Option<&Path>,
    cell_size: Option<f64>,
    seed: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Urban Heat Island Map");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    if matches!(Action::ALL[idx], Action::Server) {
        // The server prompts for its own settings.
        tokio::task::spawn_blocking(|| {
            actix_web::rt::System::new().block_on(uhi_map_server::interactive::run())
        })
        .await??;
        return Ok(());
    }

    let mut ctx = Context::open(field_id, field_path, cell_size, seed)?;

    match Action::ALL[idx] {
        Action::Grid => {
            let path: String = Input::new()
                .with_prompt("Output file (blank for stdout)")
                .allow_empty(true)
                .interact_text()?;
            let path = path.trim();
            commands::grid(&mut ctx, (!path.is_empty()).then_some(Path::new(path)))?;
        }
        Action::Classify => commands::classify(&mut ctx, prompt_point("Point (lat, lng)")?),
        Action::Nearest => commands::nearest(&mut ctx, prompt_point("Point (lat, lng)")?)?,
        Action::Select => {
            let shape = prompt_shape()?;
            let save = Confirm::new()
                .with_prompt("Save selection to selected-area.json?")
                .default(false)
                .interact()?;
            let path = commands::default_selection_path();
            commands::aggregate(&mut ctx, shape, save.then_some(path.as_path()))?;
        }
        Action::Legend => commands::legend(),
        Action::Regions => commands::regions(&ctx),
        Action::Server => {}
    }

    Ok(())
}

fn prompt_point(prompt: &str) -> Result<GeoPoint, dialoguer::Error> {
    let text: String = Input::new()
        .with_prompt(prompt)
        .validate_with(|s: &String| {
            commands::parse_point(s)
                .map(|_| ())
                .ok_or("Expected two numbers: lat, lng")
        })
        .interact_text()?;
    commands::parse_point(&text).ok_or_else(|| invalid_input(&text))
}

fn invalid_input(text: &str) -> dialoguer::Error {
    dialoguer::Error::IO(std::io::Error::new(
        std::io::ErrorKind::InvalidInput,
        format!("Could not parse '{text}'"),
    ))
}

fn prompt_shape() -> Result<SelectionShape, dialoguer::Error> {
    let kinds = ShapeKind::all();
    let titles: Vec<&str> = kinds.iter().map(|k| k.title()).collect();
    let idx = Select::new()
        .with_prompt("Shape")
        .items(&titles)
        .default(0)
        .interact()?;

    Ok(match kinds[idx] {
        ShapeKind::Polygon => {
            let text: String = Input::new()
                .with_prompt("Vertices (lat, lng; lat, lng; ...)")
                .validate_with(|s: &String| match commands::parse_points(s) {
                    Some(v) if v.len() >= 3 => Ok(()),
                    _ => Err("Expected at least three lat, lng pairs separated by ';'"),
                })
                .interact_text()?;
            SelectionShape::Polygon {
                vertices: commands::parse_points(&text).ok_or_else(|| invalid_input(&text))?,
            }
        }
        ShapeKind::Rectangle => {
            let a = prompt_point("First corner (lat, lng)")?;
            let b = prompt_point("Opposite corner (lat, lng)")?;
            SelectionShape::Rectangle {
                bounds: BoundingBox::new(
                    a.lng.min(b.lng),
                    a.lat.min(b.lat),
                    a.lng.max(b.lng),
                    a.lat.max(b.lat),
                ),
            }
        }
        ShapeKind::Circle => {
            let center = prompt_point("Center (lat, lng)")?;
            let radius_meters: f64 = Input::new()
                .with_prompt("Radius in meters")
                .default(500.0)
                .validate_with(|r: &f64| {
                    if r.is_finite() && *r >= 0.0 {
                        Ok(())
                    } else {
                        Err("Radius must be a non-negative number")
                    }
                })
                .interact_text()?;
            SelectionShape::Circle {
                center,
                radius_meters,
            }
        }
        ShapeKind::Point => SelectionShape::Point {
            point: prompt_point("Point (lat, lng)")?,
        },
    })
}

