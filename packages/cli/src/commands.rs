//! Actions shared by the subcommands and the interactive menu.

use std::path::{Path, PathBuf};

use rand::SeedableRng;
use rand::rngs::StdRng;
use uhi_map_field::selection::SelectionSession;
use uhi_map_field::{FieldError, IntensityClassifier, definition, export, format, grid, registry};
use uhi_map_field_models::{
    AreaSelection, FieldDefinition, GeoPoint, GridCell, HeatBucket, SelectionShape, color_for,
};
use uhi_map_spatial::CellIndex;

/// A loaded field plus everything needed to generate it.
pub struct Context {
    pub definition: FieldDefinition,
    classifier: IntensityClassifier,
    cell_size: f64,
    rng: StdRng,
}

impl Context {
    /// Loads the field from `field_path` if given, otherwise the
    /// registered field `field_id`.
    ///
    /// With a `seed`, every jittered intensity is reproducible across runs.
    pub fn open(
        field_id: &str,
        field_path: Option<&Path>,
        cell_size: Option<f64>,
        seed: Option<u64>,
    ) -> Result<Self, FieldError> {
        let definition = match field_path {
            Some(path) => definition::load(path)?,
            None => registry::field(field_id)?,
        };
        let classifier = IntensityClassifier::from_definition(&definition);
        let cell_size = cell_size.unwrap_or(definition.cell_size_degrees);
        let rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);

        log::debug!(
            "Using field '{}' at {cell_size}° cells, seed {seed:?}",
            definition.id
        );

        Ok(Self {
            definition,
            classifier,
            cell_size,
            rng,
        })
    }

    /// Generates a new field.
    pub fn generate(&mut self) -> Result<Vec<GridCell>, FieldError> {
        let cells = grid::generate(
            &self.classifier,
            &self.definition.bounds,
            self.cell_size,
            &mut self.rng,
        )?;
        log::info!(
            "Generated {} cells for '{}'",
            cells.len(),
            self.definition.id
        );
        Ok(cells)
    }
}

/// Writes the generated field as `GeoJSON` to `output`, or stdout.
pub fn grid(ctx: &mut Context, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let cells = ctx.generate()?;
    let geojson = export::grid_geojson(&cells)?;
    write_output(&geojson, output)
}

/// Prints the intensity of a single point.
pub fn classify(ctx: &mut Context, point: GeoPoint) {
    let classification = ctx.classifier.classify(&point, &mut ctx.rng);
    println!(
        "{:.6}, {:.6}: {} ({}°C, {})",
        point.lat,
        point.lng,
        classification.label,
        format::format_intensity(classification.intensity),
        color_for(classification.intensity)
    );
}

/// Prints the cell nearest to `point` in a freshly generated field.
pub fn nearest(ctx: &mut Context, point: GeoPoint) -> Result<(), Box<dyn std::error::Error>> {
    let cells = ctx.generate()?;
    let index = CellIndex::build(&cells);
    let Some(cell) = index.nearest(&point) else {
        println!("No data available");
        return Ok(());
    };

    let center = cell.center();
    println!("{}", format::describe_cell(cell));
    println!(
        "Cell center {:.6}, {:.6} ({:.4}° away)",
        center.lat,
        center.lng,
        point.planar_distance(&center)
    );
    Ok(())
}

/// Reads a selection shape from a JSON file.
///
/// Accepts either a serialized [`SelectionShape`] or a `GeoJSON` polygon
/// (bare geometry or feature).
pub fn read_shape(path: &Path) -> Result<SelectionShape, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)?;
    if let Ok(shape) = serde_json::from_str::<SelectionShape>(&contents) {
        return Ok(shape);
    }
    export::selection_from_geojson(&contents).ok_or_else(|| {
        format!(
            "{} is neither a selection shape nor a GeoJSON polygon",
            path.display()
        )
        .into()
    })
}

/// Summarizes the heat under `shape`, printing the result and optionally
/// saving it as JSON.
pub fn aggregate(
    ctx: &mut Context,
    shape: SelectionShape,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let cells = ctx.generate()?;

    let mut session = SelectionSession::new();
    session.start();
    session.complete(shape, &cells)?;
    let Some(selection) = session.selected() else {
        return Ok(());
    };
    print_selection(selection, session.status().text());

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(selection)?;
        write_output(&json, Some(path))?;
    }
    Ok(())
}

fn print_selection(selection: &AreaSelection, status: &str) {
    let heat = &selection.heat;
    println!("{status}: {}", selection.kind.title());
    println!("{}", format::format_coordinates(&selection.coordinates));
    println!("Area: {}", format::format_area(selection.area_km2));
    println!(
        "Average: {}°C  Max: {}°C  Min: {}°C",
        format::format_intensity(heat.average),
        format::format_intensity(heat.maximum),
        format::format_intensity(heat.minimum)
    );
    println!("Cells: {} ({})", heat.cell_count, heat.source);
}

/// Prints the color ramp, coolest first.
pub fn legend() {
    for bucket in HeatBucket::all() {
        println!("{}  {}", bucket.color(), bucket.label());
    }
}

/// Prints the field's region rules in priority order.
pub fn regions(ctx: &Context) {
    let definition = &ctx.definition;
    println!(
        "{} ({}), {}° cells",
        definition.name, definition.id, definition.cell_size_degrees
    );

    let shadowed = ctx.classifier.shadowed_rules();
    for (i, rule) in ctx.classifier.rules().iter().enumerate() {
        let (min, max) = rule.intensity.range();
        let note = shadowed
            .iter()
            .find(|(r, _)| std::ptr::eq(*r, rule))
            .map(|(_, by)| format!(" [covered by {}]", by.label))
            .unwrap_or_default();
        println!(
            "{:>2}. {:<24} lat {:.2}..{:.2} lng {:.2}..{:.2}  {}-{}°C{note}",
            i + 1,
            rule.label,
            rule.lat_min,
            rule.lat_max,
            rule.lng_min,
            rule.lng_max,
            format::format_intensity(min),
            format::format_intensity(max)
        );
    }

    let fallback = ctx.classifier.fallback();
    let (min, max) = fallback.intensity.range();
    println!(
        "    {:<24} elsewhere  {}-{}°C",
        fallback.label,
        format::format_intensity(min),
        format::format_intensity(max)
    );
}

/// Starts the API server on the actix runtime.
pub async fn serve(config: uhi_map_server::ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    // The server uses actix-web's runtime, so it runs in a blocking task
    // to avoid nesting tokio runtimes.
    tokio::task::spawn_blocking(move || {
        actix_web::rt::System::new().block_on(uhi_map_server::serve(config))
    })
    .await??;
    Ok(())
}

fn write_output(contents: &str, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) => {
            std::fs::write(path, contents)?;
            log::info!("Wrote {}", path.display());
        }
        None => println!("{contents}"),
    }
    Ok(())
}

/// Parses `"lat, lng"`.
pub fn parse_point(s: &str) -> Option<GeoPoint> {
    let (lat, lng) = s.split_once(',')?;
    let point = GeoPoint::new(lat.trim().parse().ok()?, lng.trim().parse().ok()?);
    (point.lat.is_finite() && point.lng.is_finite()).then_some(point)
}

/// Parses `"lat, lng; lat, lng; ..."`.
pub fn parse_points(s: &str) -> Option<Vec<GeoPoint>> {
    s.split(';')
        .filter(|p| !p.trim().is_empty())
        .map(parse_point)
        .collect()
}

/// Default path for saved selections.
pub fn default_selection_path() -> PathBuf {
    PathBuf::from("selected-area.json")
}
