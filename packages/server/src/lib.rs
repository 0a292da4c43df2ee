#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the urban heat island map.
//!
//! Serves the JSON API behind the map front end: the generated heat
//! field as `GeoJSON`, point classification, nearest-cell lookups, and
//! selection summaries.
//!
//! By default every request that needs cells generates a fresh field, so
//! jittered regions change between requests. Setting `UHI_CACHE_FIELD`
//! keeps one generated field until `POST /api/field/regenerate`.

mod handlers;
pub mod interactive;

use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, error, middleware, web};
use uhi_map_field::{FieldError, IntensityClassifier, definition, grid, registry};
use uhi_map_field_models::{FieldDefinition, GridCell};
use uhi_map_server_models::ApiError;

/// Server settings, normally read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind (`BIND_ADDR`).
    pub bind_addr: String,
    /// Port to listen on (`PORT`).
    pub port: u16,
    /// Registered field to serve (`UHI_FIELD`).
    pub field_id: String,
    /// Field definition file that replaces the registered field
    /// (`UHI_FIELD_PATH`).
    pub field_path: Option<PathBuf>,
    /// Reuse one generated field across requests (`UHI_CACHE_FIELD`).
    pub cache_field: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
            field_id: registry::DEFAULT_FIELD_ID.to_string(),
            field_path: None,
            cache_field: false,
        }
    }
}

impl ServerConfig {
    /// Reads settings from the environment, falling back to defaults for
    /// anything unset or unparseable.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            field_id: std::env::var("UHI_FIELD").unwrap_or(defaults.field_id),
            field_path: std::env::var_os("UHI_FIELD_PATH").map(PathBuf::from),
            cache_field: std::env::var("UHI_CACHE_FIELD")
                .is_ok_and(|v| parse_flag(&v)),
        }
    }

    /// Loads the field definition these settings point at.
    ///
    /// # Errors
    ///
    /// Returns a [`FieldError`] if the definition file cannot be loaded or
    /// the field identifier is not registered.
    pub fn load_field(&self) -> Result<FieldDefinition, FieldError> {
        self.field_path.as_ref().map_or_else(
            || registry::field(&self.field_id),
            |path| definition::load(path),
        )
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Shared application state.
pub struct AppState {
    /// Definition of the field being served.
    pub definition: FieldDefinition,
    /// Classifier built from `definition`.
    pub classifier: IntensityClassifier,
    /// Last generated field, present only when caching is enabled.
    cache: Option<RwLock<Option<Arc<Vec<GridCell>>>>>,
}

impl AppState {
    /// Creates state for `definition`, optionally caching generated
    /// fields.
    #[must_use]
    pub fn new(definition: FieldDefinition, cache_field: bool) -> Self {
        let classifier = IntensityClassifier::from_definition(&definition);
        Self {
            definition,
            classifier,
            cache: cache_field.then(|| RwLock::new(None)),
        }
    }

    /// Whether generated fields are reused across requests.
    #[must_use]
    pub const fn is_cached(&self) -> bool {
        self.cache.is_some()
    }

    /// Cells to answer a request with.
    ///
    /// A `cell_size` other than the field's default always generates a
    /// fresh, uncached field.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::InvalidCellSize`] for a non-positive or
    /// non-finite `cell_size`.
    pub fn cells(&self, cell_size: Option<f64>) -> Result<Arc<Vec<GridCell>>, FieldError> {
        let default_size = self.definition.cell_size_degrees;
        let cell_size = cell_size.unwrap_or(default_size);

        #[allow(clippy::float_cmp)]
        let uses_default = cell_size == default_size;

        match &self.cache {
            Some(cache) if uses_default => {
                let cached = cache
                    .read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone();
                cached.map_or_else(|| self.regenerate(), Ok)
            }
            _ => self.generate(cell_size).map(Arc::new),
        }
    }

    /// Generates a new field at the default cell size, replacing the
    /// cached one when caching is enabled.
    ///
    /// # Errors
    ///
    /// Returns a [`FieldError`] if the definition cannot be tiled.
    pub fn regenerate(&self) -> Result<Arc<Vec<GridCell>>, FieldError> {
        let cells = Arc::new(self.generate(self.definition.cell_size_degrees)?);
        if let Some(cache) = &self.cache {
            *cache.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&cells));
            log::info!(
                "Cached new '{}' field with {} cells",
                self.definition.id,
                cells.len()
            );
        }
        Ok(cells)
    }

    fn generate(&self, cell_size: f64) -> Result<Vec<GridCell>, FieldError> {
        grid::generate(
            &self.classifier,
            &self.definition.bounds,
            cell_size,
            &mut rand::rng(),
        )
    }
}

fn bad_request(message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiError::new(message))
}

/// Registers the API routes and the JSON error handlers for malformed
/// query strings and bodies.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(|err, _req| {
        let response = bad_request(err.to_string());
        error::InternalError::from_response(err, response).into()
    }))
    .app_data(web::JsonConfig::default().error_handler(|err, _req| {
        let response = bad_request(err.to_string());
        error::InternalError::from_response(err, response).into()
    }))
    .service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/legend", web::get().to(handlers::legend))
            .route("/regions", web::get().to(handlers::regions))
            .route("/grid", web::get().to(handlers::grid))
            .route("/classify", web::get().to(handlers::classify))
            .route("/nearest", web::get().to(handlers::nearest))
            .route("/aggregate", web::post().to(handlers::aggregate))
            .route("/field/regenerate", web::post().to(handlers::regenerate)),
    );
}

/// Starts the heat map API server with settings from the environment.
///
/// This is a regular async function; the caller is responsible for
/// providing the async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the field definition cannot be
/// loaded, or if the HTTP server fails to bind or encounters a runtime
/// error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    serve(ServerConfig::from_env()).await
}

/// Starts the heat map API server with explicit settings.
///
/// # Errors
///
/// See [`run_server`].
#[allow(clippy::future_not_send)]
pub async fn serve(config: ServerConfig) -> std::io::Result<()> {
    log::info!("Loading heat field...");
    let definition = config.load_field().map_err(std::io::Error::other)?;
    log::info!(
        "Serving field '{}' ({}) with {} rules, caching {}",
        definition.id,
        definition.name,
        definition.rules.len(),
        if config.cache_field { "on" } else { "off" }
    );

    let state = web::Data::new(AppState::new(definition, config.cache_field));

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await
}
