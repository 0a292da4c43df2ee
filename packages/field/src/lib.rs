#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Synthetic urban heat island (UHI) field.
//!
//! A heat field is a regular grid of square cells over a regional
//! bounding box. Each cell's intensity comes from a table of rectangular
//! region rules (see [`classifier`]); some rules add random jitter to
//! simulate heterogeneity, so every call to [`grid::generate`] yields a
//! fresh field. Selection queries ([`aggregate`], [`nearest`]) run
//! against an already-generated field.
//!
//! Field definitions (extent, cell size, and rule table) are TOML files
//! under `fields/`, embedded at compile time by the [`registry`].
//!
//! All distance and centroid math is planar in degrees. This is adequate
//! at city scale only.

pub mod aggregate;
pub mod classifier;
pub mod definition;
pub mod export;
pub mod format;
pub mod geometry;
pub mod grid;
pub mod nearest;
pub mod registry;
pub mod selection;

use std::path::PathBuf;

use thiserror::Error;

pub use aggregate::aggregate;
pub use classifier::IntensityClassifier;
pub use grid::generate;
pub use nearest::nearest;

/// Errors from loading field definitions or generating a grid.
#[derive(Debug, Error)]
pub enum FieldError {
    /// A field definition file could not be read.
    #[error("Failed to read field definition {}: {source}", path.display())]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A field definition was not valid TOML or had the wrong shape.
    #[error("Failed to parse field definition: {0}")]
    Parse(#[from] toml::de::Error),

    /// A field definition parsed but violates an invariant.
    #[error("Invalid field definition '{id}': {message}")]
    Invalid {
        /// Field identifier.
        id: String,
        /// Description of the violation.
        message: String,
    },

    /// No registered field has the requested identifier.
    #[error("Unknown field: {id}")]
    UnknownField {
        /// The requested identifier.
        id: String,
    },

    /// Grid generation was asked to tile a malformed bounding box.
    #[error("Bounding box must be finite with north > south and east > west")]
    InvalidBounds,

    /// Grid generation was given a non-positive or non-finite cell size.
    #[error("Cell size must be finite and greater than zero, got {cell_size}")]
    InvalidCellSize {
        /// The rejected cell size in degrees.
        cell_size: f64,
    },

    /// The requested grid is larger than [`grid::MAX_CELLS`].
    #[error("Grid would have {count} cells, more than the limit of {limit}")]
    TooManyCells {
        /// Cells the grid would need (saturated at `usize::MAX`).
        count: usize,
        /// The configured limit.
        limit: usize,
    },
}
