//! Compile-time registry of heat field definitions.
//!
//! Each entry is a `(name, toml_content)` pair embedded via `include_str!`.
//! Adding a new city requires creating a TOML file in `fields/` and adding
//! a corresponding entry here.

use uhi_map_field_models::FieldDefinition;

use crate::FieldError;
use crate::definition;

/// Identifier of the field used when none is requested.
pub const DEFAULT_FIELD_ID: &str = "toronto";

/// Number of registered fields. Enforced by a test.
#[cfg(test)]
const EXPECTED_FIELD_COUNT: usize = 1;

/// Embedded TOML field definitions.
const FIELD_TOMLS: &[(&str, &str)] = &[("toronto", include_str!("../fields/toronto.toml"))];

/// Returns all registered field definitions.
///
/// # Panics
///
/// Panics if any embedded TOML file fails to parse or validate. Since
/// these are compile-time constants, failures indicate a development
/// error and are caught by the tests below.
#[must_use]
pub fn all_fields() -> Vec<FieldDefinition> {
    FIELD_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            definition::parse(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse heat field '{name}': {e}"))
        })
        .collect()
}

/// Looks up a registered field by identifier.
///
/// # Errors
///
/// Returns [`FieldError::UnknownField`] if no field has that identifier.
pub fn field(id: &str) -> Result<FieldDefinition, FieldError> {
    all_fields()
        .into_iter()
        .find(|f| f.id == id)
        .ok_or_else(|| FieldError::UnknownField { id: id.to_string() })
}

/// Returns the default (Toronto) field.
///
/// # Panics
///
/// Panics if the default field is missing from the registry, which the
/// tests below rule out.
#[must_use]
pub fn default_field() -> FieldDefinition {
    field(DEFAULT_FIELD_ID)
        .unwrap_or_else(|e| panic!("Default heat field '{DEFAULT_FIELD_ID}' missing: {e}"))
}
