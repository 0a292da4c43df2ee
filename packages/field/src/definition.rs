//! Parsing and validation of heat field definitions.

use std::path::Path;

use uhi_map_field_models::{FieldDefinition, IntensityValue};

use crate::FieldError;

/// Parses and validates a field definition from TOML.
///
/// # Errors
///
/// Returns [`FieldError::Parse`] if the TOML is malformed, or
/// [`FieldError::Invalid`] if the definition violates an invariant.
pub fn parse(toml_str: &str) -> Result<FieldDefinition, FieldError> {
    let definition: FieldDefinition = toml::de::from_str(toml_str)?;
    validate(&definition)?;
    Ok(definition)
}

/// Reads, parses, and validates a field definition file.
///
/// # Errors
///
/// Returns [`FieldError::Io`] if the file cannot be read, or any error
/// from [`parse`].
pub fn load(path: &Path) -> Result<FieldDefinition, FieldError> {
    let toml_str = std::fs::read_to_string(path).map_err(|source| FieldError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let definition = parse(&toml_str)?;
    log::info!(
        "Loaded field '{}' with {} rules from {}",
        definition.id,
        definition.rules.len(),
        path.display()
    );
    Ok(definition)
}

/// Checks the invariants of a field definition.
///
/// # Errors
///
/// Returns [`FieldError::Invalid`] describing the first violation found.
pub fn validate(definition: &FieldDefinition) -> Result<(), FieldError> {
    let invalid = |message: String| FieldError::Invalid {
        id: definition.id.clone(),
        message,
    };

    if definition.id.is_empty() {
        return Err(invalid("id is empty".to_string()));
    }
    if !definition.bounds.is_well_formed() {
        return Err(invalid(
            "bounds must be finite with north > south and east > west".to_string(),
        ));
    }
    if !(definition.cell_size_degrees.is_finite() && definition.cell_size_degrees > 0.0) {
        return Err(invalid(format!(
            "cell_size_degrees must be positive, got {}",
            definition.cell_size_degrees
        )));
    }

    check_intensity(&definition.fallback.intensity)
        .map_err(|msg| invalid(format!("fallback: {msg}")))?;

    for rule in &definition.rules {
        if !(rule.lat_min <= rule.lat_max && rule.lng_min <= rule.lng_max) {
            return Err(invalid(format!("rule '{}' has an inverted box", rule.label)));
        }
        check_intensity(&rule.intensity)
            .map_err(|msg| invalid(format!("rule '{}': {msg}", rule.label)))?;
    }

    Ok(())
}

fn check_intensity(value: &IntensityValue) -> Result<(), String> {
    match *value {
        IntensityValue::Fixed { value } if !value.is_finite() => {
            Err(format!("fixed value {value} is not finite"))
        }
        IntensityValue::Jittered { base, spread } if !(base.is_finite() && spread.is_finite()) => {
            Err("jitter base and spread must be finite".to_string())
        }
        IntensityValue::Jittered { spread, .. } if spread < 0.0 => {
            Err(format!("jitter spread {spread} is negative"))
        }
        _ => Ok(()),
    }
}
