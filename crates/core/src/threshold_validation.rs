//! Range and precision checks for fractional threshold values.

use rust_decimal::Decimal;

use crate::error::CoreError;

/// Decimal places kept by the `NUMERIC(5, 4)` value columns.
pub const MAX_SCALE: u32 = 4;

/// Validate that a value falls within `[0, 1]`.
///
/// Returns a `CoreError::Validation` naming the field if out of range.
pub fn validate_unit_range(value: Decimal, name: &str) -> Result<(), CoreError> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(CoreError::Validation(format!(
            "{name} must be between 0 and 1, got {value}"
        )));
    }
    Ok(())
}

/// Validate that a value needs at most [`MAX_SCALE`] decimal places.
///
/// Trailing zeros do not count: `0.50000` is stored as `0.5000` without loss.
/// Anything finer would be rounded by storage and never compare equal again.
pub fn validate_scale(value: Decimal, name: &str) -> Result<(), CoreError> {
    if value.normalize().scale() > MAX_SCALE {
        return Err(CoreError::Validation(format!(
            "{name} allows at most {MAX_SCALE} decimal places, got {value}"
        )));
    }
    Ok(())
}

/// Validate every present value of a `(field name, value)` list.
///
/// Absent values are accepted; the first out-of-range or over-precise value
/// is reported.
pub fn validate_threshold_values(values: &[(&str, Option<Decimal>)]) -> Result<(), CoreError> {
    for (name, value) in values {
        if let Some(value) = value {
            validate_unit_range(*value, name)?;
            validate_scale(*value, name)?;
        }
    }
    Ok(())
}

/// Precision-only variant of [`validate_threshold_values`].
pub fn validate_threshold_scales(values: &[(&str, Option<Decimal>)]) -> Result<(), CoreError> {
    for (name, value) in values {
        if let Some(value) = value {
            validate_scale(*value, name)?;
        }
    }
    Ok(())
}
