//! Common checks shared by the concrete formulations.

use crate::error::{FormulationError, FormulationResult};
use bs_core::numeric::{ensure_all_finite, ensure_finite};

/// Ensure a value is finite, returning `NonPhysical` if not.
pub fn check_finite(value: f64, what: &'static str) -> FormulationResult<()> {
    ensure_finite(value, what).map_err(|_| FormulationError::NonPhysical { what })?;
    Ok(())
}

/// Ensure every entry of a slice is finite.
pub fn check_all_finite(values: &[f64], what: &'static str) -> FormulationResult<()> {
    ensure_all_finite(values, what).map_err(|_| FormulationError::NonPhysical { what })
}

/// Ensure a value is finite and strictly positive.
pub fn check_positive(value: f64, what: &'static str) -> FormulationResult<()> {
    check_finite(value, what)?;
    if value <= 0.0 {
        return Err(FormulationError::NonPhysical { what });
    }
    Ok(())
}
