use crate::core::units::UnitsError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpectroscopyError {
    #[error(transparent)]
    Units(#[from] UnitsError),

    #[error("Domain error: {0}")]
    Domain(String),

    #[error("Length mismatch: '{argument}' has {found} values, expected {expected}")]
    LengthMismatch {
        argument: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Half-width at line {index} must be strictly positive (got {value})")]
    NonPositiveHalfWidth { index: usize, value: f64 },

    #[error("Invalid spectral grid: {0}")]
    InvalidGrid(String),
}

pub(crate) fn ensure_len(
    argument: &'static str,
    expected: usize,
    found: usize,
) -> Result<(), SpectroscopyError> {
    if expected != found {
        return Err(SpectroscopyError::LengthMismatch {
            argument,
            expected,
            found,
        });
    }
    Ok(())
}

pub(crate) fn ensure_temperature(kelvin: f64) -> Result<(), SpectroscopyError> {
    if !(kelvin.is_finite() && kelvin > 0.0) {
        return Err(SpectroscopyError::Domain(format!(
            "temperature must be a positive finite value, got {} K",
            kelvin
        )));
    }
    Ok(())
}
