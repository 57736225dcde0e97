use crate::core::spectroscopy::error::SpectroscopyError;
use crate::core::units::{Dimension, Quantity, Scalar, Unit};

/// Output wavenumber grid, strictly increasing, stored in cm⁻¹.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralGrid {
    wavenumbers: Vec<f64>,
}

impl SpectralGrid {
    /// Validates and converts a wavenumber quantity into a grid.
    ///
    /// # Errors
    ///
    /// Fails on missing or non-wavenumber units, on an empty input, and on any pair of
    /// neighbouring points that is not strictly increasing.
    pub fn new(points: &Quantity) -> Result<Self, SpectroscopyError> {
        let wavenumbers = points.to_base(Dimension::Wavenumber, "grid")?.into_owned();
        if wavenumbers.is_empty() {
            return Err(SpectroscopyError::InvalidGrid(
                "grid must contain at least one point".to_string(),
            ));
        }
        if let Some(bad) = wavenumbers.iter().position(|v| !v.is_finite()) {
            return Err(SpectroscopyError::InvalidGrid(format!(
                "non-finite value at index {}",
                bad
            )));
        }
        if let Some(i) = wavenumbers.windows(2).position(|w| w[1] <= w[0]) {
            return Err(SpectroscopyError::InvalidGrid(format!(
                "points must be strictly increasing (index {}: {} -> {})",
                i + 1,
                wavenumbers[i],
                wavenumbers[i + 1]
            )));
        }
        Ok(Self { wavenumbers })
    }

    /// `points` evenly spaced values from `start` to `stop`, both inclusive.
    pub fn linspace(
        start: &Scalar,
        stop: &Scalar,
        points: usize,
    ) -> Result<Self, SpectroscopyError> {
        let start = start.to_base(Dimension::Wavenumber, "grid_start")?;
        let stop = stop.to_base(Dimension::Wavenumber, "grid_stop")?;
        if points < 2 {
            return Err(SpectroscopyError::InvalidGrid(format!(
                "linspace needs at least 2 points, got {}",
                points
            )));
        }
        let step = (stop - start) / (points - 1) as f64;
        let values = (0..points)
            .map(|i| {
                if i == points - 1 {
                    stop
                } else {
                    start + step * i as f64
                }
            })
            .collect();
        Self::new(&Quantity::new(values, Unit::PerCentimeter))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.wavenumbers
    }

    pub fn len(&self) -> usize {
        self.wavenumbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavenumbers.is_empty()
    }

    pub fn to_quantity(&self) -> Quantity {
        Quantity::new(self.wavenumbers.clone(), Unit::PerCentimeter)
    }
}
