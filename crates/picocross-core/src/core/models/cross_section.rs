use super::grid::SpectralGrid;
use crate::core::units::Quantity;

/// A finished Doppler-broadened cross-section, one value (cm²) per grid point.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossSection {
    grid: SpectralGrid,
    values: Quantity,
    lines: usize,
}

impl CrossSection {
    pub fn new(grid: SpectralGrid, values: Quantity, lines: usize) -> Self {
        debug_assert_eq!(grid.len(), values.len());
        Self {
            grid,
            values,
            lines,
        }
    }

    pub fn grid(&self) -> &SpectralGrid {
        &self.grid
    }

    pub fn values(&self) -> &Quantity {
        &self.values
    }

    /// Number of lines that contributed.
    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn len(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// `(wavenumber, value)` pairs in grid order.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.grid
            .as_slice()
            .iter()
            .copied()
            .zip(self.values.values().iter().copied())
    }

    /// Grid point and value of the maximum.
    pub fn peak(&self) -> Option<(f64, f64)> {
        self.points()
            .filter(|(_, v)| !v.is_nan())
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Trapezoidal integral over the grid, in cm²·cm⁻¹.
    pub fn integrated(&self) -> f64 {
        let x = self.grid.as_slice();
        let y = self.values.values();
        x.windows(2)
            .zip(y.windows(2))
            .map(|(xs, ys)| 0.5 * (xs[1] - xs[0]) * (ys[0] + ys[1]))
            .sum()
    }
}
