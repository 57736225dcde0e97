use super::error::{SpectroscopyError, ensure_len, ensure_temperature};
use crate::core::constants::{ATOMIC_MASS_UNIT_G, BOLTZMANN_ERG_K, SPEED_OF_LIGHT_CM_S};
use crate::core::units::{Dimension, Quantity, Scalar, Unit};
use std::borrow::Cow;
use std::f64::consts::LN_2;

/// Gaussian half-widths at half maximum, either shared by every line or given per line.
#[derive(Debug, Clone, PartialEq)]
pub enum HalfWidths {
    Shared(Scalar),
    PerLine(Quantity),
}

/// Half-widths resolved to cm⁻¹ and checked for positivity.
#[derive(Debug, Clone)]
pub enum Widths<'a> {
    Shared(f64),
    PerLine(Cow<'a, [f64]>),
}

impl Widths<'_> {
    #[inline]
    pub fn get(&self, line: usize) -> f64 {
        match self {
            Widths::Shared(w) => *w,
            Widths::PerLine(ws) => ws[line],
        }
    }
}

impl HalfWidths {
    pub(crate) fn resolve(&self, lines: usize) -> Result<Widths<'_>, SpectroscopyError> {
        let widths = match self {
            HalfWidths::Shared(w) => {
                Widths::Shared(w.to_base(Dimension::Wavenumber, "half_widths")?)
            }
            HalfWidths::PerLine(ws) => {
                let ws = ws.to_base(Dimension::Wavenumber, "half_widths")?;
                ensure_len("half_widths", lines, ws.len())?;
                Widths::PerLine(ws)
            }
        };

        let check = |index: usize, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(SpectroscopyError::NonPositiveHalfWidth { index, value })
            }
        };
        match &widths {
            Widths::Shared(w) => check(0, *w)?,
            Widths::PerLine(ws) => {
                for (i, &w) in ws.iter().enumerate() {
                    check(i, w)?;
                }
            }
        }
        Ok(widths)
    }
}

/// Thermal Doppler HWHM `αᵢ = |νᵢ|/c · sqrt(2·ln2·k_B·T/m)` for each line centre.
///
/// A line at `ν = 0` gets a zero width, which the profile kernels reject.
///
/// # Errors
///
/// Units errors for `centers` or `temperature`, and [`SpectroscopyError::Domain`] for
/// a non-positive temperature or mass.
pub fn doppler_half_width(
    centers: &Quantity,
    temperature: &Scalar,
    molecular_mass_amu: f64,
) -> Result<Quantity, SpectroscopyError> {
    let centers = centers.to_base(Dimension::Wavenumber, "centers")?;
    let temperature = temperature.to_base(Dimension::Temperature, "temperature")?;
    ensure_temperature(temperature)?;
    if !(molecular_mass_amu.is_finite() && molecular_mass_amu > 0.0) {
        return Err(SpectroscopyError::Domain(format!(
            "molecular mass must be positive, got {} amu",
            molecular_mass_amu
        )));
    }

    let mass_g = molecular_mass_amu * ATOMIC_MASS_UNIT_G;
    let scale = (2.0 * LN_2 * BOLTZMANN_ERG_K * temperature / mass_g).sqrt() / SPEED_OF_LIGHT_CM_S;
    Ok(Quantity::new(
        centers.iter().map(|v| v.abs() * scale).collect(),
        Unit::PerCentimeter,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::units::UnitsError;

    #[test]
    fn water_line_at_room_temperature_has_expected_width() {
        // H2O, 1000 cm-1, 296 K: ~1.4518e-3 cm-1 (HWHM)
        let widths = doppler_half_width(
            &Quantity::new(vec![1000.0], Unit::PerCentimeter),
            &Scalar::kelvin(296.0),
            18.010565,
        )
        .unwrap();
        let w = widths.values()[0];
        assert!((w - 1.4518e-3).abs() < 0.001e-3, "got {}", w);
    }

    #[test]
    fn width_scales_with_sqrt_temperature_and_linearly_with_position() {
        let centers = Quantity::new(vec![500.0, 1000.0], Unit::PerCentimeter);
        let cold = doppler_half_width(&centers, &Scalar::kelvin(100.0), 16.0).unwrap();
        let hot = doppler_half_width(&centers, &Scalar::kelvin(400.0), 16.0).unwrap();
        assert!((hot.values()[0] / cold.values()[0] - 2.0).abs() < 1e-12);
        assert!((cold.values()[1] / cold.values()[0] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn non_positive_mass_is_a_domain_error() {
        let result = doppler_half_width(
            &Quantity::new(vec![1.0], Unit::PerCentimeter),
            &Scalar::kelvin(300.0),
            0.0,
        );
        assert!(matches!(result, Err(SpectroscopyError::Domain(_))));
    }

    #[test]
    fn resolve_rejects_zero_width() {
        let widths = HalfWidths::PerLine(Quantity::new(vec![0.1, 0.0], Unit::PerCentimeter));
        assert!(matches!(
            widths.resolve(2),
            Err(SpectroscopyError::NonPositiveHalfWidth { index: 1, .. })
        ));
    }

    #[test]
    fn resolve_rejects_untagged_shared_width() {
        let widths = HalfWidths::Shared(Scalar::raw(0.1));
        assert!(matches!(
            widths.resolve(3),
            Err(SpectroscopyError::Units(UnitsError::Missing { .. }))
        ));
    }

    #[test]
    fn resolve_converts_per_meter_widths() {
        let widths = HalfWidths::Shared(Scalar::new(10.0, Unit::PerMeter));
        let resolved = widths.resolve(5).unwrap();
        assert!((resolved.get(4) - 0.1).abs() < 1e-15);
    }
}
