use super::error::{SpectroscopyError, ensure_len, ensure_temperature};
use crate::core::constants::SECOND_RADIATION_CONSTANT;
use crate::core::units::{Dimension, Quantity, Scalar};
use tracing::debug;

/// Evaluates `Q(T) = Σ gᵢ·exp(-c2·Eᵢ/T)`.
///
/// `energies` must carry wavenumber units, `degeneracies` must be dimensionless and
/// `temperature` must carry temperature units. An empty level set yields `Q = 0`.
///
/// # Errors
///
/// Returns [`SpectroscopyError::Units`] for untagged or mis-dimensioned arguments,
/// [`SpectroscopyError::LengthMismatch`] when the two columns differ in length, and
/// [`SpectroscopyError::Domain`] for a non-positive temperature.
pub fn partition(
    energies: &Quantity,
    degeneracies: &Quantity,
    temperature: &Scalar,
) -> Result<Scalar, SpectroscopyError> {
    let energies = energies.to_base(Dimension::Wavenumber, "energies")?;
    let temperature = temperature.to_base(Dimension::Temperature, "temperature")?;
    let degeneracies = degeneracies.to_base(Dimension::Dimensionless, "degeneracies")?;
    ensure_len("degeneracies", energies.len(), degeneracies.len())?;
    ensure_temperature(temperature)?;

    let c2_over_t = SECOND_RADIATION_CONSTANT / temperature;
    let q: f64 = energies
        .iter()
        .zip(degeneracies.iter())
        .map(|(&e, &g)| g * (-c2_over_t * e).exp())
        .sum();

    debug!(
        levels = energies.len(),
        temperature_k = temperature,
        q,
        "Evaluated partition function."
    );
    Ok(Scalar::dimensionless(q))
}
