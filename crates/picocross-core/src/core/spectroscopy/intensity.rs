use super::error::{SpectroscopyError, ensure_temperature};
use crate::core::constants::{SECOND_RADIATION_CONSTANT, SPEED_OF_LIGHT_CM_S};
use crate::core::models::transition::JoinedTransitions;
use crate::core::units::{Dimension, Quantity, Scalar, Unit};
use itertools::izip;
use std::f64::consts::PI;
use tracing::trace;

/// `1 - exp(-c2·ν/T)`, accurate for small `ν`.
#[inline]
pub fn stimulated_emission_factor(vfi: f64, c2_over_t: f64) -> f64 {
    -(-c2_over_t * vfi).exp_m1()
}

/// Absolute intensity of one line in cm/molecule.
///
/// No check is made on `vfi`: a non-positive line position gives a negative or NaN
/// result.
///
/// # Arguments
///
/// * `afi` - Einstein A coefficient, s⁻¹.
/// * `vfi` - Line position, cm⁻¹.
/// * `energy_lower` - Lower-state energy, cm⁻¹.
/// * `g_upper` - Total degeneracy of the upper state.
/// * `c2_over_t` - `c2 / T`, in cm.
/// * `partition_function` - `Q(T)` at the same temperature.
#[inline]
pub fn line_intensity(
    afi: f64,
    vfi: f64,
    energy_lower: f64,
    g_upper: f64,
    c2_over_t: f64,
    partition_function: f64,
) -> f64 {
    let factor = g_upper * afi / (8.0 * PI * SPEED_OF_LIGHT_CM_S * vfi * vfi);
    let population = (-c2_over_t * energy_lower).exp();
    factor * population * stimulated_emission_factor(vfi, c2_over_t) / partition_function
}

/// Line positions and absolute intensities for a joined transition table.
///
/// Rows with `vfi <= 0` are passed through unfiltered; use
/// [`JoinedTransitions::retain_physical`] first if they must not contribute.
///
/// # Arguments
///
/// * `transitions` - Transitions joined with their upper and lower levels.
/// * `temperature` - Must carry a temperature unit.
/// * `partition_function` - Dimensionless `Q` at `temperature`.
///
/// # Return
///
/// `(vfi [cm⁻¹], intensity [cm])`, one entry per row of `transitions`.
///
/// # Errors
///
/// Untagged or mis-dimensioned `temperature`/`partition_function`, a non-positive
/// temperature, or a partition function that is not strictly positive.
pub fn transition_intensities(
    transitions: &JoinedTransitions,
    temperature: &Scalar,
    partition_function: &Scalar,
) -> Result<(Quantity, Quantity), SpectroscopyError> {
    let temperature = temperature.to_base(Dimension::Temperature, "temperature")?;
    let q = partition_function.to_base(Dimension::Dimensionless, "partition_function")?;
    ensure_temperature(temperature)?;
    if !(q.is_finite() && q > 0.0) {
        return Err(SpectroscopyError::Domain(format!(
            "partition function must be strictly positive, got {}",
            q
        )));
    }

    let c2_over_t = SECOND_RADIATION_CONSTANT / temperature;
    let intensities: Vec<f64> = izip!(
        &transitions.afi,
        &transitions.vfi,
        &transitions.energy_lower,
        &transitions.g_total_upper
    )
    .map(|(&afi, &vfi, &e_lower, &g_upper)| {
        line_intensity(afi, vfi, e_lower, g_upper, c2_over_t, q)
    })
    .collect();

    trace!(
        lines = intensities.len(),
        temperature_k = temperature,
        "Computed line intensities."
    );

    Ok((
        Quantity::new(transitions.vfi.clone(), Unit::PerCentimeter),
        Quantity::new(intensities, Unit::Centimeter),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::level::{EnergyLevel, LevelTable};
    use crate::core::models::transition::{Transition, TransitionChunk, merge_transitions_states};
    use crate::core::units::UnitsError;

    fn six_states() -> LevelTable {
        [
            (1, 0.000000),
            (2, 1594.873096),
            (3, 3151.677108),
            (4, 3657.155752),
            (5, 4666.724999),
            (6, 5235.220005),
        ]
        .into_iter()
        .map(|(id, e)| EnergyLevel::new(id, e, 1.0, 0.0))
        .collect()
    }

    fn five_transitions() -> TransitionChunk {
        TransitionChunk::new(vec![
            Transition::new(2, 1, 6.4700e-22),
            Transition::new(2, 5, 1.4010e-20),
            Transition::new(5, 3, 3.5010e-26),
            Transition::new(3, 4, 2.3110e-24),
            Transition::new(7, 6, 1.3020e-19),
        ])
    }

    fn single_line(vfi: f64, energy_lower: f64, g_upper: f64, afi: f64) -> JoinedTransitions {
        let mut joined = JoinedTransitions::default();
        joined.push(
            &EnergyLevel::new(2, energy_lower + vfi, g_upper, 1.0),
            &EnergyLevel::new(1, energy_lower, 1.0, 0.0),
            afi,
        );
        joined
    }

    #[test]
    fn single_line_matches_hand_computed_intensity() {
        let (vfi, e_low, g_up, afi, t, q) = (1000.0, 200.0, 3.0, 10.0, 296.0, 2.5);
        let joined = single_line(vfi, e_low, g_up, afi);

        let (positions, intensities) =
            transition_intensities(&joined, &Scalar::kelvin(t), &Scalar::dimensionless(q))
                .unwrap();

        let c2 = SECOND_RADIATION_CONSTANT;
        let expected = g_up * afi / (8.0 * PI * SPEED_OF_LIGHT_CM_S * vfi * vfi)
            * (-c2 * e_low / t).exp()
            * (1.0 - (-c2 * vfi / t).exp())
            / q;
        assert!((positions.values()[0] - vfi).abs() < 1e-9);
        assert!((intensities.values()[0] - expected).abs() <= expected * 1e-12);
        assert_eq!(positions.unit(), Some(Unit::PerCentimeter));
        assert_eq!(intensities.unit(), Some(Unit::Centimeter));
    }

    #[test]
    fn stimulated_emission_term_vanishes_linearly_as_vfi_goes_to_zero() {
        let c2_over_t = SECOND_RADIATION_CONSTANT / 300.0;
        let mut previous = f64::INFINITY;
        for vfi in [1.0, 1e-2, 1e-4, 1e-8] {
            let term = stimulated_emission_factor(vfi, c2_over_t);
            assert!(term > 0.0 && term < previous);
            assert!((term / (c2_over_t * vfi) - 1.0).abs() < 1e-2);
            previous = term;
        }
    }

    #[test]
    fn exomol_fixture_intensities_are_finite_and_non_negative_after_filtering() {
        let mut joined = merge_transitions_states(&six_states(), &five_transitions());
        assert_eq!(joined.len(), 4);
        joined.retain_physical();

        let (positions, intensities) = transition_intensities(
            &joined,
            &Scalar::kelvin(300.0),
            &Scalar::dimensionless(1.0),
        )
        .unwrap();

        assert_eq!(positions.len(), intensities.len());
        assert!(!intensities.is_empty());
        assert!(
            intensities
                .values()
                .iter()
                .all(|v| v.is_finite() && *v >= 0.0)
        );
    }

    #[test]
    fn non_physical_lines_are_passed_through_not_dropped() {
        let joined = merge_transitions_states(&six_states(), &five_transitions());
        let (positions, intensities) = transition_intensities(
            &joined,
            &Scalar::kelvin(300.0),
            &Scalar::dimensionless(1.0),
        )
        .unwrap();

        assert_eq!(intensities.len(), joined.len());
        for (&vfi, &intensity) in positions.values().iter().zip(intensities.values()) {
            if vfi < 0.0 {
                assert!(intensity < 0.0);
            }
        }
    }

    #[test]
    fn zero_vfi_yields_nan_instead_of_an_error() {
        let joined = single_line(0.0, 100.0, 1.0, 1.0);
        let (_, intensities) = transition_intensities(
            &joined,
            &Scalar::kelvin(300.0),
            &Scalar::dimensionless(1.0),
        )
        .unwrap();
        assert!(intensities.values()[0].is_nan());
    }

    #[test]
    fn zero_partition_function_is_a_domain_error() {
        let joined = single_line(100.0, 0.0, 1.0, 1.0);
        let result = transition_intensities(
            &joined,
            &Scalar::kelvin(300.0),
            &Scalar::dimensionless(0.0),
        );
        assert!(matches!(result, Err(SpectroscopyError::Domain(_))));
    }

    #[test]
    fn untagged_temperature_is_rejected() {
        let joined = single_line(100.0, 0.0, 1.0, 1.0);
        let result =
            transition_intensities(&joined, &Scalar::raw(300.0), &Scalar::dimensionless(1.0));
        assert!(matches!(
            result,
            Err(SpectroscopyError::Units(UnitsError::Missing { .. }))
        ));
    }

    #[test]
    fn untagged_partition_function_is_rejected() {
        let joined = single_line(100.0, 0.0, 1.0, 1.0);
        let result = transition_intensities(&joined, &Scalar::kelvin(300.0), &Scalar::raw(1.0));
        assert!(matches!(
            result,
            Err(SpectroscopyError::Units(UnitsError::Missing {
                argument: "partition_function",
                ..
            }))
        ));
    }

    #[test]
    fn empty_table_gives_empty_arrays() {
        let (positions, intensities) = transition_intensities(
            &JoinedTransitions::default(),
            &Scalar::kelvin(300.0),
            &Scalar::dimensionless(1.0),
        )
        .unwrap();
        assert!(positions.is_empty());
        assert!(intensities.is_empty());
    }
}
