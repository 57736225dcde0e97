//! Physical constants in the internal base units (cm, s, K, g).

/// Speed of light in vacuum, cm/s.
pub const SPEED_OF_LIGHT_CM_S: f64 = 2.997_924_58e10;

/// Planck constant, erg·s.
pub const PLANCK_ERG_S: f64 = 6.626_070_15e-27;

/// Boltzmann constant, erg/K.
pub const BOLTZMANN_ERG_K: f64 = 1.380_649e-16;

/// Second radiation constant `c2 = h·c/k_B`, cm·K.
pub const SECOND_RADIATION_CONSTANT: f64 = PLANCK_ERG_S * SPEED_OF_LIGHT_CM_S / BOLTZMANN_ERG_K;

/// Atomic mass unit, g.
pub const ATOMIC_MASS_UNIT_G: f64 = 1.660_539_066_60e-24;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_radiation_constant_matches_codata_value() {
        assert!((SECOND_RADIATION_CONSTANT - 1.438_776_877).abs() < 1e-9);
    }
}
