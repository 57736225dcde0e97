//! Numeric core of the cross-section pipeline.
//!
//! - **Partition Function** ([`partition`]) - Boltzmann-weighted sum over energy levels
//! - **Line Intensities** ([`intensity`]) - Absolute intensities from Einstein A coefficients
//! - **Broadening** ([`broadening`]) - Gaussian half-widths, fixed or thermal
//! - **Doppler Profiles** ([`profile`]) - Batch and streaming convolution kernels onto a grid
//!
//! All public entry points accept unit-tagged [`crate::core::units::Quantity`] values and
//! reject untagged input before any arithmetic.

pub mod broadening;
pub mod error;
pub mod intensity;
pub mod partition;
pub mod profile;
