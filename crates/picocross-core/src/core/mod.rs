//! # Core Module
//!
//! Stateless building blocks of the cross-section pipeline.
//!
//! - **Units** ([`units`]) - Unit-tagged numeric wrappers validated at every public kernel boundary
//! - **Constants** ([`constants`]) - Physical constants in the internal CGS/wavenumber base
//! - **Data Models** ([`models`]) - Energy levels, transitions, joined line tables and spectral grids
//! - **File I/O** ([`io`]) - ExoMol states/transitions readers and cross-section output
//! - **Spectroscopy** ([`spectroscopy`]) - Partition function, line intensities and Doppler profiles

pub mod constants;
pub mod io;
pub mod models;
pub mod spectroscopy;
pub mod units;
