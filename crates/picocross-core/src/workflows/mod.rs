//! # Workflows Module
//!
//! High-level entry points that run a complete cross-section calculation.
//!
//! - **Cross-section workflow** ([`cross_section`]) - Loads a states table, streams every
//!   transitions file chunk by chunk through the join, intensity and broadening steps,
//!   and accumulates the Doppler profile on the configured grid.

pub mod cross_section;
