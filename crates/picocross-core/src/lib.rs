//! # picocross Core Library
//!
//! Molecular absorption cross-sections from ExoMol-format line lists, built from
//! Boltzmann partition functions, absolute line intensities, and Doppler (Gaussian)
//! line-shape convolution onto a wavenumber grid.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer layout:
//!
//! - **[`core`]: The Foundation.** Physical units and constants, the level and transition
//!   data models, ExoMol file readers, and the pure numeric kernels (`partition`,
//!   `intensity`, `profile`).
//!
//! - **[`engine`]: The Glue.** Run configuration, error aggregation, progress reporting,
//!   and the [`engine::line_list::LineList`] pairing a states table with a directory of
//!   transitions files.
//!
//! - **[`workflows`]: The Public API.** The end-to-end cross-section pipeline that streams
//!   transition chunks through the intensity calculator into a profile accumulator.

pub mod core;
pub mod engine;
pub mod workflows;
