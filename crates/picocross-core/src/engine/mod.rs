//! # Engine Module
//!
//! Run-level plumbing between the stateless [`crate::core`] layer and the
//! [`crate::workflows`] entry points.
//!
//! - **Configuration** ([`config`]) - Validated run parameters and their builder
//! - **Error Handling** ([`error`]) - Aggregated error type propagated by workflows
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Line Lists** ([`line_list`]) - A states table paired with its transitions directory

pub mod config;
pub mod error;
pub mod line_list;
pub mod progress;
