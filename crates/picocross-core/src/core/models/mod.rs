//! Data structures for line-list spectroscopy.
//!
//! Energy levels are loaded once per molecule into a [`level::LevelTable`] and read-only
//! afterwards. Transitions arrive in transient [`transition::TransitionChunk`]s which are
//! joined against the level table into column-oriented [`transition::JoinedTransitions`].

pub mod cross_section;
pub mod grid;
pub mod level;
pub mod transition;
