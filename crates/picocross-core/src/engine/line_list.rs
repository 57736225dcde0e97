use super::error::EngineError;
use crate::core::io::error::LineListError;
use crate::core::io::states::read_exomol_states;
use crate::core::io::transitions::{TransitionChunks, transition_files};
use crate::core::models::level::LevelTable;
use crate::core::models::transition::{JoinedTransitions, merge_transitions_states};
use crate::core::spectroscopy::error::SpectroscopyError;
use crate::core::spectroscopy::intensity::transition_intensities;
use crate::core::units::{Quantity, Scalar};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// A states table paired with the directory holding its `*.trans` files.
///
/// Transitions are never held in memory as a whole; every accessor walks the
/// directory again in chunks.
#[derive(Debug, Clone)]
pub struct LineList {
    levels: LevelTable,
    transitions_dir: PathBuf,
}

impl LineList {
    pub fn new(levels: LevelTable, transitions_dir: impl Into<PathBuf>) -> Self {
        Self {
            levels,
            transitions_dir: transitions_dir.into(),
        }
    }

    #[instrument(skip_all, name = "line_list_load")]
    pub fn load(
        states_path: impl AsRef<Path>,
        transitions_dir: impl Into<PathBuf>,
    ) -> Result<Self, LineListError> {
        let states_path = states_path.as_ref();
        let levels = read_exomol_states(states_path)?;
        info!(
            levels = levels.len(),
            "Loaded states from {}",
            states_path.display()
        );
        Ok(Self::new(levels, transitions_dir))
    }

    pub fn levels(&self) -> &LevelTable {
        &self.levels
    }

    pub fn transitions_dir(&self) -> &Path {
        &self.transitions_dir
    }

    /// The `*.trans` files of the transitions directory, in name order.
    ///
    /// # Errors
    ///
    /// [`LineListError::NotFound`] if the directory is missing.
    pub fn files(&self) -> Result<Vec<PathBuf>, LineListError> {
        transition_files(&self.transitions_dir)
    }

    pub fn partition_function(&self, temperature: &Scalar) -> Result<Scalar, SpectroscopyError> {
        self.levels.partition_function(temperature)
    }

    /// Transitions joined with the level table, `chunk_size` raw rows at a time.
    pub fn chunks(
        &self,
        chunk_size: usize,
    ) -> Result<impl Iterator<Item = Result<JoinedTransitions, LineListError>> + '_, LineListError>
    {
        let chunks = TransitionChunks::open(&self.transitions_dir, chunk_size)?;
        Ok(chunks.map(move |chunk| chunk.map(|c| merge_transitions_states(&self.levels, &c))))
    }

    /// `(vfi [cm⁻¹], intensity [cm])` per chunk at `temperature`.
    ///
    /// The partition function is evaluated once, before any transitions file is opened.
    pub fn intensities<'a>(
        &'a self,
        temperature: &Scalar,
        chunk_size: usize,
    ) -> Result<
        impl Iterator<Item = Result<(Quantity, Quantity), EngineError>> + use<'a>,
        EngineError,
    > {
        let q = self.partition_function(temperature)?;
        let temperature = *temperature;
        let chunks = self.chunks(chunk_size)?;
        Ok(chunks.map(move |joined| {
            let joined = joined?;
            Ok(transition_intensities(&joined, &temperature, &q)?)
        }))
    }
}
