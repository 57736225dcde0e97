use crate::core::io::transitions::DEFAULT_CHUNK_SIZE;
use crate::core::models::grid::SpectralGrid;
use crate::core::spectroscopy::error::SpectroscopyError;
use crate::core::spectroscopy::profile::KernelChoice;
use crate::core::units::Scalar;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{parameter}': {reason}")]
    Invalid {
        parameter: &'static str,
        reason: String,
    },
}

/// Evenly spaced output grid, endpoints inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct GridConfig {
    pub start: Scalar,
    pub stop: Scalar,
    pub points: usize,
}

impl GridConfig {
    pub fn build(&self) -> Result<SpectralGrid, SpectroscopyError> {
        SpectralGrid::linspace(&self.start, &self.stop, self.points)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BroadeningConfig {
    /// One half-width (HWHM) shared by every line.
    Fixed { half_width: Scalar },
    /// Thermal Doppler half-width of each line for the given molecular mass.
    Thermal { molecular_mass_amu: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CrossSectionConfig {
    pub states_path: PathBuf,
    pub transitions_dir: PathBuf,
    pub temperature: Scalar,
    pub grid: GridConfig,
    pub broadening: BroadeningConfig,
    pub kernel: KernelChoice,
    pub chunk_size: usize,
    /// Drop transitions with `vfi <= 0` before computing intensities.
    pub discard_non_physical: bool,
}

#[derive(Default)]
pub struct CrossSectionConfigBuilder {
    states_path: Option<PathBuf>,
    transitions_dir: Option<PathBuf>,
    temperature: Option<Scalar>,
    grid: Option<GridConfig>,
    broadening: Option<BroadeningConfig>,
    kernel: Option<KernelChoice>,
    chunk_size: Option<usize>,
    discard_non_physical: Option<bool>,
}

impl CrossSectionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn states_path(mut self, path: PathBuf) -> Self {
        self.states_path = Some(path);
        self
    }
    pub fn transitions_dir(mut self, path: PathBuf) -> Self {
        self.transitions_dir = Some(path);
        self
    }
    pub fn temperature(mut self, temperature: Scalar) -> Self {
        self.temperature = Some(temperature);
        self
    }
    pub fn grid(mut self, grid: GridConfig) -> Self {
        self.grid = Some(grid);
        self
    }
    pub fn broadening(mut self, broadening: BroadeningConfig) -> Self {
        self.broadening = Some(broadening);
        self
    }
    pub fn kernel(mut self, kernel: KernelChoice) -> Self {
        self.kernel = Some(kernel);
        self
    }
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = Some(size);
        self
    }
    pub fn discard_non_physical(mut self, discard: bool) -> Self {
        self.discard_non_physical = Some(discard);
        self
    }

    pub fn build(self) -> Result<CrossSectionConfig, ConfigError> {
        let chunk_size = self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE);
        if chunk_size == 0 {
            return Err(ConfigError::Invalid {
                parameter: "chunk_size",
                reason: "must be at least 1".to_string(),
            });
        }
        let grid = self.grid.ok_or(ConfigError::MissingParameter("grid"))?;
        if grid.points < 2 {
            return Err(ConfigError::Invalid {
                parameter: "grid.points",
                reason: format!("need at least 2 points, got {}", grid.points),
            });
        }
        let broadening = self
            .broadening
            .ok_or(ConfigError::MissingParameter("broadening"))?;
        if let BroadeningConfig::Thermal { molecular_mass_amu } = broadening {
            if !(molecular_mass_amu > 0.0) {
                return Err(ConfigError::Invalid {
                    parameter: "broadening.molecular_mass_amu",
                    reason: format!("must be positive, got {}", molecular_mass_amu),
                });
            }
        }

        Ok(CrossSectionConfig {
            states_path: self
                .states_path
                .ok_or(ConfigError::MissingParameter("states_path"))?,
            transitions_dir: self
                .transitions_dir
                .ok_or(ConfigError::MissingParameter("transitions_dir"))?,
            temperature: self
                .temperature
                .ok_or(ConfigError::MissingParameter("temperature"))?,
            grid,
            broadening,
            kernel: self.kernel.unwrap_or_default(),
            chunk_size,
            discard_non_physical: self.discard_non_physical.unwrap_or(false),
        })
    }
}
