use crate::cli::{ComputeArgs, KernelKind};
use crate::error::{CliError, Result};
use clap::ValueEnum;
use picocross::core::spectroscopy::profile::{DEFAULT_MAX_BATCH_ELEMENTS, KernelChoice};
use picocross::core::units::{Scalar, Unit};
use picocross::engine::config as core_config;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

const DEFAULT_OUTPUT: &str = "cross_section.csv";

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialGridConfig {
    start: Option<f64>,
    stop: Option<f64>,
    points: Option<usize>,
    unit: Option<Unit>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
enum BroadeningKind {
    Fixed,
    Thermal,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialBroadeningConfig {
    #[serde(rename = "type")]
    kind: Option<BroadeningKind>,
    half_width: Option<f64>,
    unit: Option<Unit>,
    molecular_mass: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PartialRunConfig {
    states: Option<PathBuf>,
    transitions: Option<PathBuf>,
    output: Option<PathBuf>,
    temperature: Option<f64>,
    chunk_size: Option<usize>,
    kernel: Option<KernelKind>,
    max_batch_elements: Option<usize>,
    discard_non_physical: Option<bool>,
    grid: Option<PartialGridConfig>,
    broadening: Option<PartialBroadeningConfig>,
}

/// A fully merged `compute` invocation.
#[derive(Debug)]
pub struct AppConfig {
    pub output_path: PathBuf,
    pub core_config: core_config::CrossSectionConfig,
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value)))
}

fn required<T>(value: Option<T>, key: &str) -> Result<T> {
    value.ok_or_else(|| {
        CliError::Config(format!(
            "A value for '{}' is required either in the config file or via CLI argument.",
            key
        ))
    })
}

impl PartialRunConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Merges file values with CLI flags and `--set` pairs, in increasing precedence.
    ///
    /// Relative paths are resolved against `base_dir`, normally the directory holding
    /// the config file.
    pub fn merge_with_cli(mut self, args: &ComputeArgs, base_dir: &Path) -> Result<AppConfig> {
        self.apply_set_values(&args.set_values)?;

        let resolve = |path: PathBuf| {
            if path.is_relative() {
                base_dir.join(path)
            } else {
                path
            }
        };

        let states_path = resolve(required(self.states, "states")?);
        let transitions_dir = resolve(required(self.transitions, "transitions")?);
        let output_path = match &args.output {
            Some(path) => path.clone(),
            None => resolve(self.output.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))),
        };
        let temperature = required(args.temperature.or(self.temperature), "temperature")?;

        let grid = Self::merge_grid(self.grid.unwrap_or_default())?;
        let broadening = Self::merge_broadening(self.broadening.unwrap_or_default())?;

        let max_batch_elements = self
            .max_batch_elements
            .unwrap_or(DEFAULT_MAX_BATCH_ELEMENTS);
        let kernel = match args.kernel.or(self.kernel).unwrap_or(KernelKind::Auto) {
            KernelKind::Batch => KernelChoice::Batch,
            KernelKind::Streaming => KernelChoice::Streaming,
            KernelKind::Auto => KernelChoice::Auto { max_batch_elements },
        };

        let mut builder = core_config::CrossSectionConfigBuilder::new()
            .states_path(states_path)
            .transitions_dir(transitions_dir)
            .temperature(Scalar::kelvin(temperature))
            .grid(grid)
            .broadening(broadening)
            .kernel(kernel)
            .discard_non_physical(
                args.discard_non_physical || self.discard_non_physical.unwrap_or(false),
            );
        if let Some(size) = args.chunk_size.or(self.chunk_size) {
            builder = builder.chunk_size(size);
        }

        let core_config = builder
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;
        Ok(AppConfig {
            output_path,
            core_config,
        })
    }

    fn merge_grid(partial: PartialGridConfig) -> Result<core_config::GridConfig> {
        let unit = partial.unit.unwrap_or(Unit::PerCentimeter);
        Ok(core_config::GridConfig {
            start: Scalar::new(required(partial.start, "grid.start")?, unit),
            stop: Scalar::new(required(partial.stop, "grid.stop")?, unit),
            points: required(partial.points, "grid.points")?,
        })
    }

    fn merge_broadening(
        partial: PartialBroadeningConfig,
    ) -> Result<core_config::BroadeningConfig> {
        match required(partial.kind, "broadening.type")? {
            BroadeningKind::Fixed => {
                let unit = partial.unit.unwrap_or(Unit::PerCentimeter);
                let half_width = required(partial.half_width, "broadening.half-width")?;
                Ok(core_config::BroadeningConfig::Fixed {
                    half_width: Scalar::new(half_width, unit),
                })
            }
            BroadeningKind::Thermal => Ok(core_config::BroadeningConfig::Thermal {
                molecular_mass_amu: required(partial.molecular_mass, "broadening.molecular-mass")?,
            }),
        }
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let key = key.trim();

            match key {
                "states" => self.states = Some(PathBuf::from(value)),
                "transitions" => self.transitions = Some(PathBuf::from(value)),
                "output" => self.output = Some(PathBuf::from(value)),
                "temperature" => self.temperature = Some(parse_value(key, value, "float")?),
                "chunk-size" => self.chunk_size = Some(parse_value(key, value, "integer")?),
                "max-batch-elements" => {
                    self.max_batch_elements = Some(parse_value(key, value, "integer")?)
                }
                "discard-non-physical" => {
                    self.discard_non_physical = Some(parse_value(key, value, "boolean")?)
                }
                "kernel" => {
                    self.kernel = Some(KernelKind::from_str(value.trim(), true).map_err(|_| {
                        CliError::Config(format!("Invalid kernel for {}: {}", key, value))
                    })?)
                }
                "grid.start" => {
                    self.grid.get_or_insert_with(Default::default).start =
                        Some(parse_value(key, value, "float")?)
                }
                "grid.stop" => {
                    self.grid.get_or_insert_with(Default::default).stop =
                        Some(parse_value(key, value, "float")?)
                }
                "grid.points" => {
                    self.grid.get_or_insert_with(Default::default).points =
                        Some(parse_value(key, value, "integer")?)
                }
                "grid.unit" => {
                    self.grid.get_or_insert_with(Default::default).unit =
                        Some(parse_value(key, value, "unit")?)
                }
                "broadening.type" => {
                    let kind = match value.trim() {
                        "fixed" => BroadeningKind::Fixed,
                        "thermal" => BroadeningKind::Thermal,
                        other => {
                            return Err(CliError::Config(format!(
                                "Invalid broadening type for {}: {}",
                                key, other
                            )));
                        }
                    };
                    self.broadening.get_or_insert_with(Default::default).kind = Some(kind);
                }
                "broadening.half-width" => {
                    self.broadening
                        .get_or_insert_with(Default::default)
                        .half_width = Some(parse_value(key, value, "float")?)
                }
                "broadening.unit" => {
                    self.broadening.get_or_insert_with(Default::default).unit =
                        Some(parse_value(key, value, "unit")?)
                }
                "broadening.molecular-mass" => {
                    self.broadening
                        .get_or_insert_with(Default::default)
                        .molecular_mass = Some(parse_value(key, value, "float")?)
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}
