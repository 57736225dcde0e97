use crate::core::io::error::LineListError;
use crate::core::io::transitions::TransitionFileReader;
use crate::core::models::cross_section::CrossSection;
use crate::core::models::level::LevelTable;
use crate::core::models::transition::{TransitionChunk, merge_transitions_states};
use crate::core::spectroscopy::broadening::{HalfWidths, doppler_half_width};
use crate::core::spectroscopy::intensity::transition_intensities;
use crate::core::spectroscopy::profile::ProfileAccumulator;
use crate::core::units::Scalar;
use crate::engine::config::{BroadeningConfig, CrossSectionConfig};
use crate::engine::error::EngineError;
use crate::engine::line_list::LineList;
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{debug, info, instrument, warn};

/// Counters collected while streaming transitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub chunks: usize,
    /// Raw transition rows read.
    pub transitions: usize,
    /// Rows referring to a level id missing from the states table.
    pub unmatched: usize,
    /// Joined rows with `vfi <= 0`.
    pub non_physical: usize,
    /// Non-physical rows removed before broadening.
    pub discarded: usize,
}

#[derive(Debug, Clone)]
pub struct CrossSectionResult {
    pub cross_section: CrossSection,
    pub temperature: Scalar,
    pub partition_function: Scalar,
    pub stats: RunStats,
}

struct Pipeline<'a> {
    levels: &'a LevelTable,
    config: &'a CrossSectionConfig,
    partition_function: Scalar,
    accumulator: ProfileAccumulator,
    stats: RunStats,
}

impl<'a> Pipeline<'a> {
    fn new(levels: &'a LevelTable, config: &'a CrossSectionConfig) -> Result<Self, EngineError> {
        let partition_function = levels.partition_function(&config.temperature)?;
        let grid = config.grid.build()?;
        info!(
            levels = levels.len(),
            partition_function = partition_function.value(),
            grid_points = grid.len(),
            "Prepared cross-section pipeline."
        );
        Ok(Self {
            levels,
            config,
            partition_function,
            accumulator: ProfileAccumulator::new(grid, config.kernel),
            stats: RunStats::default(),
        })
    }

    fn consume(&mut self, chunk: &TransitionChunk) -> Result<(), EngineError> {
        self.stats.chunks += 1;
        self.stats.transitions += chunk.len();

        let mut joined = merge_transitions_states(self.levels, chunk);
        self.stats.unmatched += joined.unmatched;
        self.stats.non_physical += joined.non_physical_count();
        if self.config.discard_non_physical {
            self.stats.discarded += joined.retain_physical();
        }
        if joined.is_empty() {
            return Ok(());
        }

        let (centers, intensities) = transition_intensities(
            &joined,
            &self.config.temperature,
            &self.partition_function,
        )?;
        let half_widths = match &self.config.broadening {
            BroadeningConfig::Fixed { half_width } => HalfWidths::Shared(*half_width),
            BroadeningConfig::Thermal { molecular_mass_amu } => HalfWidths::PerLine(
                doppler_half_width(&centers, &self.config.temperature, *molecular_mass_amu)?,
            ),
        };
        self.accumulator
            .add_lines(&centers, &intensities, &half_widths)?;
        Ok(())
    }

    fn finish(self) -> CrossSectionResult {
        let stats = self.stats;
        if stats.unmatched > 0 {
            warn!(
                unmatched = stats.unmatched,
                "Transitions referring to unknown states were skipped."
            );
        }
        if stats.discarded > 0 {
            warn!(
                discarded = stats.discarded,
                "Discarded transitions with non-positive wavenumber."
            );
        } else if stats.non_physical > 0 {
            warn!(
                non_physical = stats.non_physical,
                "Transitions with non-positive wavenumber were kept."
            );
        }
        CrossSectionResult {
            cross_section: self.accumulator.finish(),
            temperature: self.config.temperature,
            partition_function: self.partition_function,
            stats,
        }
    }
}

/// Accumulates a cross-section from an already-loaded states table and any source of
/// transition chunks.
///
/// The partition function is evaluated once, before the first chunk is pulled. The
/// first failing chunk aborts the run. A progress task is only started when `chunks`
/// knows its length; otherwise increments are reported against the phase alone.
///
/// # Errors
///
/// Any error from a chunk source, the join, the intensities or the profile. Without
/// `discard_non_physical`, a zero-wavenumber line has a NaN intensity and fails with
/// [`crate::core::spectroscopy::error::SpectroscopyError::Domain`].
pub fn accumulate<I>(
    levels: &LevelTable,
    chunks: I,
    config: &CrossSectionConfig,
    reporter: &ProgressReporter,
) -> Result<CrossSectionResult, EngineError>
where
    I: IntoIterator<Item = Result<TransitionChunk, LineListError>>,
{
    let mut pipeline = Pipeline::new(levels, config)?;
    let chunks = chunks.into_iter();

    reporter.report(Progress::PhaseStart {
        name: "Accumulating Profile",
    });
    let known_length = match chunks.size_hint() {
        (lower, Some(upper)) if lower == upper => Some(upper),
        _ => None,
    };
    if let Some(total) = known_length {
        reporter.report(Progress::TaskStart {
            total_steps: total as u64,
        });
    }
    for chunk in chunks {
        pipeline.consume(&chunk?)?;
        reporter.report(Progress::TaskIncrement);
    }
    if known_length.is_some() {
        reporter.report(Progress::TaskFinish);
    }
    reporter.report(Progress::PhaseFinish);

    Ok(pipeline.finish())
}

/// Loads the line list named by `config` and accumulates its cross-section, one
/// transitions file at a time.
#[instrument(skip_all, name = "cross_section_workflow")]
pub fn run(
    config: &CrossSectionConfig,
    reporter: &ProgressReporter,
) -> Result<CrossSectionResult, EngineError> {
    // === Phase 1: Load states and locate transitions files ===
    reporter.report(Progress::PhaseStart {
        name: "Loading States",
    });
    let line_list = LineList::load(&config.states_path, &config.transitions_dir)?;
    let files = line_list.files()?;
    info!(files = files.len(), "Located transitions files.");
    if files.is_empty() {
        warn!("No transitions files found; the cross-section will be zero.");
        if !reporter.is_silent() {
            reporter.report(Progress::Message(format!(
                "No transitions files found in {}",
                line_list.transitions_dir().display()
            )));
        }
    }
    reporter.report(Progress::PhaseFinish);

    // === Phase 2: Stream transitions into the profile ===
    let mut pipeline = Pipeline::new(line_list.levels(), config)?;
    reporter.report(Progress::PhaseStart {
        name: "Accumulating Profile",
    });
    reporter.report(Progress::TaskStart {
        total_steps: files.len() as u64,
    });
    for path in &files {
        debug!("Processing transitions file {}", path.display());
        for chunk in TransitionFileReader::open(path, config.chunk_size)? {
            pipeline.consume(&chunk?)?;
        }
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    // === Phase 3: Finalize ===
    let result = pipeline.finish();
    info!(
        lines = result.cross_section.lines(),
        chunks = result.stats.chunks,
        "Cross-section complete."
    );
    Ok(result)
}
