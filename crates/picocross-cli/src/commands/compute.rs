use crate::cli::ComputeArgs;
use crate::config::PartialRunConfig;
use crate::error::Result;
use crate::utils::progress::ProgressBarHandler;
use picocross::{
    core::io::output::write_cross_section_to_path,
    engine::{error::EngineError, progress::ProgressReporter},
    workflows,
};
use std::path::Path;
use tracing::{info, warn};

pub fn run(args: ComputeArgs, quiet: bool) -> Result<()> {
    let partial_config = PartialRunConfig::from_file(&args.config)?;
    let base_dir = args.config.parent().unwrap_or(Path::new("."));
    info!("Merging configuration from file and CLI arguments...");
    let app_config = partial_config.merge_with_cli(&args, base_dir)?;

    let progress_handler = if quiet {
        ProgressBarHandler::hidden()
    } else {
        ProgressBarHandler::new()
    };
    let reporter = ProgressReporter::with_callback(progress_handler.callback());

    println!("Computing cross-section...");
    let result = workflows::cross_section::run(&app_config.core_config, &reporter)?;
    let stats = result.stats;

    if result.cross_section.lines() == 0 {
        warn!("No transitions contributed to the cross-section.");
        println!("Warning: no transitions contributed; the cross-section is all zeros.");
    }
    if stats.unmatched > 0 {
        println!(
            "  {} transition(s) referred to unknown states and were skipped.",
            stats.unmatched
        );
    }
    if stats.non_physical > 0 {
        let action = if stats.discarded > 0 { "discarded" } else { "kept" };
        println!(
            "  {} transition(s) with non-positive wavenumber were {}.",
            stats.non_physical, action
        );
    }

    info!("Writing cross-section to {:?}", &app_config.output_path);
    write_cross_section_to_path(&app_config.output_path, &result.cross_section)
        .map_err(EngineError::from)?;

    println!(
        "✓ {} line(s) at {} K (Q = {:.6e}) written to: {}",
        result.cross_section.lines(),
        result.temperature.value(),
        result.partition_function.value(),
        app_config.output_path.display()
    );
    if let Some((position, peak)) = result.cross_section.peak() {
        println!("  Peak: {:.6e} cm^2 at {:.6} cm^-1", peak, position);
    }
    Ok(())
}
