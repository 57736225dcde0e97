use crate::cli::PartitionArgs;
use crate::error::Result;
use picocross::core::io::states::read_exomol_states;
use picocross::core::units::Scalar;
use picocross::engine::error::EngineError;
use tracing::info;

pub fn run(args: PartitionArgs) -> Result<()> {
    let levels = read_exomol_states(&args.states).map_err(EngineError::from)?;
    info!(
        "Loaded {} levels from {}",
        levels.len(),
        args.states.display()
    );

    println!("{:>12}  {:>16}", "T [K]", "Q(T)");
    for temperature in &args.temperatures {
        let q = levels
            .partition_function(&Scalar::kelvin(*temperature))
            .map_err(EngineError::from)?;
        println!("{:>12.3}  {:>16.8e}", temperature, q.value());
    }
    Ok(())
}
