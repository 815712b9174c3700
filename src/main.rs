//! SimLogue - discrete-time analog circuit simulator
//!
//! # Usage
//!
//! ```bash
//! simlogue rc.circuit 0.05 --samplerate 100000 --export-tables --tables ./tables/
//! ```

use std::path::PathBuf;

use clap::Parser;
use simlogue::{dsl, error::Result, Circuit, SimError, SimulationConfig, DEFAULT_SAMPLE_RATE};

/// Discrete-time analog circuit simulator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the circuit description file
    #[arg(value_name = "CIRCUIT_FILE")]
    circuit_file: PathBuf,

    /// Simulated duration in seconds
    #[arg(value_name = "DURATION")]
    duration: f64,

    /// Sample rate in Hz (the time step is its inverse)
    #[arg(short = 'r', long = "samplerate", default_value_t = DEFAULT_SAMPLE_RATE)]
    sample_rate: f64,

    /// Directory the scope tables are written to
    #[arg(short = 't', long = "tables", default_value = "./tables/")]
    tables: PathBuf,

    /// Export every scope as a CSV table after the run
    #[arg(short = 'e', long = "export-tables")]
    export_tables: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if !(args.sample_rate.is_finite() && args.sample_rate > 0.0) {
        return Err(SimError::invalid_param("sample rate must be positive"));
    }
    if !(args.duration.is_finite() && args.duration > 0.0) {
        return Err(SimError::invalid_param("duration must be positive"));
    }

    // Build the circuit
    let config = SimulationConfig::default().with_sample_rate(args.sample_rate);
    let mut circuit = Circuit::with_config(config);
    dsl::load_file(&args.circuit_file, &mut circuit)?;

    // Simulate
    let report = circuit.run_for_seconds(args.duration)?;
    if let Some(err) = &report.failure {
        eprintln!("warning: {}", err);
    }

    if args.export_tables {
        for path in circuit.export_scopes(&args.tables)? {
            println!("{}", path.display());
        }
    }

    Ok(())
}
