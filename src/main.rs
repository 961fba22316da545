//! `runway` - replay a workload file against the concurrent runway.

#![forbid(unsafe_code)]

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use runway::{RunwayConfig, Simulation, SimulationError, Workload, WorkloadError};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Exit code for missing or malformed arguments (EINVAL).
const EXIT_USAGE: i32 = 22;

#[derive(Debug, Parser)]
#[command(name = "runway", version, about = "Simulate aircraft sharing a two-slot runway")]
struct Cli {
    /// Workload file: one `class gap runway_time` record per line.
    workload: PathBuf,

    /// Multiplier applied to every workload duration (0.01 runs 100x faster).
    #[arg(long, default_value_t = 1.0)]
    time_scale: f64,

    /// Seed for fuel reserve generation.
    #[arg(long)]
    seed: Option<u64>,

    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if err.use_stderr() => {
            let _ = err.print();
            std::process::exit(EXIT_USAGE);
        }
        Err(err) => err.exit(),
    };

    init_tracing(cli.verbose);

    if let Err(err) = main_impl(&cli) {
        let code = if let Some(workload) = err.downcast_ref::<WorkloadError>() {
            workload.exit_code()
        } else if matches!(
            err.downcast_ref::<SimulationError>(),
            Some(SimulationError::Config(_))
        ) {
            EXIT_USAGE
        } else {
            1
        };
        eprintln!("Error: {err:#}");
        std::process::exit(code);
    }
}

fn main_impl(cli: &Cli) -> Result<()> {
    let config = RunwayConfig {
        time_scale: cli.time_scale,
        ..RunwayConfig::default()
    };
    let simulation = Simulation::new(config).context("invalid runway configuration")?;

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let workload = Workload::load(&cli.workload, simulation.config(), &mut rng)?;
    info!(
        target: "runway.simulation",
        path = %cli.workload.display(),
        aircraft = workload.len(),
        "workload loaded"
    );

    let report = simulation.run(&workload)?;
    println!("{report}");
    Ok(())
}

/// `RUST_LOG` wins; otherwise `-v` raises the runway targets above `info`.
fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        EnvFilter::new(format!("warn,runway={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .with_writer(io::stderr)
        .init();
}
