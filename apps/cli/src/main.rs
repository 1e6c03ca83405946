use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use trap_engine::{
    io as engine_io, telemetry, EngineConfig, EngineError, Reducer, Square, WorkerCount,
};

/// Exit status for rejected arguments or input; other failures exit with 1.
const EXIT_INVALID_INPUT: u8 = 2;

#[derive(Parser)]
#[command(author, version, about = "Parallel trapezoidal-rule integrator", long_about = None)]
struct Cli {
    /// Number of worker threads (defaults to the configured count)
    workers: Option<String>,

    /// Reducer configuration (.toml, .yaml or .yml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(exit_status(&err))
        }
    }
}

fn exit_status(err: &anyhow::Error) -> u8 {
    let invalid = err
        .chain()
        .filter_map(|cause| cause.downcast_ref::<EngineError>())
        .any(EngineError::is_validation);
    if invalid {
        EXIT_INVALID_INPUT
    } else {
        1
    }
}

fn configured_workers(cfg: &EngineConfig) -> Result<WorkerCount, EngineError> {
    let count = i64::try_from(cfg.workers).map_err(|_| {
        EngineError::InvalidWorkerCount(format!("configured count {} is too large", cfg.workers))
    })?;
    WorkerCount::new(count)
}

fn run(cli: Cli) -> Result<()> {
    let cfg = match &cli.config {
        Some(path) => EngineConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let workers = match cli.workers.as_deref() {
        Some(raw) => engine_io::parse_worker_count(raw)?,
        None => configured_workers(&cfg)
            .context("config does not provide a usable worker count")?,
    };
    tracing::info!(
        target: "engine",
        workers = workers.get(),
        accumulator = ?cfg.accumulator,
        "trap starting"
    );

    // Keep stdout clean for the JSON document.
    if cli.json {
        eprintln!("{}", engine_io::PROMPT);
    } else {
        println!("{}", engine_io::PROMPT);
        io::stdout().flush()?;
    }
    let request = engine_io::read_request(&mut io::stdin().lock()).context("reading a, b, n")?;
    let params = request.into_params()?;
    tracing::info!(target: "engine", n = params.subdivisions(), "starting reduction");

    let reducer = Reducer::new(cfg);
    let report = reducer.run(&params, workers, &Square)?;
    telemetry::record_report(&report);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cli.json {
        engine_io::write_json(&mut out, &report)?;
    } else {
        let precision = reducer.config().report.precision;
        write!(out, "{}", engine_io::render_report(&report, precision))?;
        if reducer.config().report.contributions {
            write!(out, "{}", engine_io::render_contributions(&report, precision))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_exit_with_two() {
        let err = anyhow::Error::from(EngineError::InvalidPartition(0));
        assert_eq!(exit_status(&err), EXIT_INVALID_INPUT);
        let wrapped = anyhow::Error::from(EngineError::Input("n = \"x\"".into()))
            .context("reading a, b, n");
        assert_eq!(exit_status(&wrapped), EXIT_INVALID_INPUT);
    }

    #[test]
    fn other_failures_exit_with_one() {
        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "closed");
        assert_eq!(exit_status(&anyhow::Error::from(EngineError::Io(io_err))), 1);
        let pool = EngineError::ResourceExhaustion("pool".into());
        assert_eq!(exit_status(&anyhow::Error::from(pool)), 1);
    }

    #[test]
    fn oversized_configured_count_is_invalid() {
        let cfg = EngineConfig {
            workers: usize::MAX,
            ..EngineConfig::default()
        };
        assert!(matches!(
            configured_workers(&cfg),
            Err(EngineError::InvalidWorkerCount(msg)) if msg.contains("too large")
        ));
        let cfg = EngineConfig {
            workers: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(configured_workers(&cfg), Err(EngineError::InvalidWorkerCount(_))));
        let cfg = EngineConfig {
            workers: 3,
            ..EngineConfig::default()
        };
        assert_eq!(configured_workers(&cfg).unwrap().get(), 3);
    }

    #[test]
    fn cli_accepts_optional_workers() {
        let cli = Cli::try_parse_from(["trap", "4", "--json"]).unwrap();
        assert_eq!(cli.workers.as_deref(), Some("4"));
        assert!(cli.json);
        let cli = Cli::try_parse_from(["trap"]).unwrap();
        assert!(cli.workers.is_none());
    }
}
