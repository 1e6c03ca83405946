use std::{
    fmt::Write as _,
    io::{BufRead, Write},
};

use serde::Serialize;

use crate::{
    errors::{EngineError, Result},
    params::IntegrationRequest,
    partition::WorkerCount,
    reducer::EstimateReport,
};

pub const PROMPT: &str = "Enter a, b, n";

/// Read `a b n` from `reader`. Values are whitespace separated and may span
/// several lines; anything after the third value is ignored.
pub fn read_request<R: BufRead>(reader: &mut R) -> Result<IntegrationRequest> {
    let mut tokens: Vec<String> = Vec::with_capacity(3);
    let mut line = String::new();
    while tokens.len() < 3 {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(EngineError::Input(format!(
                "expected a, b and n but input ended after {} value(s)",
                tokens.len()
            )));
        }
        tokens.extend(line.split_whitespace().map(str::to_owned));
    }
    if tokens.len() > 3 {
        tracing::debug!(target: "engine", extra = tokens.len() - 3, "ignoring trailing input");
    }

    Ok(IntegrationRequest {
        lower: parse_token(&tokens[0], "a")?,
        upper: parse_token(&tokens[1], "b")?,
        subdivisions: parse_token(&tokens[2], "n")?,
    })
}

fn parse_token<T>(token: &str, name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    token
        .parse()
        .map_err(|err| EngineError::Input(format!("{name} = {token:?}: {err}")))
}

pub fn parse_worker_count(raw: &str) -> Result<WorkerCount> {
    WorkerCount::parse(raw)
}

/// Three-line human readable report.
pub fn render_report(report: &EstimateReport, precision: usize) -> String {
    format!(
        "With n = {} trapezoids, our estimate\n\
         of the integral from {:.6} to {:.6} = {:.prec$}\n\
         Time elapsed: {:.6}\n",
        report.subdivisions,
        report.lower,
        report.upper,
        report.estimate,
        report.elapsed.as_secs_f64(),
        prec = precision,
    )
}

/// One line per worker: index, assigned range and scaled contribution.
pub fn render_contributions(report: &EstimateReport, precision: usize) -> String {
    let mut out = String::new();
    for c in &report.contributions {
        let _ = writeln!(
            out,
            "worker {:>3}: [{}, {}) -> {:.prec$}",
            c.worker.get(),
            c.range.start,
            c.range.end,
            c.contribution,
            prec = precision,
        );
    }
    out
}

pub fn write_json<T, W>(mut writer: W, value: &T) -> Result<()>
where
    T: Serialize,
    W: Write,
{
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    Ok(())
}
