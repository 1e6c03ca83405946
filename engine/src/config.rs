use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::errors::EngineError;

/// Synchronization used for the shared estimate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accumulator {
    /// Mutex-guarded critical section.
    #[default]
    Locked,
    /// Compare-and-swap loop over the f64 bit pattern.
    Atomic,
}

/// Output options for the rendered report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_precision")]
    pub precision: usize,
    #[serde(default)]
    pub contributions: bool,
}

const fn default_precision() -> usize {
    15
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            precision: default_precision(),
            contributions: false,
        }
    }
}

/// Reducer configuration loaded from TOML/YAML.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Worker count used when none is given on the command line.
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default)]
    pub accumulator: Accumulator,
    #[serde(default)]
    pub report: ReportConfig,
}

fn default_workers() -> usize {
    num_cpus::get().max(1)
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            accumulator: Accumulator::default(),
            report: ReportConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load a configuration from a TOML file on disk.
    pub fn from_toml_path<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let raw = fs::read_to_string(path)?;
        let cfg: Self = toml::from_str(&raw)?;
        Ok(cfg)
    }

    /// Load a configuration from a YAML file on disk.
    pub fn from_yaml_path<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let raw = fs::read_to_string(path)?;
        let cfg: Self = serde_yaml::from_str(&raw)?;
        Ok(cfg)
    }

    /// Pick the loader from the file extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_path(path),
            Some("yaml" | "yml") => Self::from_yaml_path(path),
            _ => Err(EngineError::other(format!(
                "unsupported config format: {}",
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_temp(suffix: &str, body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn toml_fills_defaults() {
        let file = write_temp(".toml", "accumulator = \"atomic\"\n");
        let cfg = EngineConfig::from_path(file.path()).unwrap();
        assert_eq!(cfg.accumulator, Accumulator::Atomic);
        assert_eq!(cfg.report.precision, 15);
        assert!(cfg.workers >= 1);
    }

    #[test]
    fn yaml_reads_nested_report() {
        let file = write_temp(".yml", "workers: 3\nreport:\n  precision: 6\n  contributions: true\n");
        let cfg = EngineConfig::from_path(file.path()).unwrap();
        assert_eq!(cfg.workers, 3);
        assert_eq!(cfg.accumulator, Accumulator::Locked);
        assert_eq!(cfg.report.precision, 6);
        assert!(cfg.report.contributions);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let file = write_temp(".ini", "workers=2");
        assert!(matches!(
            EngineConfig::from_path(file.path()),
            Err(EngineError::Other(_))
        ));
    }
}
