use thiserror::Error;

/// Unified error type for the reducer crate.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Subdivision count was zero or negative.
    #[error("invalid partition: subdivision count must be positive, got {0}")]
    InvalidPartition(i64),
    /// Worker count was zero, negative or not an integer.
    #[error("invalid worker count: {0}")]
    InvalidWorkerCount(String),
    /// The worker pool could not be built or a worker could not be spawned.
    #[error("resource exhaustion: {0}")]
    ResourceExhaustion(String),
    /// Malformed interactive input.
    #[error("invalid input: {0}")]
    Input(String),
    /// Wrapper around I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization or deserialization failures.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// YAML parsing error.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// TOML parsing error.
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
    /// Any other context dependent failure.
    #[error("{0}")]
    Other(String),
}

impl EngineError {
    pub fn other<T: Into<String>>(msg: T) -> Self {
        Self::Other(msg.into())
    }

    /// Errors raised by pre-spawn validation rather than by I/O or internals.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidPartition(_) | Self::InvalidWorkerCount(_) | Self::Input(_)
        )
    }
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_classified() {
        assert!(EngineError::InvalidPartition(0).is_validation());
        assert!(EngineError::InvalidWorkerCount("x".into()).is_validation());
        assert!(!EngineError::ResourceExhaustion("pool".into()).is_validation());
        assert!(!EngineError::other("phase").is_validation());
    }

    #[test]
    fn partition_message_names_the_count() {
        let msg = EngineError::InvalidPartition(-3).to_string();
        assert!(msg.contains("-3"));
    }
}
