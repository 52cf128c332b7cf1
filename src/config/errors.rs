//! Unified error handling utilities
//!
//! `AdapterError` is the taxonomy every public operation reports through its
//! outcome. Filesystem plumbing uses anyhow internally and is converted at the
//! orchestrator boundary.

use thiserror::Error;

pub type Result<T, E = AdapterError> = std::result::Result<T, E>;

/// Errors (and soft conditions) raised while driving the engine
#[derive(Error, Debug)]
pub enum AdapterError {
    /// Bad caller input, detected before any engine interaction
    #[error("Configuration error: {0}")]
    Config(String),

    /// A sought type or member is not exposed by the loaded engine
    #[error("Capability absent: {0}")]
    CapabilityAbsent(String),

    /// A type or member the operation cannot proceed without is absent
    #[error("Engine does not support {0}")]
    Unsupported(String),

    /// The engine raised a fault inside a resolved member
    #[error("Engine fault in {member}: {cause}")]
    EngineFault { member: String, cause: String },

    /// The job ran and reported failure
    #[error("Job failed with code {code}")]
    JobFailed { code: i64 },

    /// No execute-like method exists on the job
    #[error("Job {type_name} exposes no execute method; incompatible engine version")]
    JobNotExecutable { type_name: String },

    /// The engine reported success but the expected artifact is missing
    #[error("Postcondition failed: {0}")]
    Postcondition(String),

    /// Filesystem plumbing around a job failed
    #[error("I/O error: {0}")]
    Io(String),
}

impl AdapterError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn absent(msg: impl Into<String>) -> Self {
        Self::CapabilityAbsent(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    pub fn postcondition(msg: impl Into<String>) -> Self {
        Self::Postcondition(msg.into())
    }

    /// Soft conditions are recorded as warnings and never abort an operation
    pub fn is_soft(&self) -> bool {
        matches!(self, Self::CapabilityAbsent(_))
    }
}

impl From<anyhow::Error> for AdapterError {
    fn from(err: anyhow::Error) -> Self {
        Self::Io(format!("{:#}", err))
    }
}

impl From<std::io::Error> for AdapterError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Error context builders for common operations
pub trait ErrorContextExt<T> {
    /// Add file operation context
    fn file_context(self, path: &std::path::Path) -> anyhow::Result<T>;
}

impl<T, E> ErrorContextExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn file_context(self, path: &std::path::Path) -> anyhow::Result<T> {
        anyhow::Context::with_context(self, || format!("File operation failed: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_context_builders() {
        let result: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));

        let err = result.file_context(std::path::Path::new("/tmp/x")).unwrap_err();
        let converted = AdapterError::from(err);
        let msg = converted.to_string();
        assert!(msg.contains("File operation failed"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn test_soft_classification() {
        assert!(AdapterError::absent("Stemming").is_soft());
        assert!(!AdapterError::JobFailed { code: 3 }.is_soft());
        assert!(!AdapterError::config("empty").is_soft());
    }
}
