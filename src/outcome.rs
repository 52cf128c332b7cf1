//! Per-call outcome: success flag, last error and every warning

use crate::config::AdapterError;
use serde::Serialize;

/// Result of one adapter-level call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OperationOutcome {
    pub success: bool,
    pub last_error: Option<String>,
    pub last_warning: Option<String>,
    /// Every soft failure in the order it happened
    pub warnings: Vec<String>,
}

impl OperationOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a soft, ignorable condition
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!("warning: {}", message);
        self.last_warning = Some(message.clone());
        self.warnings.push(message);
    }

    /// Record a failure; soft adapter errors are downgraded to warnings
    pub fn fail(&mut self, error: AdapterError) {
        if error.is_soft() {
            self.warn(error.to_string());
            return;
        }
        tracing::warn!("{}", error);
        self.success = false;
        self.last_error = Some(error.to_string());
    }

    /// Record `result`'s error as a warning; returns whether it succeeded
    ///
    /// An optional step never clears success, so an engine fault here is a
    /// warning too.
    pub fn soft<T, E: Into<AdapterError>>(&mut self, result: Result<T, E>) -> bool {
        match result.map_err(Into::into) {
            Ok(_) => true,
            Err(e) if e.is_soft() => {
                self.fail(e);
                false
            }
            Err(e) => {
                self.warn(e.to_string());
                false
            }
        }
    }

    pub fn succeed(&mut self) {
        self.success = true;
        self.last_error = None;
    }

    /// Outcome that failed before any engine interaction
    pub fn failed(error: AdapterError) -> Self {
        let mut outcome = Self::new();
        outcome.fail(error);
        outcome
    }
}
