//! Diagnostics toggle, host log sink and tracing setup
//!
//! Diagnostic lines are emitted through `tracing` and then forwarded to the
//! host's log sink, if one was installed. Call sites go through [`diag!`],
//! which checks the toggle before formatting anything.

use crate::config::AdapterConfig;
use std::panic::{self, AssertUnwindSafe};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::EnvFilter;

type LogSink = Box<dyn Fn(&str) + Send + Sync>;

static DIAGNOSTICS: AtomicBool = AtomicBool::new(false);
static SINK: OnceLock<LogSink> = OnceLock::new();

/// Turn diagnostic output on or off for the whole process
pub fn set_diagnostics(enabled: bool) {
    DIAGNOSTICS.store(enabled, Ordering::Relaxed);
}

#[inline]
pub fn diagnostics_enabled() -> bool {
    DIAGNOSTICS.load(Ordering::Relaxed)
}

/// Install the host log sink. Only the first call wins; later calls return false.
pub fn set_log_sink<F>(sink: F) -> bool
where
    F: Fn(&str) + Send + Sync + 'static,
{
    SINK.set(Box::new(sink)).is_ok()
}

/// Route one line to tracing and the host sink. Sink panics are swallowed.
pub fn emit(message: &str) {
    tracing::debug!(target: "fts_adapter::diag", "{}", message);
    if let Some(sink) = SINK.get() {
        let _ = panic::catch_unwind(AssertUnwindSafe(|| sink(message)));
    }
}

/// Emit a formatted diagnostic line when diagnostics are enabled
#[macro_export]
macro_rules! diag {
    ($($arg:tt)*) => {
        if $crate::diagnostics::diagnostics_enabled() {
            $crate::diagnostics::emit(&format!($($arg)*));
        }
    };
}

/// Install a stderr `tracing` subscriber for hosts without their own
///
/// Also applies `config.diagnostics` to the process-wide toggle. Returns false
/// when a global subscriber is already set; the toggle is applied either way.
pub fn init_logging(config: &AdapterConfig) -> bool {
    set_diagnostics(config.diagnostics);
    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init()
        .is_ok()
}
