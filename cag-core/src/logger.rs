//! Global tracing subscriber: console and log file share the same `fmt`
//! layer (level, target, span, all fields). Reads `RUST_LOG` for the filter
//! (default `info`).

use std::fs::OpenOptions;
use std::io;
use std::sync::Arc;

use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Initializes the global tracing subscriber, tee-ing output to stdout and
/// `log_file_path`. Idempotent within a process: a second call returns `Ok`
/// without reinitializing if a subscriber is already set.
pub fn init_tracing(log_file_path: &str) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;
    let file = Arc::new(file);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    use tracing_subscriber::fmt::writer::MakeWriterExt;
    let writer = io::stdout.and(file);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(true)
        .with_thread_ids(true)
        .with_level(true)
        .with_file(false)
        .with_line_number(false);

    let result = Registry::default().with(env_filter).with(fmt_layer).try_init();

    // Tests in several crates call this more than once per process.
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.to_string().contains("already") => Ok(()),
        Err(e) => Err(anyhow::anyhow!("failed to set global subscriber: {}", e)),
    }
}
