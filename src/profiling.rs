//! # Profiling
//!
//! With the `profiling` feature enabled, `EntityWorld::process_all` opens a
//! `world.process_all` span per phase and a `system.process` span per system,
//! and `GameLoop::step` opens a `frame` span. The helpers here install a
//! subscriber to collect them.
//!
//! ```toml
//! [dependencies]
//! final_engine = { version = "0.1", features = ["profiling"] }
//! ```
//!
//! ```ignore
//! // Console output filtered by RUST_LOG (defaults to `info`)
//! final_engine::profiling::init_subscriber()?;
//!
//! // Or JSON lines into ./traces/frames.<date>, for chrome://tracing converters
//! let _guard = final_engine::profiling::init_file_subscriber("traces", "frames")?;
//! ```

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::error::{EcsError, Result};

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install a console subscriber filtered by `RUST_LOG`.
pub fn init_subscriber() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .try_init()
        .map_err(|e| EcsError::InvalidConfig(format!("tracing subscriber: {e}")))
}

/// Install a JSON subscriber writing daily-rotated files under `directory`.
///
/// Keep the returned guard alive; dropping it flushes and stops the writer.
pub fn init_file_subscriber(directory: impl AsRef<Path>, file_prefix: &str) -> Result<WorkerGuard> {
    std::fs::create_dir_all(directory.as_ref())?;
    let appender = tracing_appender::rolling::daily(directory.as_ref(), file_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_thread_ids(true)
        .json()
        .try_init()
        .map_err(|e| EcsError::InvalidConfig(format!("tracing subscriber: {e}")))?;

    Ok(guard)
}
