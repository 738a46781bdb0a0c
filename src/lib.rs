// Study Planner - constraint-based study timetables refined by Q-learning
// Generation and refinement are independent; the session layer wires them together

pub mod config;
pub mod core;
pub mod error;
pub mod planner;
pub mod reinforcement;
pub mod utils;

pub use error::{PlannerError, PlannerResult};

use anyhow::Result;
use tracing::info;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Initialize logging with default settings
pub fn init() -> Result<()> {
    init_with_logger(true, false)
}

/// Initialize logging
///
/// Logs go to stderr so the timetable on stdout stays clean. `RUST_LOG`
/// overrides the default level chosen by `verbose`.
pub fn init_with_logger(ansi_colors: bool, verbose: bool) -> Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let default_directive = if verbose {
        "study_planner=debug"
    } else {
        "study_planner=warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    fmt::Subscriber::builder()
        .with_ansi(ansi_colors)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(verbose)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Initializing study planner v{}", version());
    Ok(())
}
