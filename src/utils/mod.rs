pub mod display;
pub mod fs;
pub mod metrics;
pub mod validation;

// Re-exports for convenience
pub use display::{format_hour_chart, format_metrics, format_schedule_table};
pub use fs::{load_state, save_state};
pub use metrics::{calculate_schedule_metrics, ScheduleMetrics};
pub use validation::{check_schedule, validate_schedule};
