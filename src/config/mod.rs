// Configuration module for the study planner
// File paths, refiner hyperparameters and planning defaults

#[allow(clippy::module_inception)]
pub mod config;

pub use config::{PlanDefaults, PlannerConfig, RefinerConfig};
