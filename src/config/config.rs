use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{PlannerError, PlannerResult};

/// Main configuration structure for the study planner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Where the application state (preferences and schedules) is kept
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,

    /// Where the learned policy is kept
    #[serde(default = "default_policy_path")]
    pub policy_path: PathBuf,

    #[serde(default)]
    pub refiner: RefinerConfig,

    #[serde(default)]
    pub defaults: PlanDefaults,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefinerConfig {
    pub learning_rate: f64,
    pub discount_factor: f64,
    pub exploration_rate: f64,
    pub state_size: usize,
}

impl Default for RefinerConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount_factor: 0.9,
            exploration_rate: 0.1,
            state_size: 10,
        }
    }
}

/// Values used when the command line does not provide them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanDefaults {
    pub subjects: Vec<String>,
    pub hours_per_day: usize,
    pub days: usize,
}

impl Default for PlanDefaults {
    fn default() -> Self {
        Self {
            subjects: vec!["Math".into(), "Science".into(), "English".into()],
            hours_per_day: 4,
            days: 5,
        }
    }
}

fn default_state_path() -> PathBuf {
    PathBuf::from("data").join("planner_state.json")
}

fn default_policy_path() -> PathBuf {
    PathBuf::from("data").join("planner_policy.json")
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            state_path: default_state_path(),
            policy_path: default_policy_path(),
            refiner: RefinerConfig::default(),
            defaults: PlanDefaults::default(),
        }
    }
}

impl PlannerConfig {
    pub fn load(path: &Path) -> PlannerResult<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let content =
            std::fs::read_to_string(path).map_err(|e| PlannerError::io_error(e, Some(path)))?;

        let config: Self = match ext {
            "json" => serde_json::from_str(&content)?,
            "yaml" | "yml" => serde_yaml::from_str(&content)?,
            "toml" => toml::from_str(&content)?,
            _ => return Err(PlannerError::UnsupportedFormat(ext.to_string())),
        };
        config.validate()?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load `path` if given, else the default location if it exists, else defaults
    pub fn load_or_default(path: Option<&Path>) -> PlannerResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = Self::default_config_path();
                if default_path.exists() {
                    Self::load(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn save(&self, path: &Path) -> PlannerResult<()> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let content = match ext {
            "json" => serde_json::to_string_pretty(self)?,
            "yaml" | "yml" => serde_yaml::to_string(self)?,
            "toml" => toml::to_string(self)?,
            _ => return Err(PlannerError::UnsupportedFormat(ext.to_string())),
        };

        std::fs::write(path, content).map_err(|e| PlannerError::io_error(e, Some(path)))?;
        Ok(())
    }

    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("study-planner")
            .join("config.toml")
    }

    pub fn validate(&self) -> PlannerResult<()> {
        let refiner = &self.refiner;
        for (name, value) in [
            ("learning_rate", refiner.learning_rate),
            ("discount_factor", refiner.discount_factor),
            ("exploration_rate", refiner.exploration_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PlannerError::invalid_argument(format!(
                    "refiner.{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        if refiner.state_size == 0 {
            return Err(PlannerError::invalid_argument(
                "refiner.state_size must be at least 1",
            ));
        }
        Ok(())
    }
}
