use serde::{Deserialize, Serialize};
use serde_json::error::Category;
use serde_json::Value;
use std::path::Path;

use crate::error::{PlannerError, PlannerResult};
use crate::planner::{Schedule, UserPreferences};
use crate::reinforcement::FeedbackMap;
use crate::utils::fs::{load_state, save_state};

/// Persisted application state shared between planner runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_preferences: Option<UserPreferences>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_schedule: Option<Schedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimized_schedule: Option<Schedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<FeedbackMap>,
}

impl AppState {
    /// Load the state file; a missing file gives an empty state
    ///
    /// Stored schedules are validated on the way in, and a malformed one is
    /// reported as a validation error.
    pub fn load(path: impl AsRef<Path>) -> PlannerResult<Self> {
        let map = load_state(path)?;
        serde_json::from_value(Value::Object(map)).map_err(|e| match e.classify() {
            Category::Data => PlannerError::validation(e.to_string()),
            _ => e.into(),
        })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> PlannerResult<()> {
        match serde_json::to_value(self)? {
            Value::Object(map) => save_state(&map, path),
            _ => Err(PlannerError::Serialization(
                "application state did not serialize to an object".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reinforcement::FeedbackRating;
    use tempfile::tempdir;

    #[test]
    fn test_missing_state_is_empty() {
        let dir = tempdir().unwrap();
        let state = AppState::load(dir.path().join("state.json")).unwrap();
        assert_eq!(state, AppState::default());
    }

    #[test]
    fn test_state_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut schedule = Schedule::new();
        schedule.insert("Day 1", vec!["Math".into(), "Art".into()]);
        let mut feedback = FeedbackMap::new();
        feedback.insert("Art".into(), FeedbackRating::Poor);

        let state = AppState {
            user_preferences: Some(UserPreferences::new(vec!["Math".into(), "Art".into()], 2, 1)),
            generated_schedule: Some(schedule.clone()),
            optimized_schedule: Some(schedule),
            feedback: Some(feedback),
        };
        state.save(&path).unwrap();
        assert_eq!(AppState::load(&path).unwrap(), state);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"Art\": \"poor\""));
    }

    #[test]
    fn test_malformed_schedule_is_a_validation_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, r#"{"generated_schedule": {"Day 1": [1, 2]}}"#).unwrap();

        let err = AppState::load(&path).unwrap_err();
        assert!(err.is_validation(), "{}", err);
    }
}
