use serde_json::Value;
use std::collections::HashSet;

use crate::error::{PlannerError, PlannerResult};
use crate::planner::Schedule;
use crate::utils::fs::json_type_name;

/// Check that `value` has the shape of a schedule and convert it
///
/// The top level must be a mapping of day label to a list of subject names.
/// Day keys are always textual in JSON, so only the values need checking.
pub fn validate_schedule(value: &Value) -> PlannerResult<Schedule> {
    let days = value.as_object().ok_or_else(|| {
        PlannerError::validation(format!(
            "Schedule must be a mapping of day to subjects, got {}",
            json_type_name(value)
        ))
    })?;

    let mut schedule = Schedule::new();
    for (day, subjects) in days {
        let subjects = subjects.as_array().ok_or_else(|| {
            PlannerError::validation(format!("{} must have a list of subjects", day))
        })?;

        let slots = subjects
            .iter()
            .map(|subject| {
                subject.as_str().map(str::to_string).ok_or_else(|| {
                    PlannerError::validation(format!(
                        "Each subject must be a string, got {} in {}",
                        json_type_name(subject),
                        day
                    ))
                })
            })
            .collect::<PlannerResult<Vec<_>>>()?;

        schedule.insert(day.clone(), slots);
    }

    Ok(schedule)
}

/// Check a schedule against the configured subjects and day length
pub fn check_schedule(
    schedule: &Schedule,
    subjects: &[String],
    hours_per_day: usize,
) -> PlannerResult<()> {
    let known: HashSet<&str> = subjects.iter().map(String::as_str).collect();

    for (day, slots) in schedule.iter() {
        if slots.len() != hours_per_day {
            return Err(PlannerError::validation(format!(
                "{} has {} slots, expected {}",
                day,
                slots.len(),
                hours_per_day
            )));
        }
        if let Some(unknown) = slots.iter().find(|s| !known.contains(s.as_str())) {
            return Err(PlannerError::validation(format!(
                "{} contains unknown subject '{}'",
                day, unknown
            )));
        }
    }

    Ok(())
}
