// Schedule generation for the study planner
// Produces per-day subject sequences that satisfy the adjacency constraint

pub mod csp;
pub mod generator;

pub use csp::ConstraintProblem;
pub use generator::{generate_from_preferences, generate_schedule, generate_schedule_with_difficulties};

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{PlannerError, PlannerResult};

/// Label used for the n-th generated day (1-based)
pub fn day_label(day: usize) -> String {
    format!("Day {}", day)
}

/// Extract the trailing ordinal of a day label such as "Day 3"
pub fn parse_day_ordinal(label: &str) -> Option<u64> {
    label.split_whitespace().last()?.parse().ok()
}

/// Ordered mapping from day label to the subject studied in each hour slot
///
/// Day order is insertion order and survives JSON round trips.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    days: Vec<(String, Vec<String>)>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a day, replacing the slots of an existing day in place
    pub fn insert(&mut self, day: impl Into<String>, slots: Vec<String>) {
        let day = day.into();
        match self.days.iter_mut().find(|(label, _)| *label == day) {
            Some(entry) => entry.1 = slots,
            None => self.days.push((day, slots)),
        }
    }

    pub fn get(&self, day: &str) -> Option<&[String]> {
        self.days
            .iter()
            .find(|(label, _)| label == day)
            .map(|(_, slots)| slots.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.days
            .iter()
            .map(|(label, slots)| (label.as_str(), slots.as_slice()))
    }

    pub fn day_labels(&self) -> impl Iterator<Item = &str> {
        self.days.iter().map(|(label, _)| label.as_str())
    }

    /// Number of days in the schedule
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Total number of hour slots across all days
    pub fn total_slots(&self) -> usize {
        self.days.iter().map(|(_, slots)| slots.len()).sum()
    }

    /// Longest day, used to size table output
    pub fn max_day_len(&self) -> usize {
        self.days
            .iter()
            .map(|(_, slots)| slots.len())
            .max()
            .unwrap_or(0)
    }
}

impl FromIterator<(String, Vec<String>)> for Schedule {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        let mut schedule = Schedule::new();
        for (day, slots) in iter {
            schedule.insert(day, slots);
        }
        schedule
    }
}

impl Serialize for Schedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.days.iter().map(|(day, slots)| (day, slots)))
    }
}

impl<'de> Deserialize<'de> for Schedule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        crate::utils::validation::validate_schedule(&value).map_err(D::Error::custom)
    }
}

/// Self-assessed difficulty of a subject
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Low,
    Medium,
    High,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Low => "low",
            Difficulty::Medium => "medium",
            Difficulty::High => "high",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Difficulty::Low),
            "medium" => Ok(Difficulty::Medium),
            "high" => Ok(Difficulty::High),
            other => Err(PlannerError::invalid_argument(format!(
                "Unknown difficulty '{}', expected low, medium or high",
                other
            ))),
        }
    }
}

/// Longest study day accepted in preferences
pub const MAX_HOURS_PER_DAY: usize = 24;

/// Longest plan accepted in preferences
pub const MAX_DAYS: usize = 366;

/// Preferences collected from the user before generating a schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub subjects: Vec<String>,
    #[serde(default)]
    pub difficulties: BTreeMap<String, Difficulty>,
    pub hours_per_day: usize,
    pub days: usize,
}

impl UserPreferences {
    pub fn new(subjects: Vec<String>, hours_per_day: usize, days: usize) -> Self {
        Self {
            subjects,
            difficulties: BTreeMap::new(),
            hours_per_day,
            days,
        }
    }

    pub fn with_difficulty(mut self, subject: impl Into<String>, difficulty: Difficulty) -> Self {
        self.difficulties.insert(subject.into(), difficulty);
        self
    }

    /// Difficulty of a subject, `Low` when none was given
    pub fn difficulty_of(&self, subject: &str) -> Difficulty {
        self.difficulties.get(subject).copied().unwrap_or_default()
    }

    pub fn validate(&self) -> PlannerResult<()> {
        if self.subjects.is_empty() {
            return Err(PlannerError::invalid_argument(
                "At least one subject is required",
            ));
        }
        if let Some(blank) = self.subjects.iter().find(|s| s.trim().is_empty()) {
            return Err(PlannerError::invalid_argument(format!(
                "Subject names must not be blank: {:?}",
                blank
            )));
        }
        for (idx, subject) in self.subjects.iter().enumerate() {
            if self.subjects[..idx].contains(subject) {
                return Err(PlannerError::invalid_argument(format!(
                    "Subject listed more than once: {}",
                    subject
                )));
            }
        }
        if !(1..=MAX_HOURS_PER_DAY).contains(&self.hours_per_day) {
            return Err(PlannerError::invalid_argument(format!(
                "Hours per day must be between 1 and {}, got {}",
                MAX_HOURS_PER_DAY, self.hours_per_day
            )));
        }
        if !(1..=MAX_DAYS).contains(&self.days) {
            return Err(PlannerError::invalid_argument(format!(
                "Days must be between 1 and {}, got {}",
                MAX_DAYS, self.days
            )));
        }
        Ok(())
    }
}
