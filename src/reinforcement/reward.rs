// Reward system for the schedule refiner
// Qualitative user feedback on a subject maps to a fixed numeric reward

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::PlannerError;

/// User rating of how well a subject is working in the schedule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackRating {
    Excellent,
    Good,
    #[default]
    Fair,
    Poor,
    VeryPoor,
}

impl FeedbackRating {
    pub const ALL: [FeedbackRating; 5] = [
        FeedbackRating::Excellent,
        FeedbackRating::Good,
        FeedbackRating::Fair,
        FeedbackRating::Poor,
        FeedbackRating::VeryPoor,
    ];

    /// Reward fed to the value update, in [-1.0, 1.0]
    pub fn reward(self) -> f64 {
        match self {
            FeedbackRating::Excellent => 1.0,
            FeedbackRating::Good => 0.5,
            FeedbackRating::Fair => 0.0,
            FeedbackRating::Poor => -0.5,
            FeedbackRating::VeryPoor => -1.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FeedbackRating::Excellent => "excellent",
            FeedbackRating::Good => "good",
            FeedbackRating::Fair => "fair",
            FeedbackRating::Poor => "poor",
            FeedbackRating::VeryPoor => "very_poor",
        }
    }
}

impl fmt::Display for FeedbackRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FeedbackRating {
    type Err = PlannerError;

    /// Accepts the snake_case labels, case-insensitively; "very poor" and
    /// "very-poor" are read as `very_poor`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        FeedbackRating::ALL
            .into_iter()
            .find(|rating| rating.label() == normalized)
            .ok_or_else(|| PlannerError::unknown_feedback(s.trim()))
    }
}

/// Feedback for one refinement pass: subject -> rating
pub type FeedbackMap = BTreeMap<String, FeedbackRating>;

/// Neutral feedback for every subject, overlaid with explicit ratings
pub fn feedback_with_defaults<'a>(
    subjects: impl IntoIterator<Item = &'a String>,
    explicit: &FeedbackMap,
) -> FeedbackMap {
    let mut feedback: FeedbackMap = subjects
        .into_iter()
        .map(|subject| (subject.clone(), FeedbackRating::default()))
        .collect();
    feedback.extend(explicit.iter().map(|(s, r)| (s.clone(), *r)));
    feedback
}
