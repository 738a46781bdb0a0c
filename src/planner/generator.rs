// Per-day schedule generation
// Each day is an independent CSP: one variable per hour slot, adjacent slots differ

use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::planner::{day_label, ConstraintProblem, Difficulty, Schedule, UserPreferences};

/// Generate a schedule where no two adjacent hour slots share a subject
///
/// Days whose constraints cannot be satisfied (a single distinct subject with
/// two or more hours, or no subjects at all) are left out of the result.
pub fn generate_schedule(subjects: &[String], hours_per_day: usize, days: usize) -> Schedule {
    generate_schedule_with_difficulties(subjects, &BTreeMap::new(), hours_per_day, days)
}

/// Generate a schedule trying harder subjects first in each day
///
/// Subjects without a difficulty count as `Low`. The starting subject rotates
/// from day to day among subjects of equal difficulty.
pub fn generate_schedule_with_difficulties(
    subjects: &[String],
    difficulties: &BTreeMap<String, Difficulty>,
    hours_per_day: usize,
    days: usize,
) -> Schedule {
    let distinct = distinct_subjects(subjects);
    let mut schedule = Schedule::new();

    for day in 1..=days {
        let domain = day_domain(&distinct, difficulties, day);
        match solve_day(&domain, hours_per_day) {
            Some(slots) => {
                debug!("Generated {}: {:?}", day_label(day), slots);
                schedule.insert(day_label(day), slots);
            }
            None => warn!(
                "No valid assignment for {} ({} distinct subjects, {} hours); day omitted",
                day_label(day),
                distinct.len(),
                hours_per_day
            ),
        }
    }

    schedule
}

/// Generate a schedule from stored user preferences
pub fn generate_from_preferences(preferences: &UserPreferences) -> Schedule {
    generate_schedule_with_difficulties(
        &preferences.subjects,
        &preferences.difficulties,
        preferences.hours_per_day,
        preferences.days,
    )
}

fn distinct_subjects(subjects: &[String]) -> Vec<String> {
    let mut distinct: Vec<String> = Vec::with_capacity(subjects.len());
    for subject in subjects {
        if !distinct.contains(subject) {
            distinct.push(subject.clone());
        }
    }
    distinct
}

/// Value ordering for one day: rotated by day, then hardest first (stable)
fn day_domain(
    distinct: &[String],
    difficulties: &BTreeMap<String, Difficulty>,
    day: usize,
) -> Vec<String> {
    let mut domain = distinct.to_vec();
    if !domain.is_empty() {
        let shift = (day - 1) % domain.len();
        domain.rotate_left(shift);
    }
    domain.sort_by_key(|subject| {
        std::cmp::Reverse(difficulties.get(subject).copied().unwrap_or_default())
    });
    domain
}

fn solve_day(domain: &[String], hours_per_day: usize) -> Option<Vec<String>> {
    let mut problem = ConstraintProblem::new();
    let slots: Vec<usize> = (0..hours_per_day)
        .map(|_| problem.add_variable(domain.to_vec()))
        .collect();

    for pair in slots.windows(2) {
        problem.add_constraint(pair[0], pair[1], |first: &String, second: &String| {
            first != second
        });
    }

    problem.solve()
}
