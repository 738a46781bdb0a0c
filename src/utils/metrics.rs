use serde::Serialize;

use crate::planner::Schedule;

/// Descriptive statistics about how study hours are spread across subjects
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleMetrics {
    /// Every assigned slot, including subjects outside the catalog
    pub total_hours: usize,
    /// Hours per catalog subject, in catalog order
    pub subject_hours: Vec<(String, usize)>,
    pub avg_hours_per_subject: f64,
    pub std_deviation: f64,
    /// `1 - std / mean`; higher is more balanced, 0 when the mean is 0
    pub balance_score: f64,
}

impl ScheduleMetrics {
    pub fn hours_for(&self, subject: &str) -> Option<usize> {
        self.subject_hours
            .iter()
            .find(|(name, _)| name == subject)
            .map(|(_, hours)| *hours)
    }
}

/// Compute hour totals and balance for a schedule
pub fn calculate_schedule_metrics(schedule: &Schedule, subjects: &[String]) -> ScheduleMetrics {
    let mut subject_hours: Vec<(String, usize)> = Vec::with_capacity(subjects.len());
    for subject in subjects {
        if !subject_hours.iter().any(|(name, _)| name == subject) {
            subject_hours.push((subject.clone(), 0));
        }
    }

    let mut total_hours = 0;
    for (_, slots) in schedule.iter() {
        for subject in slots {
            if let Some(entry) = subject_hours.iter_mut().find(|(name, _)| name == subject) {
                entry.1 += 1;
            }
            total_hours += 1;
        }
    }

    let count = subject_hours.len();
    let (avg, std_dev) = if count == 0 {
        (0.0, 0.0)
    } else {
        let avg = total_hours as f64 / count as f64;
        let variance = subject_hours
            .iter()
            .map(|(_, hours)| (*hours as f64 - avg).powi(2))
            .sum::<f64>()
            / count as f64;
        (avg, variance.sqrt())
    };

    let balance_score = if avg > 0.0 { 1.0 - std_dev / avg } else { 0.0 };

    ScheduleMetrics {
        total_hours,
        subject_hours,
        avg_hours_per_subject: avg,
        std_deviation: std_dev,
        balance_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn schedule(days: &[&[&str]]) -> Schedule {
        days.iter()
            .enumerate()
            .map(|(i, slots)| (format!("Day {}", i + 1), names(slots)))
            .collect()
    }

    #[test]
    fn test_perfectly_balanced() {
        let subjects = names(&["Math", "Art"]);
        let metrics =
            calculate_schedule_metrics(&schedule(&[&["Math", "Art"], &["Art", "Math"]]), &subjects);

        assert_eq!(metrics.total_hours, 4);
        assert_eq!(metrics.hours_for("Math"), Some(2));
        assert_eq!(metrics.avg_hours_per_subject, 2.0);
        assert_eq!(metrics.std_deviation, 0.0);
        assert_eq!(metrics.balance_score, 1.0);
    }

    #[test]
    fn test_unbalanced_schedule() {
        let subjects = names(&["Math", "Art"]);
        let metrics = calculate_schedule_metrics(&schedule(&[&["Math", "Math", "Math", "Art"]]), &subjects);

        // mean 2, std 1
        assert_eq!(metrics.std_deviation, 1.0);
        assert!((metrics.balance_score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_subjects_count_towards_total_only() {
        let subjects = names(&["Math"]);
        let metrics = calculate_schedule_metrics(&schedule(&[&["Math", "Music"]]), &subjects);
        assert_eq!(metrics.total_hours, 2);
        assert_eq!(metrics.hours_for("Math"), Some(1));
        assert_eq!(metrics.hours_for("Music"), None);
    }

    #[test]
    fn test_empty_inputs() {
        let metrics = calculate_schedule_metrics(&Schedule::new(), &names(&["Math"]));
        assert_eq!(metrics.total_hours, 0);
        assert_eq!(metrics.balance_score, 0.0);

        let metrics = calculate_schedule_metrics(&schedule(&[&["Math"]]), &[]);
        assert_eq!(metrics.avg_hours_per_subject, 0.0);
        assert_eq!(metrics.balance_score, 0.0);
    }
}
