// Feedback-driven schedule refinement
// Replays the learned policy onto a schedule, learning from feedback on the way

use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::PlannerResult;
use crate::planner::Schedule;
use crate::reinforcement::{q_learning::QLearningSystem, reward::FeedbackMap};

/// Counters from one refinement pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefineSummary {
    /// Slots visited
    pub slots: usize,
    /// Value updates applied from feedback
    pub updates: usize,
    /// Slots whose subject changed
    pub changed: usize,
}

/// Refines generated schedules using a Q-learning policy
#[derive(Debug, Clone)]
pub struct ScheduleRefiner {
    q_learning: QLearningSystem,
    last_summary: RefineSummary,
}

impl ScheduleRefiner {
    pub fn new(q_learning: QLearningSystem) -> Self {
        Self {
            q_learning,
            last_summary: RefineSummary::default(),
        }
    }

    pub fn q_learning(&self) -> &QLearningSystem {
        &self.q_learning
    }

    pub fn q_learning_mut(&mut self) -> &mut QLearningSystem {
        &mut self.q_learning
    }

    pub fn last_summary(&self) -> RefineSummary {
        self.last_summary
    }

    /// Walk every slot of `schedule` in order and replace its subject with the
    /// policy's choice for the slot's state
    ///
    /// Slots whose current subject has feedback update the value of the chosen
    /// action first. The replacement uses the action selected before that
    /// update, so the output has the same days and slot counts as the input.
    pub fn refine(&mut self, schedule: &Schedule, feedback: &FeedbackMap) -> PlannerResult<Schedule> {
        let states = self.q_learning.states();
        let mut summary = RefineSummary::default();
        let mut refined = Schedule::new();

        for unknown in feedback
            .keys()
            .filter(|s| !self.q_learning.catalog().contains(s))
        {
            warn!("Feedback for '{}' which is not in the policy's subjects", unknown);
        }

        for (day, subjects) in schedule.iter() {
            let mut day_schedule = Vec::with_capacity(subjects.len());

            for (idx, subject) in subjects.iter().enumerate() {
                let state = states.state_for(day, idx);
                let action = self.q_learning.select_action(state)?;

                if let Some(rating) = feedback.get(subject) {
                    let next_state = states.state_for(day, idx + 1);
                    let value = self
                        .q_learning
                        .update(state, action, rating.reward(), next_state)?;
                    summary.updates += 1;
                    debug!(
                        "{} hour {}: {} rated {} -> Q[{}][{}] = {:.4}",
                        day,
                        idx + 1,
                        subject,
                        rating,
                        state,
                        action,
                        value
                    );
                }

                let new_subject = self.q_learning.action_to_subject(action).to_string();
                if new_subject != *subject {
                    summary.changed += 1;
                }
                summary.slots += 1;
                day_schedule.push(new_subject);
            }

            refined.insert(day, day_schedule);
        }

        info!(
            "Refined {} slots over {} days ({} value updates, {} subjects changed)",
            summary.slots,
            refined.len(),
            summary.updates,
            summary.changed
        );
        self.last_summary = summary;
        Ok(refined)
    }

    /// Persist the complete policy state
    pub fn persist(&self, path: impl AsRef<Path>) -> PlannerResult<()> {
        self.q_learning.save(path)
    }

    /// Restore the complete policy state; `false` if nothing was saved yet
    pub fn restore(&mut self, path: impl AsRef<Path>) -> PlannerResult<bool> {
        self.q_learning.load(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::generate_schedule;
    use crate::reinforcement::reward::FeedbackRating;
    use tempfile::tempdir;

    fn subjects() -> Vec<String> {
        vec!["Math".into(), "Physics".into(), "Chemistry".into()]
    }

    fn refiner(epsilon: f64, seed: u64) -> ScheduleRefiner {
        let q = QLearningSystem::new(subjects(), 10, 0.1, 0.9, epsilon)
            .unwrap()
            .with_seed(seed);
        ScheduleRefiner::new(q)
    }

    #[test]
    fn test_refine_preserves_shape() {
        let schedule = generate_schedule(&subjects(), 4, 5);
        let mut feedback = FeedbackMap::new();
        feedback.insert("Math".into(), FeedbackRating::Poor);

        for feedback in [FeedbackMap::new(), feedback] {
            let mut refiner = refiner(0.5, 11);
            let refined = refiner.refine(&schedule, &feedback).unwrap();

            let days: Vec<_> = refined.day_labels().collect();
            assert_eq!(days, schedule.day_labels().collect::<Vec<_>>());
            for (day, slots) in schedule.iter() {
                assert_eq!(refined.get(day).unwrap().len(), slots.len());
            }
            assert_eq!(refiner.last_summary().slots, schedule.total_slots());
        }
    }

    #[test]
    fn test_empty_feedback_does_not_touch_table() {
        let schedule = generate_schedule(&subjects(), 3, 2);
        let mut refiner = refiner(0.2, 3);
        let before = refiner.q_learning().q_table().clone();

        refiner.refine(&schedule, &FeedbackMap::new()).unwrap();
        assert_eq!(refiner.q_learning().q_table(), &before);
        assert_eq!(refiner.last_summary().updates, 0);
    }

    #[test]
    fn test_positive_feedback_increases_selected_value() {
        let mut schedule = Schedule::new();
        schedule.insert("Day 1", vec!["Math".to_string()]);
        let mut feedback = FeedbackMap::new();
        feedback.insert("Math".into(), FeedbackRating::Excellent);

        let mut refiner = refiner(0.0, 1);
        let state = refiner.q_learning().states().state_for("Day 1", 0);
        // Greedy on an all-zero table picks action 0
        let before = refiner.q_learning().q_value(state, 0).unwrap();

        let refined = refiner.refine(&schedule, &feedback).unwrap();
        let after = refiner.q_learning().q_value(state, 0).unwrap();

        assert!(after > before);
        assert_eq!(refined.get("Day 1").unwrap(), &["Math".to_string()][..]);
        assert_eq!(refiner.last_summary().updates, 1);
    }

    #[test]
    fn test_negative_feedback_moves_policy_away() {
        let mut schedule = Schedule::new();
        schedule.insert("Day 1", vec!["Math".to_string()]);
        let mut feedback = FeedbackMap::new();
        feedback.insert("Math".into(), FeedbackRating::VeryPoor);

        let mut refiner = refiner(0.0, 1);
        let first = refiner.refine(&schedule, &feedback).unwrap();
        assert_eq!(first.get("Day 1").unwrap()[0], "Math");

        // Action 0 now has a negative value, so the greedy choice moves on
        let second = refiner.refine(&schedule, &feedback).unwrap();
        assert_eq!(second.get("Day 1").unwrap()[0], "Physics");
    }

    #[test]
    fn test_persist_and_restore() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("policy.json");

        let schedule = generate_schedule(&subjects(), 4, 3);
        let mut feedback = FeedbackMap::new();
        feedback.insert("Physics".into(), FeedbackRating::Good);

        let mut trained = refiner(0.1, 5);
        trained.refine(&schedule, &feedback).unwrap();
        trained.persist(&path).unwrap();

        let mut fresh = refiner(0.1, 5);
        assert!(fresh.restore(&path).unwrap());
        assert_eq!(fresh.q_learning().q_table(), trained.q_learning().q_table());
        assert!(!fresh.restore(dir.path().join("missing.json")).unwrap());
    }
}
