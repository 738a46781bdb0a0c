use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::PlannerConfig;
use crate::core::state::AppState;
use crate::error::{PlannerError, PlannerResult};
use crate::planner::{generate_from_preferences, Schedule, UserPreferences};
use crate::reinforcement::{
    feedback_with_defaults, initialize_refiner, FeedbackMap, RefineSummary, ScheduleRefiner,
};
use crate::utils::{calculate_schedule_metrics, check_schedule, ScheduleMetrics};

/// Result of generating a schedule
#[derive(Debug, Clone)]
pub struct GenerateOutcome {
    pub schedule: Schedule,
    pub metrics: ScheduleMetrics,
    /// Days requested but left out because no valid assignment exists
    pub omitted_days: usize,
}

/// Result of refining the stored schedule
#[derive(Debug, Clone)]
pub struct OptimizeOutcome {
    pub schedule: Schedule,
    pub metrics: ScheduleMetrics,
    pub feedback: FeedbackMap,
    /// Whether a previously learned policy was reused
    pub restored_policy: bool,
    pub summary: RefineSummary,
}

/// Drives generation and refinement against the persisted state
#[derive(Debug, Clone)]
pub struct StudySession {
    config: PlannerConfig,
    seed: Option<u64>,
}

impl StudySession {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config, seed: None }
    }

    /// Seed exploration for reproducible refinement
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn state_path(&self) -> &Path {
        &self.config.state_path
    }

    pub fn policy_path(&self) -> &Path {
        &self.config.policy_path
    }

    pub fn load_state(&self) -> PlannerResult<AppState> {
        AppState::load(self.state_path())
    }

    /// Generate a new schedule and store it with the preferences
    ///
    /// Any earlier optimized schedule and feedback are discarded.
    pub fn generate(&self, preferences: UserPreferences) -> PlannerResult<GenerateOutcome> {
        preferences.validate()?;

        let schedule = generate_from_preferences(&preferences);
        check_schedule(&schedule, &preferences.subjects, preferences.hours_per_day)?;

        let omitted_days = preferences.days.saturating_sub(schedule.len());
        if omitted_days > 0 {
            warn!(
                "{} of {} days could not be scheduled",
                omitted_days, preferences.days
            );
        }

        let metrics = calculate_schedule_metrics(&schedule, &preferences.subjects);
        let state = AppState {
            user_preferences: Some(preferences),
            generated_schedule: Some(schedule.clone()),
            optimized_schedule: None,
            feedback: None,
        };
        state.save(self.state_path())?;
        info!(
            "Generated {} days and saved state to {}",
            schedule.len(),
            self.state_path().display()
        );

        Ok(GenerateOutcome {
            schedule,
            metrics,
            omitted_days,
        })
    }

    /// Refine the stored schedule with feedback and persist the learned policy
    ///
    /// Subjects without explicit feedback are rated `fair`.
    pub fn optimize(&self, explicit: &FeedbackMap) -> PlannerResult<OptimizeOutcome> {
        let mut state = self.load_state()?;
        let (Some(preferences), Some(schedule)) =
            (state.user_preferences.clone(), state.generated_schedule.clone())
        else {
            return Err(PlannerError::invalid_argument(
                "No generated schedule found; run `generate` first",
            ));
        };
        check_schedule(&schedule, &preferences.subjects, preferences.hours_per_day)?;

        let (mut refiner, restored_policy) = self.refiner_for(&preferences.subjects)?;

        let feedback = feedback_with_defaults(&preferences.subjects, explicit);
        let refined = refiner.refine(&schedule, &feedback)?;
        check_schedule(&refined, &preferences.subjects, preferences.hours_per_day)?;

        refiner.persist(self.policy_path())?;

        let metrics = calculate_schedule_metrics(&refined, &preferences.subjects);
        state.optimized_schedule = Some(refined.clone());
        state.feedback = Some(feedback.clone());
        state.save(self.state_path())?;

        Ok(OptimizeOutcome {
            schedule: refined,
            metrics,
            feedback,
            restored_policy,
            summary: refiner.last_summary(),
        })
    }

    /// Build a refiner, reusing the saved policy when it covers the same subjects
    pub fn refiner_for(&self, subjects: &[String]) -> PlannerResult<(ScheduleRefiner, bool)> {
        let mut refiner = self.fresh_refiner(subjects)?;
        if !refiner.restore(self.policy_path())? {
            return Ok((refiner, false));
        }

        if refiner.q_learning().catalog().subjects() != subjects {
            warn!(
                "Saved policy at {} was learned for {:?}; starting a new policy for {:?}",
                self.policy_path().display(),
                refiner.q_learning().catalog().subjects(),
                subjects
            );
            return Ok((self.fresh_refiner(subjects)?, false));
        }

        Ok((refiner, true))
    }

    fn fresh_refiner(&self, subjects: &[String]) -> PlannerResult<ScheduleRefiner> {
        initialize_refiner(subjects.to_vec(), &self.config.refiner, self.seed)
    }
}

/// Default policy path next to a custom state file
pub fn sibling_policy_path(state_path: &Path) -> PathBuf {
    let stem = state_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("planner");
    state_path.with_file_name(format!("{}_policy.json", stem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reinforcement::FeedbackRating;
    use tempfile::{tempdir, TempDir};

    fn session(dir: &TempDir) -> StudySession {
        let mut config = PlannerConfig::default();
        config.state_path = dir.path().join("state.json");
        config.policy_path = dir.path().join("policy.json");
        StudySession::new(config).with_seed(42)
    }

    fn preferences() -> UserPreferences {
        UserPreferences::new(vec!["Math".into(), "Physics".into(), "Chemistry".into()], 4, 5)
    }

    #[test]
    fn test_generate_saves_state() {
        let dir = tempdir().unwrap();
        let session = session(&dir);

        let outcome = session.generate(preferences()).unwrap();
        assert_eq!(outcome.schedule.len(), 5);
        assert_eq!(outcome.omitted_days, 0);
        assert_eq!(outcome.metrics.total_hours, 20);

        let state = session.load_state().unwrap();
        assert_eq!(state.generated_schedule, Some(outcome.schedule));
        assert_eq!(state.user_preferences, Some(preferences()));
    }

    #[test]
    fn test_generate_reports_omitted_days() {
        let dir = tempdir().unwrap();
        let outcome = session(&dir)
            .generate(UserPreferences::new(vec!["Math".into()], 3, 2))
            .unwrap();
        assert!(outcome.schedule.is_empty());
        assert_eq!(outcome.omitted_days, 2);
    }

    #[test]
    fn test_generate_rejects_out_of_range_plan() {
        let dir = tempdir().unwrap();
        let session = session(&dir);

        let err = session
            .generate(UserPreferences::new(vec!["Math".into(), "Art".into()], 20_000, 1))
            .unwrap_err();
        assert!(matches!(err, PlannerError::InvalidArgument { .. }));
        assert!(session
            .generate(UserPreferences::new(vec!["Math".into(), "Art".into()], 0, 3))
            .is_err());
        assert!(!session.state_path().exists());
    }

    #[test]
    fn test_optimize_requires_generated_schedule() {
        let dir = tempdir().unwrap();
        let err = session(&dir).optimize(&FeedbackMap::new()).unwrap_err();
        assert!(matches!(err, PlannerError::InvalidArgument { .. }));
    }

    #[test]
    fn test_optimize_persists_policy_and_reuses_it() {
        let dir = tempdir().unwrap();
        let session = session(&dir);
        let generated = session.generate(preferences()).unwrap();

        let mut feedback = FeedbackMap::new();
        feedback.insert("Math".into(), FeedbackRating::Excellent);

        let first = session.optimize(&feedback).unwrap();
        assert!(!first.restored_policy);
        assert!(session.policy_path().exists());
        assert_eq!(first.feedback["Physics"], FeedbackRating::Fair);
        assert_eq!(first.schedule.len(), generated.schedule.len());
        assert_eq!(first.summary.updates, 20);

        let second = session.optimize(&feedback).unwrap();
        assert!(second.restored_policy);

        let state = session.load_state().unwrap();
        assert_eq!(state.optimized_schedule, Some(second.schedule));
    }

    #[test]
    fn test_policy_for_other_subjects_is_not_reused() {
        let dir = tempdir().unwrap();
        let session = session(&dir);
        session.generate(preferences()).unwrap();
        session.optimize(&FeedbackMap::new()).unwrap();

        let (refiner, restored) = session
            .refiner_for(&["Art".to_string(), "Music".to_string()])
            .unwrap();
        assert!(!restored);
        assert_eq!(refiner.q_learning().action_size(), 2);
    }

    #[test]
    fn test_sibling_policy_path() {
        assert_eq!(
            sibling_policy_path(Path::new("/tmp/week.json")),
            PathBuf::from("/tmp/week_policy.json")
        );
    }
}
