// Main module for Reinforcement Learning components
// Tabular Q-learning that refines generated schedules from user feedback

pub mod action;
pub mod q_learning;
pub mod refiner;
pub mod reward;
pub mod state;

// Re-export main components for easier access
pub use action::SubjectCatalog;
pub use q_learning::{QLearningSystem, QTable};
pub use refiner::{RefineSummary, ScheduleRefiner};
pub use reward::{feedback_with_defaults, FeedbackMap, FeedbackRating};
pub use state::StateSpace;

use crate::config::RefinerConfig;
use crate::PlannerResult;

/// Initialize a refiner for the given subjects, optionally with seeded exploration
pub fn initialize_refiner(
    subjects: Vec<String>,
    config: &RefinerConfig,
    seed: Option<u64>,
) -> PlannerResult<ScheduleRefiner> {
    let mut q_learning = QLearningSystem::from_config(subjects, config)?;
    if let Some(seed) = seed {
        q_learning = q_learning.with_seed(seed);
    }
    Ok(ScheduleRefiner::new(q_learning))
}

/// Trait defining the interface for a reinforcement learning policy
pub trait Policy {
    /// Returns the probability of taking an action given a state
    fn action_probability(&self, state: usize, action: usize) -> f64;

    /// The action taken when not exploring; `None` for unknown states
    fn greedy_action(&self, state: usize) -> Option<usize>;
}
