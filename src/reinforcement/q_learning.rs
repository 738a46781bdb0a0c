// Q-Learning implementation for the schedule refiner
// A dense tabular policy over (slot state, subject action) pairs

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

use crate::config::RefinerConfig;
use crate::error::{PlannerError, PlannerResult};
use crate::reinforcement::{action::SubjectCatalog, state::StateSpace, Policy};
use crate::utils::fs::{load_state, save_state};

/// Dense `state_size x action_size` table of action values
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    state_size: usize,
    action_size: usize,
    values: Vec<f64>,
}

impl QTable {
    /// Create a zero-initialised table; both dimensions are at least 1
    pub(crate) fn new(state_size: usize, action_size: usize) -> Self {
        debug_assert!(state_size > 0 && action_size > 0);
        Self {
            state_size,
            action_size,
            values: vec![0.0; state_size * action_size],
        }
    }

    /// Rebuild a table from per-state rows; `None` if there are no rows, the
    /// rows are empty, or they are ragged
    pub fn from_rows(rows: &[Vec<f64>]) -> Option<Self> {
        let action_size = rows.first().map(Vec::len)?;
        if action_size == 0 || rows.iter().any(|row| row.len() != action_size) {
            return None;
        }
        Some(Self {
            state_size: rows.len(),
            action_size,
            values: rows.iter().flatten().copied().collect(),
        })
    }

    pub fn state_size(&self) -> usize {
        self.state_size
    }

    pub fn action_size(&self) -> usize {
        self.action_size
    }

    pub fn get(&self, state: usize, action: usize) -> f64 {
        self.values[state * self.action_size + action]
    }

    fn set(&mut self, state: usize, action: usize, value: f64) {
        self.values[state * self.action_size + action] = value;
    }

    pub fn row(&self, state: usize) -> &[f64] {
        let start = state * self.action_size;
        &self.values[start..start + self.action_size]
    }

    /// Highest action value for a state
    pub fn max_value(&self, state: usize) -> f64 {
        self.row(state)
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Action with the highest value; ties go to the lowest index
    pub fn best_action(&self, state: usize) -> usize {
        let row = self.row(state);
        let mut best = 0;
        for (action, value) in row.iter().enumerate().skip(1) {
            if *value > row[best] {
                best = action;
            }
        }
        best
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.values
            .chunks(self.action_size)
            .map(<[f64]>::to_vec)
            .collect()
    }
}

/// On-disk layout of a persisted policy
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedPolicy {
    q_table: Vec<Vec<f64>>,
    state_size: usize,
    action_size: usize,
    lr: f64,
    gamma: f64,
    epsilon: f64,
    subjects: Vec<String>,
    subject_to_idx: BTreeMap<String, usize>,
    idx_to_subject: BTreeMap<usize, String>,
}

/// Q-Learning system for subject selection and learning
#[derive(Debug, Clone)]
pub struct QLearningSystem {
    /// Q-table mapping state-action pairs to expected future rewards
    q_table: QTable,
    /// Subjects available as actions
    catalog: SubjectCatalog,
    states: StateSpace,
    /// Learning rate (α) - how quickly new information overrides old
    learning_rate: f64,
    /// Discount factor (γ) - importance of future rewards
    discount_factor: f64,
    /// Exploration rate (ε) - probability of taking a random action
    exploration_rate: f64,
    rng: StdRng,
}

impl QLearningSystem {
    /// Create a new Q-Learning system with one action per subject
    pub fn new(
        subjects: Vec<String>,
        state_size: usize,
        learning_rate: f64,
        discount_factor: f64,
        exploration_rate: f64,
    ) -> PlannerResult<Self> {
        check_unit_interval("learning rate", learning_rate)?;
        check_unit_interval("discount factor", discount_factor)?;
        check_unit_interval("exploration rate", exploration_rate)?;

        let catalog = SubjectCatalog::new(subjects)?;
        let states = StateSpace::new(state_size)?;

        Ok(Self {
            q_table: QTable::new(state_size, catalog.len()),
            catalog,
            states,
            learning_rate,
            discount_factor,
            exploration_rate,
            rng: StdRng::from_rng(&mut rand::rng()),
        })
    }

    pub fn from_config(subjects: Vec<String>, config: &RefinerConfig) -> PlannerResult<Self> {
        Self::new(
            subjects,
            config.state_size,
            config.learning_rate,
            config.discount_factor,
            config.exploration_rate,
        )
    }

    /// Replace the random source with a seeded one
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn catalog(&self) -> &SubjectCatalog {
        &self.catalog
    }

    pub fn states(&self) -> StateSpace {
        self.states
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn state_size(&self) -> usize {
        self.q_table.state_size()
    }

    pub fn action_size(&self) -> usize {
        self.q_table.action_size()
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn discount_factor(&self) -> f64 {
        self.discount_factor
    }

    pub fn exploration_rate(&self) -> f64 {
        self.exploration_rate
    }

    /// Get the Q-value for a state-action pair
    pub fn q_value(&self, state: usize, action: usize) -> PlannerResult<f64> {
        self.check_indices(state, action)?;
        Ok(self.q_table.get(state, action))
    }

    /// Epsilon-greedy action selection
    ///
    /// One uniform draw decides between exploring (a uniformly random action)
    /// and exploiting (the first action with the highest value).
    pub fn select_action(&mut self, state: usize) -> PlannerResult<usize> {
        self.check_state(state)?;

        if self.rng.random::<f64>() < self.exploration_rate {
            return Ok(self.rng.random_range(0..self.action_size()));
        }

        Ok(self.q_table.best_action(state))
    }

    /// Update the Q-value for a state-action pair and return the new value
    pub fn update(
        &mut self,
        state: usize,
        action: usize,
        reward: f64,
        next_state: usize,
    ) -> PlannerResult<f64> {
        self.check_indices(state, action)?;
        self.check_state(next_state)?;

        let current_q = self.q_table.get(state, action);
        let max_next_q = self.q_table.max_value(next_state);

        // Q(s,a) ← Q(s,a) + α[r + γ·max_a' Q(s',a') - Q(s,a)]
        let temporal_difference = reward + self.discount_factor * max_next_q - current_q;
        let new_q = current_q + self.learning_rate * temporal_difference;
        self.q_table.set(state, action, new_q);

        Ok(new_q)
    }

    /// Subject for an action id, or the first subject if the id is unknown
    pub fn action_to_subject(&self, action: usize) -> &str {
        self.catalog.subject_or_default(action)
    }

    /// Save the table, hyperparameters and catalog as one JSON object
    pub fn save(&self, path: impl AsRef<Path>) -> PlannerResult<()> {
        let path = path.as_ref();
        let persisted = PersistedPolicy {
            q_table: self.q_table.to_rows(),
            state_size: self.state_size(),
            action_size: self.action_size(),
            lr: self.learning_rate,
            gamma: self.discount_factor,
            epsilon: self.exploration_rate,
            subjects: self.catalog.subjects().to_vec(),
            subject_to_idx: self.catalog.subject_to_idx(),
            idx_to_subject: self.catalog.idx_to_subject(),
        };

        let Value::Object(map) = serde_json::to_value(&persisted)? else {
            return Err(PlannerError::Serialization(
                "policy did not serialize to an object".to_string(),
            ));
        };
        save_state(&map, path)?;

        info!(
            "Saved policy ({} states x {} actions) to {}",
            self.state_size(),
            self.action_size(),
            path.display()
        );
        Ok(())
    }

    /// Replace all state with a previously saved policy
    ///
    /// Returns `false` and leaves the system untouched if `path` does not
    /// exist. An inconsistent file is rejected without modifying anything.
    pub fn load(&mut self, path: impl AsRef<Path>) -> PlannerResult<bool> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No saved policy at {}, keeping current state", path.display());
            return Ok(false);
        }

        let map = load_state(path)?;
        let persisted: PersistedPolicy = serde_json::from_value(Value::Object(map))
            .map_err(|e| PlannerError::corrupt_policy(e.to_string(), path))?;

        let (q_table, catalog, states) = Self::check_persisted(&persisted)
            .map_err(|message| PlannerError::corrupt_policy(message, path))?;

        self.q_table = q_table;
        self.catalog = catalog;
        self.states = states;
        self.learning_rate = persisted.lr;
        self.discount_factor = persisted.gamma;
        self.exploration_rate = persisted.epsilon;

        info!(
            "Loaded policy ({} states x {} actions) from {}",
            self.state_size(),
            self.action_size(),
            path.display()
        );
        Ok(true)
    }

    fn check_persisted(
        persisted: &PersistedPolicy,
    ) -> Result<(QTable, SubjectCatalog, StateSpace), String> {
        for (name, value) in [
            ("lr", persisted.lr),
            ("gamma", persisted.gamma),
            ("epsilon", persisted.epsilon),
        ] {
            check_unit_interval(name, value).map_err(|e| e.to_string())?;
        }

        let catalog = SubjectCatalog::new(persisted.subjects.clone()).map_err(|e| e.to_string())?;
        if persisted.action_size != catalog.len() {
            return Err(format!(
                "action_size {} does not match {} subjects",
                persisted.action_size,
                catalog.len()
            ));
        }
        if persisted.subject_to_idx != catalog.subject_to_idx()
            || persisted.idx_to_subject != catalog.idx_to_subject()
        {
            return Err("subject index mappings do not match the subject list".to_string());
        }

        let states = StateSpace::new(persisted.state_size).map_err(|e| e.to_string())?;
        let q_table = QTable::from_rows(&persisted.q_table)
            .ok_or_else(|| "q_table is empty or has rows of different lengths".to_string())?;
        if q_table.state_size() != persisted.state_size
            || q_table.action_size() != persisted.action_size
        {
            return Err(format!(
                "q_table is {}x{}, expected {}x{}",
                q_table.state_size(),
                q_table.action_size(),
                persisted.state_size,
                persisted.action_size
            ));
        }
        if q_table.values.iter().any(|v| !v.is_finite()) {
            return Err("q_table contains non-finite values".to_string());
        }

        Ok((q_table, catalog, states))
    }

    fn check_state(&self, state: usize) -> PlannerResult<()> {
        if !self.states.contains(state) {
            return Err(PlannerError::invalid_argument(format!(
                "State {} outside state space of size {}",
                state,
                self.state_size()
            )));
        }
        Ok(())
    }

    fn check_indices(&self, state: usize, action: usize) -> PlannerResult<()> {
        self.check_state(state)?;
        if action >= self.action_size() {
            return Err(PlannerError::invalid_argument(format!(
                "Action {} outside action space of size {}",
                action,
                self.action_size()
            )));
        }
        Ok(())
    }
}

impl Policy for QLearningSystem {
    fn action_probability(&self, state: usize, action: usize) -> f64 {
        if !self.states.contains(state) || action >= self.action_size() {
            return 0.0;
        }

        let uniform = self.exploration_rate / self.action_size() as f64;
        if action == self.q_table.best_action(state) {
            1.0 - self.exploration_rate + uniform
        } else {
            uniform
        }
    }

    fn greedy_action(&self, state: usize) -> Option<usize> {
        self.states
            .contains(state)
            .then(|| self.q_table.best_action(state))
    }
}

fn check_unit_interval(name: &str, value: f64) -> PlannerResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(PlannerError::invalid_argument(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )));
    }
    Ok(())
}
