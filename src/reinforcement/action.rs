// Action space for the schedule refiner
// Each action id selects one subject from the catalog

use std::collections::{BTreeMap, HashMap};

use crate::error::{PlannerError, PlannerResult};

/// Ordered set of subjects, bidirectionally indexed to action ids `0..n`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectCatalog {
    subjects: Vec<String>,
    index: HashMap<String, usize>,
}

impl SubjectCatalog {
    /// Build a catalog; fails on an empty list or duplicate names
    pub fn new(subjects: Vec<String>) -> PlannerResult<Self> {
        if subjects.is_empty() {
            return Err(PlannerError::invalid_argument(
                "Subject catalog must contain at least one subject",
            ));
        }

        let mut index = HashMap::with_capacity(subjects.len());
        for (idx, subject) in subjects.iter().enumerate() {
            if index.insert(subject.clone(), idx).is_some() {
                return Err(PlannerError::invalid_argument(format!(
                    "Duplicate subject in catalog: {}",
                    subject
                )));
            }
        }

        Ok(Self { subjects, index })
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    pub fn contains(&self, subject: &str) -> bool {
        self.index.contains_key(subject)
    }

    pub fn action_for(&self, subject: &str) -> Option<usize> {
        self.index.get(subject).copied()
    }

    pub fn subject_for(&self, action: usize) -> Option<&str> {
        self.subjects.get(action).map(String::as_str)
    }

    /// Reverse lookup that falls back to the first subject for unknown ids
    pub fn subject_or_default(&self, action: usize) -> &str {
        self.subject_for(action).unwrap_or(self.subjects[0].as_str())
    }

    /// subject -> action id, as persisted
    pub fn subject_to_idx(&self) -> BTreeMap<String, usize> {
        self.index.iter().map(|(s, &i)| (s.clone(), i)).collect()
    }

    /// action id -> subject, as persisted (ids become textual keys in JSON)
    pub fn idx_to_subject(&self) -> BTreeMap<usize, String> {
        self.subjects.iter().cloned().enumerate().collect()
    }
}
