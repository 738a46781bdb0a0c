// State representation for the schedule refiner
// A state is a bounded id derived from the day and the hour slot

use crate::error::{PlannerError, PlannerResult};
use crate::planner::parse_day_ordinal;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a hash
pub fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Stable key for a day label
///
/// Labels ending in an ordinal ("Day 3") hash the ordinal, so the key does
/// not depend on the label wording. Other labels hash their bytes.
pub fn day_key(label: &str) -> u64 {
    match parse_day_ordinal(label) {
        Some(ordinal) => fnv1a(&ordinal.to_le_bytes()),
        None => fnv1a(label.as_bytes()),
    }
}

/// Finite state space `0..size`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateSpace {
    size: usize,
}

impl StateSpace {
    pub fn new(size: usize) -> PlannerResult<Self> {
        if size == 0 {
            return Err(PlannerError::invalid_argument(
                "State space size must be at least 1",
            ));
        }
        Ok(Self { size })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn contains(&self, state: usize) -> bool {
        state < self.size
    }

    /// Derive the state for an hour slot of a day
    ///
    /// Consecutive slots of a day map to consecutive states (mod size).
    pub fn state_for(&self, day: &str, slot: usize) -> usize {
        let size = self.size as u64;
        let base = day_key(day) % size;
        ((base + slot as u64 % size) % size) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fnv1a_reference_values() {
        assert_eq!(fnv1a(b""), 0xcbf29ce484222325);
        assert_eq!(fnv1a(b"a"), 0xaf63dc4c8601ec8c);
    }

    #[test]
    fn test_state_derivation_is_pure() {
        let space = StateSpace::new(10).unwrap();
        for slot in 0..6 {
            let state = space.state_for("Day 3", slot);
            assert_eq!(state, space.state_for("Day 3", slot));
            assert!(space.contains(state));
        }
    }

    #[test]
    fn test_consecutive_slots_are_consecutive_states() {
        let space = StateSpace::new(7).unwrap();
        let first = space.state_for("Day 2", 0);
        assert_eq!(space.state_for("Day 2", 1), (first + 1) % 7);
        assert_eq!(space.state_for("Day 2", 7), first);
    }

    #[test]
    fn test_day_key_uses_ordinal() {
        assert_eq!(day_key("Day 4"), day_key("day 4"));
        assert_ne!(day_key("Day 4"), day_key("Day 5"));
        assert_eq!(day_key("Monday"), fnv1a(b"Monday"));
    }

    #[test]
    fn test_single_state_space() {
        let space = StateSpace::new(1).unwrap();
        assert_eq!(space.state_for("Day 9", 42), 0);
        assert!(StateSpace::new(0).is_err());
    }
}
