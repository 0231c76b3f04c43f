//! Inspection priority scoring.
//!
//! `score = (6 - condition) * 3 + passport_age`, bucketed with inclusive lower
//! bounds: `>= 12` high, `>= 6` medium, otherwise low. Only high-priority
//! objects are flagged for inspection.

use crate::domain::{MapObject, Priority, PriorityLevel, TechnicalCondition};

/// Lowest score that counts as high priority
pub const HIGH_PRIORITY_THRESHOLD: u32 = 12;
/// Lowest score that counts as medium priority
pub const MEDIUM_PRIORITY_THRESHOLD: u32 = 6;

const CONDITION_CEILING: u32 = 6;
const CONDITION_WEIGHT: u32 = 3;

impl PriorityLevel {
    pub fn from_score(score: u32) -> Self {
        if score >= HIGH_PRIORITY_THRESHOLD {
            PriorityLevel::High
        } else if score >= MEDIUM_PRIORITY_THRESHOLD {
            PriorityLevel::Medium
        } else {
            PriorityLevel::Low
        }
    }
}

/// Scores one object. `passport_age` is already clamped at zero by its type.
pub fn compute_priority(condition: TechnicalCondition, passport_age: u32) -> Priority {
    let condition_term = (CONDITION_CEILING - u32::from(condition.value())) * CONDITION_WEIGHT;
    let score = condition_term.saturating_add(passport_age);
    let level = PriorityLevel::from_score(score);

    Priority {
        score,
        level,
        passport_age,
        needs_inspection: level == PriorityLevel::High,
    }
}

/// Returns a copy of `object` with its priority attached.
pub fn classify(object: &MapObject) -> MapObject {
    MapObject {
        priority: Some(compute_priority(object.technical_condition, object.passport_age)),
        ..object.clone()
    }
}

pub fn classify_all(objects: &[MapObject]) -> Vec<MapObject> {
    objects.iter().map(classify).collect()
}
