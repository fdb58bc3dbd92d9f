//! Classification functions for derived categorical features.
//!
//! Thresholds are policy constants shared with the training pipeline.

use crate::types::{LightCategory, RiskLevel, Season};

// ============================================================================
// Season Classification
// ============================================================================

/// Map a calendar month to its planting season.
/// - 6-9: Monsoon
/// - 10-11: PostMonsoon
/// - 12, 1, 2: Winter
/// - otherwise (3-5): Summer
pub fn month_to_season(month: u8) -> Season {
    match month {
        6..=9 => Season::Monsoon,
        10 | 11 => Season::PostMonsoon,
        12 | 1 | 2 => Season::Winter,
        _ => Season::Summer,
    }
}

// ============================================================================
// Light Classification
// ============================================================================

pub const LIGHT_LOW_BELOW: u8 = 40;
pub const LIGHT_MED_BELOW: u8 = 70;

/// Bucket the light availability slider (0-100).
pub fn light_category(light: u8) -> LightCategory {
    if light < LIGHT_LOW_BELOW {
        LightCategory::Low
    } else if light < LIGHT_MED_BELOW {
        LightCategory::Med
    } else {
        LightCategory::High
    }
}

// ============================================================================
// Risk Classification
// ============================================================================

/// Probabilities at or above this are Low risk.
pub const LOW_RISK_MIN_PROB: f64 = 0.75;
/// Probabilities at or above this (and below LOW_RISK_MIN_PROB) are Medium risk.
pub const MEDIUM_RISK_MIN_PROB: f64 = 0.45;

/// Classify a survival probability.
/// Boundary values land in the safer bucket: 0.75 is Low, 0.45 is Medium.
pub fn risk_label(prob: f64) -> RiskLevel {
    if prob >= LOW_RISK_MIN_PROB {
        RiskLevel::Low
    } else if prob >= MEDIUM_RISK_MIN_PROB {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}
