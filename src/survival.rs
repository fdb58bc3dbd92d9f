//! Survival Function
//!
//! Ordered (time, probability) samples produced by the model for one row.
//! Times are in months and strictly ascending; probabilities lie in [0, 1]
//! and never increase with time.

use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, PlannerResult};

/// Survival horizon reported as the headline result (months)
pub const TARGET_TIME_MONTHS: f64 = 36.0;

/// Tolerance for float noise when checking monotonicity
const MONOTONE_EPS: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurvivalPoint {
    pub time: f64,
    pub probability: f64,
}

// Serialize only: deserializing would bypass the checks in `new`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SurvivalFunction {
    points: Vec<SurvivalPoint>,
}

impl SurvivalFunction {
    pub fn new(points: Vec<SurvivalPoint>) -> PlannerResult<Self> {
        if points.is_empty() {
            return Err(PlannerError::InvalidSurvivalFunction(
                "no time points".to_string(),
            ));
        }

        for (i, p) in points.iter().enumerate() {
            if !p.time.is_finite() {
                return Err(PlannerError::InvalidSurvivalFunction(format!(
                    "non-finite time at index {}",
                    i
                )));
            }
            if !(0.0..=1.0).contains(&p.probability) {
                return Err(PlannerError::InvalidSurvivalFunction(format!(
                    "probability {} at t={} is outside [0, 1]",
                    p.probability, p.time
                )));
            }
        }

        for pair in points.windows(2) {
            if pair[1].time <= pair[0].time {
                return Err(PlannerError::InvalidSurvivalFunction(format!(
                    "times not strictly ascending at t={}",
                    pair[1].time
                )));
            }
            if pair[1].probability > pair[0].probability + MONOTONE_EPS {
                return Err(PlannerError::InvalidSurvivalFunction(format!(
                    "probability increases between t={} and t={}",
                    pair[0].time, pair[1].time
                )));
            }
        }

        Ok(Self { points })
    }

    pub fn from_pairs(times: &[f64], probabilities: &[f64]) -> PlannerResult<Self> {
        if times.len() != probabilities.len() {
            return Err(PlannerError::InvalidSurvivalFunction(format!(
                "{} times but {} probabilities",
                times.len(),
                probabilities.len()
            )));
        }

        let points = times
            .iter()
            .zip(probabilities)
            .map(|(&time, &probability)| SurvivalPoint { time, probability })
            .collect();

        Self::new(points)
    }

    pub fn points(&self) -> &[SurvivalPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Sample whose time is closest to `target`.
    ///
    /// Nearest-sample lookup, no interpolation. On a tie the earlier sample
    /// wins.
    pub fn nearest(&self, target: f64) -> SurvivalPoint {
        let mut best = self.points[0];
        let mut best_dist = (best.time - target).abs();

        for p in &self.points[1..] {
            let dist = (p.time - target).abs();
            if dist < best_dist {
                best = *p;
                best_dist = dist;
            }
        }

        best
    }

    /// Nearest sample to the 36-month horizon
    pub fn at_horizon(&self) -> SurvivalPoint {
        self.nearest(TARGET_TIME_MONTHS)
    }
}
