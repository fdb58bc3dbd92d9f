//! Planner Errors
//!
//! Failures of a single prediction attempt. None of these are retried: the
//! pipeline is deterministic, so the same inputs fail the same way.
//!
//! Loading artifacts is a startup concern and uses `anyhow` instead.

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    /// A user-supplied value is outside its domain. Inference must not run.
    #[error("{message}")]
    InputValidation {
        field: &'static str,
        message: String,
    },

    /// The feature record lacks fields the fitted encoder was trained on.
    /// Points at a mismatch between this build and the deployed artifacts.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFeatures(Vec<String>),

    #[error("Encoding failed: {0}")]
    Encoding(String),

    /// Encoded row does not line up with what the model was fitted on.
    #[error("Feature row does not match model schema: {0}")]
    FeatureMismatch(String),

    #[error("Invalid survival function: {0}")]
    InvalidSurvivalFunction(String),

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

impl PlannerError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        PlannerError::InputValidation {
            field,
            message: message.into(),
        }
    }

    /// True for errors the caller caused (bad input), false for
    /// schema or artifact problems.
    pub fn is_user_error(&self) -> bool {
        matches!(self, PlannerError::InputValidation { .. })
    }
}

pub type PlannerResult<T> = std::result::Result<T, PlannerError>;
