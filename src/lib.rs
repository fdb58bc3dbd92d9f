//! Tree Survival Planner
//!
//! Planting guidance from a fitted Weibull AFT survival model: derive
//! categorical features from plantation inputs, encode them with the fitted
//! encoder, and report the probability that a tree survives 36 months,
//! its risk bucket and the full survival curve.
//!
//! Layout:
//! - `utils/`: season, light and risk classification; frame helpers
//! - `preprocessing`: feature record → encoded, model-ordered row
//! - `encoder` / `model`: fitted artifacts behind traits
//! - `planner`: end-to-end prediction and planting-window scan
//! - `history`: per-session, append-only prediction log
//! - `api_server` (feature `api`): REST presentation layer

pub mod artifacts;
pub mod config;
pub mod encoder;
pub mod error;
pub mod history;
pub mod insights;
pub mod model;
pub mod planner;
pub mod preprocessing;
pub mod survival;
pub mod types;
pub mod utils;

#[cfg(feature = "api")]
pub mod api_server;

// Re-export commonly used types
pub use artifacts::ModelArtifacts;
pub use config::PlannerConfig;
pub use encoder::{CategoricalEncoder, FittedOneHotEncoder};
pub use error::{PlannerError, PlannerResult};
pub use history::{DashboardSummary, PredictionRecord, SessionHistory};
pub use model::{SurvivalModel, WeibullAftModel};
pub use planner::{Prediction, SurvivalPlanner};
pub use preprocessing::{preprocess_input, EncodedFeatureRow, FeatureRecord};
pub use survival::{SurvivalFunction, TARGET_TIME_MONTHS};
pub use types::*;
pub use utils::{light_category, month_to_season, risk_label};

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};
