//! Weibull AFT Survival Model
//!
//! Applies a fitted Weibull accelerated-failure-time model exported from the
//! offline training pipeline. For a covariate row x:
//!
//!   λ(x) = exp(β_λ · x + b_λ)      (scale)
//!   ρ(x) = exp(β_ρ · x + b_ρ)      (shape)
//!   S(t | x) = exp(-(t / λ(x))^ρ(x))
//!
//! Artifact layout (`weibull_aft_model.json`):
//! ```json
//! {
//!   "lambda_": {"Intercept": 3.6, "Census": -0.03},
//!   "rho_": {"Intercept": 0.3},
//!   "timeline": [0.0, 12.0, 24.0, 36.0]
//! }
//! ```

use anyhow::{bail, Context, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{PlannerError, PlannerResult};
use crate::preprocessing::EncodedFeatureRow;
use crate::survival::{SurvivalFunction, SurvivalPoint};

const INTERCEPT: &str = "Intercept";

/// Monthly grid used when the artifact carries no timeline
const DEFAULT_TIMELINE_MAX_MONTHS: u32 = 72;

/// Anything that turns an encoded row into a survival curve.
pub trait SurvivalModel: Send + Sync {
    /// Feature order the model was fitted on.
    fn feature_names(&self) -> &[String];

    fn predict_survival_function(&self, row: &EncodedFeatureRow) -> PlannerResult<SurvivalFunction>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeibullAftArtifact {
    #[serde(rename = "lambda_")]
    pub lambda: FxHashMap<String, f64>,
    #[serde(rename = "rho_")]
    pub rho: FxHashMap<String, f64>,
    #[serde(default)]
    pub timeline: Option<Vec<f64>>,
}

/// Coefficients of one linear predictor, aligned to the model's feature order
#[derive(Debug, Clone)]
struct LinearPredictor {
    intercept: f64,
    coefficients: Vec<f64>,
}

impl LinearPredictor {
    fn align(
        name: &str,
        params: &FxHashMap<String, f64>,
        feature_names: &[String],
        warn_missing: bool,
    ) -> Result<Self> {
        let Some(&intercept) = params.get(INTERCEPT) else {
            bail!("{} parameters have no Intercept", name);
        };
        for key in params.keys() {
            if key != INTERCEPT && !feature_names.iter().any(|f| f == key) {
                bail!("{} coefficient '{}' has no matching model feature", name, key);
            }
        }

        let coefficients: Vec<f64> = feature_names
            .iter()
            .map(|f| params.get(f).copied().unwrap_or(0.0))
            .collect();

        let used = feature_names.iter().filter(|f| params.contains_key(*f)).count();
        if warn_missing && used < feature_names.len() {
            tracing::warn!(
                "{} of {} model features carry no {} coefficient",
                feature_names.len() - used,
                feature_names.len(),
                name
            );
        }

        Ok(Self {
            intercept,
            coefficients,
        })
    }

    fn evaluate(&self, values: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(values)
                .map(|(b, x)| b * x)
                .sum::<f64>()
    }
}

#[derive(Debug, Clone)]
pub struct WeibullAftModel {
    feature_names: Vec<String>,
    lambda: LinearPredictor,
    rho: LinearPredictor,
    timeline: Vec<f64>,
}

impl WeibullAftModel {
    /// Load model artifact from JSON file, aligned to `feature_names`
    pub fn load(path: &Path, feature_names: &[String]) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read model artifact: {:?}", path))?;

        let artifact: WeibullAftArtifact = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse model artifact: {:?}", path))?;

        Self::from_artifact(artifact, feature_names)
    }

    pub fn from_artifact(artifact: WeibullAftArtifact, feature_names: &[String]) -> Result<Self> {
        // Sparse shape coefficients are normal
        let lambda = LinearPredictor::align("lambda_", &artifact.lambda, feature_names, true)?;
        let rho = LinearPredictor::align("rho_", &artifact.rho, feature_names, false)?;

        let timeline = match artifact.timeline {
            Some(t) => t,
            None => (0..=DEFAULT_TIMELINE_MAX_MONTHS).map(f64::from).collect(),
        };
        if timeline.is_empty() {
            bail!("Model timeline is empty");
        }
        if timeline.iter().any(|t| !t.is_finite() || *t < 0.0) {
            bail!("Model timeline must hold finite, non-negative times");
        }
        if timeline.windows(2).any(|w| w[1] <= w[0]) {
            bail!("Model timeline must be strictly ascending");
        }

        tracing::info!(
            "Weibull AFT model: {} features, {} timeline points ({}..{} months)",
            feature_names.len(),
            timeline.len(),
            timeline[0],
            timeline[timeline.len() - 1]
        );

        Ok(Self {
            feature_names: feature_names.to_vec(),
            lambda,
            rho,
            timeline,
        })
    }

    pub fn timeline(&self) -> &[f64] {
        &self.timeline
    }

    /// (λ, ρ) for one row
    pub fn parameters(&self, row: &EncodedFeatureRow) -> PlannerResult<(f64, f64)> {
        self.check_schema(row)?;
        let values = row.values();
        Ok((
            self.lambda.evaluate(values).exp(),
            self.rho.evaluate(values).exp(),
        ))
    }

    fn check_schema(&self, row: &EncodedFeatureRow) -> PlannerResult<()> {
        if row.names() != self.feature_names.as_slice() {
            return Err(PlannerError::FeatureMismatch(format!(
                "row has {} features, model expects {} in fitted order",
                row.len(),
                self.feature_names.len()
            )));
        }
        Ok(())
    }
}

/// S(t) = exp(-(t/λ)^ρ); S(0) = 1
pub fn weibull_survival(t: f64, lambda: f64, rho: f64) -> f64 {
    if t <= 0.0 {
        return 1.0;
    }
    (-(t / lambda).powf(rho)).exp()
}

impl SurvivalModel for WeibullAftModel {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict_survival_function(&self, row: &EncodedFeatureRow) -> PlannerResult<SurvivalFunction> {
        let (lambda, rho) = self.parameters(row)?;
        tracing::debug!("Weibull parameters: lambda={:.4} rho={:.4}", lambda, rho);

        let points = self
            .timeline
            .iter()
            .map(|&time| SurvivalPoint {
                time,
                probability: weibull_survival(time, lambda, rho).clamp(0.0, 1.0),
            })
            .collect();

        SurvivalFunction::new(points)
    }
}
