//! Survival Planner - Main coordinator for survival predictions
//!
//! Runs the full pipeline for one request:
//! input → derived features → preprocessor → model → horizon lookup → risk.
//! Also scans all twelve planting months in parallel (Rayon).

use anyhow::{bail, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;

use crate::artifacts::ModelArtifacts;
use crate::encoder::CategoricalEncoder;
use crate::error::PlannerResult;
use crate::history::{PredictionRecord, SessionHistory};
use crate::insights::{headline, impact_factors, percent_label, ImpactFactor};
use crate::model::SurvivalModel;
use crate::preprocessing::{preprocess_input, FeatureRecord};
use crate::survival::{SurvivalFunction, TARGET_TIME_MONTHS};
use crate::types::{LightCategory, PlantationInput, RiskLevel, Season};
use crate::utils::risk_label;

/// Result of one prediction
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub input: PlantationInput,
    pub season: Season,
    pub light_category: LightCategory,
    /// Soil category the model saw
    pub soil_category: String,
    /// Requested horizon (months)
    pub horizon_months: f64,
    /// Timeline sample closest to the horizon
    pub horizon_time: f64,
    pub survival_probability: f64,
    pub survival_percent: String,
    pub risk: RiskLevel,
    pub risk_display: String,
    pub impact_factors: Vec<ImpactFactor>,
    pub headline: String,
    pub recommended_window: Season,
    pub survival_curve: SurvivalFunction,
}

impl Prediction {
    pub fn to_record(&self) -> PredictionRecord {
        PredictionRecord {
            probability: self.survival_probability,
            risk: self.risk,
            season: self.season,
        }
    }
}

/// Outlook for planting in one month
#[derive(Debug, Clone, Serialize)]
pub struct MonthOutlook {
    pub month: u8,
    pub season: Season,
    pub survival_probability: f64,
    pub risk: RiskLevel,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlantingWindows {
    pub months: Vec<MonthOutlook>,
    /// Highest survival probability; earliest month on ties
    pub best: MonthOutlook,
}

/// Main survival planner
///
/// Holds the fitted artifacts read-only; clone freely across handlers.
#[derive(Clone)]
pub struct SurvivalPlanner {
    model: Arc<dyn SurvivalModel>,
    encoder: Arc<dyn CategoricalEncoder>,
    feature_names: Arc<Vec<String>>,
}

impl SurvivalPlanner {
    pub fn new(
        model: Arc<dyn SurvivalModel>,
        encoder: Arc<dyn CategoricalEncoder>,
        feature_names: Vec<String>,
    ) -> Result<Self> {
        if model.feature_names() != feature_names.as_slice() {
            bail!(
                "Model was aligned to {} features but the feature list has {}",
                model.feature_names().len(),
                feature_names.len()
            );
        }

        Ok(Self {
            model,
            encoder,
            feature_names: Arc::new(feature_names),
        })
    }

    pub fn from_artifacts(artifacts: ModelArtifacts) -> Result<Self> {
        Self::new(
            Arc::new(artifacts.model),
            Arc::new(artifacts.encoder),
            artifacts.feature_names,
        )
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Run the full pipeline for one input
    pub fn predict(&self, input: &PlantationInput) -> PlannerResult<Prediction> {
        input.validate()?;

        let record = FeatureRecord::from_input(input);
        let curve = self.survival_curve(&record)?;

        let horizon = curve.at_horizon();
        let probability = horizon.probability;
        let risk = risk_label(probability);

        let factors = impact_factors(record.light, input.soil, input.myco_type, record.season);

        tracing::debug!(
            "Predicted {} at t={} (horizon {}): {} risk",
            percent_label(probability),
            horizon.time,
            TARGET_TIME_MONTHS,
            risk.as_str()
        );

        Ok(Prediction {
            input: input.clone(),
            season: record.season,
            light_category: record.light,
            soil_category: record.soil,
            horizon_months: TARGET_TIME_MONTHS,
            horizon_time: horizon.time,
            survival_probability: probability,
            survival_percent: percent_label(probability),
            risk,
            risk_display: risk.display(),
            headline: headline(&factors),
            impact_factors: factors.into_vec(),
            recommended_window: record.season,
            survival_curve: curve,
        })
    }

    /// Predict and append to `history`. A failed prediction leaves the
    /// history untouched.
    pub fn predict_and_record(
        &self,
        input: &PlantationInput,
        history: &mut SessionHistory,
    ) -> PlannerResult<Prediction> {
        let prediction = self.predict(input)?;
        history.append(prediction.to_record());
        Ok(prediction)
    }

    /// Evaluate `input` for every planting month
    pub fn planting_windows(&self, input: &PlantationInput) -> PlannerResult<PlantingWindows> {
        // Only the month varies, so one check covers all twelve
        input.validate()?;

        let months: Vec<MonthOutlook> = (1..=12u8)
            .into_par_iter()
            .map(|month| -> PlannerResult<MonthOutlook> {
                let record = FeatureRecord::from_input(&PlantationInput { month, ..input.clone() });
                let probability = self.survival_curve(&record)?.at_horizon().probability;
                Ok(MonthOutlook {
                    month,
                    season: record.season,
                    survival_probability: probability,
                    risk: risk_label(probability),
                })
            })
            .collect::<PlannerResult<Vec<_>>>()?;

        let mut best = months[0].clone();
        for outlook in &months[1..] {
            if outlook.survival_probability > best.survival_probability {
                best = outlook.clone();
            }
        }

        Ok(PlantingWindows { months, best })
    }

    fn survival_curve(&self, record: &FeatureRecord) -> PlannerResult<SurvivalFunction> {
        let row = preprocess_input(record, self.encoder.as_ref(), &self.feature_names)?;
        self.model.predict_survival_function(&row)
    }
}
