//! Model Artifact Loading
//!
//! Loads the three read-only artifacts produced by the offline training
//! pipeline from one model directory:
//! - `feature_names.json`: final model feature order (JSON string array)
//! - `encoder.json`: fitted categorical encoder
//! - `weibull_aft_model.json`: fitted Weibull AFT parameters
//!
//! Loaded once at startup and shared read-only afterwards.

use anyhow::{bail, Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::encoder::{CategoricalEncoder, FittedOneHotEncoder};
use crate::model::{SurvivalModel, WeibullAftModel};

pub const FEATURE_NAMES_FILE: &str = "feature_names.json";
pub const ENCODER_FILE: &str = "encoder.json";
pub const MODEL_FILE: &str = "weibull_aft_model.json";

/// Fitted model, encoder and feature order
pub struct ModelArtifacts {
    pub model: WeibullAftModel,
    pub encoder: FittedOneHotEncoder,
    pub feature_names: Vec<String>,
}

impl ModelArtifacts {
    /// Load all artifacts from `model_dir`
    pub fn load(model_dir: &Path) -> Result<Self> {
        tracing::info!("Loading model artifacts from {:?}", model_dir);

        let feature_names = Self::load_feature_names(&model_dir.join(FEATURE_NAMES_FILE))?;
        let encoder = FittedOneHotEncoder::load(&model_dir.join(ENCODER_FILE))?;
        let model = WeibullAftModel::load(&model_dir.join(MODEL_FILE), &feature_names)?;

        // Encoder outputs the model never uses point at mismatched artifacts
        let model_features: HashSet<&str> = feature_names.iter().map(|s| s.as_str()).collect();
        let unused: Vec<&str> = encoder
            .output_feature_names()
            .iter()
            .map(|s| s.as_str())
            .filter(|name| !model_features.contains(name))
            .collect();
        if !unused.is_empty() {
            tracing::warn!("Encoder outputs not used by the model: {:?}", unused);
        }

        tracing::info!("  Encoder input fields: {}", encoder.expected_input_fields().len());
        tracing::info!("  Encoder outputs: {}", encoder.output_feature_names().len());
        tracing::info!("  Model features: {}", model.feature_names().len());

        Ok(Self {
            model,
            encoder,
            feature_names,
        })
    }

    /// Load the model's feature order
    fn load_feature_names(path: &Path) -> Result<Vec<String>> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read feature names: {:?}", path))?;

        let names: Vec<String> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse feature names: {:?}", path))?;

        if names.is_empty() {
            bail!("Feature name list is empty: {:?}", path);
        }

        let mut seen = HashSet::new();
        for name in &names {
            if !seen.insert(name.as_str()) {
                bail!("Duplicate feature name '{}' in {:?}", name, path);
            }
        }

        Ok(names)
    }
}
