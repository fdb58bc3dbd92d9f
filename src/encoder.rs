//! Fitted Categorical Encoder
//!
//! The encoder is an opaque capability: the planner only needs its trained
//! input fields, its output feature names and a transform. `FittedOneHotEncoder`
//! applies an exported one-hot artifact. It never infers categories itself;
//! the artifact's categories and output names are the source of truth.
//!
//! Artifact layout (`encoder.json`):
//! ```json
//! {
//!   "feature_names_in": ["Species", "Census"],
//!   "columns": {
//!     "Species": {"type": "one_hot", "categories": ["Prunus serotina", "Quercus alba"], "drop": "Prunus serotina"},
//!     "Census": {"type": "passthrough"}
//!   },
//!   "feature_names_out": ["Species_Quercus alba", "Census"],
//!   "handle_unknown": "ignore"
//! }
//! ```

use anyhow::{bail, Context, Result};
use polars::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::{PlannerError, PlannerResult};

/// Interface of a fitted categorical encoder.
pub trait CategoricalEncoder: Send + Sync {
    /// Input fields in the order the encoder was fitted on.
    fn expected_input_fields(&self) -> &[String];

    /// Names of the encoded outputs, aligned with `transform`'s values.
    fn output_feature_names(&self) -> &[String];

    /// Encode a single-row frame whose columns are `expected_input_fields`.
    fn transform(&self, frame: &DataFrame) -> PlannerResult<Vec<f64>>;
}

// ============================================================================
// Artifact
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderArtifact {
    pub feature_names_in: Vec<String>,
    pub columns: FxHashMap<String, ColumnEncoding>,
    #[serde(default)]
    pub feature_names_out: Option<Vec<String>>,
    #[serde(default)]
    pub handle_unknown: UnknownCategory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColumnEncoding {
    OneHot {
        categories: Vec<String>,
        /// Category with no output column (reference level)
        #[serde(default)]
        drop: Option<String>,
    },
    Passthrough,
}

/// What to do with a category the encoder never saw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownCategory {
    /// Encode as all zeros
    #[default]
    Ignore,
    Error,
}

// ============================================================================
// Fitted encoder
// ============================================================================

#[derive(Debug, Clone)]
enum FittedColumn {
    OneHot {
        field: String,
        /// category -> offset within this column's output block
        slots: FxHashMap<String, usize>,
        width: usize,
        dropped: Option<String>,
    },
    Passthrough {
        field: String,
    },
}

impl FittedColumn {
    fn width(&self) -> usize {
        match self {
            FittedColumn::OneHot { width, .. } => *width,
            FittedColumn::Passthrough { .. } => 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FittedOneHotEncoder {
    input_fields: Vec<String>,
    output_names: Vec<String>,
    columns: Vec<FittedColumn>,
    handle_unknown: UnknownCategory,
}

impl FittedOneHotEncoder {
    /// Load encoder artifact from JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read encoder artifact: {:?}", path))?;

        let artifact: EncoderArtifact = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse encoder artifact: {:?}", path))?;

        Self::from_artifact(artifact)
    }

    pub fn from_artifact(artifact: EncoderArtifact) -> Result<Self> {
        if artifact.feature_names_in.is_empty() {
            bail!("Encoder artifact has no input fields");
        }

        let mut columns = Vec::with_capacity(artifact.feature_names_in.len());
        let mut generated_names = Vec::new();

        for field in &artifact.feature_names_in {
            let encoding = artifact
                .columns
                .get(field)
                .with_context(|| format!("Encoder artifact has no encoding for field '{}'", field))?;

            match encoding {
                ColumnEncoding::OneHot { categories, drop } => {
                    if let Some(dropped) = drop {
                        if !categories.contains(dropped) {
                            bail!(
                                "Dropped category '{}' is not a category of '{}'",
                                dropped, field
                            );
                        }
                    }

                    let mut slots = FxHashMap::default();
                    for category in categories {
                        if drop.as_deref() == Some(category.as_str()) {
                            continue;
                        }
                        if slots.contains_key(category) {
                            bail!("Duplicate category '{}' in '{}'", category, field);
                        }
                        slots.insert(category.clone(), slots.len());
                        generated_names.push(format!("{}_{}", field, category));
                    }

                    let width = slots.len();
                    columns.push(FittedColumn::OneHot {
                        field: field.clone(),
                        slots,
                        width,
                        dropped: drop.clone(),
                    });
                }
                ColumnEncoding::Passthrough => {
                    generated_names.push(field.clone());
                    columns.push(FittedColumn::Passthrough { field: field.clone() });
                }
            }
        }

        // Exported names win over generated ones; they must describe the same width
        let output_names = match artifact.feature_names_out {
            Some(names) => {
                if names.len() != generated_names.len() {
                    bail!(
                        "Encoder artifact lists {} output names but its columns produce {}",
                        names.len(),
                        generated_names.len()
                    );
                }
                names
            }
            None => generated_names,
        };

        let mut seen = HashSet::new();
        for name in &output_names {
            if !seen.insert(name.as_str()) {
                bail!("Duplicate encoder output name '{}'", name);
            }
        }

        tracing::debug!(
            "Fitted encoder: {} input fields -> {} outputs",
            artifact.feature_names_in.len(),
            output_names.len()
        );

        Ok(Self {
            input_fields: artifact.feature_names_in,
            output_names,
            columns,
            handle_unknown: artifact.handle_unknown,
        })
    }
}

impl CategoricalEncoder for FittedOneHotEncoder {
    fn expected_input_fields(&self) -> &[String] {
        &self.input_fields
    }

    fn output_feature_names(&self) -> &[String] {
        &self.output_names
    }

    fn transform(&self, frame: &DataFrame) -> PlannerResult<Vec<f64>> {
        if frame.height() != 1 {
            return Err(PlannerError::Encoding(format!(
                "expected a single row, got {}",
                frame.height()
            )));
        }

        let mut out = Vec::with_capacity(self.output_names.len());

        for fitted in &self.columns {
            match fitted {
                FittedColumn::OneHot { field, slots, width, dropped } => {
                    let block_start = out.len();
                    out.resize(block_start + width, 0.0);

                    let value = cell_as_string(frame.column(field)?)?;
                    match value.as_deref().and_then(|v| slots.get(v)) {
                        Some(slot) => out[block_start + slot] = 1.0,
                        // Reference level: known, encoded as all zeros
                        None if value.is_some() && value == *dropped => {}
                        None => {
                            let shown = value.as_deref().unwrap_or("null");
                            if self.handle_unknown == UnknownCategory::Error {
                                return Err(PlannerError::Encoding(format!(
                                    "unknown category '{}' for field '{}'",
                                    shown, field
                                )));
                            }
                            tracing::debug!("{}='{}' encoded as all zeros", field, shown);
                        }
                    }
                }
                FittedColumn::Passthrough { field } => {
                    let as_float = frame.column(field)?.cast(&DataType::Float64)?;
                    let value = as_float.f64()?.get(0).ok_or_else(|| {
                        PlannerError::Encoding(format!("null value in numeric field '{}'", field))
                    })?;
                    out.push(value);
                }
            }
        }

        debug_assert_eq!(out.len(), self.columns.iter().map(FittedColumn::width).sum::<usize>());
        Ok(out)
    }
}

fn cell_as_string(column: &Column) -> PlannerResult<Option<String>> {
    let as_str = column.cast(&DataType::String)?;
    let value = as_str.str()?.get(0).map(|s| s.to_string());
    Ok(value)
}
