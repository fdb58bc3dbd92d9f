//! Shared data types for survival planning.
//!
//! Labels returned by `as_str()` are the exact category strings the fitted
//! encoder was trained on. Changing one breaks bit-compatibility with the
//! model artifacts.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PlannerError, PlannerResult};

// ============================================================================
// Categorical inputs
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    #[serde(rename = "Prunus serotina")]
    PrunusSerotina,
    #[serde(rename = "Quercus alba")]
    QuercusAlba,
    #[serde(rename = "Quercus rubra")]
    QuercusRubra,
}

impl Species {
    pub const ALL: [Species; 3] = [
        Species::PrunusSerotina,
        Species::QuercusAlba,
        Species::QuercusRubra,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Species::PrunusSerotina => "Prunus serotina",
            Species::QuercusAlba => "Quercus alba",
            Species::QuercusRubra => "Quercus rubra",
        }
    }
}

/// Soil choice as offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoilChoice {
    Forest,
    Sterile,
}

impl SoilChoice {
    pub const ALL: [SoilChoice; 2] = [SoilChoice::Forest, SoilChoice::Sterile];

    pub fn as_str(&self) -> &'static str {
        match self {
            SoilChoice::Forest => "Forest",
            SoilChoice::Sterile => "Sterile",
        }
    }

    /// Soil category the model was trained on.
    ///
    /// The training data labels conditioned soil by the species that
    /// conditioned it, and forest soil was taken under Quercus alba. The
    /// mapping must stay exactly as is to match the fitted encoder.
    pub fn model_category(&self) -> &'static str {
        match self {
            SoilChoice::Forest => "Quercus alba",
            SoilChoice::Sterile => "Sterile",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MycoType {
    #[serde(rename = "EMF")]
    Emf,
    #[serde(rename = "AMF")]
    Amf,
}

impl MycoType {
    pub const ALL: [MycoType; 2] = [MycoType::Emf, MycoType::Amf];

    pub fn as_str(&self) -> &'static str {
        match self {
            MycoType::Emf => "EMF",
            MycoType::Amf => "AMF",
        }
    }
}

// ============================================================================
// Derived categories
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Monsoon,
    PostMonsoon,
    Winter,
    Summer,
}

impl Season {
    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Monsoon => "Monsoon",
            Season::PostMonsoon => "PostMonsoon",
            Season::Winter => "Winter",
            Season::Summer => "Summer",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LightCategory {
    Low,
    Med,
    High,
}

impl LightCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            LightCategory::Low => "Low",
            LightCategory::Med => "Med",
            LightCategory::High => "High",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }

    /// Display label, e.g. "Medium Risk"
    pub fn display(&self) -> String {
        format!("{} Risk", self.as_str())
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Plantation input
// ============================================================================

pub const LIGHT_RANGE: (u8, u8) = (0, 100);
pub const MONTH_RANGE: (u8, u8) = (1, 12);
pub const CENSUS_RANGE: (i64, i64) = (1, 20);

/// Parameters of one prediction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantationInput {
    pub species: Species,
    pub soil: SoilChoice,
    /// Light availability slider, 0-100
    pub light: u8,
    /// Planting month, 1-12
    pub month: u8,
    pub myco_type: MycoType,
    /// Observation intensity
    pub census: i64,
    /// EMF level
    pub emf: f64,
}

impl Default for PlantationInput {
    fn default() -> Self {
        Self {
            species: Species::PrunusSerotina,
            soil: SoilChoice::Forest,
            light: 60,
            month: 7,
            myco_type: MycoType::Emf,
            census: 6,
            emf: 50.0,
        }
    }
}

impl PlantationInput {
    /// Check every field against the ranges the planner accepts.
    /// EMF and Census are checked first, in the same order and with the same
    /// messages as `preprocess_input`.
    pub fn validate(&self) -> PlannerResult<()> {
        if !self.emf.is_finite() || self.emf < 0.0 {
            return Err(PlannerError::validation("EMF", "EMF must be non-negative"));
        }
        if self.census <= 0 {
            return Err(PlannerError::validation("Census", "Census must be positive"));
        }
        if self.light > LIGHT_RANGE.1 {
            return Err(PlannerError::validation(
                "Light",
                format!("Light must be between {} and {}", LIGHT_RANGE.0, LIGHT_RANGE.1),
            ));
        }
        if !(MONTH_RANGE.0..=MONTH_RANGE.1).contains(&self.month) {
            return Err(PlannerError::validation(
                "Month",
                format!("Month must be between {} and {}", MONTH_RANGE.0, MONTH_RANGE.1),
            ));
        }
        if !(CENSUS_RANGE.0..=CENSUS_RANGE.1).contains(&self.census) {
            return Err(PlannerError::validation(
                "Census",
                format!("Census must be between {} and {}", CENSUS_RANGE.0, CENSUS_RANGE.1),
            ));
        }
        Ok(())
    }
}
