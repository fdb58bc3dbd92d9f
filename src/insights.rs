//! Impact Factors
//!
//! Plain-language factors behind a prediction, listed in fixed priority
//! order. The headline names at most the first two.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::types::{LightCategory, MycoType, Season, SoilChoice};

/// Factors shown in the headline
pub const HEADLINE_FACTORS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactFactor {
    LowLight,
    PoorSoil,
    WeakMycorrhizae,
    SummerStress,
    FavorableMonsoon,
}

impl ImpactFactor {
    pub fn message(&self) -> &'static str {
        match self {
            ImpactFactor::LowLight => "low light availability",
            ImpactFactor::PoorSoil => "poor soil quality",
            ImpactFactor::WeakMycorrhizae => "weaker mycorrhizal support",
            ImpactFactor::SummerStress => "summer planting stress",
            ImpactFactor::FavorableMonsoon => "favorable monsoon conditions",
        }
    }
}

/// Collect impact factors in priority order
pub fn impact_factors(
    light: LightCategory,
    soil: SoilChoice,
    myco_type: MycoType,
    season: Season,
) -> SmallVec<[ImpactFactor; 5]> {
    let mut factors = SmallVec::new();

    if light == LightCategory::Low {
        factors.push(ImpactFactor::LowLight);
    }
    // Judged on the soil the user picked, not the model category
    if soil == SoilChoice::Sterile {
        factors.push(ImpactFactor::PoorSoil);
    }
    if myco_type == MycoType::Amf {
        factors.push(ImpactFactor::WeakMycorrhizae);
    }
    match season {
        Season::Summer => factors.push(ImpactFactor::SummerStress),
        Season::Monsoon => factors.push(ImpactFactor::FavorableMonsoon),
        _ => {}
    }

    factors
}

/// One-line summary of the leading factors
pub fn headline(factors: &[ImpactFactor]) -> String {
    if factors.is_empty() {
        return "Environmental conditions are favorable for survival.".to_string();
    }

    let shown: Vec<&str> = factors
        .iter()
        .take(HEADLINE_FACTORS)
        .map(|f| f.message())
        .collect();

    format!("High impact factors: {}.", shown.join(", "))
}

/// Probability as a percentage with one decimal, e.g. "72.8%"
pub fn percent_label(probability: f64) -> String {
    format!("{:.1}%", probability * 100.0)
}
