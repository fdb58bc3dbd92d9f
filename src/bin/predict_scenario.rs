//! Predict Reference Scenario
//!
//! Loads the model artifacts and prints the prediction, survival curve and
//! planting-window scan for the reference plantation:
//! Quercus alba, forest soil, light 60, July, EMF, census 6, EMF level 50.
//!
//! Run with: MODEL_DIR=model cargo run --bin predict_scenario

use anyhow::Result;
use tree_survival_planner::{
    ModelArtifacts, MycoType, PlannerConfig, PlantationInput, SoilChoice, Species,
    SurvivalPlanner,
};

fn main() -> Result<()> {
    let config = PlannerConfig::from_env();
    println!("Loading artifacts from {:?}...", config.model_dir);

    let artifacts = ModelArtifacts::load(&config.model_dir)?;
    let planner = SurvivalPlanner::from_artifacts(artifacts)?;

    let input = PlantationInput {
        species: Species::QuercusAlba,
        soil: SoilChoice::Forest,
        light: 60,
        month: 7,
        myco_type: MycoType::Emf,
        census: 6,
        emf: 50.0,
    };

    let p = planner.predict(&input)?;

    println!("\n=== Survival Prediction ===");
    println!("  Species:          {}", input.species.as_str());
    println!("  Soil:             {} (model: {})", input.soil.as_str(), p.soil_category);
    println!("  Light:            {} ({})", input.light, p.light_category.as_str());
    println!("  Season:           {}", p.season);
    println!(
        "  Survival ({} mo): {} (sample at t={})",
        p.horizon_months, p.survival_percent, p.horizon_time
    );
    println!("  Risk:             {}", p.risk_display);
    println!("  {}", p.headline);
    println!("  Recommended planting window: {}", p.recommended_window);

    println!("\n=== Survival Curve ===");
    for point in p.survival_curve.points() {
        let bar = "#".repeat((point.probability * 40.0).round() as usize);
        println!("  t={:>5.1}  {:>6.3}  {}", point.time, point.probability, bar);
    }

    println!("\n=== Planting Windows ===");
    let windows = planner.planting_windows(&input)?;
    for m in &windows.months {
        println!(
            "  month {:>2}  {:<12} {:>6.1}%  {}",
            m.month,
            m.season.as_str(),
            m.survival_probability * 100.0,
            m.risk.as_str()
        );
    }
    println!(
        "  Best: month {} ({}) at {:.1}%",
        windows.best.month,
        windows.best.season,
        windows.best.survival_probability * 100.0
    );

    Ok(())
}
