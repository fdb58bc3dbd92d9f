//! Prediction Pipeline Integration Tests
//!
//! Runs the full pipeline against the fixture artifacts in
//! tests/fixtures/model: load → preprocess → Weibull AFT → horizon → risk.
//!
//! Run with: cargo test --test prediction_pipeline_tests

use approx::assert_relative_eq;
use std::path::PathBuf;
use tree_survival_planner::{
    month_to_season, preprocess_input, risk_label, FeatureRecord, ModelArtifacts, MycoType,
    PlannerError, PlantationInput, RiskLevel, Season, SessionHistory, SoilChoice, Species,
    SurvivalModel, SurvivalPlanner,
};

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/model")
}

fn planner() -> SurvivalPlanner {
    let artifacts = ModelArtifacts::load(&fixture_dir()).expect("Failed to load fixture artifacts");
    SurvivalPlanner::from_artifacts(artifacts).expect("Failed to build planner")
}

fn reference_input() -> PlantationInput {
    PlantationInput {
        species: Species::QuercusAlba,
        soil: SoilChoice::Forest,
        light: 60,
        month: 7,
        myco_type: MycoType::Emf,
        census: 6,
        emf: 50.0,
    }
}

#[test]
fn test_reference_scenario_end_to_end() {
    let artifacts = ModelArtifacts::load(&fixture_dir()).unwrap();

    let record = FeatureRecord::from_input(&reference_input());
    let row = preprocess_input(&record, &artifacts.encoder, &artifacts.feature_names).unwrap();

    assert_eq!(row.names(), artifacts.feature_names.as_slice());
    assert_eq!(row.get("Light_Cat_Med"), Some(1.0));
    assert_eq!(row.get("Census"), Some(6.0));
    assert_eq!(row.get("Conspecific_Heterospecific"), Some(1.0));
    assert_eq!(row.get("Soil_Quercus alba"), Some(1.0));
    assert_relative_eq!(row.get("EMF_log").unwrap(), 3.9318, epsilon = 1e-4);

    let curve = artifacts.model.predict_survival_function(&row).unwrap();
    let horizon = curve.at_horizon();

    // Fixture timeline has 35 and 38 around the 36-month horizon
    assert_relative_eq!(horizon.time, 35.0);
    assert_relative_eq!(horizon.probability, 0.72817, epsilon = 1e-4);
    assert_eq!(risk_label(horizon.probability), RiskLevel::Medium);
}

#[test]
fn test_planner_matches_manual_pipeline() {
    let p = planner().predict(&reference_input()).unwrap();

    assert_eq!(p.season, Season::Monsoon);
    assert_eq!(p.season, month_to_season(7));
    assert_relative_eq!(p.survival_probability, 0.72817, epsilon = 1e-4);
    assert_eq!(p.risk, RiskLevel::Medium);
    assert_eq!(p.risk_display, "Medium Risk");
    assert_eq!(p.survival_percent, "72.8%");
    assert_eq!(p.headline, "High impact factors: favorable monsoon conditions.");
    assert_eq!(p.survival_curve.len(), 14);
}

#[test]
fn test_all_three_risk_levels_reachable() {
    let planner = planner();

    let favourable = PlantationInput {
        light: 85,
        census: 1,
        emf: 100.0,
        ..reference_input()
    };
    let p = planner.predict(&favourable).unwrap();
    assert_relative_eq!(p.survival_probability, 0.8072, epsilon = 1e-3);
    assert_eq!(p.risk, RiskLevel::Low);

    let hostile = PlantationInput {
        species: Species::PrunusSerotina,
        soil: SoilChoice::Sterile,
        light: 10,
        month: 4,
        myco_type: MycoType::Amf,
        census: 20,
        emf: 0.0,
    };
    let p = planner.predict(&hostile).unwrap();
    assert_eq!(p.risk, RiskLevel::High);
    assert_eq!(
        p.headline,
        "High impact factors: low light availability, poor soil quality."
    );
}

#[test]
fn test_every_valid_input_yields_one_risk_label() {
    let planner = planner();

    for species in Species::ALL {
        for soil in SoilChoice::ALL {
            for myco_type in MycoType::ALL {
                for month in 1..=12u8 {
                    let input = PlantationInput {
                        species,
                        soil,
                        myco_type,
                        month,
                        ..reference_input()
                    };
                    let p = planner.predict(&input).unwrap();
                    assert!((0.0..=1.0).contains(&p.survival_probability));
                    assert_eq!(p.risk, risk_label(p.survival_probability));
                    assert_eq!(p.season, month_to_season(month));
                }
            }
        }
    }
}

#[test]
fn test_validation_errors_name_the_field() {
    let planner = planner();

    let err = planner
        .predict(&PlantationInput { emf: -1.0, ..reference_input() })
        .unwrap_err();
    assert!(err.to_string().contains("EMF"));

    let err = planner
        .predict(&PlantationInput { census: 0, ..reference_input() })
        .unwrap_err();
    assert!(err.to_string().contains("Census"));
    assert!(matches!(err, PlannerError::InputValidation { field: "Census", .. }));
    assert_eq!(err.to_string(), "Census must be positive");
}

#[test]
fn test_predict_and_preprocess_agree_on_first_invalid_field() {
    let artifacts = ModelArtifacts::load(&fixture_dir()).unwrap();
    let input = PlantationInput { emf: -1.0, census: 0, ..reference_input() };

    let direct = preprocess_input(
        &FeatureRecord::from_input(&input),
        &artifacts.encoder,
        &artifacts.feature_names,
    )
    .unwrap_err();
    let via_planner = planner().predict(&input).unwrap_err();

    assert!(matches!(via_planner, PlannerError::InputValidation { field: "EMF", .. }));
    assert_eq!(via_planner.to_string(), direct.to_string());
}

#[test]
fn test_session_dashboard_from_predictions() {
    let planner = planner();
    let mut history = SessionHistory::new();

    planner.predict_and_record(&reference_input(), &mut history).unwrap();
    planner
        .predict_and_record(&PlantationInput { month: 8, light: 85, census: 1, emf: 100.0, ..reference_input() }, &mut history)
        .unwrap();
    planner
        .predict_and_record(&PlantationInput { month: 4, ..reference_input() }, &mut history)
        .unwrap();
    // Rejected input must not show up in the history
    assert!(planner
        .predict_and_record(&PlantationInput { emf: -5.0, ..reference_input() }, &mut history)
        .is_err());

    let summary = history.summary().unwrap();
    assert_eq!(summary.predictions, 3);
    assert_eq!(summary.best_planting_window, Season::Monsoon);
    assert_eq!(summary.low_risk_count, 1);
    assert_eq!(
        summary.risk_distribution.low + summary.risk_distribution.medium + summary.risk_distribution.high,
        3
    );
}

#[test]
fn test_monsoon_is_best_planting_window() {
    let windows = planner().planting_windows(&reference_input()).unwrap();

    assert_eq!(windows.months.len(), 12);
    // Monsoon carries no seasonal penalty in the fixture model; June comes first
    assert_eq!(windows.best.month, 6);
    assert_eq!(windows.best.season, Season::Monsoon);

    let july = &windows.months[6];
    assert_relative_eq!(july.survival_probability, windows.best.survival_probability);
}
