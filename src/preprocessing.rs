//! Feature Preprocessing
//!
//! Turns plantation inputs into the encoded row the survival model expects:
//! 1. validate EMF and Census
//! 2. build a single-record frame with the derived categorical fields
//! 3. check the frame covers every field the encoder was fitted on
//! 4. select the encoder's input order and transform
//! 5. reindex to the model's feature list, zero-filling absent features

use polars::prelude::*;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::encoder::CategoricalEncoder;
use crate::error::{PlannerError, PlannerResult};
use crate::types::{LightCategory, MycoType, PlantationInput, Season, Species};
use crate::utils::{light_category, month_to_season, select_in_order};

/// Constant Sterile marker field value
pub const STERILE_MARKER: &str = "Sterile";
/// Neighbour effects are not modelled; every tree counts as heterospecific
pub const CONSPECIFIC_VALUE: &str = "Heterospecific";

// Column names of the feature record, as used at training time
pub const COL_SPECIES: &str = "Species";
pub const COL_LIGHT_CAT: &str = "Light_Cat";
pub const COL_SOIL: &str = "Soil";
pub const COL_STERILE: &str = "Sterile";
pub const COL_CONSPECIFIC: &str = "Conspecific";
pub const COL_MYCO_TYPE: &str = "Myco_type";
pub const COL_PLANT_SEASON: &str = "PlantSeason";
pub const COL_CENSUS: &str = "Census";
pub const COL_EMF_LOG: &str = "EMF_log";

/// Derived features of one request, before encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    pub species: Species,
    /// Soil category after the soil policy table, not the UI label
    pub soil: String,
    pub light: LightCategory,
    pub season: Season,
    pub myco_type: MycoType,
    pub census: i64,
    pub emf: f64,
}

impl FeatureRecord {
    pub fn from_input(input: &PlantationInput) -> Self {
        Self {
            species: input.species,
            soil: input.soil.model_category().to_string(),
            light: light_category(input.light),
            season: month_to_season(input.month),
            myco_type: input.myco_type,
            census: input.census,
            emf: input.emf,
        }
    }

    /// EMF on a log1p scale; 0 stays 0
    pub fn emf_log(&self) -> f64 {
        libm::log1p(self.emf)
    }

    fn validate(&self) -> PlannerResult<()> {
        if self.emf < 0.0 {
            return Err(PlannerError::validation("EMF", "EMF must be non-negative"));
        }
        if self.census <= 0 {
            return Err(PlannerError::validation("Census", "Census must be positive"));
        }
        Ok(())
    }

    /// Single-row frame with every field of the training schema
    pub fn to_frame(&self) -> PlannerResult<DataFrame> {
        let df = df! {
            COL_SPECIES => &[self.species.as_str()],
            COL_LIGHT_CAT => &[self.light.as_str()],
            COL_SOIL => &[self.soil.as_str()],
            COL_STERILE => &[STERILE_MARKER],
            COL_CONSPECIFIC => &[CONSPECIFIC_VALUE],
            COL_MYCO_TYPE => &[self.myco_type.as_str()],
            COL_PLANT_SEASON => &[self.season.as_str()],
            COL_CENSUS => &[self.census],
            COL_EMF_LOG => &[self.emf_log()],
        }?;
        Ok(df)
    }
}

/// Model-ready numeric row. `names` is the model's feature order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodedFeatureRow {
    names: Vec<String>,
    values: Vec<f64>,
}

impl EncodedFeatureRow {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }

    /// Single-row frame, one Float64 column per feature
    pub fn to_frame(&self) -> PlannerResult<DataFrame> {
        let columns: Vec<Column> = self
            .names
            .iter()
            .zip(&self.values)
            .map(|(name, &value)| Column::new(name.as_str().into(), [value]))
            .collect();
        Ok(DataFrame::new(columns)?)
    }
}

/// Encode one plantation record for the survival model.
///
/// # Errors
/// - `InputValidation` if EMF is negative or Census is not positive
/// - `MissingFeatures` if the record lacks a field the encoder needs
/// - `Encoding` if the encoder rejects the row
pub fn preprocess_input(
    record: &FeatureRecord,
    encoder: &dyn CategoricalEncoder,
    feature_names: &[String],
) -> PlannerResult<EncodedFeatureRow> {
    record.validate()?;

    let frame = record.to_frame()?;
    tracing::debug!(
        "Feature record: species={} soil={} light={} season={} census={} emf_log={:.4}",
        record.species.as_str(),
        record.soil,
        record.light.as_str(),
        record.season.as_str(),
        record.census,
        record.emf_log()
    );

    let ordered = select_in_order(&frame, encoder.expected_input_fields())?;
    let encoded = encoder.transform(&ordered)?;

    let encoded_names = encoder.output_feature_names();
    if encoded.len() != encoded_names.len() {
        return Err(PlannerError::Encoding(format!(
            "encoder produced {} values for {} output names",
            encoded.len(),
            encoded_names.len()
        )));
    }

    Ok(reindex(encoded_names, &encoded, feature_names))
}

/// Align encoded values to `feature_names`, 0.0 where the encoder had none.
pub fn reindex(
    encoded_names: &[String],
    encoded: &[f64],
    feature_names: &[String],
) -> EncodedFeatureRow {
    let by_name: FxHashMap<&str, f64> = encoded_names
        .iter()
        .map(|s| s.as_str())
        .zip(encoded.iter().copied())
        .collect();

    let mut filled = 0usize;
    let values: Vec<f64> = feature_names
        .iter()
        .map(|name| match by_name.get(name.as_str()) {
            Some(&v) => v,
            None => {
                filled += 1;
                0.0
            }
        })
        .collect();

    if filled > 0 {
        tracing::warn!(
            "{} of {} model features absent from encoder output; filled with 0",
            filled,
            feature_names.len()
        );
    }

    EncodedFeatureRow {
        names: feature_names.to_vec(),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{EncoderArtifact, FittedOneHotEncoder};
    use crate::types::SoilChoice;
    use approx::assert_relative_eq;
    use std::sync::Mutex;

    const ENCODER_JSON: &str = r#"{
        "feature_names_in": ["Species", "Light_Cat", "Soil", "Sterile", "Conspecific", "Myco_type", "PlantSeason", "Census", "EMF_log"],
        "columns": {
            "Species": {"type": "one_hot", "categories": ["Prunus serotina", "Quercus alba", "Quercus rubra"], "drop": "Prunus serotina"},
            "Light_Cat": {"type": "one_hot", "categories": ["High", "Low", "Med"], "drop": "High"},
            "Soil": {"type": "one_hot", "categories": ["Acer saccharum", "Prunus serotina", "Quercus alba", "Quercus rubra", "Sterile"], "drop": "Acer saccharum"},
            "Sterile": {"type": "one_hot", "categories": ["Non-Sterile", "Sterile"], "drop": "Non-Sterile"},
            "Conspecific": {"type": "one_hot", "categories": ["Conspecific", "Heterospecific", "Sterilized"], "drop": "Conspecific"},
            "Myco_type": {"type": "one_hot", "categories": ["AMF", "EMF"], "drop": "AMF"},
            "PlantSeason": {"type": "one_hot", "categories": ["Monsoon", "PostMonsoon", "Summer", "Winter"], "drop": "Monsoon"},
            "Census": {"type": "passthrough"},
            "EMF_log": {"type": "passthrough"}
        }
    }"#;

    fn encoder() -> FittedOneHotEncoder {
        let artifact: EncoderArtifact = serde_json::from_str(ENCODER_JSON).unwrap();
        FittedOneHotEncoder::from_artifact(artifact).unwrap()
    }

    fn scenario() -> PlantationInput {
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

    /// Records the frame it was asked to encode
    struct RecordingEncoder {
        inner: FittedOneHotEncoder,
        seen: Mutex<Option<DataFrame>>,
    }

    impl CategoricalEncoder for RecordingEncoder {
        fn expected_input_fields(&self) -> &[String] {
            self.inner.expected_input_fields()
        }

        fn output_feature_names(&self) -> &[String] {
            self.inner.output_feature_names()
        }

        fn transform(&self, frame: &DataFrame) -> PlannerResult<Vec<f64>> {
            *self.seen.lock().unwrap() = Some(frame.clone());
            self.inner.transform(frame)
        }
    }

    fn string_cell(df: &DataFrame, name: &str) -> String {
        df.column(name).unwrap().str().unwrap().get(0).unwrap().to_string()
    }

    #[test]
    fn test_negative_emf_rejected() {
        let enc = encoder();
        let record = FeatureRecord::from_input(&PlantationInput { emf: -1.0, ..scenario() });
        let err = preprocess_input(&record, &enc, enc.output_feature_names()).unwrap_err();
        assert!(err.to_string().contains("EMF"));
        assert!(err.is_user_error());
    }

    #[test]
    fn test_non_positive_census_rejected() {
        let enc = encoder();
        let record = FeatureRecord::from_input(&PlantationInput { census: 0, ..scenario() });
        let err = preprocess_input(&record, &enc, enc.output_feature_names()).unwrap_err();
        assert!(err.to_string().contains("Census"));

        let record = FeatureRecord::from_input(&PlantationInput { census: -3, ..scenario() });
        assert!(preprocess_input(&record, &enc, enc.output_feature_names()).is_err());
    }

    #[test]
    fn test_emf_log_values() {
        let zero = FeatureRecord::from_input(&PlantationInput { emf: 0.0, ..scenario() });
        assert_relative_eq!(zero.emf_log(), 0.0);

        let hundred = FeatureRecord::from_input(&PlantationInput { emf: 100.0, ..scenario() });
        assert_relative_eq!(hundred.emf_log(), 4.61512, epsilon = 1e-4);
    }

    #[test]
    fn test_scenario_record_fields() {
        let record = FeatureRecord::from_input(&scenario());
        let df = record.to_frame().unwrap();

        assert_eq!(df.height(), 1);
        assert_eq!(string_cell(&df, COL_LIGHT_CAT), "Med");
        assert_eq!(string_cell(&df, COL_PLANT_SEASON), "Monsoon");
        assert_eq!(string_cell(&df, COL_CONSPECIFIC), "Heterospecific");
        assert_eq!(string_cell(&df, COL_STERILE), "Sterile");
        assert_eq!(df.column(COL_CENSUS).unwrap().i64().unwrap().get(0), Some(6));
        let emf_log = df.column(COL_EMF_LOG).unwrap().f64().unwrap().get(0).unwrap();
        assert_relative_eq!(emf_log, 3.93183, epsilon = 1e-4);
    }

    #[test]
    fn test_resolved_soil_reaches_encoder() {
        let enc = RecordingEncoder { inner: encoder(), seen: Mutex::new(None) };

        let record = FeatureRecord::from_input(&scenario());
        preprocess_input(&record, &enc, enc.output_feature_names()).unwrap();
        let seen = enc.seen.lock().unwrap().take().unwrap();
        assert_eq!(string_cell(&seen, COL_SOIL), "Quercus alba");

        let record = FeatureRecord::from_input(&PlantationInput { soil: SoilChoice::Sterile, ..scenario() });
        preprocess_input(&record, &enc, enc.output_feature_names()).unwrap();
        let seen = enc.seen.lock().unwrap().take().unwrap();
        assert_eq!(string_cell(&seen, COL_SOIL), "Sterile");
    }

    #[test]
    fn test_encoder_sees_its_training_order() {
        let enc = RecordingEncoder { inner: encoder(), seen: Mutex::new(None) };
        let record = FeatureRecord::from_input(&scenario());
        preprocess_input(&record, &enc, enc.output_feature_names()).unwrap();

        let seen = enc.seen.lock().unwrap().take().unwrap();
        let cols: Vec<String> = seen.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(cols, enc.expected_input_fields());
    }

    #[test]
    fn test_output_matches_feature_names_order() {
        let enc = encoder();
        let mut feature_names: Vec<String> = enc.output_feature_names().to_vec();
        feature_names.reverse();
        // A model feature the encoder never produces
        feature_names.insert(3, "Species_Acer saccharum".to_string());

        for month in 1..=12 {
            for light in [0, 45, 90] {
                let input = PlantationInput { month, light, ..scenario() };
                let row = preprocess_input(&FeatureRecord::from_input(&input), &enc, &feature_names).unwrap();
                assert_eq!(row.names(), feature_names.as_slice());
                assert_eq!(row.len(), feature_names.len());
                assert_eq!(row.get("Species_Acer saccharum"), Some(0.0));
            }
        }
    }

    #[test]
    fn test_scenario_encoding() {
        let enc = encoder();
        let row = preprocess_input(&FeatureRecord::from_input(&scenario()), &enc, enc.output_feature_names()).unwrap();

        assert_eq!(row.get("Species_Quercus alba"), Some(1.0));
        assert_eq!(row.get("Light_Cat_Med"), Some(1.0));
        assert_eq!(row.get("Light_Cat_Low"), Some(0.0));
        assert_eq!(row.get("Soil_Quercus alba"), Some(1.0));
        assert_eq!(row.get("Conspecific_Heterospecific"), Some(1.0));
        assert_eq!(row.get("PlantSeason_Summer"), Some(0.0));
        assert_eq!(row.get("Census"), Some(6.0));
        assert_relative_eq!(row.get("EMF_log").unwrap(), 3.93183, epsilon = 1e-4);
    }

    #[test]
    fn test_missing_encoder_field_reported() {
        let mut artifact: EncoderArtifact = serde_json::from_str(ENCODER_JSON).unwrap();
        artifact.feature_names_in.push("Water".to_string());
        artifact
            .columns
            .insert("Water".to_string(), crate::encoder::ColumnEncoding::Passthrough);
        let enc = FittedOneHotEncoder::from_artifact(artifact).unwrap();

        let err = preprocess_input(&FeatureRecord::from_input(&scenario()), &enc, enc.output_feature_names())
            .unwrap_err();
        match err {
            PlannerError::MissingFeatures(missing) => assert_eq!(missing, vec!["Water".to_string()]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_row_to_frame() {
        let enc = encoder();
        let row = preprocess_input(&FeatureRecord::from_input(&scenario()), &enc, enc.output_feature_names()).unwrap();
        let df = row.to_frame().unwrap();
        assert_eq!(df.height(), 1);
        assert_eq!(df.width(), row.len());
    }
}
