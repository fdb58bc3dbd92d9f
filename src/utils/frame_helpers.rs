//! DataFrame column helpers with validation
//!
//! Explicit column checks for the single-row feature frames handed to the
//! encoder, so a schema drift fails loudly instead of encoding garbage.

use polars::prelude::*;
use std::collections::HashSet;

use crate::error::{PlannerError, PlannerResult};

/// Names in `required` that `df` does not have, in `required` order.
pub fn missing_columns(df: &DataFrame, required: &[String]) -> Vec<String> {
    let present: HashSet<&str> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.as_str())
        .collect();

    required
        .iter()
        .filter(|name| !present.contains(name.as_str()))
        .cloned()
        .collect()
}

/// Select `columns` from `df` in exactly that order
///
/// # Errors
/// `MissingFeatures` listing every absent column, before polars is asked to
/// select anything.
pub fn select_in_order(df: &DataFrame, columns: &[String]) -> PlannerResult<DataFrame> {
    let missing = missing_columns(df, columns);
    if !missing.is_empty() {
        return Err(PlannerError::MissingFeatures(missing));
    }

    let selected = df.select(columns.iter().map(|s| s.as_str()))?;
    Ok(selected)
}
