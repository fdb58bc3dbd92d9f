//! Utility modules for survival planning
//!
//! - Classification: season, light and risk buckets
//! - Frame helpers: column validation on single-row polars frames

pub mod classify;
pub mod frame_helpers;

// Re-export commonly used functions
pub use classify::{light_category, month_to_season, risk_label};
pub use frame_helpers::{missing_columns, select_in_order};
