//! Session History
//!
//! Append-only log of the predictions made in one interactive session, plus
//! the dashboard summary computed over it. Nothing here is persisted or
//! shared between sessions.

use serde::{Deserialize, Serialize};

use crate::types::{RiskLevel, Season};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub probability: f64,
    pub risk: RiskLevel,
    pub season: Season,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskDistribution {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub predictions: usize,
    pub average_probability: f64,
    pub low_risk_count: usize,
    /// Most frequently predicted season
    pub best_planting_window: Season,
    pub risk_distribution: RiskDistribution,
}

#[derive(Debug, Clone, Default)]
pub struct SessionHistory {
    records: Vec<PredictionRecord>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: PredictionRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[PredictionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Dashboard metrics, `None` until something has been recorded
    pub fn summary(&self) -> Option<DashboardSummary> {
        if self.records.is_empty() {
            return None;
        }

        let n = self.records.len();
        let average_probability = self.records.iter().map(|r| r.probability).sum::<f64>() / n as f64;

        let mut distribution = RiskDistribution::default();
        for r in &self.records {
            match r.risk {
                RiskLevel::Low => distribution.low += 1,
                RiskLevel::Medium => distribution.medium += 1,
                RiskLevel::High => distribution.high += 1,
            }
        }

        Some(DashboardSummary {
            predictions: n,
            average_probability,
            low_risk_count: distribution.low,
            best_planting_window: self.most_common_season()?,
            risk_distribution: distribution,
        })
    }

    /// Most frequent season; ties go to the season recorded first
    fn most_common_season(&self) -> Option<Season> {
        // (season, count) in first-seen order
        let mut counts: Vec<(Season, usize)> = Vec::with_capacity(4);
        for r in &self.records {
            match counts.iter_mut().find(|(s, _)| *s == r.season) {
                Some((_, c)) => *c += 1,
                None => counts.push((r.season, 1)),
            }
        }

        let mut best: Option<(Season, usize)> = None;
        for (season, count) in counts {
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((season, count));
            }
        }
        best.map(|(s, _)| s)
    }
}
