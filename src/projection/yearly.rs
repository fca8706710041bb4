//! Projection output structures

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Why an asset needs funding in a given year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttentionKind {
    Replacement,
}

impl AttentionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttentionKind::Replacement => "replacement",
        }
    }
}

/// An asset flagged in a projected year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttentionItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AttentionKind,
    pub estimated_cost: f64,
}

/// Budget need for one projected year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyProjection {
    pub year: i32,
    pub maintenance_cost: f64,
    pub replacement_cost: f64,
    pub total_budget_needed: f64,
    pub assets_requiring_attention: Vec<AttentionItem>,
}

impl YearlyProjection {
    /// Empty projection for `year`
    pub fn new(year: i32) -> Self {
        Self {
            year,
            maintenance_cost: 0.0,
            replacement_cost: 0.0,
            total_budget_needed: 0.0,
            assets_requiring_attention: Vec::new(),
        }
    }

    pub fn add_maintenance(&mut self, cost: f64) {
        self.maintenance_cost += cost;
    }

    /// Record a replacement; cost is added to `replacement_cost` as-is
    pub fn add_replacement(&mut self, id: &str, name: &str, estimated_cost: f64) {
        self.replacement_cost += estimated_cost;
        self.assets_requiring_attention.push(AttentionItem {
            id: id.to_string(),
            name: name.to_string(),
            kind: AttentionKind::Replacement,
            estimated_cost,
        });
    }

    /// Set the total from the two components. Call once all assets are added.
    pub fn finalize(&mut self) {
        self.total_budget_needed = self.maintenance_cost + self.replacement_cost;
    }
}

/// Aggregates over a whole horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub total_maintenance: f64,
    pub total_replacement: f64,
    pub total_budget_needed: f64,
    /// Year with the highest total need (earliest on ties)
    pub peak_year: Option<i32>,
    pub peak_budget_needed: f64,
    /// Distinct assets flagged for replacement in any year
    pub assets_due_for_replacement: usize,
}

impl ProjectionSummary {
    pub fn from_years(years: &[YearlyProjection]) -> Self {
        let total_maintenance: f64 = years.iter().map(|y| y.maintenance_cost).sum();
        let total_replacement: f64 = years.iter().map(|y| y.replacement_cost).sum();
        let total_budget_needed: f64 = years.iter().map(|y| y.total_budget_needed).sum();

        let mut peak: Option<&YearlyProjection> = None;
        for y in years {
            if peak.map_or(true, |p| y.total_budget_needed > p.total_budget_needed) {
                peak = Some(y);
            }
        }

        let flagged: BTreeSet<&str> = years
            .iter()
            .flat_map(|y| y.assets_requiring_attention.iter().map(|a| a.id.as_str()))
            .collect();

        Self {
            total_maintenance,
            total_replacement,
            total_budget_needed,
            peak_year: peak.map(|p| p.year),
            peak_budget_needed: peak.map(|p| p.total_budget_needed).unwrap_or(0.0),
            assets_due_for_replacement: flagged.len(),
        }
    }
}

/// Complete projection result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub start_year: i32,
    pub horizon_years: u32,
    pub total_assets: usize,
    pub years: Vec<YearlyProjection>,
}

impl ProjectionResult {
    pub fn summary(&self) -> ProjectionSummary {
        ProjectionSummary::from_years(&self.years)
    }
}
