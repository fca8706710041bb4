//! Cost assumptions: maintenance factors by condition and replacement inflation

use crate::asset::Condition;

/// Annual inflation applied to replacement cost from the projection's first year
pub const DEFAULT_INFLATION_RATE: f64 = 0.03;

/// Cost assumptions used by the projector
#[derive(Debug, Clone, PartialEq)]
pub struct CostAssumptions {
    /// Fraction of value spent on upkeep each year, indexed by condition
    maintenance: [f64; 5],

    /// Annual replacement cost inflation
    pub inflation_rate: f64,
}

impl CostAssumptions {
    /// Standard municipal maintenance table with 3% inflation
    pub fn standard() -> Self {
        Self {
            maintenance: [
                0.01, // EXCELLENT
                0.02, // GOOD
                0.04, // FAIR
                0.08, // POOR
                0.15, // CRITICAL
            ],
            inflation_rate: DEFAULT_INFLATION_RATE,
        }
    }

    /// Maintenance cost as a fraction of asset value
    pub fn maintenance_factor(&self, condition: Condition) -> f64 {
        self.maintenance[condition_index(condition)]
    }

    /// Compound growth factor after `years_from_start` years
    pub fn inflation_factor(&self, years_from_start: u32) -> f64 {
        let years = i32::try_from(years_from_start).unwrap_or(i32::MAX);
        (1.0 + self.inflation_rate).powi(years)
    }
}

impl Default for CostAssumptions {
    fn default() -> Self {
        Self::standard()
    }
}

fn condition_index(condition: Condition) -> usize {
    match condition {
        Condition::Excellent => 0,
        Condition::Good => 1,
        Condition::Fair => 2,
        Condition::Poor => 3,
        Condition::Critical => 4,
    }
}
