//! Core projection engine for yearly maintenance and replacement budgets

use crate::asset::Asset;
use crate::error::ValidationError;
use super::factors::CostAssumptions;
use super::yearly::{ProjectionResult, YearlyProjection};
use chrono::{Datelike, NaiveDate};
use rayon::prelude::*;

/// When an asset past end-of-life is counted as a replacement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplacementPolicy {
    /// Flag the asset in every year its remaining life is non-positive.
    /// The projection does not assume the replacement happened, so the cost
    /// repeats until the horizon ends.
    #[default]
    EveryYear,
    /// Flag the asset only in the first horizon year it is due
    FirstDueYearOnly,
}

impl ReplacementPolicy {
    pub fn from_first_due_only(first_due_only: bool) -> Self {
        if first_due_only {
            ReplacementPolicy::FirstDueYearOnly
        } else {
            ReplacementPolicy::EveryYear
        }
    }
}

/// Configuration for a projection run
#[derive(Debug, Clone)]
pub struct ProjectionConfig {
    /// First projected calendar year
    pub start_year: i32,

    /// Number of consecutive years to project
    pub horizon_years: u32,

    pub replacement_policy: ReplacementPolicy,
}

impl ProjectionConfig {
    pub fn new(start_year: i32, horizon_years: u32) -> Self {
        Self {
            start_year,
            horizon_years,
            replacement_policy: ReplacementPolicy::default(),
        }
    }

    /// Every projected year must be a calendar year `chrono` can represent
    pub fn validate(&self) -> Result<(), ValidationError> {
        let (min, max) = (NaiveDate::MIN.year(), NaiveDate::MAX.year());
        let end = i64::from(self.start_year) + i64::from(self.horizon_years);
        if self.start_year < min || end - 1 > i64::from(max) {
            return Err(ValidationError::StartYearOutOfRange { year: self.start_year, end, min, max });
        }
        Ok(())
    }
}

/// Main projection engine
#[derive(Debug, Clone)]
pub struct BudgetProjector {
    assumptions: CostAssumptions,
    config: ProjectionConfig,
}

impl BudgetProjector {
    /// Create a new projector with given assumptions and config
    pub fn new(assumptions: CostAssumptions, config: ProjectionConfig) -> Self {
        Self { assumptions, config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Run the projection over all assets.
    ///
    /// Years are independent, so they are computed in parallel; the output is
    /// in ascending year order and each year accumulates assets in input order.
    /// Years past `i32::MAX` are not produced.
    pub fn project(&self, assets: &[Asset]) -> ProjectionResult {
        let years: Vec<YearlyProjection> = (0..self.config.horizon_years)
            .into_par_iter()
            .filter_map(|offset| self.project_year(assets, offset))
            .collect();

        ProjectionResult {
            start_year: self.config.start_year,
            horizon_years: self.config.horizon_years,
            total_assets: assets.len(),
            years,
        }
    }

    /// Calculate one year, `offset` years after the start year
    fn project_year(&self, assets: &[Asset], offset: u32) -> Option<YearlyProjection> {
        let year = self.year_at(offset)?;
        let mut projection = YearlyProjection::new(year);
        let inflation = self.assumptions.inflation_factor(offset);

        for asset in assets {
            projection.add_maintenance(asset.value * self.assumptions.maintenance_factor(asset.condition));

            if self.replacement_due(asset, year) {
                projection.add_replacement(&asset.id, &asset.name, asset.value * inflation);
            }
        }

        projection.finalize();
        Some(projection)
    }

    fn replacement_due(&self, asset: &Asset, year: i32) -> bool {
        if asset.remaining_life(year) > 0 {
            return false;
        }
        match self.config.replacement_policy {
            ReplacementPolicy::EveryYear => true,
            // Remaining life only shrinks, so "first due" means it was still
            // positive the year before, or this is the first horizon year
            ReplacementPolicy::FirstDueYearOnly => {
                year == self.config.start_year || asset.remaining_life(year - 1) > 0
            }
        }
    }

    fn year_at(&self, offset: u32) -> Option<i32> {
        i32::try_from(offset).ok().and_then(|o| self.config.start_year.checked_add(o))
    }
}

/// Project `assets` over `[start_year, start_year + horizon_years)` with the
/// standard cost assumptions.
pub fn project(assets: &[Asset], start_year: i32, horizon_years: u32) -> Vec<YearlyProjection> {
    BudgetProjector::new(CostAssumptions::standard(), ProjectionConfig::new(start_year, horizon_years))
        .project(assets)
        .years
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Condition;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn asset(id: &str, value: f64, condition: Condition, purchase_year: i32, lifespan: u32) -> Asset {
        let date = NaiveDate::from_ymd_opt(purchase_year, 7, 1).unwrap();
        Asset::new(id, format!("Asset {id}"), value, condition, date, lifespan)
    }

    #[test]
    fn test_empty_assets() {
        let years = project(&[], 2024, 5);

        assert_eq!(years.len(), 5);
        for y in &years {
            assert_eq!(y.maintenance_cost, 0.0);
            assert_eq!(y.replacement_cost, 0.0);
            assert_eq!(y.total_budget_needed, 0.0);
            assert!(y.assets_requiring_attention.is_empty());
        }
    }

    #[test]
    fn test_years_in_order() {
        let years = project(&[asset("a", 1.0, Condition::Good, 2020, 50)], 2024, 3);
        let labels: Vec<i32> = years.iter().map(|y| y.year).collect();
        assert_eq!(labels, vec![2024, 2025, 2026]);
    }

    #[test]
    fn test_good_asset_maintenance() {
        let years = project(&[asset("a", 1000.0, Condition::Good, 2020, 50)], 2024, 10);
        for y in &years {
            assert_relative_eq!(y.maintenance_cost, 20.0, epsilon = 1e-9);
            assert_eq!(y.replacement_cost, 0.0);
        }
    }

    #[test]
    fn test_maintenance_accumulates_across_assets() {
        let assets = vec![
            asset("a", 1000.0, Condition::Excellent, 2020, 50),
            asset("b", 1000.0, Condition::Critical, 2020, 50),
            asset("c", 500.0, Condition::Poor, 2020, 50),
        ];
        let years = project(&assets, 2024, 1);
        assert_relative_eq!(years[0].maintenance_cost, 10.0 + 150.0 + 40.0, epsilon = 1e-9);
    }

    #[test]
    fn test_expired_asset_flagged_every_year() {
        // Lifespan elapsed in 2020, well before the start year
        let years = project(&[asset("old", 5000.0, Condition::Poor, 2000, 20)], 2024, 5);

        let mut prior: Option<f64> = None;
        for y in &years {
            assert_eq!(y.assets_requiring_attention.len(), 1);
            let item = &y.assets_requiring_attention[0];
            assert_eq!(item.id, "old");
            assert_eq!(item.name, "Asset old");
            assert_eq!(item.estimated_cost, y.replacement_cost);

            if let Some(p) = prior {
                assert_relative_eq!(item.estimated_cost / p, 1.03, epsilon = 1e-12);
            }
            prior = Some(item.estimated_cost);
        }

        // First year has no inflation
        assert_eq!(years[0].replacement_cost, 5000.0);
    }

    #[test]
    fn test_replacement_starts_when_remaining_life_hits_zero() {
        // Purchased 2020 with 6-year life: remaining life is 0 in 2026
        let years = project(&[asset("a", 100.0, Condition::Good, 2020, 6)], 2024, 5);

        let flagged: Vec<i32> = years
            .iter()
            .filter(|y| !y.assets_requiring_attention.is_empty())
            .map(|y| y.year)
            .collect();
        assert_eq!(flagged, vec![2026, 2027, 2028]);

        // Inflation compounds from the start year, not the due year
        assert_relative_eq!(years[2].replacement_cost, 100.0 * 1.03_f64.powi(2));
    }

    #[test]
    fn test_future_purchase_not_due() {
        let years = project(&[asset("a", 100.0, Condition::Good, 2030, 1)], 2024, 3);
        assert!(years.iter().all(|y| y.assets_requiring_attention.is_empty()));
    }

    #[test]
    fn test_total_is_sum_of_components() {
        let assets = vec![
            asset("a", 1234.56, Condition::Fair, 1999, 10),
            asset("b", 98765.4321, Condition::Critical, 2015, 12),
            asset("c", 0.1, Condition::Excellent, 2023, 1),
            asset("d", 777.0, Condition::Poor, 2010, 30),
        ];
        for y in project(&assets, 2024, 20) {
            assert_eq!(y.total_budget_needed, y.maintenance_cost + y.replacement_cost);
        }
    }

    #[test]
    fn test_attention_order_follows_input() {
        let assets = vec![
            asset("z", 10.0, Condition::Good, 1990, 5),
            asset("m", 10.0, Condition::Good, 2020, 50),
            asset("a", 10.0, Condition::Good, 1990, 5),
        ];
        let years = project(&assets, 2024, 2);
        let ids: Vec<&str> = years[1]
            .assets_requiring_attention
            .iter()
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(ids, vec!["z", "a"]);
    }

    #[test]
    fn test_zero_horizon() {
        assert!(project(&[asset("a", 1.0, Condition::Good, 2000, 1)], 2024, 0).is_empty());
    }

    #[test]
    fn test_first_due_year_only() {
        let assets = vec![
            // Already expired before the horizon: flagged in the first year only
            asset("old", 100.0, Condition::Good, 2000, 10),
            // Expires mid-horizon: flagged in 2026 only
            asset("mid", 200.0, Condition::Good, 2020, 6),
        ];
        let config = ProjectionConfig {
            replacement_policy: ReplacementPolicy::FirstDueYearOnly,
            ..ProjectionConfig::new(2024, 5)
        };
        let result = BudgetProjector::new(CostAssumptions::standard(), config).project(&assets);

        let flagged: Vec<(i32, &str)> = result
            .years
            .iter()
            .flat_map(|y| y.assets_requiring_attention.iter().map(move |a| (y.year, a.id.as_str())))
            .collect();
        assert_eq!(flagged, vec![(2024, "old"), (2026, "mid")]);

        // Maintenance is unaffected by the replacement policy
        for y in &result.years {
            assert_relative_eq!(y.maintenance_cost, 6.0, epsilon = 1e-9);
        }
        assert_eq!(result.summary().assets_due_for_replacement, 2);
    }

    #[test]
    fn test_policy_from_flag() {
        assert_eq!(ReplacementPolicy::from_first_due_only(true), ReplacementPolicy::FirstDueYearOnly);
        assert_eq!(ReplacementPolicy::from_first_due_only(false), ReplacementPolicy::EveryYear);
    }

    #[test]
    fn test_validate_year_window() {
        assert!(ProjectionConfig::new(2024, 20).validate().is_ok());

        let last = NaiveDate::MAX.year();
        assert!(ProjectionConfig::new(last, 1).validate().is_ok());
        assert!(matches!(
            ProjectionConfig::new(last, 2).validate(),
            Err(ValidationError::StartYearOutOfRange { .. })
        ));
        assert!(ProjectionConfig::new(i32::MAX - 1, 4).validate().is_err());
        assert!(ProjectionConfig::new(NaiveDate::MIN.year() - 1, 1).validate().is_err());
    }

    #[test]
    fn test_years_never_repeat_near_i32_max() {
        let config = ProjectionConfig {
            replacement_policy: ReplacementPolicy::FirstDueYearOnly,
            ..ProjectionConfig::new(i32::MAX - 1, 4)
        };
        let result = BudgetProjector::new(CostAssumptions::standard(), config)
            .project(&[asset("old", 10.0, Condition::Good, 2000, 5)]);

        let years: Vec<i32> = result.years.iter().map(|y| y.year).collect();
        assert_eq!(years, vec![i32::MAX - 1, i32::MAX]);
        assert_eq!(result.summary().assets_due_for_replacement, 1);
    }

    #[test]
    fn test_result_metadata() {
        let assets = vec![asset("a", 1.0, Condition::Good, 2000, 100); 3];
        let projector = BudgetProjector::new(CostAssumptions::default(), ProjectionConfig::new(2030, 4));
        let result = projector.project(&assets);

        assert_eq!(result.start_year, 2030);
        assert_eq!(result.horizon_years, 4);
        assert_eq!(result.total_assets, 3);
        assert_eq!(result.years.len(), 4);
    }
}
