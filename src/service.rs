//! Caller-facing operations
//!
//! Every operation authenticates, checks the caller's role, validates its
//! input, then reads from or writes to the injected stores. Nothing here
//! knows about HTTP.

use chrono::Datelike;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::asset::{Asset, AssetQuery, AssetStore, NewAsset};
use crate::auth::{authorize, parse_bearer, AuthGate, Identity, Role, ASSET_READERS, ASSET_WRITERS, BUDGET_PLANNERS};
use crate::config::ServiceConfig;
use crate::error::{Result, ServiceError, ValidationError};
use crate::plan::{FinancialPlan, NewFinancialPlan, PlanQuery, PlanStore};
use crate::projection::{
    BudgetProjector, CostAssumptions, ProjectionConfig, ProjectionSummary, ReplacementPolicy,
    YearlyProjection,
};

/// Parameters for a budget projection request
#[derive(Debug, Clone, Default)]
pub struct ProjectionQuery {
    /// Horizon in years; the configured default when absent
    pub years: Option<u32>,

    /// First projected year; the current calendar year when absent
    pub start_year: Option<i32>,

    /// Count each replacement only in its first due year
    pub first_due_only: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectionResponse {
    pub projections: Vec<YearlyProjection>,
    pub total_assets: usize,
    pub projection_years: u32,
    pub start_year: i32,
    pub summary: ProjectionSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssetPage {
    pub items: Vec<Asset>,
    pub total: usize,
    pub page: usize,
    pub pages: usize,
}

/// A plan together with the asset it budgets for
#[derive(Debug, Clone, Serialize)]
pub struct PlanDetail {
    #[serde(flatten)]
    pub plan: FinancialPlan,
    pub asset: Option<Asset>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Health {
    pub status: &'static str,
}

/// Budget planning service over an asset store, a plan store and an auth gate
pub struct BudgetService<S, P, A> {
    store: S,
    plans: P,
    gate: A,
    config: ServiceConfig,
    assumptions: CostAssumptions,
}

impl<S: AssetStore, P: PlanStore, A: AuthGate> BudgetService<S, P, A> {
    pub fn new(store: S, plans: P, gate: A, config: ServiceConfig) -> Self {
        Self {
            store,
            plans,
            gate,
            config,
            assumptions: CostAssumptions::standard(),
        }
    }

    pub fn with_assumptions(mut self, assumptions: CostAssumptions) -> Self {
        self.assumptions = assumptions;
        self
    }

    /// Connect the underlying stores. Call once at process start.
    pub fn start(&mut self) -> Result<()> {
        self.store.connect()?;
        self.plans.connect()?;
        log::info!("budget service started");
        Ok(())
    }

    /// Disconnect the underlying stores
    pub fn shutdown(&mut self) {
        self.plans.disconnect();
        self.store.disconnect();
        log::info!("budget service stopped");
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn plans(&self) -> &P {
        &self.plans
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn health(&self) -> Health {
        Health { status: "healthy" }
    }

    /// Project maintenance and replacement budgets for every asset
    pub fn projections(&self, authorization: Option<&str>, query: &ProjectionQuery) -> Result<ProjectionResponse> {
        let caller = self.authenticate(authorization, BUDGET_PLANNERS)?;

        let years = query.years.unwrap_or(self.config.default_horizon);
        if years == 0 || years > self.config.max_horizon {
            log::warn!("rejected projection horizon {} from {}", years, caller.user_id);
            return Err(ValidationError::HorizonOutOfRange { years, max: self.config.max_horizon }.into());
        }
        let config = ProjectionConfig {
            start_year: query.start_year.unwrap_or_else(current_year),
            horizon_years: years,
            replacement_policy: ReplacementPolicy::from_first_due_only(query.first_due_only),
        };
        config.validate()?;
        let start_year = config.start_year;

        let assets = self.store.find_all()?;
        log::debug!("projecting {} assets over {} years", assets.len(), years);

        let result = BudgetProjector::new(self.assumptions.clone(), config).project(&assets);
        let summary = result.summary();

        log::info!(
            "projection for {}: {} assets, {}..{} total {:.2}",
            caller.user_id,
            result.total_assets,
            start_year,
            i64::from(start_year) + i64::from(years),
            summary.total_budget_needed,
        );

        Ok(ProjectionResponse {
            projections: result.years,
            total_assets: result.total_assets,
            projection_years: years,
            start_year,
            summary,
        })
    }

    /// Filtered, paginated asset listing
    pub fn list_assets(&self, authorization: Option<&str>, query: &AssetQuery) -> Result<AssetPage> {
        self.authenticate(authorization, ASSET_READERS)?;

        if query.take == 0 || query.take > self.config.max_page_size {
            return Err(ValidationError::PageSizeOutOfRange {
                take: query.take,
                max: self.config.max_page_size,
            }
            .into());
        }

        let items = self.store.find_many(query)?;
        let total = self.store.count(query)?;
        log::debug!("listed {} of {} assets", items.len(), total);

        Ok(AssetPage {
            items,
            total,
            page: query.skip / query.take + 1,
            pages: total.div_ceil(query.take),
        })
    }

    pub fn get_asset(&self, authorization: Option<&str>, id: &str) -> Result<Asset> {
        self.authenticate(authorization, ASSET_READERS)?;
        self.store
            .find_unique(id)?
            .ok_or_else(|| ServiceError::not_found(format!("asset {id}")))
    }

    /// Register a new asset under a generated id
    pub fn create_asset(&self, authorization: Option<&str>, new: NewAsset) -> Result<Asset> {
        let caller = self.authenticate(authorization, ASSET_WRITERS)?;
        let asset = new.into_asset(Uuid::new_v4().to_string(), &caller.user_id)?;

        let asset = self.store.insert(asset)?;
        log::info!("{} created asset {} ({})", caller.user_id, asset.id, asset.name);
        Ok(asset)
    }

    /// Plans matching the filters, each with its asset
    pub fn list_plans(&self, authorization: Option<&str>, query: &PlanQuery) -> Result<Vec<PlanDetail>> {
        self.authenticate(authorization, BUDGET_PLANNERS)?;

        let plans = self.plans.find_many(query)?;
        let assets: HashMap<String, Asset> =
            self.store.find_all()?.into_iter().map(|a| (a.id.clone(), a)).collect();
        log::debug!("listed {} financial plans", plans.len());

        Ok(plans
            .into_iter()
            .map(|plan| {
                let asset = assets.get(&plan.asset_id).cloned();
                PlanDetail { plan, asset }
            })
            .collect())
    }

    /// Record a new plan in `DRAFT` status against an existing asset
    pub fn create_plan(&self, authorization: Option<&str>, new: NewFinancialPlan) -> Result<PlanDetail> {
        let caller = self.authenticate(authorization, BUDGET_PLANNERS)?;
        let plan = new.into_plan(Uuid::new_v4().to_string())?;

        let asset = self
            .store
            .find_unique(&plan.asset_id)?
            .ok_or_else(|| ValidationError::UnknownAsset(plan.asset_id.clone()))?;
        let plan = self.plans.insert(plan)?;
        log::info!("{} drafted plan {} for asset {}", caller.user_id, plan.id, asset.id);

        Ok(PlanDetail { plan, asset: Some(asset) })
    }

    /// Resolve the caller and check their role against `allowed`
    pub fn authenticate(&self, authorization: Option<&str>, allowed: &[Role]) -> Result<Identity> {
        let identity = parse_bearer(authorization)
            .and_then(|token| self.gate.authenticate(token))
            .inspect_err(|e| log::warn!("authentication failed: {e}"))?;

        authorize(&identity, allowed).inspect_err(|_| {
            log::warn!("{} ({}) denied", identity.user_id, identity.role.as_str());
        })?;

        Ok(identity)
    }
}

fn current_year() -> i32 {
    chrono::Local::now().year()
}
