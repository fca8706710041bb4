//! Access to financial plan records
//!
//! Same lifecycle as the asset store: reads and writes require `connect()`.

use super::{append_plan, load_plans, FinancialPlan, PlanStatus};
use crate::error::StoreError;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

/// Optional filters for plan listings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanQuery {
    pub year: Option<i32>,
    pub status: Option<PlanStatus>,
}

impl PlanQuery {
    pub fn matches(&self, plan: &FinancialPlan) -> bool {
        self.year.map_or(true, |y| plan.year == y) && self.status.map_or(true, |s| plan.status == s)
    }
}

/// Source of financial plan records
pub trait PlanStore: Send + Sync {
    fn connect(&mut self) -> Result<(), StoreError>;

    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;

    /// Every plan, in stored order
    fn find_all(&self) -> Result<Vec<FinancialPlan>, StoreError>;

    /// Add a plan after the existing ones. Fails with
    /// [`StoreError::Conflict`] if the id is taken.
    fn insert(&self, plan: FinancialPlan) -> Result<FinancialPlan, StoreError>;

    fn find_many(&self, query: &PlanQuery) -> Result<Vec<FinancialPlan>, StoreError> {
        Ok(self.find_all()?.into_iter().filter(|p| query.matches(p)).collect())
    }
}

fn ensure_new_id(plans: &[FinancialPlan], id: &str) -> Result<(), StoreError> {
    if plans.iter().any(|p| p.id == id) {
        return Err(StoreError::Conflict(id.to_string()));
    }
    Ok(())
}

/// Store holding plans in memory
#[derive(Debug, Default)]
pub struct InMemoryPlanStore {
    plans: RwLock<Vec<FinancialPlan>>,
    connected: bool,
}

impl InMemoryPlanStore {
    pub fn new(plans: Vec<FinancialPlan>) -> Self {
        Self { plans: RwLock::new(plans), connected: false }
    }
}

impl PlanStore for InMemoryPlanStore {
    fn connect(&mut self) -> Result<(), StoreError> {
        self.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn find_all(&self) -> Result<Vec<FinancialPlan>, StoreError> {
        if !self.connected {
            return Err(StoreError::NotConnected);
        }
        Ok(self.plans.read().map_err(|_| StoreError::Poisoned)?.clone())
    }

    fn insert(&self, plan: FinancialPlan) -> Result<FinancialPlan, StoreError> {
        if !self.connected {
            return Err(StoreError::NotConnected);
        }
        let mut plans = self.plans.write().map_err(|_| StoreError::Poisoned)?;
        ensure_new_id(&plans, &plan.id)?;
        plans.push(plan.clone());
        Ok(plan)
    }
}

/// Store backed by a CSV file. A missing file is an empty store; the file
/// is created on the first insert.
#[derive(Debug)]
pub struct CsvPlanStore {
    path: PathBuf,
    plans: RwLock<Option<Vec<FinancialPlan>>>,
}

impl CsvPlanStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), plans: RwLock::new(None) }
    }
}

impl PlanStore for CsvPlanStore {
    fn connect(&mut self) -> Result<(), StoreError> {
        let plans = if self.path.exists() { load_plans(&self.path)? } else { Vec::new() };
        log::info!("loaded {} financial plans from {}", plans.len(), self.path.display());
        *self.plans.get_mut().map_err(|_| StoreError::Poisoned)? = Some(plans);
        Ok(())
    }

    fn disconnect(&mut self) {
        *self.plans.get_mut().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn is_connected(&self) -> bool {
        self.plans.read().map(|p| p.is_some()).unwrap_or(false)
    }

    fn find_all(&self) -> Result<Vec<FinancialPlan>, StoreError> {
        let guard = self.plans.read().map_err(|_| StoreError::Poisoned)?;
        guard.clone().ok_or(StoreError::NotConnected)
    }

    fn insert(&self, plan: FinancialPlan) -> Result<FinancialPlan, StoreError> {
        let mut guard = self.plans.write().map_err(|_| StoreError::Poisoned)?;
        let plans = guard.as_mut().ok_or(StoreError::NotConnected)?;
        ensure_new_id(plans, &plan.id)?;

        append_plan(&self.path, &plan)?;
        plans.push(plan.clone());
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(id: &str, year: i32, status: PlanStatus) -> FinancialPlan {
        FinancialPlan {
            id: id.into(),
            asset_id: "a1".into(),
            year,
            amount: 100.0,
            description: None,
            status,
        }
    }

    #[test]
    fn test_filters() {
        let mut store = InMemoryPlanStore::new(vec![
            plan("p1", 2025, PlanStatus::Draft),
            plan("p2", 2026, PlanStatus::Approved),
            plan("p3", 2026, PlanStatus::Draft),
        ]);
        assert!(matches!(store.find_all(), Err(StoreError::NotConnected)));
        store.connect().unwrap();

        let ids = |q: PlanQuery| -> Vec<String> {
            store.find_many(&q).unwrap().into_iter().map(|p| p.id).collect()
        };
        assert_eq!(ids(PlanQuery::default()), vec!["p1", "p2", "p3"]);
        assert_eq!(ids(PlanQuery { year: Some(2026), status: None }), vec!["p2", "p3"]);
        assert_eq!(
            ids(PlanQuery { year: Some(2026), status: Some(PlanStatus::Draft) }),
            vec!["p3"]
        );
    }

    #[test]
    fn test_insert_rejects_duplicate_id() {
        let mut store = InMemoryPlanStore::default();
        store.connect().unwrap();
        store.insert(plan("p1", 2025, PlanStatus::Draft)).unwrap();
        assert!(matches!(
            store.insert(plan("p1", 2030, PlanStatus::Draft)),
            Err(StoreError::Conflict(_))
        ));
        assert_eq!(store.find_all().unwrap().len(), 1);

        store.insert(plan("p2", 2030, PlanStatus::Draft)).unwrap();
        let ids: Vec<String> = store.find_all().unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["p1", "p2"]);
    }

    #[test]
    fn test_csv_store_rejects_duplicate_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plans.csv");

        let mut store = CsvPlanStore::new(&path);
        store.connect().unwrap();
        store.insert(plan("p1", 2025, PlanStatus::Draft)).unwrap();
        assert!(matches!(
            store.insert(plan("p1", 2026, PlanStatus::Approved)),
            Err(StoreError::Conflict(id)) if id == "p1"
        ));

        // The rejected plan never reached the file
        assert_eq!(load_plans(&path).unwrap().len(), 1);
    }

    #[test]
    fn test_csv_store_starts_empty_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plans.csv");

        let mut store = CsvPlanStore::new(&path);
        assert!(!store.is_connected());
        store.connect().unwrap();
        assert!(store.find_all().unwrap().is_empty());

        store.insert(plan("p1", 2025, PlanStatus::Draft)).unwrap();
        store.disconnect();
        assert!(matches!(store.insert(plan("p2", 2025, PlanStatus::Draft)), Err(StoreError::NotConnected)));

        store.connect().unwrap();
        assert_eq!(store.find_all().unwrap(), vec![plan("p1", 2025, PlanStatus::Draft)]);
    }
}
