//! Financial plans: budgeted spend per asset and year

mod data;
pub mod loader;
pub mod store;

pub use data::{FinancialPlan, NewFinancialPlan, PlanStatus};
pub use loader::{append_plan, load_plans, load_plans_from_reader};
pub use store::{CsvPlanStore, InMemoryPlanStore, PlanQuery, PlanStore};
