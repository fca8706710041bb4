//! Asset Budget - multi-year maintenance and replacement budget projections
//! for municipal infrastructure assets
//!
//! This library provides:
//! - Asset records, CSV loading and a connect/disconnect asset store
//! - Financial plan records and their store
//! - The yearly budget projection engine
//! - Bearer-credential authentication and role checks
//! - The caller-facing service used by the CLI and the HTTP function

pub mod asset;
pub mod auth;
pub mod config;
pub mod error;
pub mod plan;
pub mod projection;
pub mod service;

// Re-export commonly used types
pub use asset::{Asset, AssetStore, Condition};
pub use config::ServiceConfig;
pub use error::{ServiceError, ValidationError};
pub use plan::{FinancialPlan, PlanStore};
pub use projection::{project, BudgetProjector, ProjectionConfig, ProjectionResult, YearlyProjection};
pub use service::BudgetService;
