//! Budget projection engine

mod engine;
mod export;
mod factors;
mod yearly;

pub use engine::{project, BudgetProjector, ProjectionConfig, ReplacementPolicy};
pub use export::{write_attention_csv, write_projections_csv};
pub use factors::{CostAssumptions, DEFAULT_INFLATION_RATE};
pub use yearly::{AttentionItem, AttentionKind, ProjectionResult, ProjectionSummary, YearlyProjection};
