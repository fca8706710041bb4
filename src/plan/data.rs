//! Financial plan records

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ValidationError;

/// Approval state of a plan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStatus {
    #[default]
    Draft,
    Submitted,
    Approved,
    Rejected,
}

impl PlanStatus {
    pub const ALL: [PlanStatus; 4] = [
        PlanStatus::Draft,
        PlanStatus::Submitted,
        PlanStatus::Approved,
        PlanStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Draft => "DRAFT",
            PlanStatus::Submitted => "SUBMITTED",
            PlanStatus::Approved => "APPROVED",
            PlanStatus::Rejected => "REJECTED",
        }
    }
}

impl FromStr for PlanStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlanStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownPlanStatus(s.to_string()))
    }
}

/// Budgeted spend against one asset in one fiscal year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialPlan {
    pub id: String,

    /// Asset the spend is planned for
    pub asset_id: String,

    /// Fiscal year
    pub year: i32,

    /// Planned spend
    pub amount: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub status: PlanStatus,
}

/// Caller-supplied fields for a new plan. Any status in the request is
/// ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewFinancialPlan {
    pub asset_id: String,
    pub year: i32,
    pub amount: f64,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewFinancialPlan {
    /// Build the stored record in `DRAFT` status
    pub fn into_plan(self, id: impl Into<String>) -> Result<FinancialPlan, ValidationError> {
        if self.asset_id.trim().is_empty() {
            return Err(ValidationError::MissingField("asset_id"));
        }
        check_amount(self.amount)?;

        Ok(FinancialPlan {
            id: id.into(),
            asset_id: self.asset_id,
            year: self.year,
            amount: self.amount,
            description: self.description.filter(|d| !d.trim().is_empty()),
            status: PlanStatus::Draft,
        })
    }
}

pub(crate) fn check_amount(amount: f64) -> Result<(), ValidationError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(ValidationError::InvalidAmount(amount));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!("APPROVED".parse::<PlanStatus>(), Ok(PlanStatus::Approved));
        assert_eq!(
            "approved".parse::<PlanStatus>(),
            Err(ValidationError::UnknownPlanStatus("approved".into()))
        );
    }

    #[test]
    fn test_new_plan_is_draft() {
        let body = r#"{"asset_id":"road-1","year":2026,"amount":12500.0,"status":"APPROVED"}"#;
        let new: NewFinancialPlan = serde_json::from_str(body).unwrap();
        let plan = new.into_plan("fp-1").unwrap();

        assert_eq!(plan.status, PlanStatus::Draft);
        assert_eq!(plan.asset_id, "road-1");
        assert_eq!(plan.description, None);

        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["status"], "DRAFT");
        assert!(json.get("description").is_none());
    }

    #[test]
    fn test_new_plan_validation() {
        let new = NewFinancialPlan {
            asset_id: "".into(),
            year: 2026,
            amount: 10.0,
            description: None,
        };
        assert_eq!(new.clone().into_plan("p"), Err(ValidationError::MissingField("asset_id")));

        let new = NewFinancialPlan { asset_id: "a".into(), amount: -1.0, ..new };
        assert_eq!(new.clone().into_plan("p"), Err(ValidationError::InvalidAmount(-1.0)));

        let new = NewFinancialPlan { amount: f64::NAN, ..new };
        assert!(matches!(new.into_plan("p"), Err(ValidationError::InvalidAmount(_))));
    }
}
