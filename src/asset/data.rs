//! Asset records as supplied by the asset store

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Physical condition of an asset, ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Condition {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

impl Condition {
    pub const ALL: [Condition; 5] = [
        Condition::Excellent,
        Condition::Good,
        Condition::Fair,
        Condition::Poor,
        Condition::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Excellent => "EXCELLENT",
            Condition::Good => "GOOD",
            Condition::Fair => "FAIR",
            Condition::Poor => "POOR",
            Condition::Critical => "CRITICAL",
        }
    }
}

impl FromStr for Condition {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Condition::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownCondition(s.to_string()))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Asset category, used only for filtering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetType {
    Road,
    Bridge,
    Building,
    Vehicle,
    Equipment,
    WaterSystem,
    SewerSystem,
    Park,
    #[default]
    Other,
}

impl AssetType {
    pub const ALL: [AssetType; 9] = [
        AssetType::Road,
        AssetType::Bridge,
        AssetType::Building,
        AssetType::Vehicle,
        AssetType::Equipment,
        AssetType::WaterSystem,
        AssetType::SewerSystem,
        AssetType::Park,
        AssetType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Road => "ROAD",
            AssetType::Bridge => "BRIDGE",
            AssetType::Building => "BUILDING",
            AssetType::Vehicle => "VEHICLE",
            AssetType::Equipment => "EQUIPMENT",
            AssetType::WaterSystem => "WATER_SYSTEM",
            AssetType::SewerSystem => "SEWER_SYSTEM",
            AssetType::Park => "PARK",
            AssetType::Other => "OTHER",
        }
    }
}

impl FromStr for AssetType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AssetType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownAssetType(s.to_string()))
    }
}

/// Operational status, used only for filtering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetStatus {
    #[default]
    Active,
    Maintenance,
    Inactive,
    Disposed,
}

impl AssetStatus {
    pub const ALL: [AssetStatus; 4] = [
        AssetStatus::Active,
        AssetStatus::Maintenance,
        AssetStatus::Inactive,
        AssetStatus::Disposed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::Active => "ACTIVE",
            AssetStatus::Maintenance => "MAINTENANCE",
            AssetStatus::Inactive => "INACTIVE",
            AssetStatus::Disposed => "DISPOSED",
        }
    }
}

impl FromStr for AssetStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AssetStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownAssetStatus(s.to_string()))
    }
}

/// Risk rating carried on the asset record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

/// Work priority carried on the asset record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// A single municipal asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Unique asset identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Category
    #[serde(rename = "type")]
    pub asset_type: AssetType,

    /// Operational status
    pub status: AssetStatus,

    /// Current monetary value
    pub value: f64,

    /// Current physical condition
    pub condition: Condition,

    /// Date of purchase (only the year feeds projections)
    pub purchase_date: NaiveDate,

    /// Expected lifespan in years
    pub expected_lifespan: u32,

    #[serde(default)]
    pub risk_level: RiskLevel,

    #[serde(default)]
    pub priority: Priority,

    /// User who created the record through the service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

/// Caller-supplied fields for a new asset
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewAsset {
    pub name: String,
    #[serde(rename = "type", default)]
    pub asset_type: AssetType,
    #[serde(default)]
    pub status: AssetStatus,
    pub value: f64,
    pub condition: Condition,
    pub purchase_date: NaiveDate,
    pub expected_lifespan: u32,
}

impl NewAsset {
    /// Build the stored record. New assets start at `LOW` risk and `MEDIUM`
    /// priority and carry the creating user's id.
    pub fn into_asset(self, id: impl Into<String>, created_by: &str) -> Result<Asset, ValidationError> {
        let id = id.into();
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        check_value(&id, self.value)?;

        Ok(Asset {
            created_by: Some(created_by.to_string()),
            ..Asset::new(id, self.name, self.value, self.condition, self.purchase_date, self.expected_lifespan)
                .with_classification(self.asset_type, self.status)
        })
    }
}

/// Asset values must be finite and non-negative
pub(crate) fn check_value(id: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidValue { id: id.to_string(), value });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { id: id.to_string(), value });
    }
    Ok(())
}

impl Asset {
    /// Create an active asset of type `Other`
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        value: f64,
        condition: Condition,
        purchase_date: NaiveDate,
        expected_lifespan: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            asset_type: AssetType::Other,
            status: AssetStatus::Active,
            value,
            condition,
            purchase_date,
            expected_lifespan,
            risk_level: RiskLevel::default(),
            priority: Priority::default(),
            created_by: None,
        }
    }

    pub fn with_classification(mut self, asset_type: AssetType, status: AssetStatus) -> Self {
        self.asset_type = asset_type;
        self.status = status;
        self
    }

    pub fn purchase_year(&self) -> i32 {
        self.purchase_date.year()
    }

    /// Age in whole years at `year`; negative if purchased after `year`
    pub fn age_in(&self, year: i32) -> i64 {
        i64::from(year) - i64::from(self.purchase_year())
    }

    /// Expected lifespan minus age at `year`. Non-positive means end-of-life.
    pub fn remaining_life(&self, year: i32) -> i64 {
        i64::from(self.expected_lifespan) - self.age_in(year)
    }
}
