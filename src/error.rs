//! Error types for asset loading, authentication and the service boundary

use thiserror::Error;

/// Deterministic input-validation failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("projection horizon must be between 1 and {max} years, got {years}")]
    HorizonOutOfRange { years: u32, max: u32 },

    #[error("page size must be between 1 and {max}, got {take}")]
    PageSizeOutOfRange { take: usize, max: usize },

    #[error("unknown asset condition: {0}")]
    UnknownCondition(String),

    #[error("unknown asset type: {0}")]
    UnknownAssetType(String),

    #[error("unknown asset status: {0}")]
    UnknownAssetStatus(String),

    #[error("unknown role: {0}")]
    UnknownRole(String),

    #[error("projection years {year}..{end} fall outside the supported range {min}..={max}")]
    StartYearOutOfRange { year: i32, end: i64, min: i32, max: i32 },

    #[error("asset {id} has negative value {value}")]
    NegativeValue { id: String, value: f64 },

    #[error("asset {id} has invalid value {value}")]
    InvalidValue { id: String, value: f64 },

    #[error("plan amount must be a non-negative number, got {0}")]
    InvalidAmount(f64),

    #[error("unknown plan status: {0}")]
    UnknownPlanStatus(String),

    #[error("unknown asset: {0}")]
    UnknownAsset(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error("record {0} already exists")]
    DuplicateId(String),

    #[error("invalid purchase date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid value for parameter {name}: {value}")]
    InvalidParameter { name: String, value: String },
}

impl ValidationError {
    #[must_use]
    pub fn invalid_parameter(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Failures reading from an asset store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store is not connected")]
    NotConnected,

    #[error("store lock poisoned")]
    Poisoned,

    #[error("record {0} already exists")]
    Conflict(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A record parsed as CSV but failed validation
    #[error("invalid record at line {line}: {source}")]
    InvalidRecord {
        line: u64,
        #[source]
        source: ValidationError,
    },
}

/// Credential and permission failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing bearer credential")]
    MissingCredential,

    #[error("invalid credential")]
    InvalidCredential,

    #[error("You don't have permission to perform this action")]
    Forbidden,
}

/// Errors surfaced to callers of the service boundary.
///
/// Only the outermost serving layer translates these into transport
/// status codes.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Unauthorized(AuthError),

    #[error("{0}")]
    Forbidden(AuthError),

    #[error("{0} not found")]
    NotFound(String),

    #[error("asset store unavailable: {0}")]
    UpstreamUnavailable(#[source] StoreError),
}

pub type Result<T> = std::result::Result<T, ServiceError>;

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Forbidden => Self::Forbidden(err),
            other => Self::Unauthorized(other),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            // Bad data in the store is still a data error for the caller
            StoreError::InvalidRecord { source, .. } => Self::Validation(source),
            StoreError::Conflict(id) => Self::Validation(ValidationError::DuplicateId(id)),
            other => Self::UpstreamUnavailable(other),
        }
    }
}

impl ServiceError {
    #[must_use]
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::UpstreamUnavailable(_) => 503,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        let err = ValidationError::HorizonOutOfRange { years: 21, max: 20 };
        assert_eq!(
            err.to_string(),
            "projection horizon must be between 1 and 20 years, got 21"
        );

        let err = ValidationError::UnknownCondition("BROKEN".into());
        assert_eq!(err.to_string(), "unknown asset condition: BROKEN");
    }

    #[test]
    fn test_auth_error_routing() {
        let err: ServiceError = AuthError::Forbidden.into();
        assert_eq!(err.status_code(), 403);

        let err: ServiceError = AuthError::InvalidCredential.into();
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.to_string(), "invalid credential");
    }

    #[test]
    fn test_store_error_routing() {
        let err: ServiceError = StoreError::NotConnected.into();
        assert!(matches!(err, ServiceError::UpstreamUnavailable(_)));
        assert_eq!(err.status_code(), 503);

        let err: ServiceError = StoreError::InvalidRecord {
            line: 3,
            source: ValidationError::UnknownCondition("MEH".into()),
        }
        .into();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_string(), "unknown asset condition: MEH");
    }

    #[test]
    fn test_write_error_routing() {
        let err: ServiceError = StoreError::Conflict("a-1".into()).into();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_string(), "record a-1 already exists");

        let err: ServiceError = StoreError::Poisoned.into();
        assert_eq!(err.status_code(), 503);
    }

    #[test]
    fn test_start_year_display() {
        let err = ValidationError::StartYearOutOfRange { year: 262_140, end: 262_145, min: -262_143, max: 262_142 };
        assert_eq!(
            err.to_string(),
            "projection years 262140..262145 fall outside the supported range -262143..=262142"
        );
    }

    #[test]
    fn test_not_found() {
        let err = ServiceError::not_found("asset a-9");
        assert_eq!(err.to_string(), "asset a-9 not found");
        assert_eq!(err.status_code(), 404);
    }
}
