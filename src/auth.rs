//! Caller authentication and role checks
//!
//! Credential verification itself belongs to an external identity provider;
//! this module only defines the contract ([`AuthGate`]), the roles, and the
//! per-operation role policy.

use crate::error::{AuthError, StoreError, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

/// Caller role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    FinanceDirector,
    PublicWorks,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::FinanceDirector => "finance_director",
            Role::PublicWorks => "public_works",
        }
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "finance_director" => Ok(Role::FinanceDirector),
            "public_works" => Ok(Role::PublicWorks),
            other => Err(ValidationError::UnknownRole(other.to_string())),
        }
    }
}

/// Roles allowed to read asset records
pub const ASSET_READERS: &[Role] = &[Role::Admin, Role::FinanceDirector, Role::PublicWorks];

/// Roles allowed to register new assets
pub const ASSET_WRITERS: &[Role] = &[Role::Admin];

/// Roles allowed to run budget projections and manage financial plans
pub const BUDGET_PLANNERS: &[Role] = &[Role::Admin, Role::FinanceDirector];

/// An authenticated caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    pub role: Role,
}

/// Turns a bearer credential into a caller identity
pub trait AuthGate: Send + Sync {
    fn authenticate(&self, token: &str) -> Result<Identity, AuthError>;
}

/// Reject callers whose role is not in `allowed`
pub fn authorize(identity: &Identity, allowed: &[Role]) -> Result<(), AuthError> {
    if allowed.contains(&identity.role) {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}

/// Extract the credential from an `Authorization` header value
pub fn parse_bearer(header: Option<&str>) -> Result<&str, AuthError> {
    let value = header.ok_or(AuthError::MissingCredential)?.trim();
    let (scheme, token) = value.split_once(' ').ok_or(AuthError::MissingCredential)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::MissingCredential);
    }
    Ok(token)
}

/// Gate backed by a static table of opaque tokens
#[derive(Debug, Clone, Default)]
pub struct TokenTableGate {
    tokens: HashMap<String, Identity>,
}

#[derive(Debug, Deserialize)]
struct TokenRow {
    token: String,
    user_id: String,
    email: String,
    role: String,
}

impl TokenTableGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, identity: Identity) -> Self {
        self.tokens.insert(token.into(), identity);
        self
    }

    /// Load `token,user_id,email,role` rows from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::from_reader(std::fs::File::open(path)?)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, StoreError> {
        let mut rdr = csv::Reader::from_reader(reader);
        let headers = rdr.headers()?.clone();
        let mut gate = Self::new();

        for result in rdr.records() {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let row: TokenRow = record.deserialize(Some(&headers))?;
            let role = row
                .role
                .parse()
                .map_err(|source| StoreError::InvalidRecord { line, source })?;
            gate.tokens.insert(
                row.token,
                Identity { user_id: row.user_id, email: row.email, role },
            );
        }

        Ok(gate)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl AuthGate for TokenTableGate {
    fn authenticate(&self, token: &str) -> Result<Identity, AuthError> {
        self.tokens.get(token).cloned().ok_or(AuthError::InvalidCredential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(role: Role) -> Identity {
        Identity {
            user_id: "u1".into(),
            email: "u1@city.gov".into(),
            role,
        }
    }

    #[test]
    fn test_parse_bearer() {
        assert_eq!(parse_bearer(Some("Bearer abc123")), Ok("abc123"));
        assert_eq!(parse_bearer(Some("bearer  abc123 ")), Ok("abc123"));
        assert_eq!(parse_bearer(None), Err(AuthError::MissingCredential));
        assert_eq!(parse_bearer(Some("Basic abc123")), Err(AuthError::MissingCredential));
        assert_eq!(parse_bearer(Some("Bearer")), Err(AuthError::MissingCredential));
        assert_eq!(parse_bearer(Some("Bearer   ")), Err(AuthError::MissingCredential));
    }

    #[test]
    fn test_role_policy() {
        assert!(authorize(&identity(Role::PublicWorks), ASSET_READERS).is_ok());
        assert_eq!(
            authorize(&identity(Role::PublicWorks), BUDGET_PLANNERS),
            Err(AuthError::Forbidden)
        );
        assert!(authorize(&identity(Role::FinanceDirector), BUDGET_PLANNERS).is_ok());
        assert!(authorize(&identity(Role::Admin), BUDGET_PLANNERS).is_ok());

        assert!(authorize(&identity(Role::Admin), ASSET_WRITERS).is_ok());
        assert!(authorize(&identity(Role::FinanceDirector), ASSET_WRITERS).is_err());
    }

    #[test]
    fn test_token_table() {
        let gate = TokenTableGate::new().with_token("t-admin", identity(Role::Admin));
        assert_eq!(gate.authenticate("t-admin").unwrap().role, Role::Admin);
        assert_eq!(gate.authenticate("nope"), Err(AuthError::InvalidCredential));
    }

    #[test]
    fn test_token_table_from_csv() {
        let data = "\
token,user_id,email,role
tok-1,user_1,a@city.gov,finance_director
tok-2,user_2,b@city.gov,public_works
";
        let gate = TokenTableGate::from_reader(data.as_bytes()).unwrap();
        assert_eq!(gate.len(), 2);
        let who = gate.authenticate("tok-2").unwrap();
        assert_eq!(who.user_id, "user_2");
        assert_eq!(who.role, Role::PublicWorks);
    }

    #[test]
    fn test_token_table_rejects_unknown_role() {
        let data = "token,user_id,email,role\ntok-1,user_1,a@city.gov,mayor\n";
        let err = TokenTableGate::from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            StoreError::InvalidRecord { line: 2, source: ValidationError::UnknownRole(_) }
        ));
    }

    #[test]
    fn test_role_roundtrip_names() {
        for role in [Role::Admin, Role::FinanceDirector, Role::PublicWorks] {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
    }
}
