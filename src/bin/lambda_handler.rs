//! AWS Lambda handler for the asset budget API
//!
//! Routes:
//! - `GET /api/health`
//! - `GET /api/assets?skip=&take=&type=&status=`
//! - `GET /api/assets/{id}`
//! - `POST /api/assets/create`
//! - `GET /api/financial-plans?year=&status=`
//! - `POST /api/financial-plans/create`
//! - `GET /api/financial-plans/projections?years=&start_year=&first_due_only=`
//!
//! Supports Lambda Function URLs for direct HTTP access.

use asset_budget::asset::{AssetQuery, AssetStore, CsvAssetStore};
use asset_budget::auth::{AuthGate, TokenTableGate, ASSET_WRITERS, BUDGET_PLANNERS};
use asset_budget::error::{ServiceError, ValidationError};
use asset_budget::plan::{CsvPlanStore, PlanQuery, PlanStore};
use asset_budget::service::{BudgetService, ProjectionQuery};
use asset_budget::ServiceConfig;
use lambda_http::{run, service_fn, Body, Error, Request, RequestExt, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Exact paths served; `/api/assets/{id}` is matched separately
const ROUTES: &[&str] = &[
    "/api/health",
    "/api/assets",
    "/api/assets/create",
    "/api/financial-plans",
    "/api/financial-plans/create",
    "/api/financial-plans/projections",
];

fn with_cors(builder: lambda_http::http::response::Builder) -> lambda_http::http::response::Builder {
    builder
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
        .header("Access-Control-Allow-Headers", "Authorization, Content-Type")
}

fn json_response<T: Serialize>(status: u16, body: &T) -> Result<Response<Body>, Error> {
    let response = with_cors(Response::builder())
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::Text(serde_json::to_string(body)?))?;
    Ok(response)
}

fn error_response(err: &ServiceError) -> Result<Response<Body>, Error> {
    json_response(err.status_code(), &serde_json::json!({ "error": err.to_string() }))
}

fn method_not_allowed() -> Result<Response<Body>, Error> {
    json_response(405, &serde_json::json!({ "error": "method not allowed" }))
}

fn parse_param<T: std::str::FromStr>(name: &str, raw: Option<&str>) -> Result<Option<T>, ServiceError> {
    match raw {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|_| ServiceError::Validation(ValidationError::invalid_parameter(name, s))),
    }
}

/// Parse an enum filter through its own `FromStr`, keeping its error
fn parse_filter<T>(raw: Option<&str>) -> Result<Option<T>, ServiceError>
where
    T: std::str::FromStr<Err = ValidationError>,
{
    match raw {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(ServiceError::Validation),
    }
}

fn json_body<T: DeserializeOwned>(event: &Request) -> Result<T, ServiceError> {
    serde_json::from_slice(event.body().as_ref())
        .map_err(|e| ServiceError::Validation(ValidationError::InvalidBody(e.to_string())))
}

fn projection_query(
    years: Option<&str>,
    start_year: Option<&str>,
    first_due_only: Option<&str>,
) -> Result<ProjectionQuery, ServiceError> {
    Ok(ProjectionQuery {
        years: parse_param("years", years)?,
        start_year: parse_param("start_year", start_year)?,
        first_due_only: parse_param("first_due_only", first_due_only)?.unwrap_or(false),
    })
}

fn asset_query(
    skip: Option<&str>,
    take: Option<&str>,
    asset_type: Option<&str>,
    status: Option<&str>,
) -> Result<AssetQuery, ServiceError> {
    let defaults = AssetQuery::default();
    Ok(AssetQuery {
        asset_type: parse_filter(asset_type)?,
        status: parse_filter(status)?,
        skip: parse_param("skip", skip)?.unwrap_or(defaults.skip),
        take: parse_param("take", take)?.unwrap_or(defaults.take),
    })
}

fn plan_query(year: Option<&str>, status: Option<&str>) -> Result<PlanQuery, ServiceError> {
    Ok(PlanQuery {
        year: parse_param("year", year)?,
        status: parse_filter(status)?,
    })
}

/// The `{id}` of `/api/assets/{id}`, if `path` has that shape
fn asset_id(path: &str) -> Option<&str> {
    path.strip_prefix("/api/assets/")
        .filter(|id| !id.is_empty() && !id.contains('/'))
}

/// Route one request; a trailing `/` on the path is ignored
fn dispatch<S, P, A>(service: &BudgetService<S, P, A>, event: &Request) -> Result<Response<Body>, Error>
where
    S: AssetStore,
    P: PlanStore,
    A: AuthGate,
{
    // Handle CORS preflight
    if event.method().as_str() == "OPTIONS" {
        return Ok(with_cors(Response::builder()).status(200).body(Body::Empty)?);
    }

    let params = event.query_string_parameters();
    let authorization = event
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok());
    let path = event.uri().path().trim_end_matches('/');

    let outcome = match (event.method().as_str(), path) {
        ("GET", "/api/health") => return json_response(200, &service.health()),
        ("GET", "/api/assets") => asset_query(
            params.first("skip"),
            params.first("take"),
            params.first("type"),
            params.first("status"),
        )
        .and_then(|q| service.list_assets(authorization, &q))
        .map(serde_json::to_value),
        // Credentials are checked before the body is decoded
        ("POST", "/api/assets/create") => service
            .authenticate(authorization, ASSET_WRITERS)
            .and_then(|_| json_body(event))
            .and_then(|new| service.create_asset(authorization, new))
            .map(serde_json::to_value),
        ("GET", "/api/financial-plans") => plan_query(params.first("year"), params.first("status"))
            .and_then(|q| service.list_plans(authorization, &q))
            .map(serde_json::to_value),
        ("POST", "/api/financial-plans/create") => service
            .authenticate(authorization, BUDGET_PLANNERS)
            .and_then(|_| json_body(event))
            .and_then(|new| service.create_plan(authorization, new))
            .map(serde_json::to_value),
        ("GET", "/api/financial-plans/projections") => projection_query(
            params.first("years"),
            params.first("start_year"),
            params.first("first_due_only"),
        )
        .and_then(|q| service.projections(authorization, &q))
        .map(serde_json::to_value),
        (method, other) => match asset_id(other) {
            _ if ROUTES.contains(&other) => return method_not_allowed(),
            Some(id) if method == "GET" => service.get_asset(authorization, id).map(serde_json::to_value),
            Some(_) => return method_not_allowed(),
            None => Err(ServiceError::not_found(format!("route {other}"))),
        },
    };

    match outcome {
        Ok(value) => json_response(200, &value?),
        Err(err) => {
            if err.status_code() >= 500 {
                log::error!("{} {} failed: {}", event.method(), path, err);
            }
            error_response(&err)
        }
    }
}

/// Lambda handler function
async fn handler<S, P, A>(service: &BudgetService<S, P, A>, event: Request) -> Result<Response<Body>, Error>
where
    S: AssetStore,
    P: PlanStore,
    A: AuthGate,
{
    let start = std::time::Instant::now();
    let response = dispatch(service, &event)?;

    log::info!(
        "{} {} -> {} in {}ms",
        event.method(),
        event.uri().path(),
        response.status().as_u16(),
        start.elapsed().as_millis()
    );
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let config = ServiceConfig::load()?;
    let gate = TokenTableGate::from_csv(&config.tokens_path)?;
    log::info!("loaded {} credentials", gate.len());

    let store = CsvAssetStore::new(&config.assets_path);
    let plans = CsvPlanStore::new(&config.plans_path);
    let mut service = BudgetService::new(store, plans, gate, config);
    service.start()?;

    let shared = &service;
    let outcome = run(service_fn(move |event: Request| async move { handler(shared, event).await })).await;

    service.shutdown();
    outcome
}
