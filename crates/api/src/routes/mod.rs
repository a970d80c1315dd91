//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod audit;
pub mod fund_sources;
pub mod fund_transfers;
pub mod health;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(fund_sources::routes())
        .merge(fund_transfers::routes())
        .merge(audit::routes())
}

/// Parses an optional enum query parameter.
pub(crate) fn parse_param<T>(name: &str, value: Option<&str>) -> Result<Option<T>, crate::ApiError>
where
    T: std::str::FromStr<Err = String>,
{
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| {
            v.parse::<T>()
                .map_err(|err| crate::ApiError::Validation(format!("Invalid {name}: {err}")))
        })
        .transpose()
}
