//! Router test helpers backed by an in-memory database.

use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use fundledger_db::migration::{Migrator, MigratorTrait};
use fundledger_shared::LedgerConfig;
use http_body_util::BodyExt;
use sea_orm::{ConnectOptions, Database};
use serde_json::Value;
use tower::ServiceExt;

use crate::extractors::ACTOR_HEADER;
use crate::{AppState, create_router};

/// Builds the full router over a fresh, migrated in-memory database.
pub async fn test_app() -> Router {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();

    create_router(
        AppState::new(db, LedgerConfig::default()),
        Duration::from_secs(5),
    )
}

/// Sends one request and returns the status with the parsed JSON body.
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder()
        .method(method)
        .uri(uri)
        .header(ACTOR_HEADER, "0190a1b2-0000-7000-8000-000000000001");
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Reads a money field serialized as a decimal string.
pub fn decimal(value: &Value) -> rust_decimal::Decimal {
    value
        .as_str()
        .unwrap_or_else(|| panic!("expected decimal string, got {value}"))
        .parse()
        .unwrap()
}

/// Creates a cash fund and returns its ID.
pub async fn create_fund(app: &Router, code: &str, opening_balance: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/fund-sources",
        Some(serde_json::json!({
            "name": format!("Fund {code}"),
            "code": code,
            "type": "CASH_REGISTER",
            "openingBalance": opening_balance,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_string()
}
