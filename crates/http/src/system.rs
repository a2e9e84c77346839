//! Liveness and health endpoints served at the root of the router.

use std::time::Instant;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use shopfront_db::{ConnectionState, Database};
use shopfront_kernel::settings::Environment;
use time::OffsetDateTime;

const LIVENESS_MESSAGE: &str = "My Shopping Cart API is running!";

#[derive(Clone)]
struct SystemState {
    database: Database,
    environment: Environment,
    started_at: Instant,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Liveness {
    message: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    timestamp: OffsetDateTime,
    environment: Environment,
    database_connected: bool,
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    timestamp: OffsetDateTime,
    database: ConnectionState,
    environment: Environment,
    /// Seconds since the router was built.
    uptime: f64,
}

/// Router with `GET /` and `GET /health`. Both always answer 200 and report
/// the database state as it is at request time.
pub fn routes(database: Database, environment: Environment) -> Router {
    let state = SystemState {
        database,
        environment,
        started_at: Instant::now(),
    };

    Router::new()
        .route("/", get(liveness))
        .route("/health", get(health))
        .with_state(state)
}

async fn liveness(State(state): State<SystemState>) -> Json<Liveness> {
    Json(Liveness {
        message: LIVENESS_MESSAGE,
        timestamp: OffsetDateTime::now_utc(),
        environment: state.environment,
        database_connected: state.database.is_connected(),
    })
}

async fn health(State(state): State<SystemState>) -> Json<Health> {
    Json(Health {
        status: "OK",
        timestamp: OffsetDateTime::now_utc(),
        database: state.database.state(),
        environment: state.environment,
        uptime: state.started_at.elapsed().as_secs_f64(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_reports_disconnected_database_with_200() {
        let app = routes(Database::disconnected(), Environment::Test);
        let (status, body) = get_json(app, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "OK");
        assert_eq!(body["database"], "Disconnected");
        assert_eq!(body["environment"], "test");
        assert!(body["uptime"].as_f64().unwrap() >= 0.0);
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn liveness_reports_environment_and_connection_flag() {
        let app = routes(Database::disconnected(), Environment::Production);
        let (status, body) = get_json(app, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "My Shopping Cart API is running!");
        assert_eq!(body["environment"], "production");
        assert_eq!(body["databaseConnected"], false);
    }
}
