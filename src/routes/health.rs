//! Liveness and readiness probes.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::errors::{ApiError, ApiResponse};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct Readiness {
    pub database: bool,
    pub pool_size: u32,
    pub idle_connections: usize,
}

pub async fn live() -> &'static str {
    "OK"
}

/// 200 when the database answers, 503 otherwise.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<Readiness>>) {
    let database = match sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&state.db).await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness probe: database unreachable");
            false
        }
    };

    readiness_response(Readiness {
        database,
        pool_size: state.db.size(),
        idle_connections: state.db.num_idle(),
    })
}

fn readiness_response(readiness: Readiness) -> (StatusCode, Json<ApiResponse<Readiness>>) {
    if readiness.database {
        return (StatusCode::OK, ApiResponse::success(readiness));
    }
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ApiResponse {
            success: false,
            data: Some(readiness),
            error: Some(ApiError {
                code: "SERVICE_UNAVAILABLE".to_string(),
                message: "Database unreachable".to_string(),
            }),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn readiness(database: bool) -> Readiness {
        Readiness {
            database,
            pool_size: 2,
            idle_connections: 1,
        }
    }

    #[test]
    fn ready_database_is_a_success() {
        let (status, Json(body)) = readiness_response(readiness(true));
        assert_eq!(status, StatusCode::OK);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["database"], true);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn unreachable_database_is_a_failure_envelope() {
        let (status, Json(body)) = readiness_response(readiness(false));
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "SERVICE_UNAVAILABLE");
        assert_eq!(json["data"]["database"], false);
    }
}
