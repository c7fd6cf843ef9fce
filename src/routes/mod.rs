//! Route definitions for the Maven Jobs API.

pub mod auth;
pub mod dashboard;
pub mod dwr;
pub mod expenses;
pub mod health;
pub mod jobs;
pub mod leads;
pub mod targets;

use axum::{
    http::{HeaderValue, Method},
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::AppState;

/// Largest accepted request body.
const MAX_BODY_BYTES: usize = 1024 * 1024;

fn cors(frontend_url: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(Any);

    match HeaderValue::from_str(frontend_url) {
        Ok(origin) => layer.allow_origin(origin),
        Err(e) => {
            tracing::warn!(frontend_url, error = %e, "Invalid FRONTEND_URL, cross-origin requests disabled");
            layer
        }
    }
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/users", post(auth::create_user))
        .route("/auth/me", get(auth::me));

    let leadgen_routes = Router::new()
        .route("/leadgen/metrics", get(dashboard::leadgen_metrics))
        .route(
            "/leadgen/leads",
            get(leads::list_leads).post(leads::create_lead),
        )
        .route("/leadgen/leads/{id}", get(leads::get_lead))
        .route(
            "/leadgen/leads/{id}/interactions",
            get(leads::list_lead_interactions).post(leads::add_lead_interaction),
        );

    let fse_routes = Router::new()
        .route("/fse/dashboard", get(dashboard::fse_dashboard))
        .route(
            "/fse/clients",
            get(leads::list_clients).post(leads::create_client),
        )
        .route("/fse/clients/{id}", get(leads::get_client))
        .route(
            "/fse/clients/{id}/interactions",
            get(leads::list_client_interactions).post(leads::add_client_interaction),
        );

    let team_routes = Router::new()
        .route("/manager/team", get(dashboard::manager_team))
        .route("/manager/dashboard", get(dashboard::manager_dashboard))
        .route("/hod/managers", get(dashboard::hod_managers))
        .route("/targets", get(targets::list).put(targets::set))
        .route("/dwr", get(dwr::list).post(dwr::submit));

    let expense_routes = Router::new()
        .route("/expenses", get(expenses::list).post(expenses::create))
        .route("/expenses/review", get(expenses::review_queue))
        .route("/expenses/export", get(expenses::export))
        .route(
            "/expenses/{id}",
            get(expenses::get_by_id)
                .put(expenses::update)
                .delete(expenses::delete),
        )
        .route("/expenses/{id}/status", patch(expenses::update_status))
        .route("/expenses/{id}/history", get(expenses::history));

    let job_routes = Router::new()
        .route("/jobs", get(jobs::list).post(jobs::create))
        .route("/jobs/{id}", get(jobs::get_by_id).put(jobs::update));

    let api = Router::new()
        .merge(auth_routes)
        .merge(leadgen_routes)
        .merge(fse_routes)
        .merge(team_routes)
        .merge(expense_routes)
        .merge(job_routes);

    let cors = cors(&state.config.frontend_url);

    Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .nest("/api/v1", api)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
