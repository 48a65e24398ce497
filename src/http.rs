use crate::collectors::{collect_dashboard, DashboardData};
use crate::config::Config;
use crate::render;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::{routing::get, Json, Router};
use std::sync::Arc;

#[derive(Clone)]
pub struct HttpAppState {
    pub config: Arc<Config>,
}

pub fn build_router(config: Arc<Config>) -> Router {
    Router::new()
        .route("/", get(dashboard_handler))
        .route("/healthz", get(healthz))
        .route("/api/dashboard", get(api_dashboard_handler))
        .with_state(HttpAppState { config })
}

async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// One fresh collection pass per page load. Collectors degrade
/// internally, so this always renders a full page.
async fn dashboard_handler(State(state): State<HttpAppState>) -> Html<String> {
    let data = collect_dashboard(&state.config).await;
    Html(render::render_dashboard(&data, &state.config))
}

async fn api_dashboard_handler(State(state): State<HttpAppState>) -> Json<DashboardData> {
    Json(collect_dashboard(&state.config).await)
}
