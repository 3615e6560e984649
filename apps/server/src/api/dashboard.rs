use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{dashboard::DashboardView, error::ApiResult, main_lib::AppState};

#[derive(Deserialize, IntoParams, Debug, Default)]
#[into_params(parameter_in = Query)]
pub struct DashboardQuery {
    /// Case-insensitive match on name or symbol.
    pub search: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    params(DashboardQuery),
    responses((status = 200, body = DashboardView))
)]
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Json<DashboardView> {
    Json(state.dashboard.view(query.search.as_deref()))
}

#[utoipa::path(
    post,
    path = "/api/v1/dashboard/refresh",
    params(DashboardQuery),
    responses((status = 200, body = DashboardView), (status = 502, description = "Upstream failed"))
)]
pub async fn refresh_dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<Json<DashboardView>> {
    state.poller.run_cycle().await?;
    Ok(Json(state.dashboard.view(query.search.as_deref())))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/dashboard", get(get_dashboard))
        .route("/dashboard/refresh", post(refresh_dashboard))
}
