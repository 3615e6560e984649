use std::sync::Arc;

use axum::{http::HeaderValue, routing::get, Json, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::{
    config::Config,
    dashboard::{DashboardRow, DashboardView, Direction},
    main_lib::AppState,
    models::{AssetRecord, PriceCollection, PricePoint, UpdatePriceRequest, UpdatePriceResponse},
};

pub mod collection;
pub mod dashboard;

#[utoipa::path(get, path = "/api/v1/healthz", responses((status = 200, description = "Health")))]
pub async fn healthz() -> &'static str {
    "ok"
}

#[utoipa::path(get, path = "/api/v1/readyz", responses((status = 200, description = "Ready")))]
pub async fn readyz() -> &'static str {
    "ok"
}

#[derive(OpenApi)]
#[openapi(
    paths(
        healthz,
        readyz,
        collection::list_collection,
        collection::get_asset,
        collection::update_price,
        dashboard::get_dashboard,
        dashboard::refresh_dashboard
    ),
    components(schemas(
        PricePoint,
        AssetRecord,
        PriceCollection,
        UpdatePriceRequest,
        UpdatePriceResponse,
        Direction,
        DashboardRow,
        DashboardView
    )),
    tags((name = "cointrail"))
)]
pub struct ApiDoc;

fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_allow.iter().any(|o| o == "*") {
        return CorsLayer::new().allow_origin(Any).allow_headers(Any);
    }

    let origins = config
        .cors_allow
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", o);
                None
            }
        })
        .collect::<Vec<_>>();
    CorsLayer::new().allow_origin(origins).allow_headers(Any)
}

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let openapi = ApiDoc::openapi();

    let api = Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .merge(collection::router())
        .merge(dashboard::router());

    Router::new()
        .nest("/api/v1", api)
        .route("/openapi.json", get(|| async { Json(openapi) }))
        .with_state(state)
        .layer(cors_layer(config))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
}
