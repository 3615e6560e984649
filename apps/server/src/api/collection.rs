use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::get,
    Json, Router,
};
use cointrail_core::errors::{Error as CoreError, ValidationError};

use crate::{
    error::ApiResult,
    main_lib::AppState,
    models::{AssetRecord, PriceCollection, UpdatePriceRequest, UpdatePriceResponse},
};

#[utoipa::path(
    get,
    path = "/api/v1/collection",
    responses((status = 200, body = PriceCollection), (status = 500, description = "Store unreadable"))
)]
pub async fn list_collection(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PriceCollection>> {
    let document = state.price_service.get_all()?;
    Ok(Json(PriceCollection::from(document)))
}

#[utoipa::path(
    get,
    path = "/api/v1/collection/{id}",
    params(("id" = String, Path, description = "Asset id, e.g. bitcoin")),
    responses((status = 200, body = AssetRecord), (status = 404, description = "Unknown asset"))
)]
pub async fn get_asset(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<AssetRecord>> {
    let record = state.price_service.get_one(&id)?;
    Ok(Json(AssetRecord::from(record)))
}

#[utoipa::path(
    post,
    path = "/api/v1/collection",
    request_body = UpdatePriceRequest,
    responses(
        (status = 200, body = UpdatePriceResponse),
        (status = 400, description = "Malformed body"),
        (status = 404, description = "Unknown asset")
    )
)]
pub async fn update_price(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<UpdatePriceRequest>, JsonRejection>,
) -> ApiResult<Json<UpdatePriceResponse>> {
    let Json(body) = payload?;
    let id = body.id.ok_or_else(|| missing("id"))?;
    let price = body.price.ok_or_else(|| missing("price"))?;

    state.price_service.record_price(&id, price).await?;
    Ok(Json(UpdatePriceResponse { success: true }))
}

fn missing(field: &str) -> CoreError {
    ValidationError::MissingField(field.to_string()).into()
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/collection", get(list_collection).post(update_price))
        .route("/collection/{id}", get(get_asset))
}
