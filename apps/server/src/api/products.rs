use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use givd_core::products::{NewProduct, Product, ProductUpdate};
use serde::Deserialize;

use crate::{error::ApiResult, main_lib::AppState};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProductRequest {
    name: String,
    category: String,
    quantity: f64,
    min_threshold: f64,
    unit: String,
}

async fn list_products(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Product>>> {
    let products = state.product_service.list_products().await?;
    Ok(Json(products))
}

async fn low_stock_products(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Product>>> {
    let products = state.product_service.low_stock_products().await?;
    Ok(Json(products))
}

async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(product): Json<NewProduct>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let created = state.product_service.create_product(product).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_product(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Product>> {
    let product = state.product_service.get_product(&id).await?;
    Ok(Json(product))
}

async fn update_product(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateProductRequest>,
) -> ApiResult<Json<Product>> {
    let update = ProductUpdate {
        id,
        name: req.name,
        category: req.category,
        quantity: req.quantity,
        min_threshold: req.min_threshold,
        unit: req.unit,
    };
    let product = state.product_service.update_product(update).await?;
    Ok(Json(product))
}

async fn delete_product(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    state.product_service.delete_product(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/low-stock", get(low_stock_products))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
}
