//! 产品处理器

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    http::StatusCode,
    response::Json,
};
use validator::Validate;

use super::{
    model::{CreateProductRequest, Product, ProductList, UpdateProductRequest},
    service::ProductService,
};
use crate::core::error::CoreError;

#[derive(Clone)]
pub struct AppState {
    pub product_service: ProductService,
}

pub async fn get_all_products(
    State(state): State<AppState>,
) -> Result<Json<ProductList>, CoreError> {
    let products = state.product_service.list_products().await?;
    Ok(Json(products.into()))
}

pub async fn get_product(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<Product>, CoreError> {
    let Path(id) = id?;
    let product = state.product_service.get_product(id).await?;
    Ok(Json(product))
}

pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), CoreError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let product = state.product_service.create_product(payload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<UpdateProductRequest>, JsonRejection>,
) -> Result<Json<Product>, CoreError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    payload.validate()?;

    let product = state.product_service.update_product(id, payload).await?;
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<StatusCode, CoreError> {
    let Path(id) = id?;
    state.product_service.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
