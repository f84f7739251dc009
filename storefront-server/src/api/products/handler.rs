//! Product API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;

use crate::api::MessageResponse;
use crate::auth::CurrentUser;
use crate::catalog::CatalogStore;
use crate::core::ServerState;
use crate::db::models::{Product, ProductCreate, ProductUpdate, Review, ReviewCreate};
use crate::db::repository::{ProductPage, ProductQuery};
use crate::utils::{AppResult, ValidatedJson};

/// GET /api/products - 商品列表 (过滤、搜索、排序、分页)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ProductPage>> {
    let page = state.catalog.list(&query)?;
    Ok(Json(page))
}

/// GET /api/products/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let product = state.catalog.get_product(&id)?;
    Ok(Json(product))
}

/// POST /api/products - 创建商品 (管理员)
pub async fn create(
    State(state): State<ServerState>,
    ValidatedJson(payload): ValidatedJson<ProductCreate>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let product = state.catalog.create(payload)?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/products/{id} - 更新商品 (管理员)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<ProductUpdate>,
) -> AppResult<Json<Product>> {
    let product = state.catalog.update(&id, payload)?;
    tracing::info!(product_id = %id, "Product updated");
    Ok(Json(product))
}

/// DELETE /api/products/{id} - 删除商品 (管理员)
///
/// 已下单的订单保留下单时的名称和单价
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.catalog.delete(&id)?;
    Ok(Json(MessageResponse::new("Product removed")))
}

/// GET /api/products/{id}/reviews
pub async fn list_reviews(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Review>>> {
    let product = state.catalog.get_product(&id)?;
    Ok(Json(product.reviews))
}

/// POST /api/products/{id}/reviews - 每个用户每个商品只能评价一次
pub async fn add_review(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<ReviewCreate>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let review = Review {
        user_id: user.id.clone(),
        name: user.username.clone(),
        rating: payload.rating,
        comment: payload.comment.trim().to_string(),
        created_at: Utc::now(),
    };
    let product = state.catalog.append_review(&id, review)?;
    tracing::info!(product_id = %id, user_id = %user.id, "Review added");
    Ok((StatusCode::CREATED, Json(product)))
}
