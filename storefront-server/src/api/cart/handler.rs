//! Cart API Handlers

use axum::{Json, extract::State};
use serde::Deserialize;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::OrderItemRequest;
use crate::orders::Quote;
use crate::utils::{AppResult, ValidatedJson};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRequest {
    #[validate(length(min = 1, max = 100), nested)]
    pub items: Vec<OrderItemRequest>,
}

/// POST /api/cart/calculate - 按当前价格试算 (不预留库存)
pub async fn calculate(
    State(state): State<ServerState>,
    _user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<CalculateRequest>,
) -> AppResult<Json<Quote>> {
    let quote = state.orders.quote(&payload.items)?;
    Ok(Json(quote))
}
