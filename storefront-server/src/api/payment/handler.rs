//! Payment API Handlers

use axum::{Json, extract::State};
use serde::Deserialize;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::orders::Actor;
use crate::payment::{ProviderOrderResponse, VerifyPaymentRequest, VerifyPaymentResponse};
use crate::utils::{AppResult, ValidatedJson};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProviderOrderRequest {
    #[validate(length(min = 1, max = 100))]
    pub order_id: String,
}

/// POST /api/payment/create-order - 为在线支付订单创建平台订单
pub async fn create_order(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<CreateProviderOrderRequest>,
) -> AppResult<Json<ProviderOrderResponse>> {
    let response = state
        .payments
        .create_provider_order(&payload.order_id, &Actor::from(&user))
        .await?;
    Ok(Json(response))
}

/// POST /api/payment/verify - 校验支付签名并确认订单
pub async fn verify(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<VerifyPaymentRequest>,
) -> AppResult<Json<VerifyPaymentResponse>> {
    let response = state.payments.verify(payload, &Actor::from(&user))?;
    Ok(Json(response))
}
