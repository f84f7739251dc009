//! Order API Handlers

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{
    CancelOrderRequest, CreateOrderRequest, Order, OrderStatus, UpdateStatusRequest,
};
use crate::db::repository::{OrderFilter, OrderPage};
use crate::orders::Actor;
use crate::utils::{AppError, AppResult, ValidatedJson};

const MY_ORDERS_DEFAULT_LIMIT: u32 = 10;
const ADMIN_ORDERS_DEFAULT_LIMIT: u32 = 20;

/// 订单列表查询参数
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<OrderStatus>,
    /// 仅管理员列表使用
    pub user_id: Option<String>,
}

/// POST /api/orders - 下单
///
/// 客户端提交的价格和金额被忽略，全部由服务端重新计算
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<Order>)> {
    let order = state.orders.create_order(&Actor::from(&user), payload)?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders/my-orders - 当前用户的订单 (新到旧)
pub async fn my_orders(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<OrderPage>> {
    let filter = OrderFilter {
        user_id: Some(user.id),
        status: query.status,
        page: query.page,
        limit: query.limit,
    };
    let page = state.orders.list_orders(&filter, MY_ORDERS_DEFAULT_LIMIT)?;
    Ok(Json(page))
}

/// GET /api/orders - 全部订单 (管理员)
pub async fn list_all(
    State(state): State<ServerState>,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<OrderPage>> {
    let filter = OrderFilter {
        user_id: query.user_id,
        status: query.status,
        page: query.page,
        limit: query.limit,
    };
    let page = state.orders.list_orders(&filter, ADMIN_ORDERS_DEFAULT_LIMIT)?;
    Ok(Json(page))
}

/// GET /api/orders/{id} - 非本人订单按不存在处理
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    user: CurrentUser,
) -> AppResult<Json<Order>> {
    let order = state.orders.get_order(&id, &Actor::from(&user))?;
    Ok(Json(order))
}

/// PUT /api/orders/{id}/status - 状态流转 (管理员)
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<UpdateStatusRequest>,
) -> AppResult<Json<Order>> {
    let tracking = payload.tracking();
    let order = state.orders.transition(
        &id,
        payload.order_status,
        &Actor::from(&user),
        tracking,
        None,
    )?;
    Ok(Json(order))
}

/// PUT /api/orders/{id}/cancel - 取消订单并归还库存
///
/// 请求体可省略，`{ "reason": "..." }` 可选
pub async fn cancel(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    user: CurrentUser,
    body: Bytes,
) -> AppResult<Json<Order>> {
    let request = parse_optional_body::<CancelOrderRequest>(&body)?;
    let reason = request
        .reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());
    let order = state.orders.cancel(&id, &Actor::from(&user), reason)?;
    Ok(Json(order))
}

/// 空请求体视为默认值
fn parse_optional_body<T>(body: &[u8]) -> AppResult<T>
where
    T: serde::de::DeserializeOwned + Validate + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    let value: T = serde_json::from_slice(body)
        .map_err(|e| AppError::validation(format!("Invalid JSON body: {e}")))?;
    value.validate()?;
    Ok(value)
}
