//! Order API 模块
//!
//! | 路径 | 方法 | 说明 | 权限 |
//! |------|------|------|------|
//! | /api/orders | POST | 下单 | 用户 |
//! | /api/orders | GET | 全部订单 | 管理员 |
//! | /api/orders/my-orders | GET | 我的订单 | 用户 |
//! | /api/orders/{id} | GET | 订单详情 | 本人/管理员 |
//! | /api/orders/{id}/status | PUT | 状态流转 | 管理员 |
//! | /api/orders/{id}/cancel | PUT | 取消订单 | 本人/管理员 |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", order_routes())
}

fn order_routes() -> Router<ServerState> {
    let admin = Router::new()
        .route("/", get(handler::list_all))
        .route("/{id}/status", put(handler::update_status))
        .route_layer(middleware::from_fn(require_admin));

    Router::new()
        .route("/", post(handler::create))
        .route("/my-orders", get(handler::my_orders))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/cancel", put(handler::cancel))
        .merge(admin)
}
