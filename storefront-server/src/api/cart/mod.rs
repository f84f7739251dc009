//! Cart API 模块
//!
//! 购物车只在客户端保存，服务端只做价格试算

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/cart/calculate", post(handler::calculate))
}
