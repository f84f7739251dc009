//! Payment API 模块

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/payment/create-order", post(handler::create_order))
        .route("/api/payment/verify", post(handler::verify))
}
