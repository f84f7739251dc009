//! Admin API 模块 (全部需要管理员)

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/admin/dashboard", get(handler::dashboard))
        .route("/api/admin/sales-report", get(handler::sales_report))
        .route_layer(middleware::from_fn(require_admin))
}
