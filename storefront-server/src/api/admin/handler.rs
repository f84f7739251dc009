//! Admin API Handlers

use axum::{Json, extract::State};

use crate::core::ServerState;
use crate::orders::reports::{Dashboard, MonthlySales};
use crate::utils::AppResult;

/// GET /api/admin/dashboard
pub async fn dashboard(State(state): State<ServerState>) -> AppResult<Json<Dashboard>> {
    let total_products = state.catalog.count()?;
    let dashboard = state.orders.dashboard(total_products)?;
    Ok(Json(dashboard))
}

/// GET /api/admin/sales-report - 按月统计已送达订单 (新到旧)
pub async fn sales_report(State(state): State<ServerState>) -> AppResult<Json<Vec<MonthlySales>>> {
    let report = state.orders.sales_report()?;
    Ok(Json(report))
}
