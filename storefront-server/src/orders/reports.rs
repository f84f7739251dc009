//! 管理端统计 (仪表盘、月度销售)
//!
//! Revenue only counts delivered orders.

use std::collections::{BTreeMap, HashSet};

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::Serialize;

use super::manager::{ManagerResult, OrdersManager};
use crate::db::models::{Order, OrderStatus};

/// Number of recent orders on the dashboard
const RECENT_ORDERS: usize = 5;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStatistics {
    pub total_orders: u64,
    pub total_products: u64,
    /// Distinct users that have placed at least one order
    pub total_customers: u64,
    pub total_revenue: Decimal,
    pub orders_by_status: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub statistics: DashboardStatistics,
    pub recent_orders: Vec<Order>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySales {
    pub year: i32,
    pub month: u32,
    pub total_sales: Decimal,
    pub order_count: u64,
}

impl OrdersManager {
    pub fn dashboard(&self, total_products: u64) -> ManagerResult<Dashboard> {
        let orders = self.repository().find_all()?;

        let customers: HashSet<&str> = orders.iter().map(|o| o.user_id.as_str()).collect();
        let total_revenue = orders
            .iter()
            .filter(|o| o.order_status == OrderStatus::Delivered)
            .fold(Decimal::ZERO, |acc, o| acc.saturating_add(o.total));
        let mut orders_by_status = BTreeMap::new();
        for status in OrderStatus::ALL {
            orders_by_status.insert(status.as_str().to_string(), 0);
        }
        for order in &orders {
            *orders_by_status
                .entry(order.order_status.as_str().to_string())
                .or_insert(0) += 1;
        }

        let statistics = DashboardStatistics {
            total_orders: orders.len() as u64,
            total_products,
            total_customers: customers.len() as u64,
            total_revenue,
            orders_by_status,
        };
        // find_all is newest first
        let recent_orders = orders.into_iter().take(RECENT_ORDERS).collect();

        Ok(Dashboard {
            statistics,
            recent_orders,
        })
    }

    /// Delivered sales grouped by creation month, newest month first
    pub fn sales_report(&self) -> ManagerResult<Vec<MonthlySales>> {
        let mut months: BTreeMap<(i32, u32), (Decimal, u64)> = BTreeMap::new();
        for order in self.repository().find_all()? {
            if order.order_status != OrderStatus::Delivered {
                continue;
            }
            let key = (order.created_at.year(), order.created_at.month());
            let entry = months.entry(key).or_insert((Decimal::ZERO, 0));
            entry.0 = entry.0.saturating_add(order.total);
            entry.1 += 1;
        }

        Ok(months
            .into_iter()
            .rev()
            .map(|((year, month), (total_sales, order_count))| MonthlySales {
                year,
                month,
                total_sales,
                order_count,
            })
            .collect())
    }
}
