//! OrdersManager - 订单工作流
//!
//! # Create Flow
//!
//! ```text
//! create_order(actor, request)
//!     ├─ 1. Merge duplicate product lines, reject empty cart / zero quantity
//!     ├─ 2. Re-read price + stock for every line (client prices never trusted)
//!     ├─ 3. Compute totals (PricingConfig)
//!     ├─ 4. Reserve stock for all lines (all-or-nothing)
//!     ├─ 5. Persist order
//!     └─ 6. On persist failure: release reserved stock, return error
//! ```
//!
//! Status changes run as a single read-check-write on the order record, so
//! two concurrent cancels cannot both restore stock.

mod error;
#[cfg(test)]
mod tests;

pub use error::*;

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use super::Actor;
use super::money::{OrderTotals, PricingConfig};
use crate::catalog::{CatalogStore, StockLine};
use crate::db::models::{
    CreateOrderRequest, LineItem, Order, OrderItemRequest, OrderStatus, PaymentInfo,
    PaymentMethod, PaymentStatus, TrackingInfo,
};
use crate::db::repository::{OrderFilter, OrderPage, OrderRepository, ProviderLink};

/// 价格试算结果 (不预留库存)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub items: Vec<LineItem>,
    #[serde(flatten)]
    pub totals: OrderTotals,
}

/// OrdersManager for order placement and lifecycle
pub struct OrdersManager {
    orders: OrderRepository,
    catalog: Arc<dyn CatalogStore>,
    pricing: PricingConfig,
}

impl std::fmt::Debug for OrdersManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdersManager")
            .field("orders", &"<OrderRepository>")
            .field("catalog", &"<dyn CatalogStore>")
            .field("pricing", &self.pricing)
            .finish()
    }
}

impl OrdersManager {
    pub fn new(
        orders: OrderRepository,
        catalog: Arc<dyn CatalogStore>,
        pricing: PricingConfig,
    ) -> Self {
        Self {
            orders,
            catalog,
            pricing,
        }
    }

    pub fn pricing(&self) -> &PricingConfig {
        &self.pricing
    }

    // ========== Placement ==========

    /// Price a cart against current catalog data without reserving stock
    pub fn quote(&self, items: &[OrderItemRequest]) -> ManagerResult<Quote> {
        let lines = merge_lines(items)?;
        let items = self.price_lines(&lines)?;
        let totals = self.totals(&items)?;
        Ok(Quote { items, totals })
    }

    /// Validate, reserve stock and persist a new order
    pub fn create_order(&self, actor: &Actor, request: CreateOrderRequest) -> ManagerResult<Order> {
        let lines = merge_lines(&request.items)?;
        let items = self.price_lines(&lines)?;
        let totals = self.totals(&items)?;

        let method = request.payment_info.method;
        let now = Utc::now();
        let order = Order {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: actor.user_id.clone(),
            items,
            shipping_address: request.shipping_address,
            payment_info: PaymentInfo::new(method),
            order_status: initial_status(method),
            subtotal: totals.subtotal,
            tax: totals.tax,
            shipping_cost: totals.shipping_cost,
            total: totals.total,
            tracking_info: None,
            notes: request
                .notes
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            cancellation_reason: None,
            cancelled_at: None,
            delivered_at: None,
            created_at: now,
            updated_at: now,
        };

        // 库存预留 (原子，全部或全不)
        self.catalog.reserve_stock(&lines)?;

        if let Err(e) = self.orders.insert(&order) {
            tracing::error!(order_id = %order.id, error = %e, "Order persist failed, releasing reserved stock");
            if let Err(release_err) = self.catalog.release_stock(&lines) {
                tracing::error!(order_id = %order.id, error = %release_err, "Stock release after failed order persist also failed");
            }
            return Err(e.into());
        }

        tracing::info!(
            order_id = %order.id,
            user_id = %order.user_id,
            status = %order.order_status,
            total = %order.total,
            "Order created"
        );
        Ok(order)
    }

    fn totals(&self, items: &[LineItem]) -> ManagerResult<OrderTotals> {
        OrderTotals::compute(items, &self.pricing)
            .ok_or_else(|| ManagerError::Validation("Order amount is out of range".into()))
    }

    /// Re-read each product and capture its current price.
    ///
    /// Stock is pre-checked here so a doomed order fails before any
    /// reservation; the reservation itself re-checks atomically.
    fn price_lines(&self, lines: &[StockLine]) -> ManagerResult<Vec<LineItem>> {
        lines
            .iter()
            .map(|line| {
                let product = self.catalog.get_product(&line.product_id)?;
                if product.stock < line.quantity {
                    return Err(ManagerError::OutOfStock {
                        product_id: product.id,
                        requested: line.quantity,
                        available: product.stock,
                    });
                }
                Ok(LineItem {
                    product_id: product.id,
                    name: product.name,
                    quantity: line.quantity,
                    unit_price: product.price,
                })
            })
            .collect()
    }

    // ========== Queries ==========

    /// Owner or admin only; other users get `OrderNotFound`
    pub fn get_order(&self, order_id: &str, actor: &Actor) -> ManagerResult<Order> {
        match self.orders.find_by_id(order_id)? {
            Some(order) if actor.is_admin || order.is_owned_by(&actor.user_id) => Ok(order),
            _ => Err(ManagerError::OrderNotFound(order_id.to_string())),
        }
    }

    pub fn list_orders(&self, filter: &OrderFilter, default_limit: u32) -> ManagerResult<OrderPage> {
        Ok(self.orders.list(filter, default_limit)?)
    }

    pub(crate) fn repository(&self) -> &OrderRepository {
        &self.orders
    }

    // ========== Lifecycle ==========

    /// Move an order to `next`.
    ///
    /// Forward moves are admin-only. `cancelled` is accepted from any status
    /// whose transition table allows it and restores stock.
    pub fn transition(
        &self,
        order_id: &str,
        next: OrderStatus,
        actor: &Actor,
        tracking: Option<TrackingInfo>,
        reason: Option<String>,
    ) -> ManagerResult<Order> {
        if next == OrderStatus::Cancelled && !actor.is_admin {
            return self.cancel(order_id, actor, reason);
        }
        if !actor.is_admin {
            return Err(ManagerError::Forbidden(
                "Only administrators can update order status".into(),
            ));
        }

        let order = self
            .orders
            .modify(order_id, |order: &mut Order| {
                let from = order.order_status;
                if !from.can_transition_to(next) {
                    return Err(ManagerError::InvalidTransition { from, to: next });
                }
                let now = Utc::now();
                order.order_status = next;
                match next {
                    OrderStatus::Delivered => order.delivered_at = Some(now),
                    OrderStatus::Cancelled => mark_cancelled(order, reason),
                    _ => {}
                }
                if let Some(tracking) = tracking {
                    order.tracking_info = Some(tracking);
                }
                Ok(())
            })?
            .ok_or_else(|| ManagerError::OrderNotFound(order_id.to_string()))?;

        tracing::info!(order_id = %order.id, status = %order.order_status, "Order status updated");

        if order.order_status == OrderStatus::Cancelled {
            self.release_order_stock(&order)?;
        }
        Ok(order)
    }

    /// Cancel a pending or processing order and restore its stock.
    ///
    /// Checks in order: existence (404), ownership (403), status (400).
    pub fn cancel(
        &self,
        order_id: &str,
        actor: &Actor,
        reason: Option<String>,
    ) -> ManagerResult<Order> {
        let order = self
            .orders
            .modify(order_id, |order: &mut Order| {
                if !actor.is_admin && !order.is_owned_by(&actor.user_id) {
                    return Err(ManagerError::Forbidden(
                        "Not authorized to cancel this order".into(),
                    ));
                }
                if !order.order_status.is_cancelable() {
                    return Err(ManagerError::NotCancelable(order.order_status));
                }
                order.order_status = OrderStatus::Cancelled;
                mark_cancelled(order, reason);
                Ok(())
            })?
            .ok_or_else(|| ManagerError::OrderNotFound(order_id.to_string()))?;

        tracing::info!(order_id = %order.id, cancelled_by = %actor.user_id, "Order cancelled");
        self.release_order_stock(&order)?;
        Ok(order)
    }

    fn release_order_stock(&self, order: &Order) -> ManagerResult<()> {
        let lines: Vec<StockLine> = order
            .items
            .iter()
            .map(|item| StockLine::new(&item.product_id, item.quantity))
            .collect();
        self.catalog.release_stock(&lines).map_err(|e| {
            tracing::error!(order_id = %order.id, error = %e, "Failed to restore stock for cancelled order");
            ManagerError::from(e)
        })
    }

    // ========== Payment ==========

    /// Record the payment provider's order id on an order awaiting payment
    pub fn link_provider_order(
        &self,
        order_id: &str,
        provider_order_id: &str,
    ) -> ManagerResult<Order> {
        match self.orders.link_provider_order(order_id, provider_order_id)? {
            ProviderLink::Linked(order) => Ok(order),
            ProviderLink::OrderMissing => Err(ManagerError::OrderNotFound(order_id.to_string())),
            ProviderLink::Taken { order_id: existing } => {
                tracing::warn!(
                    order_id = %order_id,
                    linked_order_id = %existing,
                    provider_order_id = %provider_order_id,
                    "Provider order already linked"
                );
                Err(ManagerError::ProviderOrderTaken(provider_order_id.to_string()))
            }
        }
    }

    pub fn find_by_provider_order(&self, provider_order_id: &str) -> ManagerResult<Option<Order>> {
        Ok(self.orders.find_by_provider_order(provider_order_id)?)
    }

    /// Mark an order paid. A confirmation is consumed once.
    ///
    /// `pending` orders advance to `processing`.
    pub fn confirm_payment(&self, order_id: &str, transaction_id: &str) -> ManagerResult<Order> {
        let order = self
            .orders
            .modify(order_id, |order: &mut Order| {
                if order.payment_info.status == PaymentStatus::Paid {
                    return Err(ManagerError::AlreadyPaid(order.id.clone()));
                }
                if !order.payment_info.method.is_online() {
                    return Err(ManagerError::PaymentRejected(
                        "Cash on delivery orders are not paid online".into(),
                    ));
                }
                if !order.order_status.is_cancelable() {
                    return Err(ManagerError::PaymentRejected(format!(
                        "Order is {}",
                        order.order_status
                    )));
                }
                order.payment_info.status = PaymentStatus::Paid;
                order.payment_info.transaction_id = Some(transaction_id.to_string());
                order.payment_info.paid_at = Some(Utc::now());
                if order.order_status == OrderStatus::Pending {
                    order.order_status = OrderStatus::Processing;
                }
                Ok(())
            })?
            .ok_or_else(|| ManagerError::OrderNotFound(order_id.to_string()))?;

        tracing::info!(order_id = %order.id, transaction_id = %transaction_id, "Payment confirmed");
        Ok(order)
    }
}

/// 货到付款订单直接进入 pending，在线支付等待确认 (processing)
fn initial_status(method: PaymentMethod) -> OrderStatus {
    if method.is_online() {
        OrderStatus::Processing
    } else {
        OrderStatus::Pending
    }
}

fn mark_cancelled(order: &mut Order, reason: Option<String>) {
    order.cancelled_at = Some(Utc::now());
    order.cancellation_reason = reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());
}

/// Merge duplicate product lines, keeping first-seen order
fn merge_lines(items: &[OrderItemRequest]) -> ManagerResult<Vec<StockLine>> {
    if items.is_empty() {
        return Err(ManagerError::Validation("Cart is empty".into()));
    }
    let mut lines: Vec<StockLine> = Vec::with_capacity(items.len());
    for item in items {
        if item.quantity == 0 {
            return Err(ManagerError::Validation(format!(
                "Quantity for product {} must be at least 1",
                item.product
            )));
        }
        match lines.iter_mut().find(|l| l.product_id == item.product) {
            Some(line) => {
                line.quantity = line.quantity.checked_add(item.quantity).ok_or_else(|| {
                    ManagerError::Validation(format!("Quantity overflow for {}", item.product))
                })?;
            }
            None => lines.push(StockLine::new(&item.product, item.quantity)),
        }
    }
    Ok(lines)
}
