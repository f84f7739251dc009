//! Order Repository
//!
//! 订单读写。状态变更通过 [`OrderRepository::modify`] 在单个写事务内完成，
//! 并发的两次取消只有一次能看到可取消状态。

use redb::{ReadableTable, ReadableTableMetadata};
use serde::Serialize;

use super::PageWindow;
use crate::db::models::{Order, OrderStatus};
use crate::db::{
    ORDERS_TABLE, PAYMENT_REFS_TABLE, Storage, StorageError, StorageResult, get_json, put_json,
    scan_json,
};

/// 订单列表过滤条件
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub user_id: Option<String>,
    pub status: Option<OrderStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_orders: u64,
}

/// [`OrderRepository::link_provider_order`] 的结果
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderLink {
    Linked(Order),
    /// The provider order id is already indexed to another order
    Taken { order_id: String },
    OrderMissing,
}

/// Order repository backed by redb
#[derive(Clone)]
pub struct OrderRepository {
    storage: Storage,
}

impl OrderRepository {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn insert(&self, order: &Order) -> StorageResult<()> {
        let txn = self.storage.begin_write()?;
        {
            let mut table = txn.open_table(ORDERS_TABLE)?;
            put_json(&mut table, &order.id, order)?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn find_by_id(&self, id: &str) -> StorageResult<Option<Order>> {
        let read_txn = self.storage.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        get_json(&table, id)
    }

    /// All orders, newest first
    pub fn find_all(&self) -> StorageResult<Vec<Order>> {
        let read_txn = self.storage.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        let mut orders: Vec<Order> = scan_json(&table)?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(orders)
    }

    pub fn count(&self) -> StorageResult<u64> {
        let read_txn = self.storage.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        Ok(table.len()?)
    }

    /// Filtered listing, newest first
    pub fn list(&self, filter: &OrderFilter, default_limit: u32) -> StorageResult<OrderPage> {
        let orders: Vec<Order> = self
            .find_all()?
            .into_iter()
            .filter(|o| filter.user_id.as_deref().is_none_or(|u| o.user_id == u))
            .filter(|o| filter.status.is_none_or(|s| o.order_status == s))
            .collect();

        let total_orders = orders.len() as u64;
        let window = PageWindow::new(filter.page, filter.limit, default_limit);
        let (orders, total_pages) = window.apply(orders);

        Ok(OrderPage {
            orders,
            current_page: window.page,
            total_pages,
            total_orders,
        })
    }

    /// Load, mutate and persist one order inside a single write transaction.
    ///
    /// Returns `Ok(None)` if the order does not exist. When `f` fails nothing
    /// is written.
    pub fn modify<E, F>(&self, id: &str, f: F) -> Result<Option<Order>, E>
    where
        E: From<StorageError>,
        F: FnOnce(&mut Order) -> Result<(), E>,
    {
        let txn = self.storage.begin_write()?;
        let order = {
            let mut table = txn.open_table(ORDERS_TABLE).map_err(StorageError::from)?;
            let Some(mut order) = get_json::<Order>(&table, id)? else {
                return Ok(None);
            };
            f(&mut order)?;
            order.updated_at = chrono::Utc::now();
            put_json(&mut table, id, &order)?;
            order
        };
        txn.commit().map_err(StorageError::from)?;
        Ok(Some(order))
    }

    /// Record the payment provider's order id on the order and index it.
    ///
    /// A provider order id maps to at most one order. The index check and the
    /// write share one transaction; a conflicting link writes nothing.
    pub fn link_provider_order(
        &self,
        order_id: &str,
        provider_order_id: &str,
    ) -> StorageResult<ProviderLink> {
        let txn = self.storage.begin_write()?;
        let order = {
            let mut refs = txn.open_table(PAYMENT_REFS_TABLE)?;
            let existing = refs.get(provider_order_id)?.map(|g| g.value().to_string());
            if let Some(existing) = existing.filter(|id| id != order_id) {
                return Ok(ProviderLink::Taken { order_id: existing });
            }

            let mut orders = txn.open_table(ORDERS_TABLE)?;
            let Some(mut order) = get_json::<Order>(&orders, order_id)? else {
                return Ok(ProviderLink::OrderMissing);
            };
            order.payment_info.provider_order_id = Some(provider_order_id.to_string());
            order.updated_at = chrono::Utc::now();
            put_json(&mut orders, order_id, &order)?;

            refs.insert(provider_order_id, order_id)?;
            order
        };
        txn.commit()?;
        Ok(ProviderLink::Linked(order))
    }

    pub fn find_by_provider_order(&self, provider_order_id: &str) -> StorageResult<Option<Order>> {
        let read_txn = self.storage.begin_read()?;
        let refs = read_txn.open_table(PAYMENT_REFS_TABLE)?;
        let order_id = refs.get(provider_order_id)?.map(|g| g.value().to_string());
        let Some(order_id) = order_id else {
            return Ok(None);
        };
        let orders = read_txn.open_table(ORDERS_TABLE)?;
        get_json(&orders, &order_id)
    }
}
