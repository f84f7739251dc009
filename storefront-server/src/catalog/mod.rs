//! 商品目录契约
//!
//! 订单引擎只依赖 [`CatalogStore`]，不关心存储细节。库存扣减必须是原子的
//! "检查并扣减"，不允许先读后写两步完成。

use thiserror::Error;

use crate::db::StorageError;
use crate::db::models::{Product, Review};
use crate::utils::AppError;

/// Catalog errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Product not found: {0}")]
    NotFound(String),

    #[error("Insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: String,
        requested: u32,
        available: u32,
    },

    #[error("Product {0} already reviewed by this user")]
    AlreadyReviewed(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(id) => AppError::not_found(format!("Product {id}")),
            e @ CatalogError::InsufficientStock { .. } => AppError::OutOfStock(e.to_string()),
            CatalogError::AlreadyReviewed(_) => AppError::BusinessRule("Product already reviewed".into()),
            CatalogError::Storage(e) => AppError::database(e.to_string()),
        }
    }
}

/// 一次库存预留中的一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockLine {
    pub product_id: String,
    pub quantity: u32,
}

impl StockLine {
    pub fn new(product_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// 商品目录存储
pub trait CatalogStore: Send + Sync {
    fn get_product(&self, id: &str) -> CatalogResult<Product>;

    /// Atomically decrement stock; fails with `InsufficientStock` and leaves
    /// stock untouched when `stock < qty`.
    fn decrement_stock(&self, id: &str, qty: u32) -> CatalogResult<()>;

    /// Increment stock by `qty`.
    fn restore_stock(&self, id: &str, qty: u32) -> CatalogResult<()>;

    /// Append a review (one per user) and recompute the rating.
    fn append_review(&self, product_id: &str, review: Review) -> CatalogResult<Product>;

    /// Reserve every line or none.
    ///
    /// The default implementation decrements line by line and restores the
    /// lines already taken when a later one fails. Stores that can check and
    /// write all lines in one transaction should override it.
    fn reserve_stock(&self, lines: &[StockLine]) -> CatalogResult<()> {
        for (index, line) in lines.iter().enumerate() {
            if let Err(e) = self.decrement_stock(&line.product_id, line.quantity) {
                if let Err(restore_err) = self.release_stock(&lines[..index]) {
                    tracing::error!(
                        product_id = %line.product_id,
                        error = %restore_err,
                        "Failed to restore stock after partial reservation"
                    );
                }
                return Err(e);
            }
        }
        Ok(())
    }

    /// Restore every line. Keeps going after a failure and returns the first
    /// error.
    fn release_stock(&self, lines: &[StockLine]) -> CatalogResult<()> {
        let mut first_err = None;
        for line in lines {
            if let Err(e) = self.restore_stock(&line.product_id, line.quantity) {
                tracing::error!(
                    product_id = %line.product_id,
                    quantity = line.quantity,
                    error = %e,
                    "Failed to restore stock"
                );
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Catalog that only implements the per-item primitives, so the default
    /// reservation path is exercised.
    struct MemoryCatalog {
        stock: Mutex<HashMap<String, u32>>,
    }

    impl MemoryCatalog {
        fn new(items: &[(&str, u32)]) -> Self {
            Self {
                stock: Mutex::new(items.iter().map(|(k, v)| (k.to_string(), *v)).collect()),
            }
        }

        fn stock_of(&self, id: &str) -> u32 {
            self.stock.lock().unwrap()[id]
        }
    }

    impl CatalogStore for MemoryCatalog {
        fn get_product(&self, id: &str) -> CatalogResult<Product> {
            Err(CatalogError::NotFound(id.to_string()))
        }

        fn decrement_stock(&self, id: &str, qty: u32) -> CatalogResult<()> {
            let mut stock = self.stock.lock().unwrap();
            let current = stock
                .get_mut(id)
                .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
            if *current < qty {
                return Err(CatalogError::InsufficientStock {
                    product_id: id.to_string(),
                    requested: qty,
                    available: *current,
                });
            }
            *current -= qty;
            Ok(())
        }

        fn restore_stock(&self, id: &str, qty: u32) -> CatalogResult<()> {
            let mut stock = self.stock.lock().unwrap();
            let current = stock
                .get_mut(id)
                .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
            *current = current.saturating_add(qty);
            Ok(())
        }

        fn append_review(&self, product_id: &str, _review: Review) -> CatalogResult<Product> {
            Err(CatalogError::NotFound(product_id.to_string()))
        }
    }

    #[test]
    fn test_default_reserve_takes_all_lines() {
        let catalog = MemoryCatalog::new(&[("a", 5), ("b", 3)]);
        catalog
            .reserve_stock(&[StockLine::new("a", 2), StockLine::new("b", 3)])
            .unwrap();
        assert_eq!(catalog.stock_of("a"), 3);
        assert_eq!(catalog.stock_of("b"), 0);
    }

    #[test]
    fn test_default_reserve_compensates_on_later_failure() {
        let catalog = MemoryCatalog::new(&[("a", 5), ("b", 5), ("c", 1)]);
        let err = catalog
            .reserve_stock(&[
                StockLine::new("a", 2),
                StockLine::new("b", 4),
                StockLine::new("c", 2),
            ])
            .unwrap_err();

        assert!(matches!(
            err,
            CatalogError::InsufficientStock { ref product_id, requested: 2, available: 1 }
                if product_id == "c"
        ));
        assert_eq!(catalog.stock_of("a"), 5);
        assert_eq!(catalog.stock_of("b"), 5);
        assert_eq!(catalog.stock_of("c"), 1);
    }

    #[test]
    fn test_release_continues_after_missing_product() {
        let catalog = MemoryCatalog::new(&[("a", 0)]);
        let result = catalog.release_stock(&[StockLine::new("gone", 1), StockLine::new("a", 2)]);
        assert!(matches!(result, Err(CatalogError::NotFound(_))));
        assert_eq!(catalog.stock_of("a"), 2);
    }
}
