//! Product Repository
//!
//! redb-backed [`CatalogStore`]. Every stock change is a read-check-write
//! inside one write transaction.

use chrono::Utc;
use redb::{ReadableTableMetadata, WriteTransaction};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};

use super::PageWindow;
use crate::catalog::{CatalogError, CatalogResult, CatalogStore, StockLine};
use crate::db::models::{Category, Product, ProductCreate, ProductUpdate, Review};
use crate::db::{
    PRODUCTS_TABLE, Storage, StorageError, StorageResult, get_json, put_json, scan_json,
};

/// 默认每页商品数
const DEFAULT_PRODUCT_LIMIT: u32 = 12;

/// 商品列表查询参数
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub category: Option<Category>,
    pub subcategory: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Case-insensitive match on name, description and tags
    pub search: Option<String>,
    pub featured: Option<bool>,
    /// `field:order`, field ∈ {price, rating, createdAt, name}, order ∈ {asc, desc}
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total: u64,
}

impl ProductQuery {
    fn matches(&self, product: &Product) -> bool {
        if let Some(category) = self.category
            && product.category != category
        {
            return false;
        }
        if let Some(sub) = &self.subcategory
            && !product.subcategory.eq_ignore_ascii_case(sub)
        {
            return false;
        }
        if let Some(min) = self.min_price.and_then(Decimal::from_f64)
            && product.price < min
        {
            return false;
        }
        if let Some(max) = self.max_price.and_then(Decimal::from_f64)
            && product.price > max
        {
            return false;
        }
        if let Some(featured) = self.featured
            && product.featured != featured
        {
            return false;
        }
        if let Some(search) = &self.search {
            let needle = search.trim().to_lowercase();
            if !needle.is_empty()
                && !product.name.to_lowercase().contains(&needle)
                && !product.description.to_lowercase().contains(&needle)
                && !product.tags.iter().any(|t| t.to_lowercase().contains(&needle))
            {
                return false;
            }
        }
        true
    }

    fn sort(&self, products: &mut [Product]) {
        let (field, desc) = match self.sort.as_deref().and_then(|s| s.split_once(':')) {
            Some((field, order)) => (field, order.eq_ignore_ascii_case("desc")),
            None => match self.sort.as_deref() {
                Some(field) if !field.is_empty() => (field, false),
                _ => ("createdAt", true),
            },
        };
        products.sort_by(|a, b| {
            let ord = match field {
                "price" => a.price.cmp(&b.price),
                "rating" => a.rating.total_cmp(&b.rating),
                "name" => a.name.cmp(&b.name),
                _ => a.created_at.cmp(&b.created_at),
            };
            if desc { ord.reverse() } else { ord }
        });
    }
}

/// Product repository backed by redb
#[derive(Clone)]
pub struct ProductRepository {
    storage: Storage,
}

impl ProductRepository {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn find_by_id(&self, id: &str) -> StorageResult<Option<Product>> {
        let read_txn = self.storage.begin_read()?;
        let table = read_txn.open_table(PRODUCTS_TABLE)?;
        get_json(&table, id)
    }

    pub fn find_all(&self) -> StorageResult<Vec<Product>> {
        let read_txn = self.storage.begin_read()?;
        let table = read_txn.open_table(PRODUCTS_TABLE)?;
        scan_json(&table)
    }

    pub fn count(&self) -> StorageResult<u64> {
        let read_txn = self.storage.begin_read()?;
        let table = read_txn.open_table(PRODUCTS_TABLE)?;
        Ok(table.len()?)
    }

    /// Filtered, sorted, paginated listing
    pub fn list(&self, query: &ProductQuery) -> StorageResult<ProductPage> {
        let mut products: Vec<Product> = self
            .find_all()?
            .into_iter()
            .filter(|p| query.matches(p))
            .collect();
        query.sort(&mut products);

        let total = products.len() as u64;
        let window = PageWindow::new(query.page, query.limit, DEFAULT_PRODUCT_LIMIT);
        let (products, total_pages) = window.apply(products);

        Ok(ProductPage {
            products,
            current_page: window.page,
            total_pages,
            total,
        })
    }

    pub fn create(&self, data: ProductCreate) -> StorageResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: uuid::Uuid::new_v4().to_string(),
            name: data.name.trim().to_string(),
            description: data.description,
            price: data.price,
            category: data.category,
            subcategory: data.subcategory,
            images: data.images,
            stock: data.stock,
            discount: data.discount,
            tags: data.tags,
            rating: 0.0,
            num_reviews: 0,
            reviews: Vec::new(),
            featured: data.featured,
            created_at: now,
            updated_at: now,
        };

        let txn = self.storage.begin_write()?;
        {
            let mut table = txn.open_table(PRODUCTS_TABLE)?;
            put_json(&mut table, &product.id, &product)?;
        }
        txn.commit()?;

        tracing::info!(product_id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }

    pub fn update(&self, id: &str, data: ProductUpdate) -> CatalogResult<Product> {
        self.modify(id, |product| {
            data.apply(product);
            Ok(())
        })
    }

    pub fn delete(&self, id: &str) -> CatalogResult<()> {
        let txn = self.storage.begin_write()?;
        let removed = {
            let mut table = txn.open_table(PRODUCTS_TABLE).map_err(StorageError::from)?;
            table.remove(id).map_err(StorageError::from)?.is_some()
        };
        if !removed {
            return Err(CatalogError::NotFound(id.to_string()));
        }
        txn.commit().map_err(StorageError::from)?;
        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }

    /// Load, mutate and write back one product inside a single write transaction.
    ///
    /// If `f` fails the transaction is dropped and nothing is written.
    fn modify<F>(&self, id: &str, f: F) -> CatalogResult<Product>
    where
        F: FnOnce(&mut Product) -> CatalogResult<()>,
    {
        let txn = self.storage.begin_write()?;
        let product = modify_in(&txn, id, f)?;
        txn.commit().map_err(StorageError::from)?;
        Ok(product)
    }
}

fn modify_in<F>(txn: &WriteTransaction, id: &str, f: F) -> CatalogResult<Product>
where
    F: FnOnce(&mut Product) -> CatalogResult<()>,
{
    let mut table = txn
        .open_table(PRODUCTS_TABLE)
        .map_err(StorageError::from)?;
    let mut product: Product =
        get_json(&table, id)?.ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
    f(&mut product)?;
    put_json(&mut table, id, &product)?;
    Ok(product)
}

fn take_stock(product: &mut Product, qty: u32) -> CatalogResult<()> {
    if product.stock < qty {
        return Err(CatalogError::InsufficientStock {
            product_id: product.id.clone(),
            requested: qty,
            available: product.stock,
        });
    }
    product.stock -= qty;
    product.updated_at = Utc::now();
    Ok(())
}

impl CatalogStore for ProductRepository {
    fn get_product(&self, id: &str) -> CatalogResult<Product> {
        self.find_by_id(id)?
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    fn decrement_stock(&self, id: &str, qty: u32) -> CatalogResult<()> {
        self.modify(id, |product| take_stock(product, qty))?;
        Ok(())
    }

    fn restore_stock(&self, id: &str, qty: u32) -> CatalogResult<()> {
        match self.modify(id, |product| {
            product.stock = product.stock.saturating_add(qty);
            product.updated_at = Utc::now();
            Ok(())
        }) {
            Ok(_) => Ok(()),
            // 商品已被删除：库存无处归还
            Err(CatalogError::NotFound(_)) => {
                tracing::warn!(product_id = %id, quantity = qty, "Stock restore skipped, product no longer exists");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn append_review(&self, product_id: &str, review: Review) -> CatalogResult<Product> {
        self.modify(product_id, |product| {
            if product.has_review_from(&review.user_id) {
                return Err(CatalogError::AlreadyReviewed(product_id.to_string()));
            }
            product.push_review(review);
            Ok(())
        })
    }

    /// Check and decrement every line in one write transaction
    fn reserve_stock(&self, lines: &[StockLine]) -> CatalogResult<()> {
        let txn = self.storage.begin_write()?;
        for line in lines {
            modify_in(&txn, &line.product_id, |product| take_stock(product, line.quantity))?;
        }
        txn.commit().map_err(StorageError::from)?;
        Ok(())
    }

    fn release_stock(&self, lines: &[StockLine]) -> CatalogResult<()> {
        let txn = self.storage.begin_write()?;
        for line in lines {
            match modify_in(&txn, &line.product_id, |product| {
                product.stock = product.stock.saturating_add(line.quantity);
                product.updated_at = Utc::now();
                Ok(())
            }) {
                Ok(_) => {}
                Err(CatalogError::NotFound(_)) => {
                    tracing::warn!(product_id = %line.product_id, quantity = line.quantity, "Stock restore skipped, product no longer exists");
                }
                Err(e) => return Err(e),
            }
        }
        txn.commit().map_err(StorageError::from)?;
        Ok(())
    }
}
