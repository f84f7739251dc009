//! Repository Module
//!
//! Provides CRUD operations over the redb tables.

pub mod order;
pub mod product;

pub use order::{OrderFilter, OrderPage, OrderRepository, ProviderLink};
pub use product::{ProductPage, ProductQuery, ProductRepository};

/// 分页上限
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Normalized pagination window (1-based page)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u32,
    pub limit: u32,
}

impl PageWindow {
    /// `page` defaults to 1, `limit` is clamped to `1..=MAX_PAGE_LIMIT`
    pub fn new(page: Option<u32>, limit: Option<u32>, default_limit: u32) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_LIMIT),
        }
    }

    /// Slice one page out of a fully filtered, sorted list.
    ///
    /// Returns the page items and the total page count.
    pub fn apply<T>(&self, items: Vec<T>) -> (Vec<T>, u32) {
        let total = items.len();
        let limit = self.limit as usize;
        let total_pages = total.div_ceil(limit) as u32;
        let skip = (self.page as usize - 1).saturating_mul(limit);
        let page = items.into_iter().skip(skip).take(limit).collect();
        (page, total_pages)
    }
}
