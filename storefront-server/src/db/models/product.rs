//! Product Model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::validation::{not_blank, review_comment};

pub type ProductId = String;

/// 商品分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Stationery,
    Gifts,
    #[serde(rename = "Greeting Cards")]
    GreetingCards,
}

/// 商品图片
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    #[validate(length(min = 1, max = 2048))]
    pub url: String,
    pub public_id: Option<String>,
}

/// 商品评价 (每个用户每个商品最多一条)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub user_id: String,
    pub name: String,
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Product model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: Category,
    pub subcategory: String,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    pub stock: u32,
    /// Discount percentage, 0..=100 (display only; orders charge `price`)
    #[serde(default)]
    pub discount: u8,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Mean of review ratings
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub num_reviews: u32,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn has_review_from(&self, user_id: &str) -> bool {
        self.reviews.iter().any(|r| r.user_id == user_id)
    }

    /// Append a review and recompute the aggregate rating
    pub fn push_review(&mut self, review: Review) {
        self.reviews.push(review);
        self.num_reviews = self.reviews.len() as u32;
        let sum: u32 = self.reviews.iter().map(|r| u32::from(r.rating)).sum();
        self.rating = f64::from(sum) / f64::from(self.num_reviews);
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    #[validate(length(max = 200), custom(function = "not_blank"))]
    pub name: String,
    #[validate(length(max = 2000), custom(function = "not_blank"))]
    pub description: String,
    #[validate(custom(function = "non_negative_price"))]
    pub price: Decimal,
    pub category: Category,
    #[validate(length(max = 100), custom(function = "not_blank"))]
    pub subcategory: String,
    #[serde(default)]
    #[validate(nested)]
    pub images: Vec<ProductImage>,
    pub stock: u32,
    #[serde(default)]
    #[validate(range(max = 100))]
    pub discount: u8,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured: bool,
}

/// Partial update, absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    #[validate(length(max = 200), custom(function = "not_blank"))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(custom(function = "non_negative_price"))]
    pub price: Option<Decimal>,
    pub category: Option<Category>,
    #[validate(length(max = 100))]
    pub subcategory: Option<String>,
    #[validate(nested)]
    pub images: Option<Vec<ProductImage>>,
    pub stock: Option<u32>,
    #[validate(range(max = 100))]
    pub discount: Option<u8>,
    pub tags: Option<Vec<String>>,
    pub featured: Option<bool>,
}

impl ProductUpdate {
    pub fn apply(self, product: &mut Product) {
        if let Some(v) = self.name {
            product.name = v;
        }
        if let Some(v) = self.description {
            product.description = v;
        }
        if let Some(v) = self.price {
            product.price = v;
        }
        if let Some(v) = self.category {
            product.category = v;
        }
        if let Some(v) = self.subcategory {
            product.subcategory = v;
        }
        if let Some(v) = self.images {
            product.images = v;
        }
        if let Some(v) = self.stock {
            product.stock = v;
        }
        if let Some(v) = self.discount {
            product.discount = v;
        }
        if let Some(v) = self.tags {
            product.tags = v;
        }
        if let Some(v) = self.featured {
            product.featured = v;
        }
        product.updated_at = Utc::now();
    }
}

/// 新增评价请求
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviewCreate {
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,
    #[validate(length(max = 2000), custom(function = "review_comment"))]
    pub comment: String,
}

fn non_negative_price(price: &Decimal) -> Result<(), validator::ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(validator::ValidationError::new("range")
            .with_message("price must not be negative".into()));
    }
    Ok(())
}
