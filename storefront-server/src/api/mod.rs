//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`products`] - 商品浏览、管理和评价
//! - [`cart`] - 购物车试算
//! - [`orders`] - 下单、查询、状态流转、取消
//! - [`payment`] - 支付平台下单与支付确认
//! - [`admin`] - 仪表盘和销售报表

pub mod admin;
pub mod cart;
pub mod health;
pub mod orders;
pub mod payment;
pub mod products;

use serde::Serialize;

// Re-export common types for handlers
pub use crate::utils::{AppResult, ValidatedJson};

/// 仅含提示信息的响应
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
