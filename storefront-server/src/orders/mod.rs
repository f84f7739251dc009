//! 订单工作流引擎
//!
//! - [`OrdersManager`] - 下单、库存预留、状态流转、取消、支付确认
//! - [`lifecycle`] - 状态机 (允许的状态流转表)
//! - [`money`] - 金额计算 (小计、税、运费、合计)
//! - [`reports`] - 管理端统计

pub mod lifecycle;
pub mod manager;
pub mod money;
pub mod reports;

pub use manager::{ManagerError, ManagerResult, OrdersManager, Quote};
pub use money::{OrderTotals, PricingConfig};

use crate::auth::CurrentUser;

/// 操作者 (订单归属与权限判断)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: String,
    pub is_admin: bool,
}

impl Actor {
    pub fn customer(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            is_admin: false,
        }
    }

    pub fn admin(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            is_admin: true,
        }
    }
}

impl From<&CurrentUser> for Actor {
    fn from(user: &CurrentUser) -> Self {
        Self {
            user_id: user.id.clone(),
            is_admin: user.is_admin(),
        }
    }
}
