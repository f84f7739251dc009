//! Storefront Server - 文具/礼品电商后端
//!
//! # 架构概述
//!
//! 本 crate 提供店铺后端的核心功能：
//!
//! - **商品目录** (`catalog`, `db`): 基于 redb 的商品库存，库存扣减为原子操作
//! - **订单流程** (`orders`): 下单、库存预留、金额计算、状态机流转
//! - **支付确认** (`payment`): 支付平台回调的 HMAC-SHA256 签名校验
//! - **认证** (`auth`): JWT 认证，区分 admin / customer 角色
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! storefront-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证、中间件
//! ├── api/           # HTTP 路由和处理器
//! ├── catalog/       # 商品目录契约 (CatalogStore)
//! ├── db/            # redb 存储、模型、仓储
//! ├── orders/        # 订单工作流引擎
//! ├── payment/       # 支付确认桥接
//! ├── services/      # HTTP 服务装配
//! └── utils/         # 错误、日志、校验
//! ```

pub mod api;
pub mod auth;
pub mod catalog;
pub mod core;
pub mod db;
pub mod orders;
pub mod payment;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use catalog::{CatalogError, CatalogStore};
pub use core::{Config, Server, ServerState};
pub use orders::{Actor, OrdersManager};
pub use payment::PaymentBridge;
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 加载 `.env` 并初始化日志
///
/// 必须在读取 [`Config`] 之前调用
pub fn setup_environment() {
    let _ = dotenvy::dotenv();

    let level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(level.as_deref(), log_dir.as_deref());
}
