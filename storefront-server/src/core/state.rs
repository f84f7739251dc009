use std::path::PathBuf;
use std::sync::Arc;

use crate::auth::JwtService;
use crate::core::{Config, Result};
use crate::db::Storage;
use crate::db::repository::{OrderRepository, ProductRepository};
use crate::orders::OrdersManager;
use crate::payment::PaymentBridge;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，每个请求 clone 一次。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | storage | Storage | redb 数据库句柄 |
/// | catalog | Arc<ProductRepository> | 商品目录 (同时实现 CatalogStore) |
/// | orders | Arc<OrdersManager> | 订单工作流 |
/// | payments | Arc<PaymentBridge> | 支付确认桥接 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub storage: Storage,
    pub catalog: Arc<ProductRepository>,
    pub orders: Arc<OrdersManager>,
    pub payments: Arc<PaymentBridge>,
    pub jwt_service: Arc<JwtService>,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("config", &self.config)
            .field("orders", &self.orders)
            .field("payments", &self.payments)
            .finish_non_exhaustive()
    }
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 1. 确保工作目录存在
    /// 2. 打开 redb 数据库 (`{work_dir}/storefront.redb`)
    /// 3. 装配仓储和服务
    pub fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;

        let db_path = config.db_path();
        let storage = Storage::open(&db_path)?;
        tracing::info!(path = %db_path.display(), "Database opened");

        Self::with_storage(config.clone(), storage)
    }

    /// 使用已打开的存储装配状态
    pub fn with_storage(config: Config, storage: Storage) -> Result<Self> {
        let catalog = Arc::new(ProductRepository::new(storage.clone()));
        let orders = Arc::new(OrdersManager::new(
            OrderRepository::new(storage.clone()),
            catalog.clone(),
            config.pricing.clone(),
        ));
        let payments = Arc::new(PaymentBridge::new(config.payment.clone(), orders.clone())?);
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        Ok(Self {
            config,
            storage,
            catalog,
            orders,
            payments,
            jwt_service,
        })
    }

    pub fn get_jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }
}
