use thiserror::Error;

use crate::auth::JwtError;
use crate::db::StorageError;
use crate::payment::PaymentError;

/// 启动期错误 (配置、存储、服务初始化)
///
/// 请求处理期间的错误使用 [`AppError`](crate::utils::AppError)
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("存储错误: {0}")]
    Storage(#[from] StorageError),

    #[error("JWT 配置错误: {0}")]
    Jwt(#[from] JwtError),

    #[error("支付服务初始化失败: {0}")]
    Payment(#[from] PaymentError),

    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
