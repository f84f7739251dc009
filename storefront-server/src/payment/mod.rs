//! 支付确认桥接
//!
//! - [`signature`] - HMAC-SHA256 签名计算与常量时间校验
//! - [`gateway`] - 支付平台 REST 客户端 (创建平台订单)
//! - [`bridge`] - 将平台回调的确认与本地订单对账

pub mod bridge;
pub mod gateway;
pub mod signature;

pub use bridge::{PaymentBridge, ProviderOrderResponse, VerifyPaymentRequest, VerifyPaymentResponse};
pub use gateway::{PaymentGateway, ProviderOrder};

use std::time::Duration;

use thiserror::Error;

use crate::orders::ManagerError;
use crate::utils::AppError;

/// 支付平台配置
#[derive(Clone)]
pub struct PaymentConfig {
    /// Public key id (returned to checkout clients)
    pub key_id: String,
    /// HMAC shared secret
    pub key_secret: String,
    pub api_url: String,
    pub timeout: Duration,
    pub currency: String,
}

impl std::fmt::Debug for PaymentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentConfig")
            .field("key_id", &self.key_id)
            .field("key_secret", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .field("currency", &self.currency)
            .finish()
    }
}

/// Payment errors
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Invalid payment signature")]
    InvalidSignature,

    #[error("Payment gateway error: {0}")]
    Gateway(String),

    #[error(transparent)]
    Order(#[from] ManagerError),

    #[error("Internal payment error: {0}")]
    Internal(String),
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::InvalidSignature => AppError::InvalidSignature,
            PaymentError::Gateway(msg) => AppError::Gateway(msg),
            PaymentError::Order(e) => e.into(),
            PaymentError::Internal(msg) => AppError::internal(msg),
        }
    }
}
