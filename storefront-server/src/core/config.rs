use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;

use crate::auth::JwtConfig;
use crate::auth::jwt::generate_printable_secret;
use crate::core::{Result, ServerError};
use crate::orders::PricingConfig;
use crate::payment::PaymentConfig;

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 5000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
/// | SHUTDOWN_TIMEOUT_MS | 10000 | 优雅关闭超时(毫秒) |
/// | TAX_RATE_PERCENT | 18 | 税率 (%) |
/// | FREE_SHIPPING_THRESHOLD | 1000 | 包邮门槛 (小计 >= 门槛免运费) |
/// | FLAT_SHIPPING_FEE | 100 | 运费 |
/// | PAYMENT_KEY_ID | (空) | 支付平台 key id |
/// | PAYMENT_KEY_SECRET | 开发环境自动生成 | 支付签名密钥 |
/// | PAYMENT_API_URL | https://api.razorpay.com | 支付平台 API |
/// | PAYMENT_TIMEOUT_MS | 10000 | 支付平台调用超时 |
/// | PAYMENT_CURRENCY | INR | 币种 |
/// | JWT_SECRET | 开发环境自动生成 | JWT 密钥 (>= 32 字符) |
/// | JWT_EXPIRATION_MINUTES | 1440 | 令牌有效期 |
/// | JWT_ISSUER / JWT_AUDIENCE | storefront-server / storefront-clients | 签发者/受众 |
///
/// 生产环境下 `PAYMENT_KEY_SECRET` 和 `JWT_SECRET` 必须设置。
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/shop HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库和日志
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
    /// 关闭超时时间 (毫秒)
    pub shutdown_timeout_ms: u64,
    /// 定价参数
    pub pricing: PricingConfig,
    /// 支付平台配置
    pub payment: PaymentConfig,
    /// JWT 认证配置
    pub jwt: JwtConfig,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// 读取密钥; 生产环境缺失即报错，开发环境生成临时密钥
fn require_secret(key: &str, production: bool) -> Result<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ if production => Err(ServerError::Config(format!(
            "{key} environment variable must be set in production"
        ))),
        _ => {
            tracing::warn!("⚠️  {} not set! Generating temporary key for development.", key);
            Ok(generate_printable_secret())
        }
    }
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 未设置的项使用默认值
    pub fn from_env() -> Result<Self> {
        let environment = env_string("ENVIRONMENT", "development");
        let production = environment == "production";

        let pricing = PricingConfig {
            tax_rate_percent: env_or("TAX_RATE_PERCENT", Decimal::from(18)),
            free_shipping_threshold: env_or("FREE_SHIPPING_THRESHOLD", Decimal::from(1000)),
            flat_shipping_fee: env_or("FLAT_SHIPPING_FEE", Decimal::from(100)),
        };
        if pricing.tax_rate_percent.is_sign_negative()
            || pricing.free_shipping_threshold.is_sign_negative()
            || pricing.flat_shipping_fee.is_sign_negative()
        {
            return Err(ServerError::Config(
                "pricing values must not be negative".into(),
            ));
        }

        let payment = PaymentConfig {
            key_id: env_string("PAYMENT_KEY_ID", ""),
            key_secret: require_secret("PAYMENT_KEY_SECRET", production)?,
            api_url: env_string("PAYMENT_API_URL", "https://api.razorpay.com"),
            timeout: Duration::from_millis(env_or("PAYMENT_TIMEOUT_MS", 10_000)),
            currency: env_string("PAYMENT_CURRENCY", "INR"),
        };

        let jwt = JwtConfig {
            secret: require_secret("JWT_SECRET", production)?,
            expiration_minutes: env_or("JWT_EXPIRATION_MINUTES", 1440),
            issuer: env_string("JWT_ISSUER", "storefront-server"),
            audience: env_string("JWT_AUDIENCE", "storefront-clients"),
        };
        jwt.validate()?;

        Ok(Self {
            work_dir: env_string("WORK_DIR", "./data"),
            http_port: env_or("HTTP_PORT", 5000),
            environment,
            request_timeout_ms: env_or("REQUEST_TIMEOUT_MS", 30_000),
            shutdown_timeout_ms: env_or("SHUTDOWN_TIMEOUT_MS", 10_000),
            pricing,
            payment,
            jwt,
        })
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Result<Self> {
        let mut config = Self::from_env()?;
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        Ok(config)
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// redb 数据文件路径
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("storefront.redb")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}
