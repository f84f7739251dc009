//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] - 应用错误类型
//! - [`AppResponse`] - API 错误响应结构
//! - [`ValidatedJson`] - 带 `validator` 校验的 JSON 提取器
//! - 日志初始化

pub mod error;
pub mod logger;
pub mod result;
pub mod validation;

pub use error::{AppError, AppResponse, FieldError};
pub use result::AppResult;
pub use validation::ValidatedJson;
