//! 服务装配
//!
//! - [`http`] - Axum 路由和 tower-http 中间件

pub mod http;

pub use self::http::{build_app, build_router};
