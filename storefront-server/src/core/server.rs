//! Server Implementation
//!
//! HTTP 服务器启动和管理

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::Notify;

use crate::core::{Config, Result, ServerState};
use crate::services::http::build_router;

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    /// 运行直到收到 Ctrl-C
    ///
    /// 收到信号后停止接受新连接，等待进行中的请求完成，
    /// 最多等待 `SHUTDOWN_TIMEOUT_MS`。
    pub async fn run(&self) -> Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config)?,
        };

        let app = build_router(state);
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("🛒 Storefront server listening on {}", addr);

        let shutdown_started = Arc::new(Notify::new());
        let signal = shutdown_started.clone();
        let serve = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutting down...");
                signal.notify_one();
            })
            .into_future();

        let grace = self.config.shutdown_timeout();
        tokio::select! {
            result = serve => result?,
            _ = async {
                shutdown_started.notified().await;
                tokio::time::sleep(grace).await;
            } => {
                tracing::warn!(timeout_ms = self.config.shutdown_timeout_ms, "Graceful shutdown timed out, dropping connections");
            }
        }

        tracing::info!("Server stopped");
        Ok(())
    }
}
