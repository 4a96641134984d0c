//! # HTTP 服务器
//!
//! 组装路由与中间件，监听端口并在收到关闭信号后优雅退出

use axum::Router;
use std::net::SocketAddr;
use std::path::Path;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::middleware::enforce_https_middleware;
use super::{AppState, create_routes};
use crate::config::ServerConfig;
use crate::error::{AppError, Result};
use crate::logging::{LogComponent, LogStage};
use crate::{linfo, lwarn};

/// 组装完整路由：业务路由、静态文件回退、请求追踪与 HTTPS 强制
pub fn build_router(state: AppState) -> Router {
    let server_config = state.config.server.clone();
    let mut app = create_routes(state);

    let static_dir = Path::new(&server_config.static_dir);
    if static_dir.is_dir() {
        linfo!(
            "system",
            LogStage::Startup,
            LogComponent::ServerSetup,
            "static_service_enabled",
            &format!("Serving static files from {}", static_dir.display())
        );
        app = app.fallback_service(ServeDir::new(static_dir));
    } else {
        lwarn!(
            "system",
            LogStage::Startup,
            LogComponent::ServerSetup,
            "static_dir_not_found",
            &format!(
                "Static directory {} not found, static files will not be served",
                static_dir.display()
            )
        );
    }

    app = app.layer(TraceLayer::new_for_http());

    if server_config.enforce_https {
        linfo!(
            "system",
            LogStage::Startup,
            LogComponent::ServerSetup,
            "https_enforced",
            "Redirecting plain HTTP requests to HTTPS"
        );
        app = app.layer(axum::middleware::from_fn(enforce_https_middleware));
    }

    app
}

/// HTTP 服务器
pub struct WebServer {
    config: ServerConfig,
    router: Router,
}

impl WebServer {
    /// 创建服务器
    #[must_use]
    pub fn new(state: AppState) -> Self {
        let config = state.config.server.clone();
        let router = build_router(state);
        Self { config, router }
    }

    /// 监听地址
    pub fn bind_address(&self) -> Result<SocketAddr> {
        let ip = self
            .config
            .bind_address
            .parse::<std::net::IpAddr>()
            .map_err(|e| {
                AppError::config_with_source(
                    format!("Invalid bind address '{}'", self.config.bind_address),
                    e,
                )
            })?;
        Ok(SocketAddr::new(ip, self.config.port))
    }

    /// 启动服务器，`shutdown` 完成后停止接收新连接并等待在途请求结束
    pub async fn serve<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.bind_address()?;

        linfo!(
            "system",
            LogStage::Startup,
            LogComponent::ServerSetup,
            "server_start",
            &format!(
                "Listening on {addr}, public base URL {}",
                self.config.public_base_url()
            )
        );

        let listener = TcpListener::bind(&addr).await?;

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| AppError::network_with_source("HTTP server error", e))?;

        linfo!(
            "system",
            LogStage::Shutdown,
            LogComponent::ServerSetup,
            "server_stopped",
            "HTTP server stopped"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemorySessionStore;
    use crate::config::AppConfig;
    use crate::store_api::HttpStoreClientFactory;
    use std::sync::Arc;
    use std::time::Duration;

    fn state(config: AppConfig) -> AppState {
        AppState::new(
            Arc::new(config),
            Arc::new(MemorySessionStore::new()),
            Arc::new(HttpStoreClientFactory::new(Duration::from_secs(1)).unwrap()),
        )
    }

    #[test]
    fn parses_bind_address() {
        let mut config = AppConfig::default();
        config.server.bind_address = "127.0.0.1".to_string();
        config.server.port = 9100;
        let server = WebServer::new(state(config));
        assert_eq!(server.bind_address().unwrap().to_string(), "127.0.0.1:9100");
    }

    #[test]
    fn rejects_invalid_bind_address() {
        let mut config = AppConfig::default();
        config.server.bind_address = "not-an-ip".to_string();
        let server = WebServer::new(state(config));
        assert!(server.bind_address().is_err());
    }
}
