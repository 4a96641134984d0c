//! # WooCommerce 权限探测服务主程序

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use wc_scope_probe::{
    cache::connect_session_store,
    config::{CONFIG_PATH_ENV, ConfigManager},
    lerror, linfo,
    logging::{self, LogComponent, LogStage},
    store_api::HttpStoreClientFactory,
    web::{AppState, WebServer},
};

/// 命令行参数
#[derive(Debug, Parser)]
#[command(name = "wc-scope-probe", version, about)]
struct Cli {
    /// 配置文件路径
    #[arg(short, long, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    /// 日志级别（`RUST_LOG` 存在时以其为准）
    #[arg(long)]
    log_level: Option<String>,

    /// 打印日志配置说明后退出
    #[arg(long)]
    logging_help: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.logging_help {
        logging::print_logging_help();
        return Ok(());
    }

    logging::init_logging(cli.log_level.as_deref());

    if let Err(e) = run(cli).await {
        lerror!(
            "system",
            LogStage::Startup,
            LogComponent::Main,
            "service_start_failed",
            &format!("Service failed: {e:?}")
        );
        return Err(e);
    }

    linfo!(
        "system",
        LogStage::Shutdown,
        LogComponent::Main,
        "service_shutdown",
        "Service shut down cleanly"
    );
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_manager =
        ConfigManager::load(cli.config.as_deref()).context("Failed to load configuration")?;
    linfo!(
        "system",
        LogStage::Configuration,
        LogComponent::Config,
        "config_source",
        &config_manager.source().map_or_else(
            || "No config file found, running on defaults and environment".to_string(),
            |path| format!("Using config file {}", path.display())
        )
    );
    let config = Arc::new(config_manager.into_config());

    let store = connect_session_store(&config.cache)
        .await
        .context("Failed to connect session store")?;
    let store_clients = HttpStoreClientFactory::new(Duration::from_secs(
        config.store.request_timeout_secs,
    ))
    .context("Failed to create store client factory")?;

    let state = AppState::new(config, store, Arc::new(store_clients));

    linfo!(
        "system",
        LogStage::Startup,
        LogComponent::Main,
        "service_starting",
        "Starting WooCommerce scope probe"
    );
    WebServer::new(state).serve(shutdown_signal()).await?;
    Ok(())
}

/// 等待 Ctrl+C 或 SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            lerror!(
                "system",
                LogStage::Shutdown,
                LogComponent::Main,
                "signal_handler_failed",
                &format!("Failed to listen for Ctrl+C: {e}")
            );
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                lerror!(
                    "system",
                    LogStage::Shutdown,
                    LogComponent::Main,
                    "signal_handler_failed",
                    &format!("Failed to listen for SIGTERM: {e}")
                );
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    linfo!(
        "system",
        LogStage::Shutdown,
        LogComponent::Main,
        "shutdown_signal",
        "Shutdown signal received, draining in-flight requests"
    );
}
