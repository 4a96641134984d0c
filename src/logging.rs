//! # 日志配置模块
//!
//! 提供结构化日志宏（`linfo!` 等）以及 tracing 订阅器初始化

use std::env;
use std::fmt;
use tracing_subscriber::{EnvFilter, fmt as tracing_fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// 默认日志过滤规则
pub const DEFAULT_FILTER: &str = "info,wc_scope_probe=debug,tower_http=info";

/// 请求处理阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogStage {
    /// 服务启动
    Startup,
    /// 服务关闭
    Shutdown,
    /// 配置加载
    Configuration,
    /// 键值存储读写
    Cache,
    /// 会话关联
    Session,
    /// 调用远程商店 API
    ExternalApi,
    /// 权限探测
    Probe,
    /// 响应生成
    Response,
    /// 错误处理
    Error,
}

impl LogStage {
    /// 日志字段中使用的名称
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Shutdown => "shutdown",
            Self::Configuration => "configuration",
            Self::Cache => "cache",
            Self::Session => "session",
            Self::ExternalApi => "external_api",
            Self::Probe => "probe",
            Self::Response => "response",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 产生日志的组件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogComponent {
    /// 主程序
    Main,
    /// HTTP 服务器装配
    ServerSetup,
    /// 配置管理
    Config,
    /// 会话存储后端
    Cache,
    /// 会话仓库
    Session,
    /// 远程商店客户端
    StoreClient,
    /// 权限探测器
    Prober,
    /// 授权发起
    Initiator,
    /// 凭证回调
    Callback,
    /// 返回与报告
    Report,
    /// HTTPS 强制跳转
    Https,
}

impl LogComponent {
    /// 日志字段中使用的名称
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::ServerSetup => "server_setup",
            Self::Config => "config",
            Self::Cache => "cache",
            Self::Session => "session",
            Self::StoreClient => "store_client",
            Self::Prober => "prober",
            Self::Initiator => "initiator",
            Self::Callback => "callback",
            Self::Report => "report",
            Self::Https => "https",
        }
    }
}

impl fmt::Display for LogComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 结构化 info 日志
///
/// 参数依次为：请求标识、阶段、组件、操作名、消息
#[macro_export]
macro_rules! linfo {
    ($request_id:expr, $stage:expr, $component:expr, $operation:expr, $message:expr $(,)?) => {
        ::tracing::info!(
            request_id = %$request_id,
            stage = $stage.as_str(),
            component = $component.as_str(),
            operation = $operation,
            "{}",
            $message
        )
    };
}

/// 结构化 debug 日志
#[macro_export]
macro_rules! ldebug {
    ($request_id:expr, $stage:expr, $component:expr, $operation:expr, $message:expr $(,)?) => {
        ::tracing::debug!(
            request_id = %$request_id,
            stage = $stage.as_str(),
            component = $component.as_str(),
            operation = $operation,
            "{}",
            $message
        )
    };
}

/// 结构化 warn 日志
#[macro_export]
macro_rules! lwarn {
    ($request_id:expr, $stage:expr, $component:expr, $operation:expr, $message:expr $(,)?) => {
        ::tracing::warn!(
            request_id = %$request_id,
            stage = $stage.as_str(),
            component = $component.as_str(),
            operation = $operation,
            "{}",
            $message
        )
    };
}

/// 结构化 error 日志
#[macro_export]
macro_rules! lerror {
    ($request_id:expr, $stage:expr, $component:expr, $operation:expr, $message:expr $(,)?) => {
        ::tracing::error!(
            request_id = %$request_id,
            stage = $stage.as_str(),
            component = $component.as_str(),
            operation = $operation,
            "{}",
            $message
        )
    };
}

/// 初始化日志系统
///
/// `RUST_LOG` 优先；否则使用传入级别拼接的默认过滤规则。
pub fn init_logging(log_level: Option<&str>) {
    let log_filter = log_level.map_or_else(
        || DEFAULT_FILTER.to_string(),
        |level| format!("{level},wc_scope_probe={level},tower_http=info"),
    );

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| log_filter.into());

    // 测试或重复初始化时订阅器可能已存在
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init();

    if env::var("RUST_LOG").is_ok() {
        tracing::info!("Log filter taken from RUST_LOG");
    }
}

/// 环境变量设置指南
pub fn print_logging_help() {
    println!("Logging configuration:");
    println!("  RUST_LOG=info                          # standard level");
    println!("  RUST_LOG=debug                         # include probe response bodies");
    println!("  RUST_LOG=info,wc_scope_probe=trace     # verbose application tracing");
    println!("  RUST_LOG=info,tower_http=debug         # per-request HTTP traces");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_and_component_names_are_snake_case() {
        assert_eq!(LogStage::ExternalApi.as_str(), "external_api");
        assert_eq!(LogComponent::StoreClient.to_string(), "store_client");
    }

    #[test]
    fn macros_accept_formatted_messages() {
        init_logging(Some("debug"));
        let id = "abc";
        linfo!(id, LogStage::Session, LogComponent::Session, "test", &format!("value={}", 1));
        lwarn!("system", LogStage::Error, LogComponent::Main, "test", "warn");
    }
}
