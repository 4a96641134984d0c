//! # 配置管理模块
//!
//! 处理应用配置加载、验证和环境变量覆盖

mod app_config;
mod manager;

pub use app_config::{
    AppConfig, CacheBackend, CacheConfig, ProbeConfig, ServerConfig, SessionConfig, StoreConfig,
};
pub use manager::{CONFIG_PATH_ENV, ConfigManager, ENV_PREFIX};
