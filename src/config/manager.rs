//! # 配置管理器
//!
//! 加载 TOML 配置文件并应用环境变量覆盖

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

use super::{AppConfig, CacheBackend};
use crate::error::{AppError, Result};

/// 指定配置文件路径的环境变量
pub const CONFIG_PATH_ENV: &str = "WCPROBE_CONFIG_PATH";

/// 结构化覆盖变量前缀，例如 `WCPROBE_SERVER_PORT`
pub const ENV_PREFIX: &str = "WCPROBE_";

/// 配置管理器
#[derive(Debug, Clone)]
pub struct ConfigManager {
    /// 当前配置
    config: AppConfig,
    /// 实际加载的配置文件
    source: Option<PathBuf>,
}

impl ConfigManager {
    /// 创建配置管理器
    ///
    /// 路径优先级：显式参数 > `WCPROBE_CONFIG_PATH` > `config/config.{RUST_ENV}.toml`。
    /// 前两者指定的文件必须存在；默认路径不存在时使用内置默认值。
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let vars: HashMap<String, String> = env::vars().collect();

        let requested = explicit_path
            .map(Path::to_path_buf)
            .or_else(|| vars.get(CONFIG_PATH_ENV).map(PathBuf::from));

        let (config, source) = if let Some(path) = requested {
            (Self::load_config_file(&path)?, Some(path))
        } else {
            let rust_env = vars.get("RUST_ENV").map_or("dev", String::as_str);
            let default_path = PathBuf::from(format!("config/config.{rust_env}.toml"));
            if default_path.exists() {
                (Self::load_config_file(&default_path)?, Some(default_path))
            } else {
                debug!("No config file at {}, using defaults", default_path.display());
                (AppConfig::default(), None)
            }
        };

        Self::from_parts(config, source, &vars)
    }

    /// 从配置对象与给定的环境变量构建
    pub fn from_parts(
        mut config: AppConfig,
        source: Option<PathBuf>,
        vars: &HashMap<String, String>,
    ) -> Result<Self> {
        let applied = Self::apply_env_overrides(&mut config, vars)?;

        config.validate().map_err(AppError::config)?;

        info!(
            "Configuration loaded (file: {}, env overrides: {applied})",
            source
                .as_deref()
                .map_or_else(|| "<defaults>".to_string(), |p| p.display().to_string())
        );

        Ok(Self { config, source })
    }

    /// 获取当前配置
    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    /// 取出配置
    #[must_use]
    pub fn into_config(self) -> AppConfig {
        self.config
    }

    /// 实际加载的配置文件
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// 加载配置文件
    fn load_config_file(path: &Path) -> Result<AppConfig> {
        if !path.exists() {
            return Err(AppError::config(format!(
                "Config file does not exist: {}",
                path.display()
            )));
        }

        let config_content = std::fs::read_to_string(path).map_err(|e| {
            AppError::config_with_source(format!("Failed to read config file: {}", path.display()), e)
        })?;

        toml::from_str(&config_content).map_err(|e| {
            AppError::config_with_source(
                format!("TOML parse failed for {}: {e}", path.display()),
                e,
            )
        })
    }

    /// 应用环境变量覆盖，返回生效的覆盖数量
    fn apply_env_overrides(
        config: &mut AppConfig,
        vars: &HashMap<String, String>,
    ) -> Result<usize> {
        let mut applied = 0;

        // 兼容部署环境中沿用的变量名
        if let Some(port) = vars.get("PORT") {
            config.server.port = parse_value("PORT", port)?;
            applied += 1;
        }
        if let Some(ip) = vars.get("IP") {
            config.server.bind_address.clone_from(ip);
            applied += 1;
        }
        if let Some(redis_url) = vars.get("REDIS_CONNECTION_STRING") {
            if redis_url.trim().is_empty() {
                config.cache.backend = CacheBackend::Memory;
            } else {
                config.cache.backend = CacheBackend::Redis;
                config.cache.redis_url = redis_url.trim().to_string();
            }
            applied += 1;
        }
        if let Some(base_url) = vars.get("BASE_URL") {
            config.server.base_url = Some(base_url.clone());
            applied += 1;
        }
        if let Some(enforce) = vars.get("ENFORCE_HTTPS") {
            config.server.enforce_https = enforce == "true";
            applied += 1;
        }

        let mut prefixed: Vec<(&String, &String)> = vars
            .iter()
            .filter(|(key, _)| key.starts_with(ENV_PREFIX) && key.as_str() != CONFIG_PATH_ENV)
            .collect();
        prefixed.sort();

        for (key, value) in prefixed {
            let Some(path) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let path = path.to_lowercase();
            let Some((section, field)) = path.split_once('_') else {
                warn!("Ignoring malformed override {key}");
                continue;
            };

            debug!(
                "Applying env override: {section}.{field} = {}",
                if field.contains("url") { "***" } else { value }
            );

            if Self::apply_override_to_config(config, section, field, value)? {
                applied += 1;
            } else {
                warn!("Unknown config path, ignoring env override: {section}.{field}");
            }
        }

        Ok(applied)
    }

    /// 将单个覆盖写入配置对象，未知路径返回 `false`
    fn apply_override_to_config(
        config: &mut AppConfig,
        section: &str,
        field: &str,
        value: &str,
    ) -> Result<bool> {
        let key = format!("{section}.{field}");
        match (section, field) {
            ("server", "bind_address") => config.server.bind_address = value.to_string(),
            ("server", "port") => config.server.port = parse_value(&key, value)?,
            ("server", "base_url") => config.server.base_url = Some(value.to_string()),
            ("server", "enforce_https") => config.server.enforce_https = parse_value(&key, value)?,
            ("server", "static_dir") => config.server.static_dir = value.to_string(),
            ("cache", "backend") => {
                config.cache.backend = match value.to_lowercase().as_str() {
                    "memory" => CacheBackend::Memory,
                    "redis" => CacheBackend::Redis,
                    other => {
                        return Err(AppError::config(format!(
                            "Invalid cache backend '{other}', expected memory or redis"
                        )));
                    }
                };
            }
            ("cache", "redis_url") => config.cache.redis_url = value.to_string(),
            ("cache", "namespace") => config.cache.namespace = value.to_string(),
            ("cache", "session_ttl_secs") => {
                config.cache.session_ttl_secs = parse_value(&key, value)?;
            }
            ("cache", "connection_timeout") => {
                config.cache.connection_timeout = parse_value(&key, value)?;
            }
            ("store", "app_name") => config.store.app_name = value.to_string(),
            ("store", "scope") => config.store.scope = value.to_string(),
            ("store", "api_path") => config.store.api_path = value.to_string(),
            ("store", "legacy_api_path") => config.store.legacy_api_path = value.to_string(),
            ("store", "request_timeout_secs") => {
                config.store.request_timeout_secs = parse_value(&key, value)?;
            }
            ("probe", "coupon_code_prefix") => config.probe.coupon_code_prefix = value.to_string(),
            ("session", "single_use") => config.session.single_use = parse_value(&key, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .map_err(|e| AppError::config_with_source(format!("Invalid value for {key}: {value}"), e))
}
