//! # 应用配置结构定义

use serde::{Deserialize, Serialize};

/// 应用主配置结构
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP 服务配置
    pub server: ServerConfig,
    /// 会话存储配置
    pub cache: CacheConfig,
    /// 远程商店授权与 API 配置
    pub store: StoreConfig,
    /// 探测参数
    pub probe: ProbeConfig,
    /// 会话生命周期
    pub session: SessionConfig,
}

/// HTTP 服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 监听地址
    pub bind_address: String,
    /// 监听端口
    pub port: u16,
    /// 对外可访问的基础地址，用于生成回调与返回地址
    ///
    /// 为空时使用 `http://{bind_address}:{port}`。
    pub base_url: Option<String>,
    /// 是否强制 HTTPS
    pub enforce_https: bool,
    /// 静态文件目录
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 9009,
            base_url: None,
            enforce_https: false,
            static_dir: "public".to_string(),
        }
    }
}

impl ServerConfig {
    /// 解析后的基础地址（不含末尾斜杠）
    #[must_use]
    pub fn public_base_url(&self) -> String {
        self.base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .map_or_else(
                || format!("http://{}:{}", self.bind_address, self.port),
                |url| url.trim().trim_end_matches('/').to_string(),
            )
    }
}

/// 存储后端类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// 进程内存储
    #[default]
    Memory,
    /// Redis 存储
    Redis,
}

/// 会话存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// 后端类型
    pub backend: CacheBackend,
    /// Redis 连接串
    pub redis_url: String,
    /// 键命名空间
    pub namespace: String,
    /// 会话值的过期时间（秒）
    pub session_ttl_secs: u64,
    /// 连接超时时间（秒）
    pub connection_timeout: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Memory,
            redis_url: String::new(),
            namespace: "woocommerce-test".to_string(),
            session_ttl_secs: 3600,
            connection_timeout: 10,
        }
    }
}

/// 远程商店配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// 授权页展示的应用名
    pub app_name: String,
    /// 申请的权限范围
    pub scope: String,
    /// 读取类探测使用的 REST 路径
    pub api_path: String,
    /// 写入优惠券使用的旧版 REST 路径
    pub legacy_api_path: String,
    /// 单次远程调用超时（秒）
    pub request_timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            app_name: "WooCommerce Rest API test".to_string(),
            scope: "read_write".to_string(),
            api_path: "/wp-json/wc/v2".to_string(),
            legacy_api_path: "/wc-api/v3".to_string(),
            request_timeout_secs: 10,
        }
    }
}

/// 探测参数
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// 测试优惠券代码前缀
    pub coupon_code_prefix: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            coupon_code_prefix: "conversio-test-".to_string(),
        }
    }
}

/// 会话生命周期
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// 探测完成后立即删除会话，防止重放
    pub single_use: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { single_use: true }
    }
}

impl AppConfig {
    /// 验证配置的有效性
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be greater than 0".to_string());
        }
        if self.server.bind_address.trim().is_empty() {
            return Err("server.bind_address cannot be empty".to_string());
        }
        if let Some(base_url) = self.server.base_url.as_deref().filter(|u| !u.trim().is_empty()) {
            url::Url::parse(base_url.trim())
                .map_err(|e| format!("server.base_url is not a valid URL: {e}"))?;
        }

        if self.cache.namespace.trim().is_empty() {
            return Err("cache.namespace cannot be empty".to_string());
        }
        if self.cache.session_ttl_secs == 0 {
            return Err("cache.session_ttl_secs must be greater than 0".to_string());
        }
        if self.cache.backend == CacheBackend::Redis && self.cache.redis_url.trim().is_empty() {
            return Err("cache.redis_url must be set when cache.backend = \"redis\"".to_string());
        }

        if self.store.request_timeout_secs == 0 {
            return Err("store.request_timeout_secs must be greater than 0".to_string());
        }
        for (name, path) in [
            ("store.api_path", &self.store.api_path),
            ("store.legacy_api_path", &self.store.legacy_api_path),
        ] {
            if !path.starts_with('/') {
                return Err(format!("{name} must start with '/'"));
            }
        }

        Ok(())
    }
}
