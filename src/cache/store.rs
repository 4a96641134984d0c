//! # 会话存储抽象
//!
//! 提供按键读写、带过期时间的字符串存储接口

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use super::{MemorySessionStore, RedisSessionStore};
use crate::config::{CacheBackend, CacheConfig};
use crate::error::Result;
use crate::linfo;
use crate::logging::{LogComponent, LogStage};

/// 短期键值存储
///
/// 实现只需保证单键 set/get 的原子性。
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// 设置值并指定过期时间
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// 获取值，不存在或已过期时返回 `None`
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// 删除值，返回是否确实删除了
    async fn delete(&self, key: &str) -> Result<bool>;

    /// 测试后端是否可用
    async fn ping(&self) -> Result<()>;

    /// 后端名称
    fn backend_name(&self) -> &'static str;
}

/// 共享的存储句柄
pub type SharedSessionStore = Arc<dyn SessionStore>;

/// 根据配置连接存储后端
pub async fn connect_session_store(config: &CacheConfig) -> Result<SharedSessionStore> {
    let store: SharedSessionStore = match config.backend {
        CacheBackend::Memory => {
            linfo!(
                "system",
                LogStage::Startup,
                LogComponent::Cache,
                "memory_store",
                "Using in-process session store"
            );
            Arc::new(MemorySessionStore::new())
        }
        CacheBackend::Redis => Arc::new(
            RedisSessionStore::connect(
                &config.redis_url,
                Duration::from_secs(config.connection_timeout),
            )
            .await?,
        ),
    };

    store.ping().await?;
    Ok(store)
}
