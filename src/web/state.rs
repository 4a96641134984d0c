//! # 路由共享状态

use std::sync::Arc;
use std::time::Duration;

use crate::cache::SharedSessionStore;
use crate::config::AppConfig;
use crate::session::SessionRepository;
use crate::store_api::StoreClientFactory;

/// 处理器共享的应用状态
///
/// 只持有启动时创建的连接与只读配置，不保存任何会话数据。
#[derive(Clone)]
pub struct AppState {
    /// 会话仓库
    pub sessions: SessionRepository,
    /// 商店客户端工厂
    pub store_clients: Arc<dyn StoreClientFactory>,
    /// 应用配置
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// 由配置和已建立的连接组装状态
    #[must_use]
    pub fn new(
        config: Arc<AppConfig>,
        store: SharedSessionStore,
        store_clients: Arc<dyn StoreClientFactory>,
    ) -> Self {
        let sessions = SessionRepository::new(
            store,
            config.cache.namespace.clone(),
            Duration::from_secs(config.cache.session_ttl_secs),
        );
        Self {
            sessions,
            store_clients,
            config,
        }
    }
}
