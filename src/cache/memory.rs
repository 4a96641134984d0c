//! # 内存会话存储
//!
//! 进程内实现，用于开发环境与测试；过期项在读取时惰性清理

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::SessionStore;
use crate::error::Result;

#[derive(Debug, Clone)]
struct StoreEntry {
    value: String,
    /// `None` 表示过期时间超出 `Instant` 的表示范围
    expires_at: Option<Instant>,
}

impl StoreEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }
}

/// 内存会话存储
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    data: Arc<DashMap<String, StoreEntry>>,
}

impl MemorySessionStore {
    /// 创建空存储
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前未过期的键数量
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.data.iter().filter(|e| !e.is_expired(now)).count()
    }

    /// 是否没有任何有效键
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cleanup_expired(&self) {
        let now = Instant::now();
        self.data.retain(|_, entry| !entry.is_expired(now));
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.cleanup_expired();
        self.data.insert(
            key.to_string(),
            StoreEntry {
                value: value.to_string(),
                expires_at: Instant::now().checked_add(ttl),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Instant::now();
        let value = self
            .data
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value.clone());

        if value.is_none() {
            self.data.remove_if(key, |_, entry| entry.is_expired(now));
        }
        Ok(value)
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let now = Instant::now();
        Ok(self
            .data
            .remove(key)
            .is_some_and(|(_, entry)| !entry.is_expired(now)))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn set_then_get_returns_value() {
        let store = MemorySessionStore::new();
        store
            .set_with_ttl("ns:id:url", "https://shop.example", Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(
            store.get("ns:id:url").await.unwrap().as_deref(),
            Some("https://shop.example")
        );
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn expired_values_are_absent() {
        let store = MemorySessionStore::new();
        store
            .set_with_ttl("ns:id:url", "https://shop.example", Duration::from_millis(20))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(40)).await;

        assert_eq!(store.get("ns:id:url").await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn overwriting_restarts_the_ttl_for_that_key_only() {
        let store = MemorySessionStore::new();
        store
            .set_with_ttl("ns:id:url", "a", Duration::from_millis(20))
            .await
            .unwrap();
        store
            .set_with_ttl("ns:id:data", "{}", Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(40)).await;

        assert_eq!(store.get("ns:id:url").await.unwrap(), None);
        assert_eq!(store.get("ns:id:data").await.unwrap().as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn delete_reports_whether_a_live_key_was_removed() {
        let store = MemorySessionStore::new();
        store
            .set_with_ttl("k", "v", Duration::from_secs(60))
            .await
            .unwrap();

        assert!(store.delete("k").await.unwrap());
        assert!(!store.delete("k").await.unwrap());
    }

    #[tokio::test]
    async fn huge_ttl_keeps_value_instead_of_overflowing() {
        let store = MemorySessionStore::new();
        store
            .set_with_ttl("k", "v", Duration::from_secs(u64::MAX))
            .await
            .unwrap();

        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(store.len(), 1);
    }
}
