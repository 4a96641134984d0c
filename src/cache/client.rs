//! # Redis 会话存储
//!
//! 基于 `ConnectionManager` 的 Redis 后端

use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::time::Duration;

use super::SessionStore;
use crate::error::{AppError, Result};
use crate::logging::{LogComponent, LogStage};
use crate::{ldebug, lerror, linfo};

/// Redis 会话存储
#[derive(Clone)]
pub struct RedisSessionStore {
    /// Redis 连接管理器
    connection_manager: ConnectionManager,
}

impl RedisSessionStore {
    /// 连接 Redis
    pub async fn connect(redis_url: &str, connection_timeout: Duration) -> Result<Self> {
        linfo!(
            "system",
            LogStage::Startup,
            LogComponent::Cache,
            "connect_to_redis",
            &format!("Connecting to Redis at {}", redact_url(redis_url))
        );

        let client = Client::open(redis_url)
            .map_err(|e| AppError::cache_with_source("Failed to create Redis client", e))?;

        let connection_manager =
            tokio::time::timeout(connection_timeout, ConnectionManager::new(client))
                .await
                .map_err(|_| {
                    AppError::cache(format!(
                        "Timed out connecting to Redis after {}s",
                        connection_timeout.as_secs()
                    ))
                })?
                .map_err(|e| AppError::cache_with_source("Failed to connect to Redis", e))?;

        linfo!(
            "system",
            LogStage::Startup,
            LogComponent::Cache,
            "redis_connected",
            "Redis connection established"
        );

        Ok(Self { connection_manager })
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        ldebug!(
            "system",
            LogStage::Cache,
            LogComponent::Cache,
            "set_cache",
            &format!("SETEX {key} {}", ttl.as_secs())
        );

        let mut conn = self.connection_manager.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl.as_secs())
            .await
            .map_err(|e| AppError::cache_with_source(format!("Failed to set {key}"), e))
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection_manager.clone();

        let result: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| AppError::cache_with_source(format!("Failed to get {key}"), e))?;

        ldebug!(
            "system",
            LogStage::Cache,
            LogComponent::Cache,
            if result.is_some() { "cache_hit" } else { "cache_miss" },
            &format!("GET {key}")
        );
        Ok(result)
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection_manager.clone();

        let deleted_count: i64 = conn
            .del(key)
            .await
            .map_err(|e| AppError::cache_with_source(format!("Failed to delete {key}"), e))?;

        Ok(deleted_count > 0)
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.connection_manager.clone();

        let response: String = redis::Cmd::new()
            .arg("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| AppError::cache_with_source("Redis ping failed", e))?;

        if response == "PONG" {
            Ok(())
        } else {
            lerror!(
                "system",
                LogStage::Cache,
                LogComponent::Cache,
                "ping_fail",
                &format!("Unexpected Redis ping response: {response}")
            );
            Err(AppError::cache("Redis connection test failed"))
        }
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

/// 隐去连接串中的密码
fn redact_url(redis_url: &str) -> String {
    match url::Url::parse(redis_url) {
        Ok(mut parsed) if parsed.password().is_some() => {
            let _ = parsed.set_password(Some("***"));
            parsed.to_string()
        }
        Ok(parsed) => parsed.to_string(),
        Err(_) => "<unparseable url>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_is_redacted() {
        assert_eq!(
            redact_url("redis://:hunter2@cache.internal:6379/0"),
            "redis://:***@cache.internal:6379/0"
        );
        assert_eq!(redact_url("redis://127.0.0.1:6379"), "redis://127.0.0.1:6379");
    }

    #[tokio::test]
    #[ignore = "requires a running Redis server"]
    async fn round_trip_against_local_redis() {
        let store = RedisSessionStore::connect("redis://127.0.0.1:6379/15", Duration::from_secs(2))
            .await
            .unwrap();
        store
            .set_with_ttl("wc-scope-probe-test:key", "value", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(
            store.get("wc-scope-probe-test:key").await.unwrap().as_deref(),
            Some("value")
        );
        assert!(store.delete("wc-scope-probe-test:key").await.unwrap());
    }
}
