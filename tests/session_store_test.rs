//! # 会话存储集成测试
//!
//! 经由 `SessionRepository` 测试两种存储后端

use serde_json::json;
use std::time::Duration;

use wc_scope_probe::cache::{SessionStore, SharedSessionStore, connect_session_store};
use wc_scope_probe::config::{CacheBackend, CacheConfig};
use wc_scope_probe::session::{SessionRepository, new_correlation_id};

async fn exercise_repository(store: SharedSessionStore, ttl: Duration) {
    let repository = SessionRepository::new(store.clone(), "woocommerce-test-it", ttl);
    let correlation_id = new_correlation_id();
    let payload = json!({
        "user_id": correlation_id,
        "consumer_key": "ck_it",
        "consumer_secret": "cs_it"
    });

    repository
        .save_pending_url(&correlation_id, "https://shop.example")
        .await
        .unwrap();
    repository
        .save_credential_payload(&correlation_id, &payload)
        .await
        .unwrap();

    let session = repository.load_authorized(&correlation_id).await.unwrap();
    assert_eq!(session.store_url, "https://shop.example");
    assert_eq!(session.credential_payload, payload);
    assert_eq!(
        store
            .get(&format!("woocommerce-test-it:{correlation_id}:url"))
            .await
            .unwrap()
            .as_deref(),
        Some("https://shop.example")
    );

    repository.invalidate(&correlation_id).await.unwrap();
    assert!(repository.load_authorized(&correlation_id).await.is_err());
}

#[tokio::test]
async fn memory_backend_from_config() {
    let config = CacheConfig::default();
    let store = connect_session_store(&config).await.unwrap();
    assert_eq!(store.backend_name(), "memory");

    exercise_repository(store, Duration::from_secs(60)).await;
}

#[tokio::test]
async fn memory_backend_expires_values() {
    let store = connect_session_store(&CacheConfig::default()).await.unwrap();
    let repository = SessionRepository::new(store, "woocommerce-test-it", Duration::from_millis(50));

    repository.save_pending_url("short", "https://shop.example").await.unwrap();
    tokio::time::sleep(Duration::from_millis(120)).await;

    assert_eq!(repository.pending_url("short").await.unwrap(), None);
}

#[tokio::test]
#[ignore] // 需要 Redis 服务器运行
async fn redis_backend_round_trip() {
    let config = CacheConfig {
        backend: CacheBackend::Redis,
        redis_url: std::env::var("REDIS_CONNECTION_STRING")
            .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
        ..CacheConfig::default()
    };
    let store = connect_session_store(&config).await.unwrap();
    assert_eq!(store.backend_name(), "redis");

    exercise_repository(store, Duration::from_secs(60)).await;
}
