//! # 会话关联
//!
//! 通过关联 ID 把“发起授权”“凭证回调”“授权返回”三个请求串起来。
//! 两个值分别存放、各自计时过期，没有任何进程内共享状态。

use serde_json::Value;
use std::time::Duration;
use uuid::Uuid;

use crate::cache::{SessionKey, SharedSessionStore};
use crate::error::{AppError, Result};
use crate::logging::{LogComponent, LogStage};
use crate::{ldebug, lwarn};

/// 生成新的关联 ID（按时间有序的 UUID v7）
#[must_use]
pub fn new_correlation_id() -> String {
    Uuid::now_v7().to_string()
}

/// 已完成授权、可以开始探测的会话
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorizedSession {
    /// 关联 ID
    pub correlation_id: String,
    /// 发起时提交的商店地址
    pub store_url: String,
    /// 回调收到的原始凭证载荷
    pub credential_payload: Value,
}

/// 会话仓库
#[derive(Clone)]
pub struct SessionRepository {
    store: SharedSessionStore,
    namespace: String,
    ttl: Duration,
}

impl SessionRepository {
    /// 创建会话仓库
    #[must_use]
    pub fn new(store: SharedSessionStore, namespace: impl Into<String>, ttl: Duration) -> Self {
        Self {
            store,
            namespace: namespace.into(),
            ttl,
        }
    }

    /// 记录待授权的商店地址
    pub async fn save_pending_url(&self, correlation_id: &str, store_url: &str) -> Result<()> {
        let key = SessionKey::pending_url(&self.namespace, correlation_id);
        self.store.set_with_ttl(&key.build(), store_url, self.ttl).await?;

        ldebug!(
            correlation_id,
            LogStage::Session,
            LogComponent::Session,
            "save_pending_url",
            &format!("Stored pending store URL under {key}")
        );
        Ok(())
    }

    /// 原样记录回调载荷
    pub async fn save_credential_payload(&self, correlation_id: &str, payload: &Value) -> Result<()> {
        let key = SessionKey::credential_payload(&self.namespace, correlation_id);
        let serialized = serde_json::to_string(payload)?;
        self.store.set_with_ttl(&key.build(), &serialized, self.ttl).await?;

        ldebug!(
            correlation_id,
            LogStage::Session,
            LogComponent::Session,
            "save_credential_payload",
            &format!("Stored credential payload under {key}")
        );
        Ok(())
    }

    /// 读取待授权的商店地址
    pub async fn pending_url(&self, correlation_id: &str) -> Result<Option<String>> {
        let key = SessionKey::pending_url(&self.namespace, correlation_id);
        self.store.get(&key.build()).await
    }

    /// 读取凭证载荷
    ///
    /// 存储内容无法解析时视为缺失。
    pub async fn credential_payload(&self, correlation_id: &str) -> Result<Option<Value>> {
        let key = SessionKey::credential_payload(&self.namespace, correlation_id);
        let Some(raw) = self.store.get(&key.build()).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                lwarn!(
                    correlation_id,
                    LogStage::Session,
                    LogComponent::Session,
                    "corrupt_payload",
                    &format!("Stored credential payload under {key} is not JSON: {e}")
                );
                Ok(None)
            }
        }
    }

    /// 读取完整会话；任一值缺失即视为过期或无效
    pub async fn load_authorized(&self, correlation_id: &str) -> Result<AuthorizedSession> {
        let store_url = self.pending_url(correlation_id).await?;
        let credential_payload = self.credential_payload(correlation_id).await?;

        match (store_url, credential_payload) {
            (Some(store_url), Some(credential_payload)) => Ok(AuthorizedSession {
                correlation_id: correlation_id.to_string(),
                store_url,
                credential_payload,
            }),
            (store_url, payload) => {
                lwarn!(
                    correlation_id,
                    LogStage::Session,
                    LogComponent::Session,
                    "session_missing",
                    &format!(
                        "Session incomplete (url present: {}, credentials present: {})",
                        store_url.is_some(),
                        payload.is_some()
                    )
                );
                Err(AppError::session_expired(correlation_id))
            }
        }
    }

    /// 删除会话的两个值
    pub async fn invalidate(&self, correlation_id: &str) -> Result<()> {
        for key in [
            SessionKey::pending_url(&self.namespace, correlation_id),
            SessionKey::credential_payload(&self.namespace, correlation_id),
        ] {
            self.store.delete(&key.build()).await?;
        }

        ldebug!(
            correlation_id,
            LogStage::Session,
            LogComponent::Session,
            "invalidate",
            "Session invalidated"
        );
        Ok(())
    }
}
