//! # 商店密钥对

use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// 商店签发的 REST API 密钥对
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct StoreCredentials {
    /// `ck_...`
    pub consumer_key: String,
    /// `cs_...`
    pub consumer_secret: String,
}

impl StoreCredentials {
    /// 从回调载荷中提取密钥对；字段缺失或不是字符串时返回 `None`
    #[must_use]
    pub fn from_payload(payload: &Value) -> Option<Self> {
        let consumer_key = payload.get("consumer_key")?.as_str()?;
        let consumer_secret = payload.get("consumer_secret")?.as_str()?;
        if consumer_key.is_empty() || consumer_secret.is_empty() {
            return None;
        }
        Some(Self {
            consumer_key: consumer_key.to_string(),
            consumer_secret: consumer_secret.to_string(),
        })
    }
}

impl fmt::Debug for StoreCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreCredentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"***")
            .finish()
    }
}
