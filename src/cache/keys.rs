//! # 会话键命名规范
//!
//! 键格式：`{namespace}:{correlation_id}:url` 与 `{namespace}:{correlation_id}:data`

use std::fmt;

/// 会话值的类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionField {
    /// 待授权的商店地址
    PendingUrl,
    /// 回调收到的凭证载荷
    CredentialPayload,
}

impl SessionField {
    /// 键的后缀
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::PendingUrl => "url",
            Self::CredentialPayload => "data",
        }
    }
}

/// 会话键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    namespace: String,
    correlation_id: String,
    field: SessionField,
}

impl SessionKey {
    /// 构造会话键
    #[must_use]
    pub fn new(namespace: &str, correlation_id: &str, field: SessionField) -> Self {
        Self {
            namespace: namespace.to_string(),
            correlation_id: correlation_id.to_string(),
            field,
        }
    }

    /// 待授权商店地址的键
    #[must_use]
    pub fn pending_url(namespace: &str, correlation_id: &str) -> Self {
        Self::new(namespace, correlation_id, SessionField::PendingUrl)
    }

    /// 凭证载荷的键
    #[must_use]
    pub fn credential_payload(namespace: &str, correlation_id: &str) -> Self {
        Self::new(namespace, correlation_id, SessionField::CredentialPayload)
    }

    /// 生成键字符串
    #[must_use]
    pub fn build(&self) -> String {
        format!(
            "{}:{}:{}",
            self.namespace,
            self.correlation_id,
            self.field.suffix()
        )
    }

    /// 关联 ID
    #[must_use]
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    /// 值的类别
    #[must_use]
    pub const fn field(&self) -> SessionField {
        self.field
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.build())
    }
}
