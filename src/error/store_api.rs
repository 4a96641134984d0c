//! # 远程商店调用错误

use std::time::Duration;
use thiserror::Error;

/// 调用远程商店 REST API 的失败原因
///
/// `Display` 输出即报告中展示给管理员的错误文本。
#[derive(Debug, Error)]
pub enum StoreApiError {
    /// 超过单次调用时限
    #[error("Request to {path} timed out after {timeout:?}")]
    Timeout {
        /// 请求路径
        path: String,
        /// 生效的时限
        timeout: Duration,
    },

    /// 连接或传输失败
    #[error("Request to {path} failed: {source}")]
    Transport {
        /// 请求路径
        path: String,
        /// reqwest 错误
        #[source]
        source: reqwest::Error,
    },

    /// 非 2xx 响应，包括未跟随的跳转
    #[error("HTTP {status} from {path}: {message}")]
    Status {
        /// 请求路径
        path: String,
        /// 响应状态码
        status: u16,
        /// 商店返回的说明
        message: String,
    },

    /// 响应体不是合法 JSON
    #[error("Invalid response from {path}: {message}")]
    InvalidResponse {
        /// 请求路径
        path: String,
        /// 解析错误
        message: String,
    },

    /// 商店地址不可用
    #[error("Invalid store URL {url}: {message}")]
    InvalidUrl {
        /// 原始地址
        url: String,
        /// 失败原因
        message: String,
    },

    /// 无法生成 OAuth 签名
    #[error("Failed to sign request to {path}: {message}")]
    Signing {
        /// 请求路径
        path: String,
        /// 失败原因
        message: String,
    },
}

impl StoreApiError {
    /// 非 2xx 响应
    pub fn status(path: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            path: path.into(),
            status,
            message: message.into(),
        }
    }

    /// 请求超时
    pub fn timeout(path: impl Into<String>, timeout: Duration) -> Self {
        Self::Timeout {
            path: path.into(),
            timeout,
        }
    }

    /// 响应体无法解析
    pub fn invalid_response(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// 把 reqwest 错误归类为超时或传输错误
    #[must_use]
    pub fn from_reqwest(path: &str, timeout: Duration, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(path, timeout)
        } else {
            Self::Transport {
                path: path.to_string(),
                source: err,
            }
        }
    }

    /// HTTP 状态码（仅非 2xx 响应时存在）
    #[must_use]
    pub const fn http_status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
