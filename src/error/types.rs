//! # 错误类型定义

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

use crate::logging::{LogComponent, LogStage};
use crate::{lerror, lwarn};

/// 应用主要错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置相关错误
    #[error("Configuration error: {message}")]
    Config {
        /// 错误描述
        message: String,
        /// 底层错误
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 键值存储（Redis / 内存）错误
    #[error("Session store error: {message}")]
    Cache {
        /// 错误描述
        message: String,
        /// 底层错误
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 网络通信错误
    #[error("Network error: {message}")]
    Network {
        /// 错误描述
        message: String,
        /// 底层错误
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 请求参数校验失败
    #[error("Invalid request: {message}")]
    Validation {
        /// 展示给用户的说明
        message: String,
        /// 出错的字段
        field: Option<String>,
    },

    /// 会话已过期或关联 ID 未知
    #[error("Session expired or invalid: {correlation_id}")]
    SessionExpired {
        /// 请求携带的关联 ID
        correlation_id: String,
    },

    /// IO相关错误
    #[error("IO error: {message}")]
    Io {
        /// 错误描述
        message: String,
        /// 底层错误
        #[source]
        source: std::io::Error,
    },

    /// 序列化/反序列化错误
    #[error("Serialization error: {message}")]
    Serialization {
        /// 错误描述
        message: String,
        /// 底层错误
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    /// 将错误转换为HTTP状态码和错误代码
    #[must_use]
    pub fn to_http_response_parts(&self) -> (StatusCode, &str) {
        match self {
            Self::Config { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
            Self::Cache { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "CACHE_ERROR"),
            Self::Network { .. } => (StatusCode::BAD_GATEWAY, "NETWORK_ERROR"),
            Self::Validation { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Self::SessionExpired { .. } => (StatusCode::BAD_REQUEST, "SESSION_EXPIRED"),
            Self::Io { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
            Self::Serialization { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "SERIALIZATION_ERROR")
            }
        }
    }

    /// 是否属于客户端错误（4xx）
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.to_http_response_parts().0.is_client_error()
    }

    /// 创建配置错误
    pub fn config<T: Into<String>>(message: T) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// 创建带来源的配置错误
    pub fn config_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        message: T,
        source: E,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// 创建存储错误
    pub fn cache<T: Into<String>>(message: T) -> Self {
        Self::Cache {
            message: message.into(),
            source: None,
        }
    }

    /// 创建带来源的存储错误
    pub fn cache_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        message: T,
        source: E,
    ) -> Self {
        Self::Cache {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// 创建带来源的网络错误
    pub fn network_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        message: T,
        source: E,
    ) -> Self {
        Self::Network {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// 创建校验错误
    pub fn validation<T: Into<String>>(message: T, field: Option<&str>) -> Self {
        Self::Validation {
            message: message.into(),
            field: field.map(ToString::to_string),
        }
    }

    /// 创建会话过期错误
    pub fn session_expired<T: Into<String>>(correlation_id: T) -> Self {
        Self::SessionExpired {
            correlation_id: correlation_id.into(),
        }
    }

    /// 面向用户的说明文本
    ///
    /// 服务端错误不暴露内部细节。
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { message, .. } => message.clone(),
            Self::SessionExpired { .. } => {
                "Your session has expired or is invalid. Please start the test again.".to_string()
            }
            _ => "The server could not complete the request. Please try again later.".to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: "File operation failed".to_string(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: "JSON processing failed".to_string(),
            source: err.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.to_http_response_parts();

        if status.is_server_error() {
            lerror!(
                "system",
                LogStage::Error,
                LogComponent::Main,
                code,
                &format!("Request failed: {self:?}")
            );
        } else {
            lwarn!(
                "system",
                LogStage::Error,
                LogComponent::Main,
                code,
                &format!("Request rejected: {self}")
            );
        }

        let page = crate::web::render::error_page(status, &self.user_message());
        (status, Html(page)).into_response()
    }
}
