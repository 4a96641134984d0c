//! # 错误处理测试

use crate::error::{AppError, StoreApiError};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use std::error::Error;
use std::time::Duration;

#[test]
fn test_config_error_with_source() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let err = AppError::config_with_source("config file could not be loaded", io_err);

    assert!(matches!(err, AppError::Config { .. }));
    assert!(err.to_string().contains("Configuration error: config file could not be loaded"));
    assert!(err.source().is_some());
}

#[test]
fn test_session_expired_maps_to_client_error() {
    let err = AppError::session_expired("abc");
    assert_eq!(err.to_http_response_parts(), (StatusCode::BAD_REQUEST, "SESSION_EXPIRED"));
    assert!(err.is_client_error());
    assert!(err.user_message().contains("expired or is invalid"));
}

#[test]
fn test_cache_error_hides_details_from_user() {
    let err = AppError::cache("connection refused by 10.0.0.3");
    assert!(!err.is_client_error());
    assert!(!err.user_message().contains("10.0.0.3"));
}

#[test]
fn test_into_response_status() {
    let response = AppError::cache("down").into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = AppError::validation("bad url", Some("url")).into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn test_store_api_error_messages() {
    let err = StoreApiError::status("/wc-api/v3/coupons", 403, "Forbidden");
    assert_eq!(err.to_string(), "HTTP 403 from /wc-api/v3/coupons: Forbidden");
    assert_eq!(err.http_status(), Some(403));

    let err = StoreApiError::timeout("/wp-json/wc/v2/system_status", Duration::from_secs(10));
    assert_eq!(
        err.to_string(),
        "Request to /wp-json/wc/v2/system_status timed out after 10s"
    );
    assert_eq!(err.http_status(), None);
}
