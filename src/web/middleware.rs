//! # HTTPS 强制中间件
//!
//! 部署在反向代理之后时，根据 `X-Forwarded-Proto` 判断原始协议。

use axum::extract::Request;
use axum::http::header::{HOST, LOCATION};
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::logging::{LogComponent, LogStage};
use crate::ldebug;

const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// 非 HTTPS 请求一律 301 跳转到同一路径的 HTTPS 地址
pub async fn enforce_https_middleware(request: Request, next: Next) -> Response {
    if is_secure(request.headers(), request.uri()) {
        return next.run(request).await;
    }

    let Some(location) = https_location(request.headers(), request.uri()) else {
        return (StatusCode::BAD_REQUEST, "Missing Host header").into_response();
    };

    ldebug!(
        "system",
        LogStage::Response,
        LogComponent::Https,
        "https_redirect",
        &format!("Redirecting {} to {location}", request.uri())
    );
    (StatusCode::MOVED_PERMANENTLY, [(LOCATION, location)]).into_response()
}

fn is_secure(headers: &HeaderMap, uri: &Uri) -> bool {
    headers
        .get(FORWARDED_PROTO)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map_or_else(
            || uri.scheme_str() == Some("https"),
            |proto| proto.trim().eq_ignore_ascii_case("https"),
        )
}

fn https_location(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    let host = headers
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .or_else(|| uri.host())?;
    let path = uri.path_and_query().map_or("/", |pq| pq.as_str());
    Some(format!("https://{host}{path}"))
}
