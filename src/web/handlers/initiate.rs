//! # 授权发起
//!
//! 记录商店地址后，把浏览器跳转到商店的 `wc-auth` 授权页。

use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::LOCATION;
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use url::Url;

use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::linfo;
use crate::logging::{LogComponent, LogStage};
use crate::session::new_correlation_id;
use crate::web::AppState;
use crate::web::extract::FormOrJson;
use crate::web::render;

const AUTHORIZE_PATH: &str = "wc-auth/v1/authorize";

/// 发起请求体
#[derive(Debug, Clone, Deserialize)]
pub struct InitiateRequest {
    /// 商店基础地址
    pub url: String,
}

/// `GET /`
pub async fn index_handler(State(state): State<AppState>) -> Html<String> {
    Html(render::index_page(&state.config.store.app_name))
}

/// `POST /`
pub async fn initiate_handler(
    State(state): State<AppState>,
    FormOrJson(request): FormOrJson<InitiateRequest>,
) -> Result<Response> {
    let store_url = request.url.as_str();
    let correlation_id = new_correlation_id();
    let location = authorize_url(store_url, &state.config, &correlation_id)?;

    state
        .sessions
        .save_pending_url(&correlation_id, store_url)
        .await?;

    linfo!(
        &correlation_id,
        LogStage::Session,
        LogComponent::Initiator,
        "authorize_redirect",
        &format!("Sending administrator of {store_url} to {location}")
    );

    Ok((StatusCode::FOUND, [(LOCATION, location.to_string())]).into_response())
}

/// 构造授权地址
///
/// 授权路径按相对地址解析到商店地址上，查询参数顺序固定。
pub fn authorize_url(store_url: &str, config: &AppConfig, correlation_id: &str) -> Result<Url> {
    let base = Url::parse(store_url.trim()).map_err(|e| {
        AppError::validation(format!("'{store_url}' is not a valid store URL: {e}"), Some("url"))
    })?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(AppError::validation(
            format!("Store URL must use http or https, got '{}'", base.scheme()),
            Some("url"),
        ));
    }

    let mut url = base.join(AUTHORIZE_PATH).map_err(|e| {
        AppError::validation(format!("Cannot build authorize URL from '{store_url}': {e}"), Some("url"))
    })?;

    let base_url = config.server.public_base_url();
    url.query_pairs_mut()
        .clear()
        .append_pair("app_name", &config.store.app_name)
        .append_pair("scope", &config.store.scope)
        .append_pair("return_url", &format!("{base_url}/return"))
        .append_pair("callback_url", &format!("{base_url}/callback"))
        .append_pair("user_id", correlation_id);

    Ok(url)
}
