//! # 授权返回与权限探测
//!
//! 浏览器从商店授权页返回后，取出会话、逐项探测并渲染报告。

use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::logging::{LogComponent, LogStage};
use crate::probe::{CapabilityReport, run_probes, standard_probes};
use crate::store_api::StoreCredentials;
use crate::web::AppState;
use crate::web::render;
use crate::{linfo, lwarn};

/// `GET /return` 查询参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReturnQuery {
    /// 商店回传的授权结果，`"1"` 表示同意
    pub success: Option<String>,
    /// 关联 ID
    pub user_id: Option<String>,
    /// 存在时直接渲染示例报告
    pub fake: Option<String>,
}

/// `GET /return`
pub async fn return_handler(
    State(state): State<AppState>,
    Query(query): Query<ReturnQuery>,
) -> Result<Response> {
    if query.fake.is_some() {
        return Ok(Html(render::report_page(&CapabilityReport::fixture())).into_response());
    }

    if query.success.as_deref() != Some("1") {
        linfo!(
            "system",
            LogStage::Probe,
            LogComponent::Report,
            "authorization_declined",
            &format!("Authorization declined for {:?}", query.user_id)
        );
        return Ok(render::DECLINED_MESSAGE.into_response());
    }

    let correlation_id = query
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::session_expired(""))?;

    let session = state.sessions.load_authorized(correlation_id).await?;
    let Some(credentials) = StoreCredentials::from_payload(&session.credential_payload) else {
        lwarn!(
            correlation_id,
            LogStage::Probe,
            LogComponent::Report,
            "credentials_missing",
            "Credential payload has no consumer_key/consumer_secret"
        );
        return Err(AppError::session_expired(correlation_id));
    };

    let client = state
        .store_clients
        .connect(&session.store_url, credentials)
        .map_err(|e| AppError::validation(e.to_string(), Some("url")))?;

    if state.config.session.single_use {
        state.sessions.invalidate(correlation_id).await?;
    }

    let probes = standard_probes(&state.config.store, &state.config.probe);
    let outcome = run_probes(client.as_ref(), &probes, correlation_id).await;

    let report = CapabilityReport {
        url: session.store_url,
        accesses: outcome.accesses,
        errors: outcome.errors,
        data: session.credential_payload,
    };

    linfo!(
        correlation_id,
        LogStage::Response,
        LogComponent::Report,
        "report_rendered",
        &format!(
            "{} of {} capabilities granted for {}",
            report.accesses.granted_count(),
            probes.len(),
            report.url
        )
    );

    Ok(Html(render::report_page(&report)).into_response())
}
