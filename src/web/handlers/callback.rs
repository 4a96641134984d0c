//! # 凭证回调
//!
//! 商店在管理员同意后直接调用此接口，载荷按关联 ID 原样保存。
//! 调用方不做认证，关联 ID 本身就是唯一的凭据。

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::linfo;
use crate::logging::{LogComponent, LogStage};
use crate::web::AppState;

/// `POST /callback`
pub async fn callback_handler(State(state): State<AppState>, body: Bytes) -> Result<StatusCode> {
    let payload: Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::validation(format!("Callback body is not valid JSON: {e}"), None))?;
    let correlation_id = correlation_id(&payload)?;

    state
        .sessions
        .save_credential_payload(&correlation_id, &payload)
        .await?;

    linfo!(
        &correlation_id,
        LogStage::Session,
        LogComponent::Callback,
        "credentials_received",
        "Stored credential payload from store callback"
    );
    Ok(StatusCode::OK)
}

/// 提取 `user_id`，商店可能以字符串或数字形式回传
fn correlation_id(payload: &Value) -> Result<String> {
    let Some(object) = payload.as_object() else {
        return Err(AppError::validation("Callback body must be a JSON object", None));
    };

    match object.get("user_id") {
        Some(Value::String(id)) if !id.trim().is_empty() => Ok(id.trim().to_string()),
        Some(Value::Number(id)) => Ok(id.to_string()),
        _ => Err(AppError::validation(
            "Callback body is missing user_id",
            Some("user_id"),
        )),
    }
}
