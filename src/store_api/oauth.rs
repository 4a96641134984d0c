//! # OAuth 1.0a 单腿签名
//!
//! 纯 HTTP 商店不接受 Basic 认证，每个请求需要携带 HMAC 签名。
//! 签名参数与请求参数一起放在查询串中，不使用 `Authorization` 头。

use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use url::Url;

use super::StoreCredentials;
use crate::error::StoreApiError;

/// 签名算法，WooCommerce 同时接受 HMAC-SHA1 与 HMAC-SHA256
pub const SIGNATURE_METHOD: &str = "HMAC-SHA256";

/// 为一次请求生成需要追加到查询串的 `oauth_*` 参数
///
/// `url` 中已有的查询参数参与签名，但不会出现在返回值里。
pub fn signed_query(
    method: &str,
    url: &Url,
    credentials: &StoreCredentials,
    timestamp: i64,
    nonce: &str,
) -> Result<Vec<(String, String)>, StoreApiError> {
    let mut oauth_params = vec![
        ("oauth_consumer_key".to_string(), credentials.consumer_key.clone()),
        ("oauth_nonce".to_string(), nonce.to_string()),
        ("oauth_signature_method".to_string(), SIGNATURE_METHOD.to_string()),
        ("oauth_timestamp".to_string(), timestamp.to_string()),
    ];

    let base_string = signature_base_string(method, url, &oauth_params);
    let signing_key = format!("{}&", credentials.consumer_secret);

    let mut mac = Hmac::<Sha256>::new_from_slice(signing_key.as_bytes()).map_err(|e| {
        StoreApiError::Signing {
            path: url.path().to_string(),
            message: e.to_string(),
        }
    })?;
    mac.update(base_string.as_bytes());
    let signature = STANDARD.encode(mac.finalize().into_bytes());

    oauth_params.push(("oauth_signature".to_string(), signature));
    Ok(oauth_params)
}

/// `METHOD&enc(base_uri)&enc(sorted params)`
fn signature_base_string(method: &str, url: &Url, oauth_params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .chain(oauth_params.iter().cloned())
        .map(|(k, v)| (encode(&k), encode(&v)))
        .collect();
    encoded.sort();

    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        encode(&base_uri(url)),
        encode(&param_string)
    )
}

/// 不含查询串与片段；默认端口省略
fn base_uri(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    let port = url.port().map(|p| format!(":{p}")).unwrap_or_default();
    format!("{}://{host}{port}{}", url.scheme(), url.path())
}

fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
