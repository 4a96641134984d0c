//! # 远程商店 REST 客户端
//!
//! `StoreClient` 是探测器依赖的唯一能力：对商店基础地址发起带密钥认证的 GET/POST。

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode, header};
use serde_json::Value;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

use super::{StoreCredentials, oauth};
use crate::error::{AppError, StoreApiError};
use crate::logging::{LogComponent, LogStage};
use crate::{ldebug, lwarn};

/// 绑定到某个商店和密钥对的 REST 客户端
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// GET `{store_url}{path}`
    async fn get(&self, path: &str) -> Result<Value, StoreApiError>;

    /// POST `{store_url}{path}`，请求体为 JSON
    async fn post(&self, path: &str, body: &Value) -> Result<Value, StoreApiError>;
}

/// 按商店地址与凭证创建客户端
pub trait StoreClientFactory: Send + Sync {
    /// 创建绑定的客户端
    fn connect(
        &self,
        store_url: &str,
        credentials: StoreCredentials,
    ) -> Result<Box<dyn StoreClient>, StoreApiError>;
}

/// 基于 reqwest 的客户端工厂
///
/// 底层连接池在进程启动时创建，所有会话共用。
/// 不跟随跳转：跟随 301/302 会把 POST 改写成 GET，写入会被误判为成功。
#[derive(Debug, Clone)]
pub struct HttpStoreClientFactory {
    http_client: reqwest::Client,
    timeout: Duration,
}

impl HttpStoreClientFactory {
    /// 创建工厂，`timeout` 作用于每一次远程调用
    pub fn new(timeout: Duration) -> crate::error::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("wc-scope-probe/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::network_with_source("Failed to build HTTP client", e))?;

        Ok(Self {
            http_client,
            timeout,
        })
    }
}

impl StoreClientFactory for HttpStoreClientFactory {
    fn connect(
        &self,
        store_url: &str,
        credentials: StoreCredentials,
    ) -> Result<Box<dyn StoreClient>, StoreApiError> {
        let client = HttpStoreClient::new(
            self.http_client.clone(),
            store_url,
            credentials,
            self.timeout,
        )?;
        Ok(Box::new(client))
    }
}

/// 基于 reqwest 的客户端
///
/// HTTPS 商店使用 Basic 认证；HTTP 商店对每个请求做 OAuth 1.0a 签名。
#[derive(Debug, Clone)]
pub struct HttpStoreClient {
    http_client: reqwest::Client,
    base_url: String,
    use_basic_auth: bool,
    credentials: StoreCredentials,
    timeout: Duration,
}

impl HttpStoreClient {
    /// 创建客户端
    pub fn new(
        http_client: reqwest::Client,
        store_url: &str,
        credentials: StoreCredentials,
        timeout: Duration,
    ) -> Result<Self, StoreApiError> {
        let parsed = Url::parse(store_url.trim()).map_err(|e| StoreApiError::InvalidUrl {
            url: store_url.to_string(),
            message: e.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(StoreApiError::InvalidUrl {
                url: store_url.to_string(),
                message: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        Ok(Self {
            http_client,
            base_url: store_url.trim().trim_end_matches('/').to_string(),
            use_basic_auth: parsed.scheme() == "https",
            credentials,
            timeout,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, StoreApiError> {
        let raw = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        Url::parse(&raw).map_err(|e| StoreApiError::InvalidUrl {
            url: raw,
            message: e.to_string(),
        })
    }

    fn authenticate(
        &self,
        request: RequestBuilder,
        method: &Method,
        url: &Url,
    ) -> Result<RequestBuilder, StoreApiError> {
        if self.use_basic_auth {
            return Ok(request.basic_auth(
                &self.credentials.consumer_key,
                Some(&self.credentials.consumer_secret),
            ));
        }

        let params = oauth::signed_query(
            method.as_str(),
            url,
            &self.credentials,
            chrono::Utc::now().timestamp(),
            &Uuid::new_v4().simple().to_string(),
        )?;
        Ok(request.query(&params))
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, StoreApiError> {
        let url = self.endpoint(path)?;
        let mut request = self
            .http_client
            .request(method.clone(), url.clone())
            .header(header::ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = self
            .authenticate(request, &method, &url)?
            .send()
            .await
            .map_err(|e| StoreApiError::from_reqwest(path, self.timeout, e))?;

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string);
        let body = response
            .text()
            .await
            .map_err(|e| StoreApiError::from_reqwest(path, self.timeout, e))?;

        if !status.is_success() {
            lwarn!(
                "system",
                LogStage::ExternalApi,
                LogComponent::StoreClient,
                "store_call_failed",
                &format!("{method} {path} returned {status}")
            );
            let message = if status.is_redirection() {
                location.map_or_else(
                    || "Redirect without Location header".to_string(),
                    |target| format!("Redirected to {target}"),
                )
            } else {
                error_message(status, &body)
            };
            return Err(StoreApiError::status(path, status.as_u16(), message));
        }

        ldebug!(
            "system",
            LogStage::ExternalApi,
            LogComponent::StoreClient,
            "store_call_ok",
            &format!("{method} {path} returned {status} ({} bytes)", body.len())
        );

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| StoreApiError::invalid_response(path, e.to_string()))
    }
}

#[async_trait]
impl StoreClient for HttpStoreClient {
    async fn get(&self, path: &str) -> Result<Value, StoreApiError> {
        self.execute(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, StoreApiError> {
        self.execute(Method::POST, path, Some(body)).await
    }
}

/// 从错误响应中提取可读信息
///
/// 兼容 `{"message": ...}` 与旧版 `{"errors": [{"message": ...}]}` 两种格式。
fn error_message(status: StatusCode, body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let message = parsed.as_ref().and_then(|value| {
        value
            .get("message")
            .and_then(Value::as_str)
            .or_else(|| {
                value
                    .get("errors")?
                    .as_array()?
                    .first()?
                    .get("message")?
                    .as_str()
            })
            .map(ToString::to_string)
    });

    message.unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Unexpected status")
            .to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{
        body_json, header_exists, method, path, query_param, query_param_is_missing,
    };
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn credentials() -> StoreCredentials {
        StoreCredentials {
            consumer_key: "ck_1".to_string(),
            consumer_secret: "cs_1".to_string(),
        }
    }

    fn client_for(url: &str, timeout: Duration) -> Box<dyn StoreClient> {
        HttpStoreClientFactory::new(timeout)
            .unwrap()
            .connect(url, credentials())
            .unwrap()
    }

    /// 用请求中的时间戳和随机串重新签名，与收到的签名比较
    fn carries_valid_signature(request: &Request) -> bool {
        let pairs: Vec<(String, String)> = request.url.query_pairs().into_owned().collect();
        let lookup = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        };
        let (Some(timestamp), Some(nonce), Some(signature)) = (
            lookup("oauth_timestamp").and_then(|t| t.parse::<i64>().ok()),
            lookup("oauth_nonce"),
            lookup("oauth_signature"),
        ) else {
            return false;
        };

        let mut unsigned = request.url.clone();
        unsigned.set_query(None);
        let expected = oauth::signed_query(
            request.method.as_str(),
            &unsigned,
            &credentials(),
            timestamp,
            &nonce,
        )
        .unwrap();
        expected
            .iter()
            .any(|(k, v)| k == "oauth_signature" && *v == signature)
    }

    #[test]
    fn error_message_prefers_remote_text() {
        assert_eq!(
            error_message(
                StatusCode::UNAUTHORIZED,
                r#"{"code":"woocommerce_rest_cannot_view","message":"Sorry, you cannot list resources."}"#
            ),
            "Sorry, you cannot list resources."
        );
        assert_eq!(
            error_message(
                StatusCode::FORBIDDEN,
                r#"{"errors":[{"code":"woocommerce_api_authentication_error","message":"Invalid signature"}]}"#
            ),
            "Invalid signature"
        );
        assert_eq!(error_message(StatusCode::FORBIDDEN, "<html>"), "Forbidden");
    }

    #[test]
    fn rejects_non_http_urls() {
        let factory = HttpStoreClientFactory::new(Duration::from_secs(1)).unwrap();
        assert!(factory.connect("ftp://shop.example", credentials()).is_err());
        assert!(factory.connect("not a url", credentials()).is_err());
    }

    #[tokio::test]
    async fn plain_http_store_receives_oauth_signed_requests() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wp-json/wc/v2/coupons"))
            .and(query_param("oauth_consumer_key", "ck_1"))
            .and(query_param("oauth_signature_method", "HMAC-SHA256"))
            .and(query_param_is_missing("consumer_key"))
            .and(query_param_is_missing("consumer_secret"))
            .and(carries_valid_signature)
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&format!("{}/", server.uri()), Duration::from_secs(5));
        let value = client.get("/wp-json/wc/v2/coupons").await.unwrap();
        assert_eq!(value, json!([{"id": 1}]));
    }

    #[tokio::test]
    async fn each_request_gets_a_fresh_nonce() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(carries_valid_signature)
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server.uri(), Duration::from_secs(5));
        client.get("/wp-json/wc/v2/settings/general").await.unwrap();
        client.get("/wp-json/wc/v2/settings/general").await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let nonces: Vec<String> = requests
            .iter()
            .filter_map(|r| {
                r.url
                    .query_pairs()
                    .find(|(k, _)| k == "oauth_nonce")
                    .map(|(_, v)| v.into_owned())
            })
            .collect();
        assert_eq!(nonces.len(), 2);
        assert_ne!(nonces[0], nonces[1]);
    }

    #[tokio::test]
    async fn post_sends_json_body() {
        let server = MockServer::start().await;
        let body = json!({"coupon": {"code": "x"}});
        Mock::given(method("POST"))
            .and(path("/wc-api/v3/coupons"))
            .and(body_json(body.clone()))
            .and(carries_valid_signature)
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"coupon": {"id": 9}})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server.uri(), Duration::from_secs(5));
        let value = client.post("/wc-api/v3/coupons", &body).await.unwrap();
        assert_eq!(value["coupon"]["id"], 9);
    }

    #[tokio::test]
    async fn non_success_status_becomes_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wp-json/wc/v2/system_status"))
            .respond_with(
                ResponseTemplate::new(403)
                    .set_body_json(json!({"code": "denied", "message": "Sorry, you cannot view."})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server.uri(), Duration::from_secs(5));
        let err = client.get("/wp-json/wc/v2/system_status").await.unwrap_err();
        assert_eq!(err.http_status(), Some(403));
        assert_eq!(
            err.to_string(),
            "HTTP 403 from /wp-json/wc/v2/system_status: Sorry, you cannot view."
        );
    }

    #[tokio::test]
    async fn slow_store_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let client = client_for(&server.uri(), Duration::from_millis(200));
        let err = client.get("/wp-json/wc/v2/settings/general").await.unwrap_err();
        assert!(matches!(err, StoreApiError::Timeout { .. }));
        assert_eq!(
            err.to_string(),
            "Request to /wp-json/wc/v2/settings/general timed out after 200ms"
        );
    }

    #[tokio::test]
    async fn redirected_post_is_reported_not_followed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/wc-api/v3/coupons"))
            .respond_with(ResponseTemplate::new(301).insert_header("Location", "/moved"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/moved"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"coupon": {"id": 1}})))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server.uri(), Duration::from_secs(5));
        let err = client
            .post("/wc-api/v3/coupons", &json!({"coupon": {"code": "x"}}))
            .await
            .unwrap_err();
        assert_eq!(err.http_status(), Some(301));
        assert_eq!(
            err.to_string(),
            "HTTP 301 from /wc-api/v3/coupons: Redirected to /moved"
        );
    }

    #[tokio::test]
    async fn https_store_uses_basic_auth_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header_exists("authorization"))
            .and(query_param_is_missing("oauth_signature"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        // 指向本地明文服务器，但按 HTTPS 商店的方式认证
        let mut client = HttpStoreClient::new(
            reqwest::Client::new(),
            &server.uri(),
            credentials(),
            Duration::from_secs(5),
        )
        .unwrap();
        client.use_basic_auth = true;
        client.get("/wp-json/wc/v2/settings/general").await.unwrap();
    }

    #[test]
    fn https_client_uses_basic_auth() {
        let client = HttpStoreClient::new(
            reqwest::Client::new(),
            "https://shop.example/",
            credentials(),
            Duration::from_secs(1),
        )
        .unwrap();
        assert!(client.use_basic_auth);
        assert_eq!(
            client.endpoint("/wc-api/v3/coupons").unwrap().as_str(),
            "https://shop.example/wc-api/v3/coupons"
        );
    }
}
