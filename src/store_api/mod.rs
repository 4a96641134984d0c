//! # 远程商店 API
//!
//! 密钥对解析、OAuth 1.0a 签名与带认证的 REST 客户端

pub mod client;
pub mod credentials;
pub mod oauth;

pub use client::{HttpStoreClient, HttpStoreClientFactory, StoreClient, StoreClientFactory};
pub use credentials::StoreCredentials;

#[cfg(test)]
pub use client::MockStoreClient;
