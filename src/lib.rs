//! # WooCommerce REST API 权限探测
//!
//! 引导店主为测试应用签发 REST API 密钥，再用这对密钥逐项访问商店接口，
//! 报告哪些权限真正可用

pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod probe;
pub mod session;
pub mod store_api;
pub mod web;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, Result};
