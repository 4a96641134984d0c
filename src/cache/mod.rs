//! # 会话存储模块
//!
//! 键值存储抽象及其 Redis / 内存实现

pub mod client;
pub mod keys;
pub mod memory;
pub mod store;

pub use client::RedisSessionStore;
pub use keys::{SessionField, SessionKey};
pub use memory::MemorySessionStore;
pub use store::{SessionStore, SharedSessionStore, connect_session_store};
