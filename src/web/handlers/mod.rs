//! # 请求处理器

pub mod callback;
pub mod initiate;
pub mod report;
pub mod system;
