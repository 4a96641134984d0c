//! # Web 服务模块
//!
//! 授权发起、凭证回调、授权返回三个入口以及页面渲染

pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod render;
pub mod routes;
pub mod server;
pub mod state;

pub use routes::create_routes;
pub use server::{WebServer, build_router};
pub use state::AppState;
