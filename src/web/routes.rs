//! # 路由配置

use axum::Router;
use axum::routing::{get, post};

use super::AppState;
use super::handlers::{callback, initiate, report, system};

/// 创建业务路由
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            get(initiate::index_handler).post(initiate::initiate_handler),
        )
        .route("/callback", post(callback::callback_handler))
        .route("/return", get(report::return_handler))
        .route("/ping", get(system::ping_handler))
        .with_state(state)
}
