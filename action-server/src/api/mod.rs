//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`order_actions`] - 订单动作权限与发现接口

pub mod health;
pub mod order_actions;

use std::time::Duration;

use axum::{Router, extract::DefaultBodyLimit, middleware};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::core::ServerState;

/// 组装完整应用 (路由 + 中间件 + 状态)
pub fn build_app(state: ServerState) -> Router {
    let timeout = Duration::from_millis(state.config.request_timeout_ms);

    Router::new()
        .merge(health::router())
        .merge(order_actions::router())
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(DefaultBodyLimit::max(256 * 1024))
        .layer(TimeoutLayer::with_status_code(
            http::StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
