//! Order Action API Module
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/order-actions/permissions | GET | 当前角色的动作权限表 |
//! | /api/order-actions/catalog | GET | 内置 + 已发现动作目录 |
//! | /api/order-actions/bootstrap | GET | 页面扫描器启动参数 |
//! | /api/order-actions/collect | POST | 上报页面中发现的动作 |
//!
//! 全部接口要求登录并拥有 `orders:view` 权限。

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::{ORDERS_VIEW_PERMISSION, require_permission};
use crate::core::ServerState;

/// 收集接口路径 (写入扫描器启动参数)
pub const COLLECT_PATH: &str = "/api/order-actions/collect";

/// 宿主传入会话表单令牌的请求头
pub const FORM_KEY_HEADER: &str = "x-form-key";

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/order-actions/permissions", get(handler::permissions))
        .route("/api/order-actions/catalog", get(handler::catalog))
        .route("/api/order-actions/bootstrap", get(handler::bootstrap))
        .route(COLLECT_PATH, post(handler::collect))
        .layer(middleware::from_fn(require_permission(ORDERS_VIEW_PERMISSION)))
}
