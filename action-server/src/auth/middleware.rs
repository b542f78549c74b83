//! 认证中间件
//!
//! 为 JWT 认证和授权提供 Axum 中间件

use std::future::Future;
use std::pin::Pin;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{AppError, AppResult};
use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;

/// 认证中间件 - 要求用户登录
///
/// 从 `Authorization: Bearer <token>` 头提取并验证 JWT，
/// 成功后将 [`CurrentUser`] 注入请求扩展。
///
/// 跳过: `OPTIONS *` (CORS 预检) 与非 `/api/` 路径。
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> AppResult<Response> {
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    if !req.uri().path().starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    let user = authenticate(&state, req.headers(), req.uri())?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// 校验请求头中的令牌
pub(crate) fn authenticate(
    state: &ServerState,
    headers: &http::HeaderMap,
    uri: &http::Uri,
) -> AppResult<CurrentUser> {
    let auth_header = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", uri));
            return Err(AppError::unauthorized());
        }
    };

    match state.jwt_service.validate_token(token) {
        Ok(claims) => Ok(CurrentUser::from(claims)),
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", uri)
            );

            match e {
                JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}

/// `from_fn` 中间件返回的 future
type MiddlewareFuture = Pin<Box<dyn Future<Output = AppResult<Response>> + Send>>;

/// 权限检查中间件 - 要求特定权限
///
/// 必须位于 [`require_auth`] 之内 (依赖其注入的 [`CurrentUser`])。
///
/// ```ignore
/// Router::new()
///     .route("/api/order-actions/collect", post(handler::collect))
///     .layer(middleware::from_fn(require_permission("orders:view")));
/// ```
pub fn require_permission(
    permission: &'static str,
) -> impl Fn(Request, Next) -> MiddlewareFuture + Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            match req.extensions().get::<CurrentUser>() {
                Some(user) => ensure_permission(user, permission)?,
                None => return Err(AppError::unauthorized()),
            }
            Ok(next.run(req).await)
        })
    }
}

/// 403 unless `user` holds `permission`
pub(crate) fn ensure_permission(user: &CurrentUser, permission: &str) -> AppResult<()> {
    if user.has_permission(permission) {
        return Ok(());
    }

    security_log!(
        "WARN",
        "permission_denied",
        user_id = user.id.clone(),
        role_id = user.role_id.unwrap_or_default(),
        required_permission = permission
    );
    Err(AppError::forbidden(format!("Permission denied: {}", permission)))
}
