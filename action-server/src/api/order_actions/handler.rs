//! Order Action API Handlers

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use shared::{ActionDescriptor, CollectRequest, CollectResponse, PermissionMap, ScannerBootstrap};

use super::{COLLECT_PATH, FORM_KEY_HEADER};
use crate::auth::CurrentUser;
use crate::core::ServerState;

/// GET /api/order-actions/permissions - 当前角色的权限表
pub async fn permissions(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> Json<PermissionMap> {
    Json(state.resolver.resolve(current_user.role_id).await)
}

/// GET /api/order-actions/catalog - 动作目录 (供管理员授权)
pub async fn catalog(State(state): State<ServerState>) -> Json<Vec<ActionDescriptor>> {
    let catalog = state.resolver.catalog().await;
    Json(catalog.descriptors().cloned().collect())
}

/// GET /api/order-actions/bootstrap - 扫描器启动参数
///
/// 宿主通过 `X-Form-Key` 请求头传入当前会话的表单令牌，原样写入 `form_key`。
pub async fn bootstrap(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    headers: HeaderMap,
) -> Json<ScannerBootstrap> {
    let enabled = state.resolver.settings().enabled;
    let permissions = state.resolver.resolve(current_user.role_id).await;
    let form_key = headers
        .get(FORM_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    Json(ScannerBootstrap {
        enabled,
        collect_url: COLLECT_PATH.to_string(),
        form_key,
        settle_delay_ms: state.config.scan_settle_delay_ms,
        permissions,
    })
}

/// POST /api/order-actions/collect - 合并页面上报的动作
///
/// 所有失败都以 `{success:false}` 形式返回，HTTP 状态始终为 200。
pub async fn collect(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    payload: Result<Json<CollectRequest>, JsonRejection>,
) -> Json<CollectResponse> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::error!(error = %rejection, "Error collecting actions");
            return Json(CollectResponse::failed(rejection.body_text()));
        }
    };

    let actions = match request.actions {
        Some(actions) if !actions.is_empty() => actions,
        _ => return Json(CollectResponse::nothing_to_collect()),
    };

    match state.discovery().merge(&actions).await {
        Ok(total) => {
            tracing::info!(
                user_id = %current_user.id,
                reported = actions.len(),
                total,
                "Collected order actions"
            );
            Json(CollectResponse::collected(total))
        }
        Err(e) => {
            tracing::error!(error = %e, "Error collecting actions");
            Json(CollectResponse::failed(e.to_string()))
        }
    }
}
