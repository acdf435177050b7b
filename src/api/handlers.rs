use crate::api::AppState;
use crate::db::RepositoryError;
use crate::error::AppError;
use crate::models::{ActionOutcome, ActionState, Credentials, InvoiceForm};
use crate::service::{AuthOutcome, INVOICES_PATH};
use axum::{
    extract::{Form, Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;

/// 登录失败响应体
#[derive(Debug, Serialize)]
pub struct AuthMessage {
    pub message: String,
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// Action 结果 -> HTTP 响应: 状态 422 / 跳转 303 / 完成 204
fn outcome_response(outcome: ActionOutcome) -> Response {
    match outcome {
        ActionOutcome::State(state) => (StatusCode::UNPROCESSABLE_ENTITY, Json(state)).into_response(),
        ActionOutcome::Redirect(path) => Redirect::to(path).into_response(),
        ActionOutcome::Done => StatusCode::NO_CONTENT.into_response(),
    }
}

/// 发票列表 (经视图缓存)
pub async fn list_invoices(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let body = state
        .cache
        .get_or_render(INVOICES_PATH, || async {
            let invoices = state.store.list(state.list_limit).await?;
            Ok::<_, RepositoryError>(serde_json::json!({ "invoices": invoices }))
        })
        .await?;
    Ok(Json(body))
}

/// 创建发票
pub async fn create_invoice(
    State(state): State<AppState>,
    Form(form): Form<InvoiceForm>,
) -> Response {
    outcome_response(state.actions.create_invoice(&ActionState::default(), &form).await)
}

/// 更新发票
pub async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<InvoiceForm>,
) -> Result<Response, AppError> {
    let outcome = state.actions.update_invoice(&id, &form).await?;
    Ok(outcome_response(outcome))
}

/// 删除发票
pub async fn delete_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    outcome_response(state.actions.delete_invoice(&id).await)
}

/// 账号密码登录
pub async fn authenticate(
    State(state): State<AppState>,
    Form(credentials): Form<Credentials>,
) -> Result<Response, AppError> {
    match state.authenticator.authenticate(None, &credentials).await? {
        AuthOutcome::SignedIn(_) => Ok(Redirect::to(&state.post_login_redirect).into_response()),
        AuthOutcome::Rejected(message) => {
            Ok((StatusCode::UNAUTHORIZED, Json(AuthMessage { message })).into_response())
        }
    }
}
