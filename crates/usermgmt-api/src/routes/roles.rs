//! 역할 관리 endpoint.
//!
//! - `GET /api/roles` - 전체 역할
//! - `GET /api/roles/{id}` - 역할 조회
//! - `POST /api/roles` - 역할 생성 (관리자)

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use usermgmt_core::{NewRole, Role};
use uuid::Uuid;

use crate::auth::{authorize_endpoint, Endpoint, JwtAuth};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// 전체 역할 조회.
#[utoipa::path(
    get,
    path = "/api/roles",
    responses(
        (status = 200, description = "역할 목록", body = Vec<Role>),
        (status = 401, description = "인증 필요")
    ),
    security(("bearer_auth" = [])),
    tag = "roles"
)]
pub async fn list_roles(
    JwtAuth(caller): JwtAuth,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Role>>> {
    authorize_endpoint(&caller, Endpoint::ListRoles, None)?;
    Ok(Json(state.users.get_roles().await?))
}

/// ID로 역할 조회.
#[utoipa::path(
    get,
    path = "/api/roles/{id}",
    params(("id" = Uuid, Path, description = "역할 ID")),
    responses(
        (status = 200, description = "역할", body = Role),
        (status = 404, description = "역할 없음", body = crate::error::ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "roles"
)]
pub async fn get_role(
    JwtAuth(caller): JwtAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Role>> {
    authorize_endpoint(&caller, Endpoint::GetRole, None)?;

    let role = state
        .users
        .get_role(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Role {} not found", id)))?;
    Ok(Json(role))
}

/// 역할 생성.
#[utoipa::path(
    post,
    path = "/api/roles",
    request_body = NewRole,
    responses(
        (status = 201, description = "역할 생성됨", body = Role),
        (status = 400, description = "중복 이름 또는 잘못된 입력", body = crate::error::ApiErrorResponse),
        (status = 403, description = "관리자 권한 필요", body = crate::error::ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "roles"
)]
pub async fn create_role(
    JwtAuth(caller): JwtAuth,
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewRole>,
) -> ApiResult<(StatusCode, Json<Role>)> {
    authorize_endpoint(&caller, Endpoint::CreateRole, None)?;

    let role = state.users.create_role(input).await?;
    Ok((StatusCode::CREATED, Json(role)))
}

/// 역할 라우터 생성.
pub fn roles_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_roles).post(create_role))
        .route("/{id}", get(get_role))
}
