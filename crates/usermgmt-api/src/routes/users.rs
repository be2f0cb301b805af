//! 사용자 관리 endpoint.
//!
//! 모든 핸들러는 [`JwtAuth`]로 호출자를 확인한 뒤
//! [`authorize_endpoint`]로 엔드포인트 정책을 한 번 판정합니다.
//!
//! # 엔드포인트
//!
//! - `GET /api/users` - 전체 사용자 (관리자)
//! - `POST /api/users` - 사용자 생성 (관리자)
//! - `GET /api/users/{id}` - 사용자 조회 (본인 또는 관리자)
//! - `PATCH /api/users/{id}` - 표시 이름 변경 (본인만)
//! - `GET /api/users/{id}/roles` - 사용자 역할 조회
//! - `POST /api/users/{id}/roles/{role_id}` - 역할 연결 (관리자)
//! - `DELETE /api/users/{id}/roles/{role_id}` - 역할 해제 (관리자)

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::debug;
use usermgmt_core::{NewUser, ProfileUpdate, Role, User};
use uuid::Uuid;

use crate::auth::{authorize_endpoint, Endpoint, JwtAuth};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

fn user_not_found(id: Uuid) -> ApiError {
    ApiError::not_found(format!("User {} not found", id))
}

/// 전체 사용자 조회.
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "사용자 목록", body = Vec<User>),
        (status = 401, description = "인증 필요"),
        (status = 403, description = "관리자 권한 필요", body = crate::error::ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn list_users(
    JwtAuth(caller): JwtAuth,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<User>>> {
    authorize_endpoint(&caller, Endpoint::ListUsers, None)?;

    let users = state.users.get_users().await?;
    Ok(Json(users))
}

/// 사용자 생성.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = NewUser,
    responses(
        (status = 201, description = "사용자 생성됨", body = User),
        (status = 400, description = "중복 이름 또는 잘못된 입력", body = crate::error::ApiErrorResponse),
        (status = 403, description = "관리자 권한 필요", body = crate::error::ApiErrorResponse),
        (status = 404, description = "존재하지 않는 역할", body = crate::error::ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn create_user(
    JwtAuth(caller): JwtAuth,
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewUser>,
) -> ApiResult<(StatusCode, Json<User>)> {
    authorize_endpoint(&caller, Endpoint::CreateUser, None)?;

    let user = state.users.create_user(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// ID로 사용자 조회.
///
/// 대상이 없으면 404, 본인도 관리자도 아니면 400.
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "사용자 ID")),
    responses(
        (status = 200, description = "사용자", body = User),
        (status = 400, description = "본인 또는 관리자만 조회 가능", body = crate::error::ApiErrorResponse),
        (status = 404, description = "사용자 없음", body = crate::error::ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_user(
    JwtAuth(caller): JwtAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<User>> {
    let user = state
        .users
        .get_user(id)
        .await?
        .ok_or_else(|| user_not_found(id))?;

    authorize_endpoint(&caller, Endpoint::GetUser, Some(&user.username))?;
    Ok(Json(user))
}

/// 표시 이름 변경.
///
/// 본인만 변경할 수 있습니다. 관리자도 예외가 아닙니다.
#[utoipa::path(
    patch,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "사용자 ID")),
    request_body = ProfileUpdate,
    responses(
        (status = 200, description = "변경된 사용자", body = User),
        (status = 400, description = "본인이 아님", body = crate::error::ApiErrorResponse),
        (status = 404, description = "사용자 없음", body = crate::error::ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn update_profile(
    JwtAuth(caller): JwtAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(input): Json<ProfileUpdate>,
) -> ApiResult<Json<User>> {
    let target = state
        .users
        .get_user(id)
        .await?
        .ok_or_else(|| user_not_found(id))?;

    authorize_endpoint(&caller, Endpoint::UpdateProfile, Some(&target.username))?;

    debug!(user_id = %id, "PATCH profile");
    let user = state.users.update_profile(id, input).await?;
    Ok(Json(user))
}

/// 사용자 역할 조회.
#[utoipa::path(
    get,
    path = "/api/users/{id}/roles",
    params(("id" = Uuid, Path, description = "사용자 ID")),
    responses(
        (status = 200, description = "역할 목록", body = Vec<Role>),
        (status = 404, description = "사용자 없음", body = crate::error::ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_user_roles(
    JwtAuth(caller): JwtAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Role>>> {
    authorize_endpoint(&caller, Endpoint::GetUserRoles, None)?;

    let roles = state
        .users
        .get_user_roles(id)
        .await?
        .ok_or_else(|| user_not_found(id))?;
    Ok(Json(roles))
}

/// 사용자에게 역할 연결.
#[utoipa::path(
    post,
    path = "/api/users/{id}/roles/{role_id}",
    params(
        ("id" = Uuid, Path, description = "사용자 ID"),
        ("role_id" = Uuid, Path, description = "역할 ID")
    ),
    responses(
        (status = 201, description = "역할이 연결된 사용자", body = User),
        (status = 403, description = "관리자 권한 필요", body = crate::error::ApiErrorResponse),
        (status = 404, description = "사용자 또는 역할 없음", body = crate::error::ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn attach_role(
    JwtAuth(caller): JwtAuth,
    State(state): State<Arc<AppState>>,
    Path((id, role_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<(StatusCode, Json<User>)> {
    authorize_endpoint(&caller, Endpoint::AttachRole, None)?;

    let user = state.users.attach_role(id, role_id).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// 사용자에게서 역할 해제.
#[utoipa::path(
    delete,
    path = "/api/users/{id}/roles/{role_id}",
    params(
        ("id" = Uuid, Path, description = "사용자 ID"),
        ("role_id" = Uuid, Path, description = "역할 ID")
    ),
    responses(
        (status = 200, description = "역할이 해제된 사용자", body = User),
        (status = 403, description = "관리자 권한 필요", body = crate::error::ApiErrorResponse),
        (status = 404, description = "사용자 또는 역할 없음", body = crate::error::ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn detach_role(
    JwtAuth(caller): JwtAuth,
    State(state): State<Arc<AppState>>,
    Path((id, role_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<User>> {
    authorize_endpoint(&caller, Endpoint::DetachRole, None)?;

    let user = state.users.detach_role(id, role_id).await?;
    Ok(Json(user))
}

/// 사용자 라우터 생성.
pub fn users_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/{id}", get(get_user).patch(update_profile))
        .route("/{id}/roles", get(get_user_roles))
        .route(
            "/{id}/roles/{role_id}",
            post(attach_role).delete(detach_role),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::create_api_router;
    use crate::routes::testing::{bearer, seed_alice_and_bob, send};
    use axum::http::Method;
    use serde_json::{json, Value};
    use usermgmt_core::{ROLE_ADMIN, ROLE_USER};

    #[tokio::test]
    async fn test_list_users_requires_admin() {
        let state = Arc::new(crate::state::create_test_state());
        let seeded = seed_alice_and_bob(&state).await;
        let app = create_api_router().with_state(Arc::clone(&state));

        let (status, _) = send(
            &app,
            Method::GET,
            "/api/users",
            Some(&bearer(&state, "bob", &[ROLE_USER])),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(
            &app,
            Method::GET,
            "/api/users",
            Some(&bearer(&state, "alice", &[ROLE_ADMIN, ROLE_USER])),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let users: Vec<User> = serde_json::from_value(body).unwrap();
        assert!(users.iter().any(|u| u.id == seeded.alice.id));
        assert!(users.iter().all(|u| !u.username.is_empty()));
    }

    #[tokio::test]
    async fn test_list_users_without_token_is_unauthorized() {
        let state = Arc::new(crate::state::create_test_state());
        let app = create_api_router().with_state(state);

        let (status, body) = send(&app, Method::GET, "/api/users", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "MISSING_TOKEN");
    }

    #[tokio::test]
    async fn test_refresh_token_is_not_accepted_as_bearer() {
        let state = Arc::new(crate::state::create_test_state());
        let seeded = seed_alice_and_bob(&state).await;
        let app = create_api_router().with_state(Arc::clone(&state));

        let (status, pair) = send(
            &app,
            Method::POST,
            "/api/login",
            None,
            Some(json!({ "username": "alice", "password": "alice-pw" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let access = pair["access_token"].as_str().unwrap().to_string();
        let refresh = pair["refresh_token"].as_str().unwrap().to_string();

        let (status, _) = send(&app, Method::GET, "/api/users", Some(&access), None).await;
        assert_eq!(status, StatusCode::OK);

        // 관리자 역할 회수
        for role in [&seeded.admin_role, &seeded.user_role] {
            state
                .users
                .detach_role(seeded.alice.id, role.id)
                .await
                .unwrap();
        }

        let (status, body) = send(&app, Method::GET, "/api/users", Some(&refresh), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "INVALID_TOKEN");

        // 재발급한 Access Token은 현재 역할(없음)을 반영
        let (status, renewed) =
            send(&app, Method::GET, "/api/refreshToken", Some(&refresh), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(
            &app,
            Method::GET,
            "/api/users",
            Some(renewed["access_token"].as_str().unwrap()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_user_json_never_contains_password() {
        let state = Arc::new(crate::state::create_test_state());
        let seeded = seed_alice_and_bob(&state).await;
        let app = create_api_router().with_state(Arc::clone(&state));

        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/api/users/{}", seeded.alice.id),
            Some(&bearer(&state, "alice", &[ROLE_ADMIN, ROLE_USER])),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.get("password").is_none());
        assert!(body.get("password_hash").is_none());
        assert_eq!(body["username"], "alice");
    }

    #[tokio::test]
    async fn test_get_user_owner_or_admin() {
        let state = Arc::new(crate::state::create_test_state());
        let seeded = seed_alice_and_bob(&state).await;
        let app = create_api_router().with_state(Arc::clone(&state));
        let bob_token = bearer(&state, "bob", &[ROLE_USER]);

        // 본인 조회
        let (status, _) = send(
            &app,
            Method::GET,
            &format!("/api/users/{}", seeded.bob.id),
            Some(&bob_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        // 타인 조회는 400
        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/api/users/{}", seeded.alice.id),
            Some(&bob_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "NOT_OWNER");

        // 없는 사용자는 권한 판정 전에 404
        let (status, _) = send(
            &app,
            Method::GET,
            &format!("/api/users/{}", Uuid::new_v4()),
            Some(&bob_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_patch_profile_self_only() {
        let state = Arc::new(crate::state::create_test_state());
        let seeded = seed_alice_and_bob(&state).await;
        let app = create_api_router().with_state(Arc::clone(&state));
        let uri = format!("/api/users/{}", seeded.alice.id);
        let payload = json!({ "fullname": "New Name" });

        let (status, _) = send(
            &app,
            Method::PATCH,
            &uri,
            Some(&bearer(&state, "bob", &[ROLE_USER])),
            Some(payload.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            Method::PATCH,
            &uri,
            Some(&bearer(&state, "alice", &[ROLE_ADMIN, ROLE_USER])),
            Some(payload),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let updated: User = serde_json::from_value(body).unwrap();
        assert_eq!(updated.fullname, "New Name");
        assert_eq!(updated.username, "alice");
        assert_eq!(updated.roles, seeded.alice.roles);

        let (status, _) = send(
            &app,
            Method::PATCH,
            &format!("/api/users/{}", Uuid::new_v4()),
            Some(&bearer(&state, "alice", &[ROLE_ADMIN])),
            Some(json!({ "fullname": "x" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_user_and_duplicate() {
        let state = Arc::new(crate::state::create_test_state());
        let seeded = seed_alice_and_bob(&state).await;
        let app = create_api_router().with_state(Arc::clone(&state));
        let admin = bearer(&state, "alice", &[ROLE_ADMIN]);
        let payload = json!({
            "username": "carol",
            "password": "pw",
            "fullname": "Carol",
            "role_ids": [seeded.user_role.id],
        });

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/users",
            Some(&admin),
            Some(payload.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["roles"][0]["name"], ROLE_USER);

        let (status, body) =
            send(&app, Method::POST, "/api/users", Some(&admin), Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "DUPLICATE_NAME");
    }

    #[tokio::test]
    async fn test_attach_and_detach_role() {
        let state = Arc::new(crate::state::create_test_state());
        let seeded = seed_alice_and_bob(&state).await;
        let app = create_api_router().with_state(Arc::clone(&state));
        let admin = bearer(&state, "alice", &[ROLE_ADMIN]);
        let uri = format!(
            "/api/users/{}/roles/{}",
            seeded.bob.id, seeded.admin_role.id
        );

        let (status, body) = send(&app, Method::POST, &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["roles"].as_array().unwrap().len(), 2);

        let (status, body) = send(&app, Method::DELETE, &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        let roles: Vec<Value> = body["roles"].as_array().unwrap().clone();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0]["name"], ROLE_USER);

        // 관리자가 아니면 403
        let (status, _) = send(
            &app,
            Method::POST,
            &uri,
            Some(&bearer(&state, "bob", &[ROLE_USER])),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        // 없는 사용자 / 역할은 404
        let missing_user = format!(
            "/api/users/{}/roles/{}",
            Uuid::new_v4(),
            seeded.admin_role.id
        );
        let (status, _) = send(&app, Method::POST, &missing_user, Some(&admin), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let missing_role = format!("/api/users/{}/roles/{}", seeded.bob.id, Uuid::new_v4());
        let (status, _) = send(&app, Method::DELETE, &missing_role, Some(&admin), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_user_roles_any_caller() {
        let state = Arc::new(crate::state::create_test_state());
        let seeded = seed_alice_and_bob(&state).await;
        let app = create_api_router().with_state(Arc::clone(&state));
        let token = bearer(&state, "bob", &[] as &[&str]);

        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/api/users/{}/roles", seeded.alice.id),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec![ROLE_ADMIN, ROLE_USER]);

        let (status, _) = send(
            &app,
            Method::GET,
            &format!("/api/users/{}/roles", Uuid::new_v4()),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
