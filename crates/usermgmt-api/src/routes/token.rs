//! 토큰 endpoint.
//!
//! - `POST /api/login` - 사용자 이름/비밀번호로 토큰 쌍 발급
//! - `GET /api/refreshToken` - Refresh Token으로 Access Token 재발급
//!
//! 두 엔드포인트의 에러 본문은 `{"error_message": "..."}` 형식입니다.

use std::sync::Arc;

use axum::{
    extract::{OriginalUri, State},
    http::{header::HOST, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::error;
use usermgmt_core::UserMgmtError;
use utoipa::ToSchema;

use crate::auth::{bearer_token, TokenPair};
use crate::error::TokenErrorBody;
use crate::state::AppState;

/// 로그인 요청.
#[derive(Clone, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    /// 사용자 이름
    pub username: String,
    /// 비밀번호
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// 토큰 발급자(`iss`)로 쓸 요청 URL.
///
/// 프록시 뒤에서는 `X-Forwarded-Proto`를 따릅니다.
pub fn issuer_url(headers: &HeaderMap, uri: &Uri) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| uri.authority().map(|a| a.as_str()))
        .unwrap_or("localhost");

    format!("{}://{}{}", scheme, host, uri.path())
}

/// 로그인.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "토큰 발급 성공", body = TokenPair),
        (status = 401, description = "사용자 이름 또는 비밀번호 불일치", body = TokenErrorBody)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Response {
    let issuer = issuer_url(&headers, &uri);

    match state
        .auth
        .login(&request.username, &request.password, &issuer, Utc::now())
        .await
    {
        Ok(pair) => (StatusCode::OK, Json(pair)).into_response(),
        Err(UserMgmtError::InvalidCredentials) => TokenErrorBody::response(
            StatusCode::UNAUTHORIZED,
            UserMgmtError::InvalidCredentials.to_string(),
        ),
        Err(e) => {
            error!(error = %e, "Login failed");
            TokenErrorBody::response(StatusCode::INTERNAL_SERVER_ERROR, "Login failed")
        }
    }
}

/// Refresh Token으로 Access Token 재발급.
///
/// `Authorization: Bearer <refresh token>` 헤더가 필요합니다.
/// 반환되는 `refresh_token`은 요청에 사용한 값 그대로입니다.
#[utoipa::path(
    get,
    path = "/api/refreshToken",
    responses(
        (status = 200, description = "재발급 성공", body = TokenPair),
        (status = 400, description = "Authorization 헤더 없음", body = TokenErrorBody),
        (status = 403, description = "유효하지 않은 토큰", body = TokenErrorBody),
        (status = 404, description = "토큰 주체 없음", body = TokenErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> Response {
    let token = match bearer_token(&headers) {
        Ok(token) => token,
        Err(e) => return TokenErrorBody::response(StatusCode::BAD_REQUEST, e.to_string()),
    };
    let issuer = issuer_url(&headers, &uri);

    match state
        .auth
        .refresh_access_token(token, &issuer, Utc::now())
        .await
    {
        Ok(pair) => (StatusCode::OK, Json(pair)).into_response(),
        Err(UserMgmtError::TokenInvalid(message)) => {
            TokenErrorBody::response(StatusCode::FORBIDDEN, message)
        }
        Err(UserMgmtError::SubjectNotFound(_)) => {
            TokenErrorBody::response(StatusCode::NOT_FOUND, "User not found.")
        }
        Err(e) => {
            error!(error = %e, "Token refresh failed");
            TokenErrorBody::response(StatusCode::FORBIDDEN, "Token refresh failed")
        }
    }
}

/// 토큰 라우터 생성.
pub fn token_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/login", post(login))
        .route("/api/refreshToken", get(refresh_token))
}
