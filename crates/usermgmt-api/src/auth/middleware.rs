//! Axum용 JWT 인증 추출기.
//!
//! `Authorization: Bearer <access token>` 헤더를 검증해 [`Caller`]를 만듭니다.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;

use super::{jwt::JwtError, Caller};
use crate::state::AppState;

/// JWT 인증 추출기.
///
/// # 사용 예시
///
/// ```rust,ignore
/// async fn protected_handler(JwtAuth(caller): JwtAuth) -> impl IntoResponse {
///     format!("Authenticated user: {}", caller.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct JwtAuth(pub Caller);

/// JWT 인증 에러.
#[derive(Debug, thiserror::Error)]
pub enum JwtAuthError {
    #[error("인증 토큰이 필요합니다")]
    MissingToken,
    #[error("잘못된 Authorization 헤더 형식")]
    InvalidAuthHeader,
    #[error("토큰이 만료되었습니다")]
    TokenExpired,
    #[error("유효하지 않은 토큰")]
    InvalidToken,
}

impl IntoResponse for JwtAuthError {
    fn into_response(self) -> Response {
        let code = match &self {
            JwtAuthError::MissingToken => "MISSING_TOKEN",
            JwtAuthError::InvalidAuthHeader => "INVALID_AUTH_HEADER",
            JwtAuthError::TokenExpired => "TOKEN_EXPIRED",
            JwtAuthError::InvalidToken => "INVALID_TOKEN",
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.to_string()
            }
        }));

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

/// `Authorization` 헤더에서 Bearer 토큰 추출.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, JwtAuthError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(JwtAuthError::MissingToken)?;

    auth_header
        .strip_prefix("Bearer ")
        .filter(|t| !t.is_empty())
        .ok_or(JwtAuthError::InvalidAuthHeader)
}

impl FromRequestParts<Arc<AppState>> for JwtAuth {
    type Rejection = JwtAuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;

        // Refresh Token은 보호된 엔드포인트에서 거부 (WrongKind -> INVALID_TOKEN)
        let claims = state
            .tokens
            .verify_access(token, Utc::now())
            .map_err(|e| match e {
                JwtError::TokenExpired => JwtAuthError::TokenExpired,
                _ => JwtAuthError::InvalidToken,
            })?;

        Ok(JwtAuth(Caller::from_claims(&claims)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert!(matches!(
            bearer_token(&headers),
            Err(JwtAuthError::MissingToken)
        ));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(matches!(
            bearer_token(&headers),
            Err(JwtAuthError::InvalidAuthHeader)
        ));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(matches!(
            bearer_token(&headers),
            Err(JwtAuthError::InvalidAuthHeader)
        ));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_jwt_auth_error_responses_are_unauthorized() {
        for error in [
            JwtAuthError::MissingToken,
            JwtAuthError::InvalidAuthHeader,
            JwtAuthError::TokenExpired,
            JwtAuthError::InvalidToken,
        ] {
            assert_eq!(error.into_response().status(), StatusCode::UNAUTHORIZED);
        }
    }
}
