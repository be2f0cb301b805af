//! 통합 API 에러 응답 타입.
//!
//! 모든 API 엔드포인트에서 일관된 에러 형식을 제공합니다.
//! 도메인 에러([`UserMgmtError`])와 권한 거부([`AccessDenied`])를
//! HTTP 상태 코드와 JSON 본문으로 변환합니다.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use usermgmt_core::UserMgmtError;
use utoipa::ToSchema;

use crate::auth::AccessDenied;

/// 통합 API 에러 응답.
///
/// # 예시
///
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "사용자를 찾을 수 없습니다: 6c1f...",
///   "timestamp": 1738300800
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "DUPLICATE_NAME", "VALIDATION_ERROR", "NOT_FOUND")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 에러 발생 타임스탬프 (Unix timestamp, 선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    /// 기본 에러 생성 (타임스탬프 포함).
    ///
    /// # Example
    ///
    /// ```
    /// use usermgmt_api::error::ApiErrorResponse;
    ///
    /// let error = ApiErrorResponse::new("NOT_FOUND", "User not found");
    /// assert_eq!(error.code, "NOT_FOUND");
    /// ```
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }
}

/// 토큰 엔드포인트(`/api/login`, `/api/refreshToken`) 에러 본문.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenErrorBody {
    /// 에러 메시지
    pub error_message: String,
}

impl TokenErrorBody {
    /// 상태 코드와 함께 응답 생성.
    pub fn response(status: StatusCode, message: impl Into<String>) -> Response {
        (
            status,
            Json(TokenErrorBody {
                error_message: message.into(),
            }),
        )
            .into_response()
    }
}

/// HTTP 상태 코드가 결정된 API 에러.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP 상태 코드
    pub status: StatusCode,
    /// 응답 본문
    pub body: ApiErrorResponse,
}

impl ApiError {
    /// 새 API 에러 생성.
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiErrorResponse::new(code, message),
        }
    }

    /// 404 에러 생성.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<UserMgmtError> for ApiError {
    fn from(err: UserMgmtError) -> Self {
        let (status, code) = match &err {
            UserMgmtError::DuplicateName(_) => (StatusCode::BAD_REQUEST, "DUPLICATE_NAME"),
            UserMgmtError::UserNotFound(_) | UserMgmtError::RoleNotFound(_) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND")
            }
            UserMgmtError::SubjectNotFound(_) => (StatusCode::NOT_FOUND, "SUBJECT_NOT_FOUND"),
            UserMgmtError::TokenInvalid(_) => (StatusCode::FORBIDDEN, "TOKEN_INVALID"),
            UserMgmtError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            UserMgmtError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            UserMgmtError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DB_ERROR"),
            UserMgmtError::Config(_) | UserMgmtError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        if status.is_server_error() {
            error!(error = %err, "Request failed with server error");
        }

        ApiError::new(status, code, err.to_string())
    }
}

impl From<AccessDenied> for ApiError {
    fn from(denied: AccessDenied) -> Self {
        match denied {
            AccessDenied::Forbidden => {
                ApiError::new(StatusCode::FORBIDDEN, "FORBIDDEN", denied.to_string())
            }
            AccessDenied::NotOwner => {
                ApiError::new(StatusCode::BAD_REQUEST, "NOT_OWNER", denied.to_string())
            }
        }
    }
}

/// API 핸들러 Result 타입 별칭.
///
/// # Example
///
/// ```ignore
/// async fn get_role(
///     State(state): State<Arc<AppState>>,
///     Path(id): Path<Uuid>,
/// ) -> ApiResult<Json<Role>> {
///     let role = state.users.get_role(id).await?
///         .ok_or_else(|| ApiError::not_found(format!("Role {} not found", id)))?;
///     Ok(Json(role))
/// }
/// ```
pub type ApiResult<T> = Result<T, ApiError>;
