//! 사용자 관리 시스템의 에러 타입.
//!
//! 저장소, 서비스, 토큰 처리에서 공통으로 사용하는 도메인 에러를 정의합니다.
//! HTTP 상태 코드로의 변환은 API 크레이트에서 담당합니다.

use thiserror::Error;

/// 핵심 도메인 에러.
#[derive(Debug, Error)]
pub enum UserMgmtError {
    /// 사용자 이름 또는 역할 이름 중복
    #[error("이미 사용 중인 이름입니다: {0}")]
    DuplicateName(String),

    /// 사용자를 찾을 수 없음
    #[error("사용자를 찾을 수 없습니다: {0}")]
    UserNotFound(String),

    /// 역할을 찾을 수 없음
    #[error("역할을 찾을 수 없습니다: {0}")]
    RoleNotFound(String),

    /// 서명 불일치, 형식 오류, 만료된 토큰
    #[error("유효하지 않은 토큰: {0}")]
    TokenInvalid(String),

    /// 토큰 주체(username)에 해당하는 사용자가 없음
    #[error("토큰 주체를 찾을 수 없습니다: {0}")]
    SubjectNotFound(String),

    /// 로그인 실패
    #[error("사용자 이름 또는 비밀번호가 올바르지 않습니다")]
    InvalidCredentials,

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    Validation(String),

    /// 데이터베이스 에러
    #[error("데이터베이스 에러: {0}")]
    Database(String),

    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 사용자 관리 작업을 위한 Result 타입.
pub type UserMgmtResult<T> = Result<T, UserMgmtError>;

impl From<validator::ValidationErrors> for UserMgmtError {
    fn from(err: validator::ValidationErrors) -> Self {
        UserMgmtError::Validation(err.to_string())
    }
}

impl From<config::ConfigError> for UserMgmtError {
    fn from(err: config::ConfigError) -> Self {
        UserMgmtError::Config(err.to_string())
    }
}

#[cfg(feature = "sqlx-support")]
impl From<sqlx::Error> for UserMgmtError {
    fn from(err: sqlx::Error) -> Self {
        // 유니크 인덱스 위반은 중복 이름으로 취급
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return UserMgmtError::DuplicateName(
                    db_err.constraint().unwrap_or("unique constraint").to_string(),
                );
            }
        }
        UserMgmtError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = UserMgmtError::DuplicateName("ROLE_ADMIN".to_string());
        assert!(err.to_string().contains("ROLE_ADMIN"));
    }
}
