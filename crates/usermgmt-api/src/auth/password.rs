//! 비밀번호 해싱 유틸리티.
//!
//! Argon2id 기반 비밀번호 해싱 및 검증. 해싱은 CPU를 많이 사용하므로
//! 비동기 핸들러에서는 `*_blocking` 대신 `spawn_blocking` 래퍼를 사용합니다.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use usermgmt_core::UserMgmtError;

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("비밀번호 해싱 실패")]
    HashingFailed,
    #[error("잘못된 해시 형식")]
    InvalidHashFormat,
    #[error("해싱 작업이 중단되었습니다")]
    TaskAborted,
}

impl From<PasswordError> for UserMgmtError {
    fn from(err: PasswordError) -> Self {
        UserMgmtError::Internal(err.to_string())
    }
}

/// 비밀번호 해싱.
///
/// 솔트는 자동으로 생성되며 PHC 형식 문자열(`$argon2id$...`)을 반환합니다.
fn hash_password_blocking(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| PasswordError::HashingFailed)?;

    Ok(hash.to_string())
}

/// 비밀번호 검증.
///
/// 일치하면 `Ok(true)`, 불일치하면 `Ok(false)`.
/// 저장된 해시가 PHC 형식이 아니면 에러를 반환합니다.
fn verify_password_blocking(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// blocking thread pool에서 비밀번호 해싱.
pub async fn hash_password(password: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password_blocking(&password))
        .await
        .map_err(|_| PasswordError::TaskAborted)?
}

/// blocking thread pool에서 비밀번호 검증.
pub async fn verify_password(password: String, hash: String) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || verify_password_blocking(&password, &hash))
        .await
        .map_err(|_| PasswordError::TaskAborted)?
}
