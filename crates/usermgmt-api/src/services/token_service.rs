//! 로그인 및 토큰 갱신 서비스.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use usermgmt_core::{UserMgmtError, UserMgmtResult};

use super::UserService;
use crate::auth::{verify_password, TokenIssuer, TokenPair};
use crate::metrics::{record_login, record_token_refresh};

/// 로그인/토큰 갱신 서비스.
#[derive(Clone)]
pub struct TokenService {
    users: UserService,
    issuer: TokenIssuer,
}

impl TokenService {
    /// 새 서비스 생성.
    pub fn new(users: UserService, issuer: TokenIssuer) -> Self {
        Self { users, issuer }
    }

    /// 사용자 이름/비밀번호로 로그인해 토큰 쌍을 발급합니다.
    ///
    /// # Errors
    ///
    /// - `InvalidCredentials`: 사용자가 없거나 비밀번호 불일치
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        issuer_url: &str,
        now: DateTime<Utc>,
    ) -> UserMgmtResult<TokenPair> {
        let result = self.try_login(username, password, issuer_url, now).await;

        match &result {
            Ok(_) => {
                record_login("success");
                info!(username = %username, "Login succeeded");
            }
            Err(UserMgmtError::InvalidCredentials) => {
                record_login("invalid_credentials");
                debug!(username = %username, "Login rejected");
            }
            Err(e) => {
                record_login("error");
                warn!(username = %username, error = %e, "Login failed");
            }
        }

        result
    }

    async fn try_login(
        &self,
        username: &str,
        password: &str,
        issuer_url: &str,
        now: DateTime<Utc>,
    ) -> UserMgmtResult<TokenPair> {
        let record = self
            .users
            .find_record_by_username(username)
            .await?
            .ok_or(UserMgmtError::InvalidCredentials)?;

        if !verify_password(password.to_string(), record.password_hash.clone()).await? {
            return Err(UserMgmtError::InvalidCredentials);
        }

        let user = self
            .users
            .get_user(record.id)
            .await?
            .ok_or(UserMgmtError::InvalidCredentials)?;

        Ok(self
            .issuer
            .issue_pair(&user.username, user.role_names(), issuer_url, now)?)
    }

    /// Refresh Token으로 새 Access Token을 발급합니다.
    ///
    /// 역할은 토큰이 아닌 저장소의 현재 값으로 채웁니다.
    /// 반환되는 Refresh Token은 입력값 그대로입니다.
    ///
    /// # Errors
    ///
    /// - `TokenInvalid`: 서명 불일치, 형식 오류, 만료
    /// - `SubjectNotFound`: 토큰 주체가 더 이상 존재하지 않음
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
        issuer_url: &str,
        now: DateTime<Utc>,
    ) -> UserMgmtResult<TokenPair> {
        let result = self.try_refresh(refresh_token, issuer_url, now).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(UserMgmtError::TokenInvalid(_)) => "invalid_token",
            Err(UserMgmtError::SubjectNotFound(_)) => "subject_not_found",
            Err(_) => "error",
        };
        record_token_refresh(outcome);

        result
    }

    async fn try_refresh(
        &self,
        refresh_token: &str,
        issuer_url: &str,
        now: DateTime<Utc>,
    ) -> UserMgmtResult<TokenPair> {
        let claims = self.issuer.verify(refresh_token, now)?;

        let user = self
            .users
            .get_user_by_username(&claims.sub)
            .await?
            .ok_or_else(|| UserMgmtError::SubjectNotFound(claims.sub.clone()))?;

        let access_token = self
            .issuer
            .issue(&user.username, user.role_names(), issuer_url, now)?;

        debug!(username = %user.username, "Access token refreshed");
        Ok(TokenPair {
            access_token,
            refresh_token: refresh_token.to_string(),
        })
    }
}
