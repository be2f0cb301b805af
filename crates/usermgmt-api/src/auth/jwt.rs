//! JWT 토큰 처리.
//!
//! Access Token / Refresh Token 발급과 검증 로직.
//! 모든 연산은 입력, 서명 키, 호출자가 넘긴 현재 시각만으로 결정됩니다.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use usermgmt_core::{AuthConfig, UserMgmtError};
use utoipa::ToSchema;

/// 토큰 종류.
///
/// 보호된 엔드포인트는 `Access`만 받습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT 페이로드.
///
/// Access Token과 Refresh Token은 같은 클레임 구조를 쓰며 `typ`과 수명만 다릅니다.
/// `iat`/`exp`는 초 단위로 내림한 Unix timestamp입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - 사용자 이름
    pub sub: String,
    /// 발급 시점의 역할 이름 스냅샷
    pub roles: Vec<String>,
    /// Issuer - 토큰을 발급한 요청 URL
    pub iss: String,
    /// 토큰 종류
    pub typ: TokenKind,
    /// Issued At (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// 새로운 Claims 생성.
    ///
    /// # Arguments
    ///
    /// * `username` - 토큰 주체
    /// * `roles` - 역할 이름 목록
    /// * `issuer` - 발급 요청 URL
    /// * `kind` - 토큰 종류
    /// * `now` - 발급 시각
    /// * `ttl` - 토큰 수명
    pub fn new(
        username: impl Into<String>,
        roles: Vec<String>,
        issuer: impl Into<String>,
        kind: TokenKind,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        let iat = now.timestamp();
        Self {
            sub: username.into(),
            roles,
            iss: issuer.into(),
            typ: kind,
            iat,
            exp: iat + ttl.num_seconds(),
        }
    }
}

/// Access Token + Refresh Token 페어.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TokenPair {
    /// Access Token
    pub access_token: String,
    /// Refresh Token
    pub refresh_token: String,
}

/// JWT 토큰 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("토큰 인코딩 실패: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),
    #[error("토큰 서명이 일치하지 않습니다")]
    InvalidSignature,
    #[error("토큰이 만료되었습니다")]
    TokenExpired,
    #[error("아직 유효하지 않은 토큰입니다")]
    NotYetValid,
    #[error("잘못된 토큰 형식")]
    InvalidToken,
    #[error("Access Token이 아닙니다")]
    WrongKind,
}

impl From<JwtError> for UserMgmtError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::EncodingError(e) => UserMgmtError::Internal(e.to_string()),
            other => UserMgmtError::TokenInvalid(other.to_string()),
        }
    }
}

/// 토큰 발급/검증기.
///
/// HS256 서명 키와 토큰 수명을 보관합니다. 상태를 갖지 않으므로 자유롭게 복제해
/// 사용할 수 있습니다.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    secret: SecretString,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    /// 새 발급기 생성.
    ///
    /// # Arguments
    ///
    /// * `secret` - HMAC 서명 키
    /// * `access_ttl_secs` - Access Token 수명 (초)
    /// * `refresh_ttl_secs` - Refresh Token 수명 (초)
    pub fn new(secret: impl Into<String>, access_ttl_secs: i64, refresh_ttl_secs: i64) -> Self {
        Self {
            secret: SecretString::from(secret.into()),
            access_ttl: Duration::seconds(access_ttl_secs),
            refresh_ttl: Duration::seconds(refresh_ttl_secs),
        }
    }

    /// 인증 설정에서 발급기 생성.
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            config.jwt_secret.clone(),
            config.access_token_ttl_secs,
            config.refresh_token_ttl_secs,
        )
    }

    /// Access Token 수명 (초).
    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl.num_seconds()
    }

    /// Access Token 발급.
    ///
    /// `exp = now + access_ttl`.
    pub fn issue(
        &self,
        username: &str,
        roles: Vec<String>,
        issuer: &str,
        now: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        self.sign(&Claims::new(
            username,
            roles,
            issuer,
            TokenKind::Access,
            now,
            self.access_ttl,
        ))
    }

    /// Refresh Token 발급.
    ///
    /// 서명 키는 Access Token과 같고 `typ`과 수명이 다릅니다.
    pub fn issue_refresh(
        &self,
        username: &str,
        roles: Vec<String>,
        issuer: &str,
        now: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        self.sign(&Claims::new(
            username,
            roles,
            issuer,
            TokenKind::Refresh,
            now,
            self.refresh_ttl,
        ))
    }

    /// Access Token + Refresh Token 쌍 발급.
    pub fn issue_pair(
        &self,
        username: &str,
        roles: Vec<String>,
        issuer: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, JwtError> {
        let access_token = self.issue(username, roles.clone(), issuer, now)?;
        let refresh_token = self.issue_refresh(username, roles, issuer, now)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// 토큰 검증 및 디코딩. 토큰 종류는 확인하지 않습니다.
    ///
    /// `now`가 `[iat, exp)` 구간 밖이면 실패합니다. 시계 오차 허용(leeway)은 없습니다.
    /// 비교는 초 단위이므로 `now`의 초 미만 부분은 버립니다.
    ///
    /// # Errors
    ///
    /// - `JwtError::InvalidSignature`: 서명 키 불일치 또는 변조
    /// - `JwtError::InvalidToken`: 구조/클레임 형식 오류
    /// - `JwtError::TokenExpired`: `now >= exp`
    /// - `JwtError::NotYetValid`: `now < iat`
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        // 만료는 시스템 시계가 아닌 `now` 기준으로 아래에서 확인
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.expose_secret().as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => JwtError::InvalidSignature,
            _ => JwtError::InvalidToken,
        })?;

        let claims = data.claims;
        let now_ts = now.timestamp();
        if now_ts >= claims.exp {
            return Err(JwtError::TokenExpired);
        }
        if now_ts < claims.iat {
            return Err(JwtError::NotYetValid);
        }

        Ok(claims)
    }

    /// Access Token 검증. Refresh Token이면 `JwtError::WrongKind`.
    pub fn verify_access(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, JwtError> {
        let claims = self.verify(token, now)?;
        if claims.typ != TokenKind::Access {
            return Err(JwtError::WrongKind);
        }
        Ok(claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(self.secret.expose_secret().as_bytes()),
        )
        .map_err(JwtError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const TEST_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";
    const ISSUER: &str = "http://localhost/api/login";

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(TEST_SECRET, 60, 1800)
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn roles() -> Vec<String> {
        vec!["ROLE_ADMIN".to_string(), "ROLE_USER".to_string()]
    }

    #[test]
    fn test_issue_and_verify() {
        let token = issuer().issue("alice", roles(), ISSUER, t0()).unwrap();
        assert!(!token.is_empty());

        let claims = issuer().verify(&token, t0()).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.roles, roles());
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.exp - claims.iat, 60);
    }

    #[test]
    fn test_verify_window_is_half_open() {
        let token = issuer().issue("alice", roles(), ISSUER, t0()).unwrap();

        assert!(issuer().verify(&token, t0() + Duration::seconds(59)).is_ok());
        assert!(matches!(
            issuer().verify(&token, t0() + Duration::seconds(60)),
            Err(JwtError::TokenExpired)
        ));
        assert!(matches!(
            issuer().verify(&token, t0() + Duration::seconds(3600)),
            Err(JwtError::TokenExpired)
        ));
        assert!(matches!(
            issuer().verify(&token, t0() - Duration::seconds(1)),
            Err(JwtError::NotYetValid)
        ));
    }

    #[test]
    fn test_wrong_secret() {
        let token = issuer().issue("alice", roles(), ISSUER, t0()).unwrap();
        let other = TokenIssuer::new("wrong-secret-key-for-testing-minimum-32-chars", 60, 1800);

        assert!(matches!(
            other.verify(&token, t0()),
            Err(JwtError::InvalidSignature)
        ));
    }

    #[test]
    fn test_tampered_signature() {
        let token = issuer().issue("alice", roles(), ISSUER, t0()).unwrap();
        let mut tampered = token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });

        assert!(issuer().verify(&tampered, t0()).is_err());
    }

    #[test]
    fn test_malformed_token() {
        assert!(matches!(
            issuer().verify("invalid.token.here", t0()),
            Err(JwtError::InvalidToken)
        ));
        assert!(issuer().verify("", t0()).is_err());
    }

    #[test]
    fn test_issue_pair_lifetimes() {
        let pair = issuer().issue_pair("bob", vec![], ISSUER, t0()).unwrap();

        let access = issuer().verify(&pair.access_token, t0()).unwrap();
        let refresh = issuer().verify(&pair.refresh_token, t0()).unwrap();
        assert_eq!(access.exp - access.iat, 60);
        assert_eq!(refresh.exp - refresh.iat, 1800);

        // Access Token 만료 이후에도 Refresh Token은 유효
        let later = t0() + Duration::seconds(120);
        assert!(issuer().verify(&pair.access_token, later).is_err());
        assert!(issuer().verify(&pair.refresh_token, later).is_ok());
    }

    #[test]
    fn test_token_kind_claim() {
        let pair = issuer().issue_pair("bob", roles(), ISSUER, t0()).unwrap();

        let access = issuer().verify(&pair.access_token, t0()).unwrap();
        let refresh = issuer().verify(&pair.refresh_token, t0()).unwrap();
        assert_eq!(access.typ, TokenKind::Access);
        assert_eq!(refresh.typ, TokenKind::Refresh);

        assert!(issuer().verify_access(&pair.access_token, t0()).is_ok());
        assert!(matches!(
            issuer().verify_access(&pair.refresh_token, t0()),
            Err(JwtError::WrongKind)
        ));
    }

    #[test]
    fn test_sub_second_issue_time_truncates_to_whole_seconds() {
        let issued = t0() + Duration::milliseconds(900);
        let token = issuer().issue("alice", roles(), ISSUER, issued).unwrap();
        let claims = issuer().verify(&token, issued).unwrap();
        assert_eq!(claims.iat, t0().timestamp());
        assert_eq!(claims.exp, t0().timestamp() + 60);

        // 같은 초 안이면 발급 시각 이전이라도 유효
        assert!(issuer().verify(&token, t0()).is_ok());
        assert!(issuer()
            .verify(&token, t0() + Duration::milliseconds(59_999))
            .is_ok());
        assert!(matches!(
            issuer().verify(&token, t0() + Duration::seconds(60)),
            Err(JwtError::TokenExpired)
        ));
    }

    #[test]
    fn test_jwt_error_maps_to_token_invalid() {
        let err: UserMgmtError = JwtError::TokenExpired.into();
        assert!(matches!(err, UserMgmtError::TokenInvalid(_)));
    }
}
