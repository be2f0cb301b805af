//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.
//! 설정 파일(`config/default.toml`, 선택)과 `USERMGMT__` 접두사 환경 변수를
//! 순서대로 적용합니다.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{UserMgmtError, UserMgmtResult};

/// 개발용 기본 JWT 시크릿. 운영 환경에서는 반드시 교체해야 합니다.
pub const DEFAULT_JWT_SECRET: &str = "dev-secret-key-change-in-production";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 서버 설정
    pub server: ServerConfig,
    /// 데이터베이스 설정
    pub database: DatabaseConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
    /// 인증/토큰 설정
    pub auth: AuthConfig,
    /// 초기 데이터 설정
    pub bootstrap: BootstrapConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_secs: 30,
        }
    }
}

/// 데이터베이스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL 연결 URL. 없으면 메모리 저장소를 사용합니다.
    pub url: Option<String>,
    /// 최대 연결 수
    pub max_connections: u32,
    /// 연결 타임아웃 (초)
    pub connection_timeout_secs: u64,
    /// 시작 시 마이그레이션 실행 여부
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            connection_timeout_secs: 10,
            run_migrations: true,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
    /// 파일명/줄 번호 출력
    pub file_line: bool,
    /// 모듈 경로 출력
    pub target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "usermgmt_api=info,usermgmt_core=info,tower_http=debug".to_string(),
            format: "pretty".to_string(),
            file_line: false,
            target: true,
        }
    }
}

/// 인증/토큰 설정.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC 서명 키
    pub jwt_secret: String,
    /// Access Token 수명 (초)
    pub access_token_ttl_secs: i64,
    /// Refresh Token 수명 (초)
    pub refresh_token_ttl_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            access_token_ttl_secs: 60,
            refresh_token_ttl_secs: 30 * 60,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("access_token_ttl_secs", &self.access_token_ttl_secs)
            .field("refresh_token_ttl_secs", &self.refresh_token_ttl_secs)
            .finish()
    }
}

impl AuthConfig {
    /// 개발용 기본 시크릿을 사용 중인지 확인.
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

/// 초기 데이터(기본 역할, 관리자 계정) 설정.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// 시작 시 기본 역할/사용자 생성 여부
    pub seed_defaults: bool,
    /// 초기 사용자 이름
    pub username: String,
    /// 초기 사용자 비밀번호 (평문, 해싱 후 저장)
    pub password: String,
    /// 초기 사용자 표시 이름
    pub fullname: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            seed_defaults: true,
            username: "user".to_string(),
            password: "1234".to_string(),
            fullname: "User".to_string(),
        }
    }
}

impl std::fmt::Debug for BootstrapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapConfig")
            .field("seed_defaults", &self.seed_defaults)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("fullname", &self.fullname)
            .finish()
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    /// `DATABASE_URL`, `JWT_SECRET` 환경 변수도 인식합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> UserMgmtResult<Self> {
        let builder = config::Config::builder()
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("USERMGMT")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("auth.jwt_secret", std::env::var("JWT_SECRET").ok())?;

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 설정값 검증.
    pub fn validate(&self) -> UserMgmtResult<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(UserMgmtError::Config("auth.jwt_secret is empty".to_string()));
        }
        if self.auth.access_token_ttl_secs <= 0 {
            return Err(UserMgmtError::Config(
                "auth.access_token_ttl_secs must be positive".to_string(),
            ));
        }
        if self.auth.refresh_token_ttl_secs <= 0 {
            return Err(UserMgmtError::Config(
                "auth.refresh_token_ttl_secs must be positive".to_string(),
            ));
        }
        if self.bootstrap.seed_defaults
            && (self.bootstrap.username.is_empty() || self.bootstrap.password.is_empty())
        {
            return Err(UserMgmtError::Config(
                "bootstrap.username and bootstrap.password are required when seeding".to_string(),
            ));
        }
        Ok(())
    }

    /// `host:port` 바인딩 주소.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
