//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 모든 API 핸들러에서 공유되는 상태를 관리합니다.
//! Arc로 래핑되어 여러 요청 간에 안전하게 공유됩니다.

use std::sync::Arc;

use usermgmt_core::CredentialStore;

use crate::auth::TokenIssuer;
use crate::services::{TokenService, UserService};

/// 애플리케이션 공유 상태.
///
/// Axum의 State extractor를 통해 핸들러에 주입됩니다.
#[derive(Clone)]
pub struct AppState {
    /// 자격증명 저장소 (PostgreSQL 또는 메모리)
    pub store: Arc<dyn CredentialStore>,

    /// 사용자/역할 서비스
    pub users: UserService,

    /// 로그인/토큰 갱신 서비스
    pub auth: TokenService,

    /// JWT 발급/검증기 - 요청 인증에 사용
    pub tokens: TokenIssuer,

    /// 데이터베이스 연결 풀 (PostgreSQL 저장소 사용 시)
    pub db_pool: Option<sqlx::PgPool>,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새로운 AppState 생성.
    ///
    /// # 인자
    /// * `store` - 자격증명 저장소
    /// * `tokens` - JWT 발급/검증기
    pub fn new(store: Arc<dyn CredentialStore>, tokens: TokenIssuer) -> Self {
        let users = UserService::new(Arc::clone(&store));
        let auth = TokenService::new(users.clone(), tokens.clone());

        Self {
            store,
            users,
            auth,
            tokens,
            db_pool: None,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 데이터베이스 연결 풀 설정.
    pub fn with_db_pool(mut self, pool: sqlx::PgPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// 서버 업타임 (초).
    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }
}

/// 테스트용 JWT 서명 키.
#[cfg(any(test, feature = "test-utils"))]
pub const TEST_JWT_SECRET: &str = "test-secret-key";

/// 테스트용 AppState 생성.
///
/// 메모리 저장소와 고정 서명 키를 사용합니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    use crate::repository::MemoryCredentialStore;

    AppState::new(
        Arc::new(MemoryCredentialStore::new()),
        TokenIssuer::new(TEST_JWT_SECRET, 60, 1800),
    )
}
