//! 사용자/역할 관리 REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API
//! - JWT 인증 (Access/Refresh Token) 및 엔드포인트 정책 기반 권한 판정
//! - PostgreSQL / 메모리 자격증명 저장소
//! - 헬스 체크 엔드포인트
//! - Prometheus 메트릭
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`auth`]: JWT 인증 및 권한 판정
//! - [`services`]: 사용자/역할, 로그인/토큰 갱신 비즈니스 로직
//! - [`repository`]: 자격증명 저장소 구현체
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`middleware`]: HTTP 미들웨어
//! - [`openapi`]: OpenAPI 문서 및 Swagger UI

pub mod auth;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod openapi;
pub mod repository;
pub mod routes;
pub mod services;
pub mod state;

pub use auth::{
    authorize, authorize_endpoint, hash_password, verify_password, AccessDenied, Caller, Claims,
    Endpoint, JwtAuth, JwtAuthError, JwtError, Requirement, TokenIssuer, TokenKind, TokenPair,
};
pub use error::{ApiError, ApiErrorResponse, ApiResult};
pub use metrics::setup_metrics_recorder;
pub use middleware::metrics_layer;
pub use repository::{MemoryCredentialStore, PgCredentialStore};
pub use routes::*;
pub use services::{TokenService, UserService};
pub use state::AppState;

#[cfg(any(test, feature = "test-utils"))]
pub use state::create_test_state;
