//! API 라우트.
//!
//! 모든 REST API 엔드포인트를 정의하고 라우터를 구성합니다.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/api/login`, `/api/refreshToken` - 토큰 발급/갱신
//! - `/api/users` - 사용자 관리
//! - `/api/roles` - 역할 관리

pub mod health;
pub mod roles;
pub mod token;
pub mod users;

pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use roles::roles_router;
pub use token::{token_router, LoginRequest};
pub use users::users_router;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// 전체 API 라우터 생성.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        // 헬스 체크 엔드포인트
        .nest("/health", health_router())
        // 토큰 엔드포인트 (/api/login, /api/refreshToken)
        .merge(token_router())
        .nest("/api/users", users_router())
        .nest("/api/roles", roles_router())
}
