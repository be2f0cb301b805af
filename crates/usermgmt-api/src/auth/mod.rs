//! 인증 및 권한 부여.
//!
//! JWT 기반 인증 및 역할 기반 접근 제어(RBAC)를 제공합니다.
//!
//! # 구성 요소
//!
//! - [`TokenIssuer`]: Access/Refresh Token 발급 및 검증
//! - [`JwtAuth`]: Axum 핸들러용 JWT 검증 추출기
//! - [`Caller`], [`Endpoint`], [`authorize_endpoint`]: 엔드포인트 정책 기반 권한 판정
//! - 비밀번호 해싱/검증 함수
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! async fn list_users(
//!     State(state): State<Arc<AppState>>,
//!     JwtAuth(caller): JwtAuth,
//! ) -> ApiResult<Json<Vec<User>>> {
//!     authorize_endpoint(&caller, Endpoint::ListUsers, None)?;
//!     Ok(Json(state.users.get_users().await?))
//! }
//! ```

mod guard;
mod jwt;
mod middleware;
mod password;

pub use guard::{authorize, authorize_endpoint, AccessDenied, Caller, Endpoint, Requirement};
pub use jwt::{Claims, JwtError, TokenIssuer, TokenKind, TokenPair};
pub use middleware::{bearer_token, JwtAuth, JwtAuthError};
pub use password::{hash_password, verify_password, PasswordError};
