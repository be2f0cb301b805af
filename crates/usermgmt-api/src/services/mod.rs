//! 비즈니스 서비스 계층.
//!
//! - [`UserService`]: 사용자/역할 생성, 역할 연결, 프로필 수정, 조회, 초기 데이터
//! - [`TokenService`]: 로그인, Refresh Token으로 Access Token 재발급

pub mod token_service;
pub mod user_service;

pub use token_service::TokenService;
pub use user_service::UserService;
