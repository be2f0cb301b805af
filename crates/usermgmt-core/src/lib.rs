//! # User Management Core
//!
//! 사용자/역할 관리 서비스의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 사용자, 역할 도메인 모델
//! - 자격증명 저장소 추상화 ([`CredentialStore`])
//! - 도메인 에러 타입
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use self::config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
