//! Repository pattern for database operations.
//!
//! [`CredentialStore`](usermgmt_core::CredentialStore) 구현체를 제공합니다.
//! 서비스 계층은 trait 객체로만 저장소에 접근합니다.

pub mod memory;
pub mod postgres;

pub use memory::MemoryCredentialStore;
pub use postgres::PgCredentialStore;
