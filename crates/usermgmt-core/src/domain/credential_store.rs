//! 자격증명 저장소 추상화.
//!
//! 사용자 레코드, 역할 레코드, 사용자↔역할 연관 테이블에 대한 저장소 중립적인
//! 인터페이스를 제공합니다. 구현체는 PostgreSQL(sqlx)과 메모리 저장소가 있습니다.
//!
//! 이름 유일성(사용자 이름, 역할 이름)은 구현체가 원자적으로 보장해야 합니다.
//! 확인 후 삽입 사이의 경합은 저장소 수준의 유니크 제약으로 막습니다.

use async_trait::async_trait;
use uuid::Uuid;

use super::{Role, UserRecord};
use crate::error::UserMgmtResult;

/// 자격증명 저장소 trait.
///
/// 모든 조회 메서드는 대상이 없을 때 `Ok(None)`을 반환합니다.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// 사용자 레코드와 역할 연결을 한 번에 삽입.
    ///
    /// 사용자 행과 `role_ids` 연결은 전부 저장되거나 전부 저장되지 않습니다.
    ///
    /// # Errors
    ///
    /// - `UserMgmtError::DuplicateName`: 같은 사용자 이름이 이미 존재
    /// - `UserMgmtError::RoleNotFound`: 존재하지 않는 역할 ID
    async fn insert_user(
        &self,
        record: UserRecord,
        role_ids: &[Uuid],
    ) -> UserMgmtResult<UserRecord>;

    /// ID로 사용자 조회.
    async fn find_user(&self, id: Uuid) -> UserMgmtResult<Option<UserRecord>>;

    /// 사용자 이름으로 조회.
    async fn find_user_by_username(&self, username: &str) -> UserMgmtResult<Option<UserRecord>>;

    /// 전체 사용자 조회 (사용자 이름순).
    async fn list_users(&self) -> UserMgmtResult<Vec<UserRecord>>;

    /// 표시 이름만 변경. 대상이 없으면 false.
    async fn update_fullname(&self, id: Uuid, fullname: &str) -> UserMgmtResult<bool>;

    /// 역할 삽입.
    ///
    /// # Errors
    ///
    /// - `UserMgmtError::DuplicateName`: 같은 역할 이름이 이미 존재
    async fn insert_role(&self, role: Role) -> UserMgmtResult<Role>;

    /// ID로 역할 조회.
    async fn find_role(&self, id: Uuid) -> UserMgmtResult<Option<Role>>;

    /// 이름으로 역할 조회.
    async fn find_role_by_name(&self, name: &str) -> UserMgmtResult<Option<Role>>;

    /// 전체 역할 조회 (이름순).
    async fn list_roles(&self) -> UserMgmtResult<Vec<Role>>;

    /// 사용자에게 연결된 역할 조회 (이름순).
    async fn roles_of_user(&self, user_id: Uuid) -> UserMgmtResult<Vec<Role>>;

    /// 사용자↔역할 연결. 이미 연결되어 있으면 아무것도 하지 않습니다.
    async fn link_role(&self, user_id: Uuid, role_id: Uuid) -> UserMgmtResult<()>;

    /// 사용자↔역할 연결 해제. 연결이 없으면 아무것도 하지 않습니다.
    async fn unlink_role(&self, user_id: Uuid, role_id: Uuid) -> UserMgmtResult<()>;

    /// 저장소 연결 상태 확인.
    async fn ping(&self) -> UserMgmtResult<()>;

    /// 저장소 이름 반환. 로깅 및 헬스 체크에 사용됩니다.
    fn backend_name(&self) -> &'static str;
}
