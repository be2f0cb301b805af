//! 메모리 자격증명 저장소.
//!
//! 데이터베이스 없이 실행하거나 테스트할 때 사용합니다.
//! 모든 쓰기는 단일 쓰기 잠금 안에서 이루어지므로 이름 확인과 삽입이 원자적입니다.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use usermgmt_core::{CredentialStore, Role, UserMgmtError, UserMgmtResult, UserRecord};
use uuid::Uuid;

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, UserRecord>,
    roles: HashMap<Uuid, Role>,
    /// (user_id, role_id)
    links: BTreeSet<(Uuid, Uuid)>,
}

/// 메모리 자격증명 저장소.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    tables: RwLock<Tables>,
}

impl MemoryCredentialStore {
    /// 빈 저장소 생성.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn insert_user(
        &self,
        record: UserRecord,
        role_ids: &[Uuid],
    ) -> UserMgmtResult<UserRecord> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == record.username) {
            return Err(UserMgmtError::DuplicateName(record.username));
        }
        // 모든 검사를 통과한 뒤에만 변경
        if let Some(missing) = role_ids.iter().find(|id| !tables.roles.contains_key(*id)) {
            return Err(UserMgmtError::RoleNotFound(missing.to_string()));
        }

        for role_id in role_ids {
            tables.links.insert((record.id, *role_id));
        }
        tables.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_user(&self, id: Uuid) -> UserMgmtResult<Option<UserRecord>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> UserMgmtResult<Option<UserRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn list_users(&self) -> UserMgmtResult<Vec<UserRecord>> {
        let tables = self.tables.read().await;
        let mut users: Vec<UserRecord> = tables.users.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn update_fullname(&self, id: Uuid, fullname: &str) -> UserMgmtResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.users.get_mut(&id) {
            Some(user) => {
                user.fullname = fullname.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_role(&self, role: Role) -> UserMgmtResult<Role> {
        let mut tables = self.tables.write().await;
        if tables.roles.values().any(|r| r.name == role.name) {
            return Err(UserMgmtError::DuplicateName(role.name));
        }
        tables.roles.insert(role.id, role.clone());
        Ok(role)
    }

    async fn find_role(&self, id: Uuid) -> UserMgmtResult<Option<Role>> {
        Ok(self.tables.read().await.roles.get(&id).cloned())
    }

    async fn find_role_by_name(&self, name: &str) -> UserMgmtResult<Option<Role>> {
        let tables = self.tables.read().await;
        Ok(tables.roles.values().find(|r| r.name == name).cloned())
    }

    async fn list_roles(&self) -> UserMgmtResult<Vec<Role>> {
        let tables = self.tables.read().await;
        let mut roles: Vec<Role> = tables.roles.values().cloned().collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }

    async fn roles_of_user(&self, user_id: Uuid) -> UserMgmtResult<Vec<Role>> {
        let tables = self.tables.read().await;
        let mut roles: Vec<Role> = tables
            .links
            .iter()
            .filter(|(u, _)| *u == user_id)
            .filter_map(|(_, r)| tables.roles.get(r).cloned())
            .collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }

    async fn link_role(&self, user_id: Uuid, role_id: Uuid) -> UserMgmtResult<()> {
        let mut tables = self.tables.write().await;
        // 외래 키 제약과 동일하게 동작
        if !tables.users.contains_key(&user_id) {
            return Err(UserMgmtError::UserNotFound(user_id.to_string()));
        }
        if !tables.roles.contains_key(&role_id) {
            return Err(UserMgmtError::RoleNotFound(role_id.to_string()));
        }
        tables.links.insert((user_id, role_id));
        Ok(())
    }

    async fn unlink_role(&self, user_id: Uuid, role_id: Uuid) -> UserMgmtResult<()> {
        self.tables.write().await.links.remove(&(user_id, role_id));
        Ok(())
    }

    async fn ping(&self) -> UserMgmtResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
