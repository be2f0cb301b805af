//! 사용자/역할 변경 및 조회 서비스.
//!
//! 라우트 핸들러와 저장소 사이의 비즈니스 로직을 담당합니다.
//! 권한 판정은 라우트 계층에서 끝난 뒤 호출된다고 가정합니다.

use std::sync::Arc;

use tracing::{debug, info, warn};
use usermgmt_core::{
    BootstrapConfig, CredentialStore, NewRole, NewUser, ProfileUpdate, Role, User, UserMgmtError,
    UserMgmtResult, UserRecord, ROLE_ADMIN, ROLE_USER,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::hash_password;

/// 사용자/역할 서비스.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn CredentialStore>,
}

impl UserService {
    /// 저장소로 서비스 생성.
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    // ========================================================================
    // 변경
    // ========================================================================

    /// 사용자 생성.
    ///
    /// 비밀번호는 Argon2id로 해싱해 저장하고, `role_ids`의 역할을 연결합니다.
    ///
    /// # Errors
    ///
    /// - `Validation`: 사용자 이름 또는 비밀번호가 비어 있음
    /// - `DuplicateName`: 같은 사용자 이름이 이미 존재
    /// - `RoleNotFound`: 존재하지 않는 역할 ID
    pub async fn create_user(&self, input: NewUser) -> UserMgmtResult<User> {
        input.validate()?;

        if self
            .store
            .find_user_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(UserMgmtError::DuplicateName(input.username));
        }

        let mut role_ids = input.role_ids.clone();
        role_ids.sort();
        role_ids.dedup();

        let mut roles = Vec::with_capacity(role_ids.len());
        for role_id in &role_ids {
            let role = self
                .store
                .find_role(*role_id)
                .await?
                .ok_or_else(|| UserMgmtError::RoleNotFound(role_id.to_string()))?;
            roles.push(role);
        }

        let password_hash = hash_password(input.password).await?;
        let record = self
            .store
            .insert_user(
                UserRecord {
                    id: Uuid::new_v4(),
                    username: input.username,
                    password_hash,
                    fullname: input.fullname,
                },
                &role_ids,
            )
            .await?;

        info!(user_id = %record.id, username = %record.username, roles = roles.len(), "User created");
        Ok(User::assemble(record, roles))
    }

    /// 역할 생성.
    ///
    /// # Errors
    ///
    /// - `Validation`: 이름이 비어 있음
    /// - `DuplicateName`: 같은 이름의 역할이 이미 존재
    pub async fn create_role(&self, input: NewRole) -> UserMgmtResult<Role> {
        input.validate()?;

        if self.store.find_role_by_name(&input.name).await?.is_some() {
            return Err(UserMgmtError::DuplicateName(input.name));
        }

        let role = self.store.insert_role(Role::new(input.name)).await?;
        info!(role_id = %role.id, name = %role.name, "Role created");
        Ok(role)
    }

    /// 사용자에게 역할 연결. 이미 연결되어 있으면 그대로 둡니다.
    pub async fn attach_role(&self, user_id: Uuid, role_id: Uuid) -> UserMgmtResult<User> {
        let (record, role) = self.require_user_and_role(user_id, role_id).await?;
        self.store.link_role(record.id, role.id).await?;

        debug!(user_id = %user_id, role = %role.name, "Role attached");
        self.assemble(record).await
    }

    /// 사용자에게서 역할 연결 해제. 연결이 없으면 그대로 둡니다.
    pub async fn detach_role(&self, user_id: Uuid, role_id: Uuid) -> UserMgmtResult<User> {
        let (record, role) = self.require_user_and_role(user_id, role_id).await?;
        self.store.unlink_role(record.id, role.id).await?;

        debug!(user_id = %user_id, role = %role.name, "Role detached");
        self.assemble(record).await
    }

    /// 표시 이름 변경.
    ///
    /// 사용자 이름, 비밀번호, 역할은 변경하지 않습니다.
    pub async fn update_profile(&self, user_id: Uuid, input: ProfileUpdate) -> UserMgmtResult<User> {
        input.validate()?;

        if !self.store.update_fullname(user_id, &input.fullname).await? {
            return Err(UserMgmtError::UserNotFound(user_id.to_string()));
        }

        let record = self
            .store
            .find_user(user_id)
            .await?
            .ok_or_else(|| UserMgmtError::UserNotFound(user_id.to_string()))?;

        debug!(user_id = %user_id, "Profile updated");
        self.assemble(record).await
    }

    // ========================================================================
    // 조회
    // ========================================================================

    /// ID로 사용자 조회.
    pub async fn get_user(&self, id: Uuid) -> UserMgmtResult<Option<User>> {
        match self.store.find_user(id).await? {
            Some(record) => Ok(Some(self.assemble(record).await?)),
            None => Ok(None),
        }
    }

    /// 사용자 이름으로 조회.
    pub async fn get_user_by_username(&self, username: &str) -> UserMgmtResult<Option<User>> {
        match self.store.find_user_by_username(username).await? {
            Some(record) => Ok(Some(self.assemble(record).await?)),
            None => Ok(None),
        }
    }

    /// 사용자 이름으로 저장 레코드 조회 (비밀번호 해시 포함).
    pub(crate) async fn find_record_by_username(
        &self,
        username: &str,
    ) -> UserMgmtResult<Option<UserRecord>> {
        self.store.find_user_by_username(username).await
    }

    /// 전체 사용자 조회 (사용자 이름순).
    pub async fn get_users(&self) -> UserMgmtResult<Vec<User>> {
        let records = self.store.list_users().await?;
        let mut users = Vec::with_capacity(records.len());
        for record in records {
            users.push(self.assemble(record).await?);
        }
        Ok(users)
    }

    /// ID로 역할 조회.
    pub async fn get_role(&self, id: Uuid) -> UserMgmtResult<Option<Role>> {
        self.store.find_role(id).await
    }

    /// 전체 역할 조회 (이름순).
    pub async fn get_roles(&self) -> UserMgmtResult<Vec<Role>> {
        self.store.list_roles().await
    }

    /// 사용자의 역할 조회. 사용자가 없으면 `None`.
    pub async fn get_user_roles(&self, user_id: Uuid) -> UserMgmtResult<Option<Vec<Role>>> {
        match self.store.find_user(user_id).await? {
            Some(_) => Ok(Some(self.store.roles_of_user(user_id).await?)),
            None => Ok(None),
        }
    }

    // ========================================================================
    // 초기 데이터
    // ========================================================================

    /// 기본 역할과 초기 사용자 생성.
    ///
    /// 이미 존재하는 이름은 건드리지 않으므로 여러 번 호출해도 안전합니다.
    pub async fn seed_defaults(&self, config: &BootstrapConfig) -> UserMgmtResult<()> {
        let mut role_ids = Vec::with_capacity(2);
        for name in [ROLE_ADMIN, ROLE_USER] {
            let role = match self.store.find_role_by_name(name).await? {
                Some(role) => role,
                None => match self.store.insert_role(Role::new(name)).await {
                    Ok(role) => role,
                    // 다른 인스턴스가 먼저 생성한 경우
                    Err(UserMgmtError::DuplicateName(_)) => self
                        .store
                        .find_role_by_name(name)
                        .await?
                        .ok_or_else(|| UserMgmtError::RoleNotFound(name.to_string()))?,
                    Err(e) => return Err(e),
                },
            };
            role_ids.push(role.id);
        }

        if self
            .store
            .find_user_by_username(&config.username)
            .await?
            .is_some()
        {
            debug!(username = %config.username, "Bootstrap user already exists");
            return Ok(());
        }

        let new_user = NewUser {
            username: config.username.clone(),
            password: config.password.clone(),
            fullname: config.fullname.clone(),
            role_ids,
        };

        match self.create_user(new_user).await {
            Ok(user) => {
                info!(username = %user.username, "Bootstrap user created");
                Ok(())
            }
            Err(UserMgmtError::DuplicateName(name)) => {
                warn!(username = %name, "Bootstrap user created concurrently");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    // ========================================================================
    // 내부 헬퍼
    // ========================================================================

    async fn require_user_and_role(
        &self,
        user_id: Uuid,
        role_id: Uuid,
    ) -> UserMgmtResult<(UserRecord, Role)> {
        let record = self
            .store
            .find_user(user_id)
            .await?
            .ok_or_else(|| UserMgmtError::UserNotFound(user_id.to_string()))?;
        let role = self
            .store
            .find_role(role_id)
            .await?
            .ok_or_else(|| UserMgmtError::RoleNotFound(role_id.to_string()))?;
        Ok((record, role))
    }

    async fn assemble(&self, record: UserRecord) -> UserMgmtResult<User> {
        let roles = self.store.roles_of_user(record.id).await?;
        Ok(User::assemble(record, roles))
    }
}
