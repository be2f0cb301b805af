//! 사용자(User) 도메인 모델.
//!
//! 저장 레코드([`UserRecord`])와 역할이 결합된 조회 모델([`User`])을 분리합니다.
//! 사용자와 역할은 서로를 소유하지 않으며, 연결은 저장소의 연관 테이블로만 표현됩니다.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::Role;

/// 저장된 사용자 레코드 (역할 미포함).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct UserRecord {
    /// 사용자 ID
    pub id: Uuid,
    /// 로그인 이름 (유일)
    pub username: String,
    /// PHC 형식 비밀번호 해시
    pub password_hash: String,
    /// 표시 이름
    pub fullname: String,
}

/// 역할이 포함된 사용자 조회 모델.
///
/// 비밀번호 해시는 포함하지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct User {
    /// 사용자 ID
    pub id: Uuid,
    /// 로그인 이름
    pub username: String,
    /// 표시 이름
    pub fullname: String,
    /// 보유 역할 (이름순, 중복 없음)
    pub roles: Vec<Role>,
}

impl User {
    /// 레코드와 역할 목록을 결합합니다.
    ///
    /// 같은 ID의 역할은 한 번만 포함되며, 역할은 이름순으로 정렬됩니다.
    pub fn assemble(record: UserRecord, mut roles: Vec<Role>) -> Self {
        roles.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        roles.dedup_by(|a, b| a.id == b.id);

        Self {
            id: record.id,
            username: record.username,
            fullname: record.fullname,
            roles,
        }
    }

    /// 역할 이름 목록.
    pub fn role_names(&self) -> Vec<String> {
        self.roles.iter().map(|r| r.name.clone()).collect()
    }
}

/// 새 사용자 입력.
#[derive(Clone, Deserialize, Serialize, Validate)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct NewUser {
    /// 로그인 이름
    #[validate(length(min = 1, max = 64, message = "사용자 이름은 1~64자여야 합니다"))]
    pub username: String,
    /// 평문 비밀번호
    #[validate(length(min = 1, message = "비밀번호가 필요합니다"))]
    pub password: String,
    /// 표시 이름
    #[serde(default)]
    #[validate(length(max = 128))]
    pub fullname: String,
    /// 생성 시 부여할 역할 ID 목록
    #[serde(default)]
    pub role_ids: Vec<Uuid>,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("fullname", &self.fullname)
            .field("role_ids", &self.role_ids)
            .finish()
    }
}

/// 프로필 수정 입력. 표시 이름만 변경할 수 있습니다.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct ProfileUpdate {
    /// 새 표시 이름
    #[validate(length(max = 128))]
    pub fullname: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ROLE_ADMIN, ROLE_USER};
    use proptest::prelude::*;

    fn record(username: &str) -> UserRecord {
        UserRecord {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: "$argon2id$dummy".to_string(),
            fullname: "Alice".to_string(),
        }
    }

    #[test]
    fn test_assemble_sorts_and_dedups_roles() {
        let admin = Role::new(ROLE_ADMIN);
        let user_role = Role::new(ROLE_USER);
        let user = User::assemble(
            record("alice"),
            vec![user_role.clone(), admin.clone(), user_role.clone()],
        );

        assert_eq!(user.roles, vec![admin, user_role]);
        assert_eq!(user.role_names(), vec!["ROLE_ADMIN", "ROLE_USER"]);
    }

    #[test]
    fn test_user_json_omits_password() {
        let user = User::assemble(record("alice"), vec![]);
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password"));
        assert!(json.contains(r#""fullname":"Alice""#));
    }

    #[test]
    fn test_new_user_defaults_and_validation() {
        let input: NewUser =
            serde_json::from_str(r#"{"username":"bob","password":"secret"}"#).unwrap();
        assert!(input.fullname.is_empty());
        assert!(input.role_ids.is_empty());
        assert!(input.validate().is_ok());

        let empty: NewUser = serde_json::from_str(r#"{"username":"","password":""}"#).unwrap();
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_new_user_debug_redacts_password() {
        let input: NewUser =
            serde_json::from_str(r#"{"username":"bob","password":"hunter2"}"#).unwrap();
        assert!(!format!("{:?}", input).contains("hunter2"));
    }

    proptest! {
        #[test]
        fn prop_assembled_roles_are_unique(picks in proptest::collection::vec(0usize..4, 0..16)) {
            let pool: Vec<Role> = (0..4).map(|i| Role::new(format!("ROLE_{}", i))).collect();
            let roles: Vec<Role> = picks.iter().map(|&i| pool[i].clone()).collect();
            let user = User::assemble(record("p"), roles);

            let mut ids: Vec<Uuid> = user.roles.iter().map(|r| r.id).collect();
            let before = ids.len();
            ids.sort();
            ids.dedup();
            prop_assert_eq!(before, ids.len());

            for pick in &picks {
                prop_assert!(user.roles.contains(&pool[*pick]));
            }
        }
    }
}
