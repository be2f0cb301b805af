//! 역할(Role) 도메인 모델.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// 관리자 역할 이름.
///
/// 이 역할을 가진 호출자는 관리 엔드포인트 전체와 다른 사용자 프로필 조회가 가능합니다.
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";

/// 일반 사용자 역할 이름.
pub const ROLE_USER: &str = "ROLE_USER";

/// 저장된 역할.
///
/// 이름은 전역적으로 유일합니다. 생성 후 수정/삭제되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct Role {
    /// 역할 ID
    pub id: Uuid,
    /// 역할 이름 (예: "ROLE_ADMIN")
    pub name: String,
}

impl Role {
    /// 새 ID로 역할 생성.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// 새 역할 입력.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct NewRole {
    /// 역할 이름
    #[validate(length(min = 1, max = 64, message = "역할 이름은 1~64자여야 합니다"))]
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_role_has_fresh_id() {
        let a = Role::new(ROLE_ADMIN);
        let b = Role::new(ROLE_ADMIN);
        assert_eq!(a.name, b.name);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_new_role_validation() {
        assert!(NewRole { name: "ROLE_AUDITOR".into() }.validate().is_ok());
        assert!(NewRole { name: String::new() }.validate().is_err());
        assert!(NewRole { name: "R".repeat(65) }.validate().is_err());
    }

    #[test]
    fn test_role_json_shape() {
        let role = Role::new(ROLE_USER);
        let json = serde_json::to_value(&role).unwrap();
        assert_eq!(json["name"], "ROLE_USER");
        assert!(json["id"].is_string());
    }
}
