//! 역할 기반 접근 제어 (RBAC).
//!
//! 엔드포인트별 요구 조건을 명시적인 정책 테이블([`Endpoint::requirement`])로 정의하고,
//! 핸들러는 검증된 호출자([`Caller`])를 인자로 넘겨 [`authorize`]를 한 번 호출합니다.
//! 전역 보안 컨텍스트는 사용하지 않습니다.

use std::collections::BTreeSet;

use usermgmt_core::ROLE_ADMIN;

use super::Claims;

/// 인증된 호출자.
///
/// Access Token 클레임에서 만들어지며 요청 단위로만 존재합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// 사용자 이름 (토큰 subject)
    pub username: String,
    /// 토큰에 담긴 역할 이름
    pub roles: BTreeSet<String>,
}

impl Caller {
    /// 새 호출자 생성.
    pub fn new<I, S>(username: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            username: username.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// 검증된 클레임에서 호출자 생성.
    pub fn from_claims(claims: &Claims) -> Self {
        Self::new(claims.sub.clone(), claims.roles.iter().cloned())
    }

    /// 특정 역할 보유 여부.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// 요구 역할 중 하나라도 보유하는지 확인.
    pub fn has_any_role(&self, required: &[&str]) -> bool {
        required.iter().any(|r| self.has_role(r))
    }

    /// 관리자 여부.
    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }
}

/// 엔드포인트 요구 조건.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// 인증된 호출자면 허용
    Authenticated,
    /// 나열된 역할 중 하나 이상 보유 시 허용
    AnyRole(&'static [&'static str]),
    /// 대상 리소스의 소유자이거나 관리자면 허용
    OwnerOrAdmin,
    /// 대상 리소스의 소유자만 허용
    OwnerOnly,
}

/// 보호 대상 엔드포인트.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// GET /api/roles
    ListRoles,
    /// GET /api/roles/{id}
    GetRole,
    /// POST /api/roles
    CreateRole,
    /// GET /api/users
    ListUsers,
    /// GET /api/users/{id}
    GetUser,
    /// GET /api/users/{id}/roles
    GetUserRoles,
    /// POST /api/users
    CreateUser,
    /// POST /api/users/{id}/roles/{roleId}
    AttachRole,
    /// DELETE /api/users/{id}/roles/{roleId}
    DetachRole,
    /// PATCH /api/users/{id}
    UpdateProfile,
}

const ADMIN_ONLY: &[&str] = &[ROLE_ADMIN];

impl Endpoint {
    /// 정책 테이블.
    pub fn requirement(self) -> Requirement {
        match self {
            Endpoint::ListRoles | Endpoint::GetRole | Endpoint::GetUserRoles => {
                Requirement::Authenticated
            }
            Endpoint::CreateRole
            | Endpoint::ListUsers
            | Endpoint::CreateUser
            | Endpoint::AttachRole
            | Endpoint::DetachRole => Requirement::AnyRole(ADMIN_ONLY),
            Endpoint::GetUser => Requirement::OwnerOrAdmin,
            Endpoint::UpdateProfile => Requirement::OwnerOnly,
        }
    }
}

/// 접근 거부 사유.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessDenied {
    /// 필요한 역할이 없음 (403)
    #[error("권한이 부족합니다")]
    Forbidden,
    /// 소유자가 아님 (400, 기존 클라이언트 호환)
    #[error("본인 또는 관리자만 접근할 수 있습니다")]
    NotOwner,
}

/// 호출자가 엔드포인트 요구 조건을 만족하는지 판정.
///
/// `owner`는 소유자 기반 요구 조건에서 대상 리소스의 사용자 이름입니다.
/// 소유자 기반 요구 조건인데 `owner`가 없으면 거부합니다.
pub fn authorize(
    caller: &Caller,
    requirement: Requirement,
    owner: Option<&str>,
) -> Result<(), AccessDenied> {
    let is_owner = owner.is_some_and(|o| o == caller.username);

    let allowed = match requirement {
        Requirement::Authenticated => return Ok(()),
        Requirement::AnyRole(required) => {
            return if caller.has_any_role(required) {
                Ok(())
            } else {
                Err(AccessDenied::Forbidden)
            };
        }
        Requirement::OwnerOrAdmin => is_owner || caller.is_admin(),
        Requirement::OwnerOnly => is_owner,
    };

    if allowed {
        Ok(())
    } else {
        Err(AccessDenied::NotOwner)
    }
}

/// 엔드포인트 정책으로 판정.
pub fn authorize_endpoint(
    caller: &Caller,
    endpoint: Endpoint,
    owner: Option<&str>,
) -> Result<(), AccessDenied> {
    let result = authorize(caller, endpoint.requirement(), owner);
    if let Err(ref denied) = result {
        tracing::debug!(
            caller = %caller.username,
            endpoint = ?endpoint,
            reason = %denied,
            "Access denied"
        );
    }
    result
}
