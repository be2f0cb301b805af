//! OpenAPI 문서화 설정.
//!
//! utoipa를 사용하여 REST API의 OpenAPI 3.0 스펙을 생성합니다.
//! Swagger UI는 `/swagger-ui` 경로에서 사용 가능합니다.
//!
//! 새로운 엔드포인트를 추가할 때:
//!
//! 1. 응답/요청 타입에 `#[derive(ToSchema)]` 추가
//! 2. 핸들러에 `#[utoipa::path(...)]` 어노테이션 추가
//! 3. 이 파일의 `components(schemas(...))` 및 `paths(...)` 섹션에 추가

use axum::Router;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use usermgmt_core::{NewRole, NewUser, ProfileUpdate, Role, User};

use crate::auth::TokenPair;
use crate::error::{ApiErrorResponse, TokenErrorBody};
use crate::routes::{ComponentHealth, ComponentStatus, HealthResponse, LoginRequest};

// ==================== OpenAPI 문서 정의 ====================

/// User Management API 문서.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "User Management API",
        description = r#"
# 사용자/역할 관리 REST API

## 인증

`POST /api/login`으로 Access Token과 Refresh Token을 발급받습니다.
보호된 엔드포인트는 `Authorization: Bearer <access token>` 헤더가 필요합니다.
Access Token이 만료되면 `GET /api/refreshToken`에 Refresh Token을 Bearer로 보내 재발급합니다.

## 권한

- `ROLE_ADMIN`: 사용자 목록/생성, 역할 생성, 역할 연결/해제
- 본인: 자기 정보 조회 및 표시 이름 변경
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "로컬 개발 서버"),
    ),
    tags(
        (name = "health", description = "헬스 체크 - 서버 상태 확인"),
        (name = "auth", description = "인증 - 로그인 및 토큰 갱신"),
        (name = "users", description = "사용자 - 생성, 조회, 프로필, 역할 연결"),
        (name = "roles", description = "역할 - 생성 및 조회")
    ),
    modifiers(&SecurityAddon),
    // ==================== 스키마 등록 ====================
    components(
        schemas(
            // ===== Health =====
            HealthResponse,
            ComponentHealth,
            ComponentStatus,

            // ===== Common =====
            ApiErrorResponse,
            TokenErrorBody,

            // ===== Auth =====
            LoginRequest,
            TokenPair,

            // ===== Users / Roles =====
            User,
            NewUser,
            ProfileUpdate,
            Role,
            NewRole,
        )
    ),
    // ==================== 경로 등록 ====================
    paths(
        // ===== Health =====
        crate::routes::health::health_check,
        crate::routes::health::health_ready,

        // ===== Auth =====
        crate::routes::token::login,
        crate::routes::token::refresh_token,

        // ===== Users =====
        crate::routes::users::list_users,
        crate::routes::users::create_user,
        crate::routes::users::get_user,
        crate::routes::users::update_profile,
        crate::routes::users::get_user_roles,
        crate::routes::users::attach_role,
        crate::routes::users::detach_role,

        // ===== Roles =====
        crate::routes::roles::list_roles,
        crate::routes::roles::get_role,
        crate::routes::roles::create_role,
    )
)]
pub struct ApiDoc;

/// `bearer_auth` 보안 스키마 등록.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

// ==================== Swagger UI 라우터 ====================

/// Swagger UI 라우터 생성.
///
/// 다음 경로에 문서 UI를 마운트합니다:
/// - `/swagger-ui` - Swagger UI 대화형 문서
/// - `/api-docs/openapi.json` - OpenAPI JSON 스펙
pub fn swagger_ui_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}

// ==================== 테스트 ====================
