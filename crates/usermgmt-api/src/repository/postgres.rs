//! PostgreSQL 자격증명 저장소.
//!
//! `app_user`, `app_role`, `app_user_role` 테이블에 대한 [`CredentialStore`] 구현.
//! 이름 유일성은 테이블의 UNIQUE 제약으로 보장합니다.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info};
use usermgmt_core::{CredentialStore, Role, UserMgmtError, UserMgmtResult, UserRecord};
use uuid::Uuid;

/// PostgreSQL 자격증명 저장소.
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    /// 연결 풀로 저장소 생성.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 데이터베이스 마이그레이션을 실행합니다.
    pub async fn migrate(&self) -> UserMgmtResult<()> {
        info!("Running database migrations...");

        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| UserMgmtError::Database(format!("migration failed: {}", e)))?;

        info!("Migrations completed successfully");
        Ok(())
    }
}

/// 유니크 제약 위반을 중복 이름 에러로 변환.
fn map_insert_error(err: sqlx::Error, name: &str) -> UserMgmtError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            UserMgmtError::DuplicateName(name.to_string())
        }
        _ => err.into(),
    }
}

/// 외래 키 위반(삭제된 역할)을 역할 없음 에러로 변환.
fn map_link_error(err: sqlx::Error, role_id: Uuid) -> UserMgmtError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            UserMgmtError::RoleNotFound(role_id.to_string())
        }
        _ => err.into(),
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn insert_user(
        &self,
        record: UserRecord,
        role_ids: &[Uuid],
    ) -> UserMgmtResult<UserRecord> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO app_user (id, username, password_hash, fullname)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, password_hash, fullname
            "#,
        )
        .bind(record.id)
        .bind(&record.username)
        .bind(&record.password_hash)
        .bind(&record.fullname)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_insert_error(e, &record.username))?;

        for role_id in role_ids {
            sqlx::query(
                r#"
                INSERT INTO app_user_role (user_id, role_id)
                VALUES ($1, $2)
                ON CONFLICT (user_id, role_id) DO NOTHING
                "#,
            )
            .bind(inserted.id)
            .bind(role_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_link_error(e, *role_id))?;
        }

        // 커밋 전에 에러로 빠져나가면 tx drop 시 롤백
        tx.commit().await?;

        debug!(
            user_id = %inserted.id,
            username = %inserted.username,
            roles = role_ids.len(),
            "User row inserted"
        );
        Ok(inserted)
    }

    async fn find_user(&self, id: Uuid) -> UserMgmtResult<Option<UserRecord>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, password_hash, fullname FROM app_user WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_user_by_username(&self, username: &str) -> UserMgmtResult<Option<UserRecord>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, password_hash, fullname FROM app_user WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn list_users(&self) -> UserMgmtResult<Vec<UserRecord>> {
        let records = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, password_hash, fullname FROM app_user ORDER BY username",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn update_fullname(&self, id: Uuid, fullname: &str) -> UserMgmtResult<bool> {
        let result = sqlx::query("UPDATE app_user SET fullname = $2 WHERE id = $1")
            .bind(id)
            .bind(fullname)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_role(&self, role: Role) -> UserMgmtResult<Role> {
        let inserted = sqlx::query_as::<_, Role>(
            "INSERT INTO app_role (id, name) VALUES ($1, $2) RETURNING id, name",
        )
        .bind(role.id)
        .bind(&role.name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, &role.name))?;

        Ok(inserted)
    }

    async fn find_role(&self, id: Uuid) -> UserMgmtResult<Option<Role>> {
        let role = sqlx::query_as::<_, Role>("SELECT id, name FROM app_role WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(role)
    }

    async fn find_role_by_name(&self, name: &str) -> UserMgmtResult<Option<Role>> {
        let role = sqlx::query_as::<_, Role>("SELECT id, name FROM app_role WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(role)
    }

    async fn list_roles(&self) -> UserMgmtResult<Vec<Role>> {
        let roles = sqlx::query_as::<_, Role>("SELECT id, name FROM app_role ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(roles)
    }

    async fn roles_of_user(&self, user_id: Uuid) -> UserMgmtResult<Vec<Role>> {
        let roles = sqlx::query_as::<_, Role>(
            r#"
            SELECT r.id, r.name
            FROM app_role r
            JOIN app_user_role ur ON ur.role_id = r.id
            WHERE ur.user_id = $1
            ORDER BY r.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(roles)
    }

    async fn link_role(&self, user_id: Uuid, role_id: Uuid) -> UserMgmtResult<()> {
        sqlx::query(
            r#"
            INSERT INTO app_user_role (user_id, role_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, role_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(role_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn unlink_role(&self, user_id: Uuid, role_id: Uuid) -> UserMgmtResult<()> {
        sqlx::query("DELETE FROM app_user_role WHERE user_id = $1 AND role_id = $2")
            .bind(user_id)
            .bind(role_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn ping(&self) -> UserMgmtResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
