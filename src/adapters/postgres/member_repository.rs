use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use super::map_sqlx_err;
use crate::domain::{Member, MemberDraft, MemberId, MemberUpdate};
use crate::ports::member_repository::MemberRepository as MemberRepositoryTrait;
use crate::ports::{RepositoryError, Result};

/// PostgreSQLの行データをMemberに変換する
fn map_row_to_member(row: &PgRow) -> Member {
    Member {
        id: MemberId::new(row.get("id")),
        code: row.get("code"),
        name: row.get("name"),
        penalized_at: row.get("penalized_at"),
    }
}

/// MemberRepositoryのPostgreSQL実装
pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    /// PostgreSQLコネクションプールから新しいMemberRepositoryを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberRepositoryTrait for MemberRepository {
    async fn find_by_code(&self, code: &str) -> Result<Option<Member>> {
        let row = sqlx::query(
            r#"
            SELECT id, code, name, penalized_at
            FROM members
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(row.as_ref().map(map_row_to_member))
    }

    async fn find_by_id(&self, id: MemberId) -> Result<Option<Member>> {
        let row = sqlx::query(
            r#"
            SELECT id, code, name, penalized_at
            FROM members
            WHERE id = $1
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(row.as_ref().map(map_row_to_member))
    }

    async fn find_all(&self) -> Result<Vec<Member>> {
        let rows = sqlx::query(
            r#"
            SELECT id, code, name, penalized_at
            FROM members
            ORDER BY code ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(rows.iter().map(map_row_to_member).collect())
    }

    /// 新規会員はpenalized_atをNULLで作成する
    async fn insert(&self, draft: &MemberDraft) -> Result<Member> {
        let row = sqlx::query(
            r#"
            INSERT INTO members (code, name, penalized_at)
            VALUES ($1, $2, NULL)
            RETURNING id, code, name, penalized_at
            "#,
        )
        .bind(&draft.code)
        .bind(&draft.name)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(map_row_to_member(&row))
    }

    async fn update(&self, update: &MemberUpdate, code: &str) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE members
            SET name = $1, penalized_at = $2
            WHERE code = $3
            "#,
        )
        .bind(&update.name)
        .bind(update.penalized_at)
        .bind(code)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
