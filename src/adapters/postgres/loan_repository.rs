use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};

use super::map_sqlx_err;
use crate::domain::{BookId, Loan, MemberId};
use crate::ports::loan_repository::LoanRepository as LoanRepositoryTrait;
use crate::ports::{RepositoryError, Result};

/// PostgreSQLの行データをLoanに変換する
fn map_row_to_loan(row: &PgRow) -> Loan {
    Loan {
        book_id: BookId::new(row.get("book_id")),
        member_id: MemberId::new(row.get("member_id")),
        borrowed_at: row.get("borrowed_at"),
    }
}

/// LoanRepositoryのPostgreSQL実装
///
/// 台帳の書き込みは在庫調整と不可分のため、`insert`と`delete`は
/// booksテーブルへの条件付き更新を含むトランザクションとして実行する。
pub struct LoanRepository {
    pool: PgPool,
}

impl LoanRepository {
    /// PostgreSQLコネクションプールから新しいLoanRepositoryを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanRepositoryTrait for LoanRepository {
    async fn find_by_book_and_member(
        &self,
        book_id: BookId,
        member_id: MemberId,
    ) -> Result<Option<Loan>> {
        let row = sqlx::query(
            r#"
            SELECT book_id, member_id, borrowed_at
            FROM loans
            WHERE book_id = $1 AND member_id = $2
            "#,
        )
        .bind(book_id.value())
        .bind(member_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(row.as_ref().map(map_row_to_loan))
    }

    async fn find_by_member(&self, member_id: MemberId) -> Result<Vec<Loan>> {
        let rows = sqlx::query(
            r#"
            SELECT book_id, member_id, borrowed_at
            FROM loans
            WHERE member_id = $1
            ORDER BY borrowed_at DESC
            "#,
        )
        .bind(member_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(rows.iter().map(map_row_to_loan).collect())
    }

    /// 在庫の条件付き減算と台帳記録を同一トランザクションで行う
    ///
    /// `stock >= 1`を条件に含めたUPDATEが行ロックを取るため、同時に
    /// 最後の1冊を狙う呼び出しのうち成功するのは1つだけになる。
    /// 主キー(book_id, member_id)の一意制約違反は`Duplicate`として返す。
    async fn insert(
        &self,
        book_id: BookId,
        member_id: MemberId,
        borrowed_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::Storage(Box::new(e)))?;

        let updated = sqlx::query("UPDATE books SET stock = stock - 1 WHERE id = $1 AND stock >= 1")
            .bind(book_id.value())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;

        // 条件を満たす行がなければ在庫切れ。txはドロップ時にロールバックされる
        if updated.rows_affected() == 0 {
            return Err(RepositoryError::StockExhausted);
        }

        sqlx::query(
            r#"
            INSERT INTO loans (book_id, member_id, borrowed_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(book_id.value())
        .bind(member_id.value())
        .bind(borrowed_at)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_err)?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Storage(Box::new(e)))?;

        Ok(())
    }

    /// 台帳削除と在庫加算を同一トランザクションで行う
    async fn delete(&self, book_id: BookId, member_id: MemberId) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::Storage(Box::new(e)))?;

        let deleted = sqlx::query("DELETE FROM loans WHERE book_id = $1 AND member_id = $2")
            .bind(book_id.value())
            .bind(member_id.value())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;

        if deleted.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query("UPDATE books SET stock = stock + 1 WHERE id = $1")
            .bind(book_id.value())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Storage(Box::new(e)))?;

        Ok(())
    }
}
