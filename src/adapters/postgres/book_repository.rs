use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use super::map_sqlx_err;
use crate::domain::{Book, BookDraft, BookId};
use crate::ports::book_repository::BookRepository as BookRepositoryTrait;
use crate::ports::{RepositoryError, Result};

/// PostgreSQLの行データをBookに変換する
///
/// 位置ではなく列名でフィールドを対応付ける。
fn map_row_to_book(row: &PgRow) -> Book {
    Book {
        id: BookId::new(row.get("id")),
        code: row.get("code"),
        title: row.get("title"),
        author: row.get("author"),
        stock: row.get("stock"),
    }
}

/// BookRepositoryのPostgreSQL実装
pub struct BookRepository {
    pool: PgPool,
}

impl BookRepository {
    /// PostgreSQLコネクションプールから新しいBookRepositoryを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepositoryTrait for BookRepository {
    async fn find_by_code(&self, code: &str) -> Result<Option<Book>> {
        let row = sqlx::query(
            r#"
            SELECT id, code, title, author, stock
            FROM books
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(row.as_ref().map(map_row_to_book))
    }

    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>> {
        let row = sqlx::query(
            r#"
            SELECT id, code, title, author, stock
            FROM books
            WHERE id = $1
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(row.as_ref().map(map_row_to_book))
    }

    async fn find_all(&self) -> Result<Vec<Book>> {
        let rows = sqlx::query(
            r#"
            SELECT id, code, title, author, stock
            FROM books
            ORDER BY code ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(rows.iter().map(map_row_to_book).collect())
    }

    async fn find_in_stock(&self) -> Result<Vec<Book>> {
        let rows = sqlx::query(
            r#"
            SELECT id, code, title, author, stock
            FROM books
            WHERE stock > 0
            ORDER BY code ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(rows.iter().map(map_row_to_book).collect())
    }

    async fn insert(&self, draft: &BookDraft) -> Result<Book> {
        let row = sqlx::query(
            r#"
            INSERT INTO books (code, title, author, stock)
            VALUES ($1, $2, $3, $4)
            RETURNING id, code, title, author, stock
            "#,
        )
        .bind(&draft.code)
        .bind(&draft.title)
        .bind(&draft.author)
        .bind(draft.stock)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(map_row_to_book(&row))
    }

    async fn update(&self, draft: &BookDraft, code: &str) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET title = $1, author = $2, stock = $3
            WHERE code = $4
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.author)
        .bind(draft.stock)
        .bind(code)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// 貸出中チェックと削除を同一トランザクションで行う
    ///
    /// 書籍行をFOR UPDATEでロックしてから貸出レコードの有無を
    /// 確認することで、確認と削除の間の競合を防ぐ。
    async fn delete(&self, code: &str) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::Storage(Box::new(e)))?;

        let row = sqlx::query("SELECT id FROM books WHERE code = $1 FOR UPDATE")
            .bind(code)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;

        let Some(row) = row else {
            return Err(RepositoryError::NotFound);
        };
        let book_id: i32 = row.get("id");

        let count_row = sqlx::query("SELECT COUNT(*) AS count FROM loans WHERE book_id = $1")
            .bind(book_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;
        let active_loans: i64 = count_row.get("count");

        if active_loans > 0 {
            return Err(RepositoryError::LoanInProgress);
        }

        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(book_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Storage(Box::new(e)))?;

        Ok(())
    }
}
