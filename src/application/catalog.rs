use crate::domain::{Book, BookDraft, BookId};
use crate::ports::RepositoryError;

use super::ServiceDependencies;
use super::errors::{LendingError, Result};

/// 共通バリデーション：コードは必須
fn require_code(code: &str) -> Result<()> {
    if code.trim().is_empty() {
        return Err(LendingError::Validation("code is required".to_string()));
    }
    Ok(())
}

/// 書籍を登録する
///
/// 同じコードの書籍が既にある場合は`BookAlreadyExists`。
/// 在庫の初期値は0以上でなければならない。
pub async fn add_book(deps: &ServiceDependencies, draft: BookDraft) -> Result<Book> {
    require_code(&draft.code)?;

    if draft.stock < 0 {
        return Err(LendingError::Validation(
            "stock must not be negative".to_string(),
        ));
    }

    if deps
        .book_repository
        .find_by_code(&draft.code)
        .await?
        .is_some()
    {
        return Err(LendingError::BookAlreadyExists);
    }

    let book = match deps.book_repository.insert(&draft).await {
        Ok(book) => book,
        // 存在確認と登録の間に同じコードで登録された場合
        Err(RepositoryError::Duplicate) => return Err(LendingError::BookAlreadyExists),
        Err(e) => return Err(LendingError::Storage(e)),
    };

    Ok(book)
}

/// 書籍を更新する
///
/// コードをキーに題名・著者・在庫を上書きする。コードは変更しない。
pub async fn update_book(deps: &ServiceDependencies, draft: BookDraft, code: &str) -> Result<()> {
    require_code(code)?;

    if draft.stock < 0 {
        return Err(LendingError::Validation(
            "stock must not be negative".to_string(),
        ));
    }

    if deps.book_repository.find_by_code(code).await?.is_none() {
        return Err(LendingError::BookNotFound);
    }

    deps.book_repository.update(&draft, code).await?;

    Ok(())
}

/// 書籍を削除する
///
/// 貸出中の書籍は削除できない。貸出中チェックと削除は
/// リポジトリ側で同一トランザクションとして実行される。
pub async fn remove_book(deps: &ServiceDependencies, code: &str) -> Result<()> {
    require_code(code)?;

    match deps.book_repository.delete(code).await {
        Ok(()) => Ok(()),
        Err(RepositoryError::NotFound) => Err(LendingError::BookNotFound),
        Err(RepositoryError::LoanInProgress) => Err(LendingError::BookCurrentlyBorrowed),
        Err(e) => Err(LendingError::Storage(e)),
    }
}

/// コードで書籍を取得する
pub async fn get_book(deps: &ServiceDependencies, code: &str) -> Result<Book> {
    require_code(code)?;

    deps.book_repository
        .find_by_code(code)
        .await?
        .ok_or(LendingError::BookNotFound)
}

/// IDで書籍を取得する
pub async fn get_book_by_id(deps: &ServiceDependencies, id: BookId) -> Result<Book> {
    deps.book_repository
        .find_by_id(id)
        .await?
        .ok_or(LendingError::BookNotFound)
}

/// 全書籍を取得する
pub async fn get_books(deps: &ServiceDependencies) -> Result<Vec<Book>> {
    Ok(deps.book_repository.find_all().await?)
}

/// 在庫のある書籍のみ取得する
pub async fn get_in_stock_books(deps: &ServiceDependencies) -> Result<Vec<Book>> {
    Ok(deps.book_repository.find_in_stock().await?)
}
