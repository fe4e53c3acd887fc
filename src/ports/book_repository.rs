use async_trait::async_trait;

use super::Result;
use crate::domain::{Book, BookDraft, BookId};

/// 書籍リポジトリポート
///
/// カタログの読み書きを抽象化する。在庫の増減はここには現れない。
/// 増減は貸出・返却のトランザクションの一部として台帳側で行われる。
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// コードで書籍を検索する
    async fn find_by_code(&self, code: &str) -> Result<Option<Book>>;

    /// IDで書籍を検索する
    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>>;

    /// 全書籍を取得する
    async fn find_all(&self) -> Result<Vec<Book>>;

    /// 在庫のある書籍のみ取得する（stock > 0）
    async fn find_in_stock(&self) -> Result<Vec<Book>>;

    /// 書籍を登録し、採番されたIDを含む書籍を返す
    async fn insert(&self, draft: &BookDraft) -> Result<Book>;

    /// コードをキーに書籍を更新する（コード自体は変更しない）
    async fn update(&self, draft: &BookDraft, code: &str) -> Result<()>;

    /// コードをキーに書籍を削除する
    ///
    /// 貸出中チェックと削除は同一トランザクションで行う。
    /// 対象書籍を参照する貸出レコードが存在する場合は`LoanInProgress`。
    async fn delete(&self, code: &str) -> Result<()>;
}
