pub mod book_repository;
pub mod loan_repository;
pub mod member_repository;

pub use book_repository::*;
pub use loan_repository::*;
pub use member_repository::*;

use thiserror::Error;

/// リポジトリ層の共通エラー
///
/// ポートはストレージ実装を知らないため、分類できない失敗は
/// opaqueな`Storage`として運ぶ。呼び出し側（アプリケーション層）は
/// 型付きのバリアントだけをビジネスルールの結果に変換する。
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// 対象レコードが存在しない
    #[error("record not found")]
    NotFound,
    /// 一意制約違反（コード重複、貸出の二重登録）
    #[error("duplicate record")]
    Duplicate,
    /// 在庫の条件付き減算が失敗（stock < 1）
    #[error("stock is exhausted")]
    StockExhausted,
    /// 貸出中の書籍に対する削除
    #[error("book has an active loan")]
    LoanInProgress,
    /// 上記に分類できない永続化の失敗
    #[error("storage failure")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
