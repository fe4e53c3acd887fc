use thiserror::Error;

use crate::ports::RepositoryError;

/// 貸出管理アプリケーション層のエラー
///
/// すべてのルール違反は書き込み前に検出され、このエラーとして
/// 呼び出し側へ返る。自動リトライは行わない。
#[derive(Debug, Error)]
pub enum LendingError {
    /// 入力の欠落・不正
    #[error("{0}")]
    Validation(String),

    /// 書籍が存在しない
    #[error("book not found")]
    BookNotFound,

    /// 書籍が存在しない、または在庫がない
    #[error("stock is not available")]
    StockNotAvailable,

    /// 会員が存在しない
    #[error("member not found")]
    MemberNotFound,

    /// 会員がペナルティ期間中
    #[error("member is penalized")]
    MemberPenalized,

    /// 貸出上限（2冊）に達している
    #[error("member has more than one book borrowed")]
    BorrowLimitExceeded,

    /// 対象の貸出レコードが存在しない
    #[error("member has not borrowed the book")]
    LoanNotFound,

    /// 同じコードの書籍が既に存在する
    #[error("book already exists")]
    BookAlreadyExists,

    /// 同じコードの会員が既に存在する
    #[error("member already exists")]
    MemberAlreadyExists,

    /// 同じ (書籍, 会員) の貸出が既に存在する
    #[error("book is already borrowed by the member")]
    LoanAlreadyExists,

    /// 貸出中の書籍は削除できない
    #[error("book is being borrowed")]
    BookCurrentlyBorrowed,

    /// 永続化の失敗（詳細はログのみに残し、クライアントには出さない）
    #[error("storage failure")]
    Storage(#[source] RepositoryError),
}

impl From<RepositoryError> for LendingError {
    fn from(err: RepositoryError) -> Self {
        LendingError::Storage(err)
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, LendingError>;
