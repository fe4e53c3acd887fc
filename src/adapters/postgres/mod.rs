pub mod book_repository;
pub mod loan_repository;
pub mod member_repository;

// パブリックに型を再エクスポート
pub use book_repository::BookRepository as PostgresBookRepository;
pub use loan_repository::LoanRepository as PostgresLoanRepository;
pub use member_repository::MemberRepository as PostgresMemberRepository;

use crate::ports::RepositoryError;

/// sqlxのエラーをリポジトリエラーへ変換する
///
/// 一意制約違反は`Duplicate`として型付きで返し、それ以外は
/// opaqueなストレージ失敗として運ぶ。
pub(crate) fn map_sqlx_err(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return RepositoryError::Duplicate;
        }
    }

    RepositoryError::Storage(Box::new(err))
}
