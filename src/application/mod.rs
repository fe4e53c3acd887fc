mod catalog;
mod errors;
mod lending;
mod members;

pub use catalog::{
    add_book, get_book, get_book_by_id, get_books, get_in_stock_books, remove_book, update_book,
};
pub use errors::{LendingError, Result};
pub use lending::{MAX_ACTIVE_LOANS, borrow_book, return_book};
pub use members::{
    MemberDetails, add_member, get_member, get_member_by_id, get_members, update_member,
};

use std::sync::Arc;

use crate::ports::{BookRepository, LoanRepository, MemberRepository};

/// サービスの依存関係
///
/// 振る舞いは持たず、ユースケース関数に依存関係を明示的に渡すための
/// データ構造。すべてのユースケースはこの一式だけを見る。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub book_repository: Arc<dyn BookRepository>,
    pub member_repository: Arc<dyn MemberRepository>,
    pub loan_repository: Arc<dyn LoanRepository>,
}
