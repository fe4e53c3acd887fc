use crate::domain::commands::{BorrowBook, ReturnBook};
use crate::domain::{Member, MemberUpdate};
use crate::ports::RepositoryError;

use super::ServiceDependencies;
use super::errors::{LendingError, Result};

/// 会員1人あたりの最大貸出冊数
pub const MAX_ACTIVE_LOANS: usize = 2;

fn require_codes(book_code: &str, member_code: &str) -> Result<()> {
    if book_code.trim().is_empty() {
        return Err(LendingError::Validation("book code is required".to_string()));
    }
    if member_code.trim().is_empty() {
        return Err(LendingError::Validation(
            "member code is required".to_string(),
        ));
    }
    Ok(())
}

/// 書籍を貸し出す
///
/// ビジネスルール：
/// - 書籍が存在し、在庫があること
/// - 会員が存在すること
/// - 会員がペナルティ期間中（延滞返却から3日未満）でないこと
/// - 会員の貸出中の冊数が上限（2冊）未満であること
///
/// ルール違反はすべて書き込み前に検出される。最終的な
/// 在庫減算と台帳への記録は台帳側の単一トランザクションで行われ、
/// 同時実行下でも在庫が負になることはない。
pub async fn borrow_book(deps: &ServiceDependencies, cmd: BorrowBook) -> Result<()> {
    require_codes(&cmd.book_code, &cmd.member_code)?;

    // 1. 書籍の解決と在庫確認
    let book = deps
        .book_repository
        .find_by_code(&cmd.book_code)
        .await?
        .ok_or(LendingError::StockNotAvailable)?;

    if !book.in_stock() {
        return Err(LendingError::StockNotAvailable);
    }

    // 2. 会員の解決
    let member = deps
        .member_repository
        .find_by_code(&cmd.member_code)
        .await?
        .ok_or(LendingError::MemberNotFound)?;

    // 3. ペナルティ確認（読み取り時点の経過日数で判定）
    if member.penalty_active(cmd.borrowed_at) {
        return Err(LendingError::MemberPenalized);
    }

    // 4. 貸出上限と二重貸出の確認
    let loans = deps.loan_repository.find_by_member(member.id).await?;

    if loans.iter().any(|loan| loan.book_id == book.id) {
        return Err(LendingError::LoanAlreadyExists);
    }

    if loans.len() >= MAX_ACTIVE_LOANS {
        return Err(LendingError::BorrowLimitExceeded);
    }

    // 5. 在庫減算＋台帳記録（単一トランザクション）
    match deps
        .loan_repository
        .insert(book.id, member.id, cmd.borrowed_at)
        .await
    {
        Ok(()) => Ok(()),
        // 事前確認後に他の呼び出しが最後の在庫を取った場合
        Err(RepositoryError::StockExhausted) => Err(LendingError::StockNotAvailable),
        // 事前確認後に同じ組の貸出が成立した場合
        Err(RepositoryError::Duplicate) => Err(LendingError::LoanAlreadyExists),
        Err(e) => Err(LendingError::Storage(e)),
    }
}

/// 延滞返却時の会員ペナルティ更新ペイロードを組み立てる
fn penalize(member: &Member, at: chrono::DateTime<chrono::Utc>) -> MemberUpdate {
    MemberUpdate {
        name: member.name.clone(),
        penalized_at: Some(at),
    }
}

/// 書籍を返却する
///
/// ビジネスルール：
/// - (書籍, 会員) の貸出レコードが存在すること
/// - 7日を超過した返却は、返却処理の一部として会員にペナルティを付ける
///
/// ペナルティの書き込みは台帳削除に先立って行う。在庫加算と
/// 台帳削除は台帳側の単一トランザクションで行われる。
pub async fn return_book(deps: &ServiceDependencies, cmd: ReturnBook) -> Result<()> {
    require_codes(&cmd.book_code, &cmd.member_code)?;

    // 1. 書籍・会員の解決
    let book = deps
        .book_repository
        .find_by_code(&cmd.book_code)
        .await?
        .ok_or(LendingError::BookNotFound)?;

    let member = deps
        .member_repository
        .find_by_code(&cmd.member_code)
        .await?
        .ok_or(LendingError::MemberNotFound)?;

    // 2. 貸出レコードの解決
    let loan = deps
        .loan_repository
        .find_by_book_and_member(book.id, member.id)
        .await?
        .ok_or(LendingError::LoanNotFound)?;

    // 3. 延滞ペナルティ（返却時刻を起点に設定）
    if loan.is_overdue(cmd.returned_at) {
        deps.member_repository
            .update(&penalize(&member, cmd.returned_at), &member.code)
            .await?;
    }

    // 4. 在庫加算＋台帳削除（単一トランザクション）
    match deps.loan_repository.delete(book.id, member.id).await {
        Ok(()) => Ok(()),
        Err(RepositoryError::NotFound) => Err(LendingError::LoanNotFound),
        Err(e) => Err(LendingError::Storage(e)),
    }
}
