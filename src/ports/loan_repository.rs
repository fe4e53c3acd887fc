use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::Result;
use crate::domain::{BookId, Loan, MemberId};

/// 貸出台帳ポート
///
/// 台帳への書き込みは在庫の増減と不可分のため、`insert`と`delete`は
/// 在庫調整を含むひとつのトランザクションとして実装される。
/// これにより同時実行下でも在庫が負にならないことを保証する。
#[async_trait]
pub trait LoanRepository: Send + Sync {
    /// (書籍, 会員) の組で貸出レコードを検索する
    async fn find_by_book_and_member(
        &self,
        book_id: BookId,
        member_id: MemberId,
    ) -> Result<Option<Loan>>;

    /// 会員の貸出レコードをすべて取得する
    ///
    /// 貸出上限（会員ごと最大2冊）の確認に使用される。
    async fn find_by_member(&self, member_id: MemberId) -> Result<Vec<Loan>>;

    /// 貸出レコードを作成する
    ///
    /// 同一トランザクションで在庫を条件付きで1減らす。
    /// 在庫が1未満なら`StockExhausted`、同じ組の貸出が既に存在する
    /// 場合は`Duplicate`を返し、どちらの場合も書き込みは残らない。
    async fn insert(
        &self,
        book_id: BookId,
        member_id: MemberId,
        borrowed_at: DateTime<Utc>,
    ) -> Result<()>;

    /// 貸出レコードを削除する
    ///
    /// 同一トランザクションで在庫を1増やす。
    /// レコードが存在しない場合は`NotFound`を返し、在庫は変化しない。
    async fn delete(&self, book_id: BookId, member_id: MemberId) -> Result<()>;
}
