use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, MemberId};

/// 貸出期間（日数）
///
/// この日数を超えた返却は延滞扱いとなり、会員にペナルティが付く。
pub const LOAN_PERIOD_DAYS: i64 = 7;

/// 貸出レコード - 台帳のエントリ
///
/// (book_id, member_id) の組ごとに高々1件のみ存在する。
/// 貸出成立時に作成され、返却時に削除される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub book_id: BookId,
    pub member_id: MemberId,
    pub borrowed_at: DateTime<Utc>,
}

impl Loan {
    /// 貸出期間（7日間）を超過しているか
    ///
    /// 延滞は保存されたフラグではなく、読み取り時点の`now`と
    /// `borrowed_at`から毎回導出する。
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        now - self.borrowed_at > Duration::days(LOAN_PERIOD_DAYS)
    }
}
