use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::MemberId;

/// ペナルティ期間（日数）
///
/// 延滞返却の処理時点からこの日数の間、会員は新規に借りられない。
pub const PENALTY_PERIOD_DAYS: i64 = 3;

/// 会員 - 会員名簿の中心エンティティ
///
/// `penalized_at`は延滞返却を処理した瞬間に設定され、ペナルティ期間の
/// 起点を表す。未設定は「ペナルティなし」を意味する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    /// 人間が付与する一意なコード（例: "M001"）
    pub code: String,
    pub name: String,
    pub penalized_at: Option<DateTime<Utc>>,
}

impl Member {
    /// ペナルティ期間内か（読み取り時点で判定）
    ///
    /// `penalized_at`は期間経過後も自動では消去されない。借りるたびに
    /// 経過日数を再計算する。消去は会員更新操作でのみ行える。
    pub fn penalty_active(&self, now: DateTime<Utc>) -> bool {
        self.penalized_at
            .is_some_and(|at| now - at < Duration::days(PENALTY_PERIOD_DAYS))
    }
}

/// 会員の新規登録ペイロード
///
/// 新規会員は常にペナルティなしで作成される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDraft {
    pub code: String,
    pub name: String,
}

/// 会員の更新ペイロード
///
/// `penalized_at`を設定・消去できる唯一の経路。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberUpdate {
    pub name: String,
    pub penalized_at: Option<DateTime<Utc>>,
}
