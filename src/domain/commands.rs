use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// コマンド：書籍を貸し出す
///
/// 時刻をコマンドに含めることで、貸出ルールの判定を呼び出し時点に固定する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowBook {
    pub book_code: String,
    pub member_code: String,
    pub borrowed_at: DateTime<Utc>,
}

/// コマンド：書籍を返却する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnBook {
    pub book_code: String,
    pub member_code: String,
    pub returned_at: DateTime<Utc>,
}
