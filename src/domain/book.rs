use serde::{Deserialize, Serialize};

use super::BookId;

/// 書籍 - カタログ管理の中心エンティティ
///
/// 不変条件：`stock`は常に0以上で、貸出中でない物理的な在庫数と一致する。
/// 在庫の増減は必ず貸出・返却のトランザクションの一部として行われ、
/// 独立した公開操作としては存在しない（直接編集を除く）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    /// 人間が付与する一意なコード（例: "JK-45"）
    pub code: String,
    pub title: String,
    pub author: String,
    pub stock: i32,
}

impl Book {
    /// 貸出可能な在庫があるか
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// 書籍の登録・更新ペイロード
///
/// IDはサーバー採番のため持たない。更新時のキーは既存のコードで、
/// コード自体の変更は行わない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDraft {
    pub code: String,
    pub title: String,
    pub author: String,
    pub stock: i32,
}
