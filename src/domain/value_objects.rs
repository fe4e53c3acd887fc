use serde::{Deserialize, Serialize};

/// 書籍ID - カタログが採番するサロゲートキー
///
/// データベースのSERIAL列から割り当てられ、作成後は不変。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookId(i32);

impl BookId {
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

/// 会員ID - 会員名簿が採番するサロゲートキー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberId(i32);

impl MemberId {
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}
