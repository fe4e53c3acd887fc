use async_trait::async_trait;

use super::Result;
use crate::domain::{Member, MemberDraft, MemberId, MemberUpdate};

/// 会員リポジトリポート
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// コードで会員を検索する
    async fn find_by_code(&self, code: &str) -> Result<Option<Member>>;

    /// IDで会員を検索する
    async fn find_by_id(&self, id: MemberId) -> Result<Option<Member>>;

    /// 全会員を取得する
    async fn find_all(&self) -> Result<Vec<Member>>;

    /// 会員を登録し、採番されたIDを含む会員を返す
    ///
    /// 新規会員は`penalized_at`なしで作成される。
    async fn insert(&self, draft: &MemberDraft) -> Result<Member>;

    /// コードをキーに会員を更新する
    ///
    /// `penalized_at`を設定・消去できる唯一の書き込み経路。
    async fn update(&self, update: &MemberUpdate, code: &str) -> Result<()>;
}
