use crate::domain::{Loan, Member, MemberDraft, MemberId, MemberUpdate};
use crate::ports::RepositoryError;

use super::ServiceDependencies;
use super::errors::{LendingError, Result};

/// 会員と貸出状況のセット
///
/// 会員の「現在の貸出冊数」は保存されず、台帳のレコード数から導出する。
#[derive(Debug, Clone)]
pub struct MemberDetails {
    pub member: Member,
    pub loans: Vec<Loan>,
}

fn require_code(code: &str) -> Result<()> {
    if code.trim().is_empty() {
        return Err(LendingError::Validation("code is required".to_string()));
    }
    Ok(())
}

/// 会員を登録する
///
/// 新規会員は常にペナルティなしで作成される。
pub async fn add_member(deps: &ServiceDependencies, draft: MemberDraft) -> Result<Member> {
    require_code(&draft.code)?;

    if deps
        .member_repository
        .find_by_code(&draft.code)
        .await?
        .is_some()
    {
        return Err(LendingError::MemberAlreadyExists);
    }

    let member = match deps.member_repository.insert(&draft).await {
        Ok(member) => member,
        Err(RepositoryError::Duplicate) => return Err(LendingError::MemberAlreadyExists),
        Err(e) => return Err(LendingError::Storage(e)),
    };

    Ok(member)
}

/// 会員を更新する
///
/// `penalized_at`を設定・消去できる唯一の操作。
pub async fn update_member(
    deps: &ServiceDependencies,
    update: MemberUpdate,
    code: &str,
) -> Result<()> {
    require_code(code)?;

    if deps.member_repository.find_by_code(code).await?.is_none() {
        return Err(LendingError::MemberNotFound);
    }

    deps.member_repository.update(&update, code).await?;

    Ok(())
}

/// コードで会員を取得する（貸出状況付き）
pub async fn get_member(deps: &ServiceDependencies, code: &str) -> Result<MemberDetails> {
    require_code(code)?;

    let member = deps
        .member_repository
        .find_by_code(code)
        .await?
        .ok_or(LendingError::MemberNotFound)?;

    let loans = deps.loan_repository.find_by_member(member.id).await?;

    Ok(MemberDetails { member, loans })
}

/// IDで会員を取得する
pub async fn get_member_by_id(deps: &ServiceDependencies, id: MemberId) -> Result<Member> {
    deps.member_repository
        .find_by_id(id)
        .await?
        .ok_or(LendingError::MemberNotFound)
}

/// 全会員を取得する（各会員の貸出状況付き）
pub async fn get_members(deps: &ServiceDependencies) -> Result<Vec<MemberDetails>> {
    let members = deps.member_repository.find_all().await?;

    let mut details = Vec::with_capacity(members.len());
    for member in members {
        let loans = deps.loan_repository.find_by_member(member.id).await?;
        details.push(MemberDetails { member, loans });
    }

    Ok(details)
}
