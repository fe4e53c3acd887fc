use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::MemberDetails;
use crate::domain::{Book, BookDraft, Loan, MemberDraft, MemberUpdate};

/// 書籍の登録リクエスト（POST /books）
#[derive(Debug, Deserialize)]
pub struct CreateBookRequest {
    pub code: String,
    pub title: String,
    pub author: String,
    pub stock: i32,
}

impl CreateBookRequest {
    pub fn into_draft(self) -> BookDraft {
        BookDraft {
            code: self.code,
            title: self.title,
            author: self.author,
            stock: self.stock,
        }
    }
}

/// 書籍の更新リクエスト（PUT /books/:code）
///
/// キーはパスのコード。ボディにコードは含めない。
#[derive(Debug, Deserialize)]
pub struct UpdateBookRequest {
    pub title: String,
    pub author: String,
    pub stock: i32,
}

impl UpdateBookRequest {
    pub fn into_draft(self, code: String) -> BookDraft {
        BookDraft {
            code,
            title: self.title,
            author: self.author,
            stock: self.stock,
        }
    }
}

/// 書籍レスポンス
#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub id: i32,
    pub code: String,
    pub title: String,
    pub author: String,
    pub stock: i32,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id.value(),
            code: book.code,
            title: book.title,
            author: book.author,
            stock: book.stock,
        }
    }
}

/// 会員の登録リクエスト（POST /members）
#[derive(Debug, Deserialize)]
pub struct CreateMemberRequest {
    pub code: String,
    pub name: String,
}

impl CreateMemberRequest {
    pub fn into_draft(self) -> MemberDraft {
        MemberDraft {
            code: self.code,
            name: self.name,
        }
    }
}

/// 会員の更新リクエスト（PUT /members/:code）
///
/// ペナルティの設定・消去はこの操作でのみ行える。
#[derive(Debug, Deserialize)]
pub struct UpdateMemberRequest {
    pub name: String,
    pub penalized_at: Option<DateTime<Utc>>,
}

impl UpdateMemberRequest {
    pub fn into_update(self) -> MemberUpdate {
        MemberUpdate {
            name: self.name,
            penalized_at: self.penalized_at,
        }
    }
}

/// 貸出レコードレスポンス
///
/// `more_than_seven_days`は保存された値ではなく、レスポンス生成時点の
/// 時刻から導出する。
#[derive(Debug, Serialize)]
pub struct LoanResponse {
    pub book_id: i32,
    pub member_id: i32,
    pub borrowed_at: DateTime<Utc>,
    pub more_than_seven_days: bool,
}

impl LoanResponse {
    pub fn from_loan(loan: &Loan, now: DateTime<Utc>) -> Self {
        Self {
            book_id: loan.book_id.value(),
            member_id: loan.member_id.value(),
            borrowed_at: loan.borrowed_at,
            more_than_seven_days: loan.is_overdue(now),
        }
    }
}

/// 会員詳細レスポンス（貸出状況付き）
#[derive(Debug, Serialize)]
pub struct MemberDetailResponse {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub penalized_at: Option<DateTime<Utc>>,
    /// 台帳のレコード数から導出した現在の貸出冊数
    pub borrowed_books: usize,
    pub loans: Vec<LoanResponse>,
}

impl MemberDetailResponse {
    pub fn from_details(details: MemberDetails, now: DateTime<Utc>) -> Self {
        let loans: Vec<LoanResponse> = details
            .loans
            .iter()
            .map(|loan| LoanResponse::from_loan(loan, now))
            .collect();

        Self {
            id: details.member.id.value(),
            code: details.member.code,
            name: details.member.name,
            penalized_at: details.member.penalized_at,
            borrowed_books: loans.len(),
            loans,
        }
    }
}

/// 貸出・返却リクエスト（POST /loans, POST /loans/return）
#[derive(Debug, Deserialize)]
pub struct LoanRequest {
    pub book_code: String,
    pub member_code: String,
}

/// エラーレスポンス
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
