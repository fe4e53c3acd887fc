use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::application::LendingError;

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub struct ApiError(LendingError);

impl From<LendingError> for ApiError {
    fn from(err: LendingError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self.0 {
            // 400 Bad Request - 入力の欠落・不正
            LendingError::Validation(ref msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.as_str())
            }

            // 404 Not Found - 参照先が存在しない
            LendingError::BookNotFound => (StatusCode::NOT_FOUND, "BOOK_NOT_FOUND", "Book not found"),
            LendingError::MemberNotFound => {
                (StatusCode::NOT_FOUND, "MEMBER_NOT_FOUND", "Member not found")
            }
            LendingError::StockNotAvailable => (
                StatusCode::NOT_FOUND,
                "STOCK_NOT_AVAILABLE",
                "Stock is not available",
            ),
            LendingError::LoanNotFound => (
                StatusCode::NOT_FOUND,
                "LOAN_NOT_FOUND",
                "Member has not borrowed the book",
            ),

            // 403 Forbidden - ビジネスルールによる拒否
            LendingError::MemberPenalized => (
                StatusCode::FORBIDDEN,
                "MEMBER_PENALIZED",
                "Member is penalized",
            ),
            LendingError::BorrowLimitExceeded => (
                StatusCode::FORBIDDEN,
                "BORROW_LIMIT_EXCEEDED",
                "Member has more than one book borrowed",
            ),

            // 409 Conflict - 一意性違反、貸出中の削除
            LendingError::BookAlreadyExists => (
                StatusCode::CONFLICT,
                "BOOK_ALREADY_EXISTS",
                "Book already exists",
            ),
            LendingError::MemberAlreadyExists => (
                StatusCode::CONFLICT,
                "MEMBER_ALREADY_EXISTS",
                "Member already exists",
            ),
            LendingError::LoanAlreadyExists => (
                StatusCode::CONFLICT,
                "LOAN_ALREADY_EXISTS",
                "Book is already borrowed by the member",
            ),
            LendingError::BookCurrentlyBorrowed => (
                StatusCode::CONFLICT,
                "BOOK_CURRENTLY_BORROWED",
                "Book is being borrowed",
            ),

            // 500 Internal Server Error - 永続化の失敗
            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            LendingError::Storage(ref e) => {
                tracing::error!("Storage error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "An unexpected error occurred",
                )
            }
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
