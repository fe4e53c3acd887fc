use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use std::sync::Arc;

use crate::application::{self, ServiceDependencies};
use crate::domain::commands::{BorrowBook, ReturnBook};

use super::{
    error::ApiError,
    types::{
        BookResponse, CreateBookRequest, CreateMemberRequest, LoanRequest, MemberDetailResponse,
        UpdateBookRequest, UpdateMemberRequest,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

// ============================================================================
// Book handlers
// ============================================================================

/// GET /books - 全書籍を取得
pub async fn list_books(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BookResponse>>, ApiError> {
    let books = application::get_books(&state.service_deps).await?;

    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

/// GET /books/in-stock - 在庫のある書籍のみ取得
pub async fn list_in_stock_books(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BookResponse>>, ApiError> {
    let books = application::get_in_stock_books(&state.service_deps).await?;

    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

/// GET /books/:code - コードで書籍を取得
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<BookResponse>, ApiError> {
    let book = application::get_book(&state.service_deps, &code).await?;

    Ok(Json(BookResponse::from(book)))
}

/// POST /books - 書籍を登録
///
/// 同じコードの書籍が既にある場合は409を返す。
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateBookRequest>,
) -> Result<(StatusCode, Json<BookResponse>), ApiError> {
    let book = application::add_book(&state.service_deps, req.into_draft()).await?;

    Ok((StatusCode::CREATED, Json(BookResponse::from(book))))
}

/// PUT /books/:code - 書籍を更新
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    Json(req): Json<UpdateBookRequest>,
) -> Result<StatusCode, ApiError> {
    let draft = req.into_draft(code.clone());
    application::update_book(&state.service_deps, draft, &code).await?;

    Ok(StatusCode::OK)
}

/// DELETE /books/:code - 書籍を削除
///
/// 貸出中の書籍は削除できない（409）。
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<StatusCode, ApiError> {
    application::remove_book(&state.service_deps, &code).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Member handlers
// ============================================================================

/// GET /members - 全会員を取得（貸出状況付き）
pub async fn list_members(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MemberDetailResponse>>, ApiError> {
    let details = application::get_members(&state.service_deps).await?;

    let now = Utc::now();
    Ok(Json(
        details
            .into_iter()
            .map(|d| MemberDetailResponse::from_details(d, now))
            .collect(),
    ))
}

/// GET /members/:code - コードで会員を取得（貸出状況付き）
pub async fn get_member(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<MemberDetailResponse>, ApiError> {
    let details = application::get_member(&state.service_deps, &code).await?;

    Ok(Json(MemberDetailResponse::from_details(details, Utc::now())))
}

/// POST /members - 会員を登録
pub async fn create_member(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateMemberRequest>,
) -> Result<(StatusCode, Json<MemberDetailResponse>), ApiError> {
    let member = application::add_member(&state.service_deps, req.into_draft()).await?;

    let details = application::MemberDetails {
        member,
        loans: Vec::new(),
    };

    Ok((
        StatusCode::CREATED,
        Json(MemberDetailResponse::from_details(details, Utc::now())),
    ))
}

/// PUT /members/:code - 会員を更新
///
/// ペナルティの設定・消去はこの操作でのみ行える。
pub async fn update_member(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    Json(req): Json<UpdateMemberRequest>,
) -> Result<StatusCode, ApiError> {
    application::update_member(&state.service_deps, req.into_update(), &code).await?;

    Ok(StatusCode::OK)
}

// ============================================================================
// Lending handlers
// ============================================================================

/// POST /loans - 書籍を貸し出す
///
/// 強制されるビジネスルール:
/// - 書籍が存在し、在庫があること
/// - 会員が存在すること
/// - 会員がペナルティ期間中でないこと
/// - 会員の貸出冊数が上限（2冊）未満であること
pub async fn borrow_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoanRequest>,
) -> Result<StatusCode, ApiError> {
    let cmd = BorrowBook {
        book_code: req.book_code,
        member_code: req.member_code,
        borrowed_at: Utc::now(),
    };

    application::borrow_book(&state.service_deps, cmd).await?;

    Ok(StatusCode::CREATED)
}

/// POST /loans/return - 書籍を返却する
///
/// 7日を超過した返却は、返却処理の一部として会員にペナルティを付ける。
pub async fn return_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoanRequest>,
) -> Result<StatusCode, ApiError> {
    let cmd = ReturnBook {
        book_code: req.book_code,
        member_code: req.member_code,
        returned_at: Utc::now(),
    };

    application::return_book(&state.service_deps, cmd).await?;

    Ok(StatusCode::OK)
}
