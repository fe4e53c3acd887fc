use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, borrow_book, create_book, create_member, delete_book, get_book, get_member,
    list_books, list_in_stock_books, list_members, return_book, update_book, update_member,
};

/// Creates the API router with all inventory and lending endpoints
///
/// Book catalog:
/// - GET /books - List all books
/// - GET /books/in-stock - List books with stock > 0
/// - GET /books/:code - Get a book by code
/// - POST /books - Register a book
/// - PUT /books/:code - Update a book
/// - DELETE /books/:code - Remove a book (fails while on loan)
///
/// Member directory:
/// - GET /members - List members with their borrow counts
/// - GET /members/:code - Get a member with loan records
/// - POST /members - Register a member
/// - PUT /members/:code - Update a member (incl. penalty)
///
/// Lending:
/// - POST /loans - Borrow a book
/// - POST /loans/return - Return a book
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Book catalog
        .route("/books", get(list_books).post(create_book))
        .route("/books/in-stock", get(list_in_stock_books))
        .route(
            "/books/:code",
            get(get_book).put(update_book).delete(delete_book),
        )
        // Member directory
        .route("/members", get(list_members).post(create_member))
        .route("/members/:code", get(get_member).put(update_member))
        // Lending
        .route("/loans", post(borrow_book))
        .route("/loans/return", post(return_book))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
