//! REST route table.

use crate::state::AppState;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Serialize;

mod books;
mod circulation;
mod publishers;
mod readers;
mod reports;
mod staff;

/// Acknowledgement body for mutations without a natural payload.
#[derive(Serialize)]
pub(crate) struct Message {
    message: &'static str,
}

pub(crate) fn message(message: &'static str) -> Json<Message> {
    Json(Message { message })
}

pub(crate) fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(reports::health))
        .route("/api/books", get(books::list).post(books::create))
        .route("/api/books/search", get(books::search))
        .route("/api/books/available", get(books::available))
        .route(
            "/api/books/:isbn",
            get(books::fetch).put(books::update).delete(books::remove),
        )
        .route(
            "/api/publishers",
            get(publishers::list).post(publishers::create),
        )
        .route(
            "/api/publishers/:id",
            get(publishers::fetch)
                .put(publishers::update)
                .delete(publishers::remove),
        )
        .route("/api/readers", get(readers::list).post(readers::register))
        .route("/api/readers/full", get(readers::list_full))
        .route(
            "/api/readers/:user_id",
            get(readers::fetch).put(readers::update).delete(readers::remove),
        )
        .route("/api/staff", get(staff::list).post(staff::create))
        .route("/api/staff/login", post(staff::login))
        .route("/api/staff/:id/password", put(staff::change_password))
        .route(
            "/api/borrowings",
            get(circulation::list).post(circulation::issue),
        )
        .route("/api/borrowings/:id", get(circulation::fetch))
        .route("/api/returns", post(circulation::return_book))
        .route("/api/reports", get(reports::list))
        .route("/api/stats", get(reports::stats))
}
