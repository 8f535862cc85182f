use super::{message, Message};
use crate::dto::{BookPatchBody, BooksQuery, CreateBookBody, JsonBody, PathParam, SearchQuery};
use crate::error::ApiResult;
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use libris_core::model::book::{BookPage, BookPatch, BookRecord};
use libris_core::repo::book_repo::SqliteBookRepository;
use libris_core::service::BookService;
use libris_core::{LibraryResult, ValidationError};
use rusqlite::Connection;

fn service(conn: &Connection) -> LibraryResult<BookService<SqliteBookRepository<'_>>> {
    Ok(BookService::new(SqliteBookRepository::try_new(conn)?))
}

pub(super) async fn list(
    State(state): State<AppState>,
    Query(query): Query<BooksQuery>,
) -> ApiResult<Json<BookPage>> {
    let query = query.into_list_query()?;
    let page = state
        .run(move |conn, _| service(conn)?.list_books(&query))
        .await?;
    Ok(Json(page))
}

pub(super) async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<BookRecord>>> {
    let term = query.q.ok_or(ValidationError::MissingField("q"))?;
    let books = state
        .run(move |conn, _| service(conn)?.search_books(&term))
        .await?;
    Ok(Json(books))
}

pub(super) async fn available(State(state): State<AppState>) -> ApiResult<Json<Vec<BookRecord>>> {
    let books = state
        .run(|conn, _| service(conn)?.list_available_books())
        .await?;
    Ok(Json(books))
}

pub(super) async fn fetch(
    State(state): State<AppState>,
    PathParam(isbn): PathParam<String>,
) -> ApiResult<Json<BookRecord>> {
    let book = state
        .run(move |conn, _| service(conn)?.get_book(&isbn))
        .await?;
    Ok(Json(book))
}

pub(super) async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateBookBody>,
) -> ApiResult<(StatusCode, Json<BookRecord>)> {
    let book = body.into_book()?;
    let created = state
        .run(move |conn, _| service(conn)?.create_book(&book))
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub(super) async fn update(
    State(state): State<AppState>,
    PathParam(isbn): PathParam<String>,
    JsonBody(body): JsonBody<BookPatchBody>,
) -> ApiResult<Json<BookRecord>> {
    let patch = BookPatch::from(body);
    let updated = state
        .run(move |conn, _| service(conn)?.update_book(&isbn, &patch))
        .await?;
    Ok(Json(updated))
}

pub(super) async fn remove(
    State(state): State<AppState>,
    PathParam(isbn): PathParam<String>,
) -> ApiResult<Json<Message>> {
    state
        .run(move |conn, _| service(conn)?.delete_book(&isbn))
        .await?;
    Ok(message("book deleted"))
}
