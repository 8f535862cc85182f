use super::{message, Message};
use crate::dto::{JsonBody, PathParam, RegisterReaderBody};
use crate::error::ApiResult;
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use libris_core::model::reader::{Reader, ReaderPatch, ReaderWithPhones};
use libris_core::repo::reader_repo::SqliteReaderRepository;
use libris_core::service::ReaderService;
use libris_core::LibraryResult;
use rusqlite::Connection;
use serde::Serialize;

#[derive(Serialize)]
pub(crate) struct Registered {
    user_id: i64,
    message: &'static str,
}

fn service(conn: &Connection) -> LibraryResult<ReaderService<SqliteReaderRepository<'_>>> {
    Ok(ReaderService::new(SqliteReaderRepository::try_new(conn)?))
}

pub(super) async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Reader>>> {
    let readers = state.run(|conn, _| service(conn)?.list_readers()).await?;
    Ok(Json(readers))
}

pub(super) async fn list_full(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ReaderWithPhones>>> {
    let readers = state
        .run(|conn, _| service(conn)?.list_readers_with_phones())
        .await?;
    Ok(Json(readers))
}

pub(super) async fn fetch(
    State(state): State<AppState>,
    PathParam(user_id): PathParam<i64>,
) -> ApiResult<Json<ReaderWithPhones>> {
    let reader = state
        .run(move |conn, _| service(conn)?.get_reader(user_id))
        .await?;
    Ok(Json(reader))
}

pub(super) async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RegisterReaderBody>,
) -> ApiResult<(StatusCode, Json<Registered>)> {
    let input = body.into_new()?;
    let user_id = state
        .run(move |conn, _| service(conn)?.register_reader(&input))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(Registered {
            user_id,
            message: "reader registered",
        }),
    ))
}

pub(super) async fn update(
    State(state): State<AppState>,
    PathParam(user_id): PathParam<i64>,
    JsonBody(patch): JsonBody<ReaderPatch>,
) -> ApiResult<Json<Reader>> {
    let updated = state
        .run(move |conn, _| service(conn)?.update_reader(user_id, &patch))
        .await?;
    Ok(Json(updated))
}

pub(super) async fn remove(
    State(state): State<AppState>,
    PathParam(user_id): PathParam<i64>,
) -> ApiResult<Json<Message>> {
    state
        .run(move |conn, _| service(conn)?.delete_reader(user_id))
        .await?;
    Ok(message("reader deleted"))
}
