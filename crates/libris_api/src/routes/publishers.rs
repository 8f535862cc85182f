use super::{message, Message};
use crate::dto::{JsonBody, PathParam, PublisherBody};
use crate::error::ApiResult;
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use libris_core::model::publisher::Publisher;
use libris_core::repo::publisher_repo::SqlitePublisherRepository;
use libris_core::service::PublisherService;
use libris_core::LibraryResult;
use rusqlite::Connection;

fn service(conn: &Connection) -> LibraryResult<PublisherService<SqlitePublisherRepository<'_>>> {
    Ok(PublisherService::new(SqlitePublisherRepository::try_new(conn)?))
}

pub(super) async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Publisher>>> {
    let publishers = state
        .run(|conn, _| service(conn)?.list_publishers())
        .await?;
    Ok(Json(publishers))
}

pub(super) async fn fetch(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> ApiResult<Json<Publisher>> {
    let publisher = state
        .run(move |conn, _| service(conn)?.get_publisher(id))
        .await?;
    Ok(Json(publisher))
}

pub(super) async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<PublisherBody>,
) -> ApiResult<(StatusCode, Json<Publisher>)> {
    let input = body.into_new();
    let created = state
        .run(move |conn, _| service(conn)?.create_publisher(&input))
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub(super) async fn update(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
    JsonBody(body): JsonBody<PublisherBody>,
) -> ApiResult<Json<Publisher>> {
    let patch = body.into_patch();
    let updated = state
        .run(move |conn, _| service(conn)?.update_publisher(id, &patch))
        .await?;
    Ok(Json(updated))
}

pub(super) async fn remove(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> ApiResult<Json<Message>> {
    state
        .run(move |conn, _| service(conn)?.delete_publisher(id))
        .await?;
    Ok(message("publisher deleted"))
}
