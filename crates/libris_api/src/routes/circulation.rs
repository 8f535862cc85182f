use crate::dto::{IssueBody, JsonBody, PathParam, ReturnBody, StatusQuery};
use crate::error::ApiResult;
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use libris_core::model::borrowing::{Borrowing, BorrowingRecord};
use libris_core::repo::borrowing_repo::SqliteBorrowingRepository;
use libris_core::service::CirculationService;
use libris_core::LibraryResult;
use rusqlite::Connection;
use serde::Serialize;

#[derive(Serialize)]
pub(crate) struct Issued {
    borrow_id: i64,
    message: &'static str,
}

#[derive(Serialize)]
pub(crate) struct Returned {
    message: &'static str,
    borrowing: Borrowing,
}

fn service(conn: &Connection) -> LibraryResult<CirculationService<SqliteBorrowingRepository<'_>>> {
    Ok(CirculationService::new(SqliteBorrowingRepository::try_new(conn)?))
}

pub(super) async fn list(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> ApiResult<Json<Vec<BorrowingRecord>>> {
    let status = query.into_filter()?;
    let today = state.today();
    let records = state
        .run(move |conn, _| service(conn)?.list_borrowings(status, today))
        .await?;
    Ok(Json(records))
}

pub(super) async fn fetch(
    State(state): State<AppState>,
    PathParam(borrow_id): PathParam<i64>,
) -> ApiResult<Json<BorrowingRecord>> {
    let today = state.today();
    let record = state
        .run(move |conn, _| service(conn)?.get_borrowing(borrow_id, today))
        .await?;
    Ok(Json(record))
}

pub(super) async fn issue(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<IssueBody>,
) -> ApiResult<(StatusCode, Json<Issued>)> {
    let request = body.into_request()?;
    let borrow_id = state
        .run(move |conn, _| service(conn)?.issue_book(&request))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(Issued {
            borrow_id,
            message: "book issued",
        }),
    ))
}

pub(super) async fn return_book(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<ReturnBody>,
) -> ApiResult<Json<Returned>> {
    let request = body.into_request()?;
    let borrowing = state
        .run(move |conn, _| service(conn)?.return_book(&request))
        .await?;
    Ok(Json(Returned {
        message: "book returned",
        borrowing,
    }))
}
