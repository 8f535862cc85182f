use crate::dto::ReportQuery;
use crate::error::ApiResult;
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::Json;
use libris_core::model::report::{LibraryStats, ReportRecord};
use libris_core::repo::borrowing_repo::SqliteBorrowingRepository;
use libris_core::repo::report_repo::SqliteReportRepository;
use libris_core::service::ReportService;
use libris_core::LibraryResult;
use rusqlite::Connection;
use serde::Serialize;

#[derive(Serialize)]
pub(crate) struct Health {
    status: &'static str,
    message: &'static str,
    version: &'static str,
}

fn service(
    conn: &Connection,
) -> LibraryResult<ReportService<SqliteReportRepository<'_>, SqliteBorrowingRepository<'_>>> {
    Ok(ReportService::new(
        SqliteReportRepository::try_new(conn)?,
        SqliteBorrowingRepository::try_new(conn)?,
    ))
}

pub(super) async fn health() -> Json<Health> {
    Json(Health {
        status: "OK",
        message: "Libris API is running",
        version: libris_core::core_version(),
    })
}

pub(super) async fn list(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> ApiResult<Json<Vec<ReportRecord>>> {
    let action = query.into_filter()?;
    let reports = state
        .run(move |conn, _| service(conn)?.list_reports(action))
        .await?;
    Ok(Json(reports))
}

pub(super) async fn stats(State(state): State<AppState>) -> ApiResult<Json<LibraryStats>> {
    let today = state.today();
    let stats = state
        .run(move |conn, _| service(conn)?.compute_stats(today))
        .await?;
    Ok(Json(stats))
}
