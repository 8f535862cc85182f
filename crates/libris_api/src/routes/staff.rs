use super::{message, Message};
use crate::dto::{ChangePasswordBody, CreateStaffBody, JsonBody, LoginBody, PathParam};
use crate::error::ApiResult;
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use libris_core::model::staff::Staff;
use libris_core::repo::staff_repo::SqliteStaffRepository;
use libris_core::service::StaffService;
use libris_core::{LibraryError, LibraryResult, PasswordHasher, ValidationError};
use rusqlite::Connection;

fn service<'a>(
    conn: &'a Connection,
    hasher: &'a dyn PasswordHasher,
) -> LibraryResult<StaffService<'a, SqliteStaffRepository<'a>>> {
    Ok(StaffService::new(SqliteStaffRepository::try_new(conn)?, hasher))
}

pub(super) async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Staff>>> {
    let staff = state
        .run(|conn, hasher| service(conn, hasher)?.list_staff())
        .await?;
    Ok(Json(staff))
}

pub(super) async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateStaffBody>,
) -> ApiResult<(StatusCode, Json<Staff>)> {
    let input = body.into_new();
    let staff = state
        .run(move |conn, hasher| service(conn, hasher)?.create_staff_account(&input))
        .await?;
    Ok((StatusCode::CREATED, Json(staff)))
}

pub(super) async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginBody>,
) -> ApiResult<Json<Staff>> {
    // Blank credentials fail exactly like wrong ones.
    let (Some(login_id), Some(password)) = (body.login_id, body.password) else {
        return Err(LibraryError::InvalidCredentials.into());
    };
    let staff = state
        .run(move |conn, hasher| service(conn, hasher)?.authenticate(&login_id, &password))
        .await?;
    Ok(Json(staff))
}

pub(super) async fn change_password(
    State(state): State<AppState>,
    PathParam(staff_id): PathParam<i64>,
    JsonBody(body): JsonBody<ChangePasswordBody>,
) -> ApiResult<Json<Message>> {
    let old_password = body
        .old_password
        .ok_or(ValidationError::MissingField("old_password"))?;
    let new_password = body
        .new_password
        .ok_or(ValidationError::MissingField("new_password"))?;
    state
        .run(move |conn, hasher| {
            service(conn, hasher)?.change_password(staff_id, &old_password, &new_password)
        })
        .await?;
    Ok(message("password updated"))
}
