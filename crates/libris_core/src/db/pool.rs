//! Pooled SQLite connections for concurrent request handling.

use super::open::{configure_connection, open_db};
use super::DbResult;
use log::info;
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;

pub type DbPool = r2d2::Pool<SqliteConnectionManager>;
pub type PooledConn = r2d2::PooledConnection<SqliteConnectionManager>;

/// Migrates the database file once, then builds a pool over it.
///
/// Pooled connections only get pragmas applied; the schema is already
/// current when the first one is handed out.
pub fn open_pool(path: impl AsRef<Path>, max_size: u32) -> DbResult<DbPool> {
    let path = path.as_ref();
    drop(open_db(path)?);

    let manager = SqliteConnectionManager::file(path).with_init(|conn| configure_connection(conn));
    let pool = r2d2::Pool::builder()
        .max_size(max_size.max(1))
        .test_on_check_out(true)
        .build(manager)?;

    info!(
        "event=db_pool module=db status=ok path={} max_size={}",
        path.display(),
        pool.max_size()
    );
    Ok(pool)
}
