//! Schema migrations for the library database.
//!
//! # Responsibility
//! - Keep the ordered list of embedded schema steps.
//! - Bring a connection from its recorded version up to the latest one.
//!
//! # Invariants
//! - Steps are listed in strictly increasing version order.
//! - Each step commits together with its `PRAGMA user_version` bump, so a
//!   failed step leaves the database at the previous version.
//! - A database newer than this binary is refused, never downgraded.

use crate::db::{DbError, DbResult};
use log::{error, info};
use rusqlite::{Connection, TransactionBehavior};
use std::time::Instant;

struct SchemaStep {
    version: u32,
    label: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        label: "library_tables",
        sql: include_str!("0001_init.sql"),
    },
    SchemaStep {
        version: 2,
        label: "open_borrowing_guard",
        sql: include_str!("0002_open_borrowing_guard.sql"),
    },
];

/// Highest schema version this binary can produce.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.iter().map(|step| step.version).max().unwrap_or(0)
}

/// Runs every step above the connection's recorded version, one
/// transaction per step.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let recorded = current_user_version(conn)?;
    let latest = latest_version();
    if recorded > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: recorded,
            latest_supported: latest,
        });
    }

    for step in SCHEMA_STEPS.iter().filter(|step| step.version > recorded) {
        let started_at = Instant::now();
        if let Err(err) = run_step(conn, step) {
            error!(
                "event=db_migrate module=db status=error version={} label={} duration_ms={} error={}",
                step.version,
                step.label,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err);
        }
        info!(
            "event=db_migrate module=db status=ok version={} label={} duration_ms={}",
            step.version,
            step.label,
            started_at.elapsed().as_millis()
        );
    }
    Ok(())
}

fn run_step(conn: &mut Connection, step: &SchemaStep) -> DbResult<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    tx.execute_batch(step.sql)?;
    tx.pragma_update(None, "user_version", step.version)?;
    tx.commit()?;
    Ok(())
}

/// Reads the schema version recorded on the connection.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?;
    Ok(version)
}
