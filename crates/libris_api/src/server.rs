//! Process bootstrap: pool, hasher, listener and graceful shutdown.

use crate::config::ServerConfig;
use crate::state::AppState;
use libris_core::{open_pool, DbError, HashError, Pbkdf2Hasher};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

#[derive(Debug)]
pub enum StartupError {
    Db(DbError),
    Hash(HashError),
    Io(std::io::Error),
}

impl Display for StartupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "database setup failed: {err}"),
            Self::Hash(err) => write!(f, "password hasher setup failed: {err}"),
            Self::Io(err) => write!(f, "server I/O failed: {err}"),
        }
    }
}

impl Error for StartupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Hash(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<DbError> for StartupError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<HashError> for StartupError {
    fn from(value: HashError) -> Self {
        Self::Hash(value)
    }
}

impl From<std::io::Error> for StartupError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Opens the store and serves until Ctrl-C.
pub async fn serve(config: ServerConfig) -> Result<(), StartupError> {
    let pool = open_pool(&config.db_path, config.pool_size)?;
    let hasher = Pbkdf2Hasher::new(config.hash_rounds)?;
    let state = AppState::new(pool, Arc::new(hasher));
    let app = crate::build_router(state, config.static_dir.as_deref());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(
        "event=server_start module=api status=ok bind_addr={} db_path={} pool_size={}",
        config.bind_addr,
        config.db_path.display(),
        config.pool_size
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=api status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("event=server_signal module=api status=error detail={err}");
    }
}
