pub mod migrations;
pub mod pool;
pub mod queries;
pub mod sql;

pub use pool::{create_in_memory_pool, create_pool, DbPool};

use rusqlite::Connection;

use crate::error::{AppError, AppResult};

/// Run blocking database work on its own pooled connection.
///
/// The closure executes on tokio's blocking thread pool, so several calls
/// awaited together really do query SQLite in parallel.
pub async fn with_conn<T, F>(pool: &DbPool, f: F) -> AppResult<T>
where
    F: FnOnce(&Connection) -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let conn = pool.get()?;
        f(&conn)
    })
    .await
    .map_err(|e| AppError::Internal(format!("database task failed: {e}")))?
}
