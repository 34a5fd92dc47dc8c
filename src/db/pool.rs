use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use std::path::Path;

pub type DbPool = Pool<SqliteConnectionManager>;

pub fn create_pool(database_path: &Path) -> Result<DbPool, r2d2::Error> {
    if let Some(parent) = database_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }

    let manager = SqliteConnectionManager::file(database_path).with_init(|conn| {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;",
        )
    });

    Pool::builder().max_size(10).build(manager)
}

/// Pool over a private in-memory database.
///
/// Every connection opens the same shared-cache database, named uniquely per
/// pool so parallel tests never see each other's rows. The pool keeps one
/// idle connection alive, otherwise SQLite would drop the database.
pub fn create_in_memory_pool() -> Result<DbPool, r2d2::Error> {
    let uri = format!(
        "file:finanzas-{}?mode=memory&cache=shared",
        uuid::Uuid::new_v4()
    );
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_URI;

    let manager = SqliteConnectionManager::file(uri)
        .with_flags(flags)
        .with_init(|conn| {
            conn.execute_batch(
                "PRAGMA foreign_keys = ON;
                 PRAGMA read_uncommitted = true;",
            )
        });

    Pool::builder().max_size(10).min_idle(Some(1)).build(manager)
}
