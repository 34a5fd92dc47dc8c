use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::models::{OwnerId, User, UserCredentials};

/// Insert a user. A taken e-mail address is reported as a conflict.
pub fn create_user(
    conn: &Connection,
    name: &str,
    email: &str,
    password_hash: &str,
) -> AppResult<User> {
    let inserted = conn.execute(
        "INSERT INTO users (name, email, password_hash) VALUES (?, ?, ?)",
        params![name, email, password_hash],
    );

    match inserted {
        Ok(_) => {}
        Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
            debug!(email, "Registration with an existing e-mail");
            return Err(AppError::Conflict("El email ya está registrado".into()));
        }
        Err(e) => return Err(e.into()),
    }

    let id = conn.last_insert_rowid();
    info!(user_id = id, "Created user");
    get_user(conn, OwnerId::new(id))?
        .ok_or_else(|| AppError::Internal("user vanished after insert".into()))
}

pub fn get_user(conn: &Connection, owner: OwnerId) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        "SELECT id, name, email, created_at FROM users WHERE id = ?",
        [owner.get()],
        |row| {
            Ok(User {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                created_at: row.get(3)?,
            })
        },
    )
    .optional()
}

pub fn find_credentials_by_email(
    conn: &Connection,
    email: &str,
) -> rusqlite::Result<Option<UserCredentials>> {
    conn.query_row(
        "SELECT id, name, email, created_at, password_hash FROM users WHERE email = ?",
        [email],
        |row| {
            Ok(UserCredentials {
                user: User {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    email: row.get(2)?,
                    created_at: row.get(3)?,
                },
                password_hash: row.get(4)?,
            })
        },
    )
    .optional()
}
