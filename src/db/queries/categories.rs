use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::models::{Category, CategoryKind, NewCategory};

const CATEGORY_COLUMNS: &str = "id, name, description, icon, color, kind, created_at";

fn map_category(row: &Row) -> rusqlite::Result<Category> {
    let kind: String = row.get(5)?;
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        icon: row.get(3)?,
        color: row.get(4)?,
        kind: CategoryKind::from_db(&kind).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                5,
                rusqlite::types::Type::Text,
                format!("unknown category kind {kind:?}").into(),
            )
        })?,
        created_at: row.get(6)?,
    })
}

pub fn list_categories(conn: &Connection) -> rusqlite::Result<Vec<Category>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY kind, name"
    ))?;
    let categories = stmt
        .query_map([], map_category)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    debug!(count = categories.len(), "Listed categories");
    Ok(categories)
}

pub fn list_categories_by_kind(
    conn: &Connection,
    kind: CategoryKind,
) -> rusqlite::Result<Vec<Category>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM categories WHERE kind = ? ORDER BY name"
    ))?;
    let categories = stmt
        .query_map([kind.as_str()], map_category)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    debug!(count = categories.len(), kind = kind.as_str(), "Listed categories by kind");
    Ok(categories)
}

pub fn get_category(conn: &Connection, id: i64) -> rusqlite::Result<Option<Category>> {
    conn.query_row(
        &format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?"),
        [id],
        map_category,
    )
    .optional()
}

pub fn create_category(conn: &Connection, category: &NewCategory) -> rusqlite::Result<Category> {
    conn.execute(
        "INSERT INTO categories (name, description, icon, color, kind) VALUES (?, ?, ?, ?, ?)",
        params![
            category.name,
            category.description,
            category.icon,
            category.color,
            category.kind.as_str()
        ],
    )?;
    let id = conn.last_insert_rowid();
    debug!(category_id = id, name = %category.name, "Created category");

    conn.query_row(
        &format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?"),
        [id],
        map_category,
    )
}
