use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::models::{NewPaymentMethod, PaymentMethod};

const PAYMENT_METHOD_COLUMNS: &str = "id, name, description, icon, active, created_at";

fn map_payment_method(row: &Row) -> rusqlite::Result<PaymentMethod> {
    Ok(PaymentMethod {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        icon: row.get(3)?,
        active: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Only active methods are offered to clients.
pub fn list_active_payment_methods(conn: &Connection) -> rusqlite::Result<Vec<PaymentMethod>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PAYMENT_METHOD_COLUMNS} FROM payment_methods WHERE active = 1 ORDER BY name"
    ))?;
    let methods = stmt
        .query_map([], map_payment_method)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    debug!(count = methods.len(), "Listed payment methods");
    Ok(methods)
}

pub fn get_payment_method(conn: &Connection, id: i64) -> rusqlite::Result<Option<PaymentMethod>> {
    conn.query_row(
        &format!("SELECT {PAYMENT_METHOD_COLUMNS} FROM payment_methods WHERE id = ?"),
        [id],
        map_payment_method,
    )
    .optional()
}

pub fn create_payment_method(
    conn: &Connection,
    method: &NewPaymentMethod,
) -> rusqlite::Result<PaymentMethod> {
    conn.execute(
        "INSERT INTO payment_methods (name, description, icon) VALUES (?, ?, ?)",
        params![method.name, method.description, method.icon],
    )?;
    let id = conn.last_insert_rowid();
    debug!(payment_method_id = id, name = %method.name, "Created payment method");

    conn.query_row(
        &format!("SELECT {PAYMENT_METHOD_COLUMNS} FROM payment_methods WHERE id = ?"),
        [id],
        map_payment_method,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::queries::test_support::migrated_conn;

    #[test]
    fn test_inactive_methods_are_hidden() {
        let conn = migrated_conn();
        let before = list_active_payment_methods(&conn).unwrap().len();

        conn.execute("UPDATE payment_methods SET active = 0 WHERE id = 1", [])
            .unwrap();

        let after = list_active_payment_methods(&conn).unwrap();
        assert_eq!(after.len(), before - 1);
        assert!(after.iter().all(|m| m.id != 1 && m.active));
        assert!(!get_payment_method(&conn, 1).unwrap().unwrap().active);
    }

    #[test]
    fn test_create_payment_method_is_active() {
        let conn = migrated_conn();
        let created = create_payment_method(
            &conn,
            &NewPaymentMethod {
                name: "Cheque".into(),
                description: Some("Pago con cheque".into()),
                icon: "file-text".into(),
            },
        )
        .unwrap();

        assert!(created.active);
        assert_eq!(created.description.as_deref(), Some("Pago con cheque"));
    }
}
