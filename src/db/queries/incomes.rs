use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use crate::date_utils::MonthYear;
use crate::db::sql::{bind, Assignments, Predicates};
use crate::error::{AppError, AppResult};
use crate::models::{Income, IncomeChanges, NewIncome, OwnerId};

#[derive(Debug, Default, Clone)]
pub struct IncomeFilter {
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl IncomeFilter {
    fn predicates(&self, owner: OwnerId) -> Predicates {
        let mut where_ = Predicates::owned_by("user_id", owner.get());
        if let (Some(month), Some(year)) = (self.month, self.year) {
            where_.eq("month", month).eq("year", year);
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            where_.between("date", start, end);
        }
        where_
    }
}

const INCOME_SELECT: &str = "SELECT id, user_id, amount_cents, description, date, month, year,
        created_at, updated_at
     FROM incomes";

fn map_income(row: &Row) -> rusqlite::Result<Income> {
    Ok(Income {
        id: row.get(0)?,
        user_id: row.get(1)?,
        amount_cents: row.get(2)?,
        description: row.get(3)?,
        date: row.get(4)?,
        month: row.get(5)?,
        year: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

pub fn list_incomes(
    conn: &Connection,
    owner: OwnerId,
    filter: &IncomeFilter,
) -> rusqlite::Result<Vec<Income>> {
    let where_ = filter.predicates(owner);
    let sql = format!(
        "{INCOME_SELECT} WHERE {} ORDER BY date DESC, created_at DESC, id DESC",
        where_.to_sql()
    );

    let mut stmt = conn.prepare(&sql)?;
    let incomes = stmt
        .query_map(where_.params().as_slice(), map_income)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    debug!(owner = owner.get(), count = incomes.len(), "Listed incomes");
    Ok(incomes)
}

pub fn get_income(conn: &Connection, owner: OwnerId, id: i64) -> rusqlite::Result<Option<Income>> {
    conn.query_row(
        &format!("{INCOME_SELECT} WHERE id = ? AND user_id = ?"),
        params![id, owner.get()],
        map_income,
    )
    .optional()
}

pub fn create_income(conn: &Connection, owner: OwnerId, income: &NewIncome) -> AppResult<Income> {
    let period = MonthYear::of(income.date);
    conn.execute(
        "INSERT INTO incomes (user_id, amount_cents, description, date, month, year)
         VALUES (?, ?, ?, ?, ?, ?)",
        params![
            owner.get(),
            income.amount_cents,
            income.description,
            income.date,
            period.month,
            period.year
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!(income_id = id, owner = owner.get(), amount_cents = income.amount_cents, "Created income");

    get_income(conn, owner, id)?
        .ok_or_else(|| AppError::Internal("income vanished after insert".into()))
}

/// Returns `Ok(None)` when no income with this id belongs to `owner`.
pub fn update_income(
    conn: &Connection,
    owner: OwnerId,
    id: i64,
    changes: &IncomeChanges,
) -> AppResult<Option<Income>> {
    if changes.is_empty() {
        return Err(AppError::NoFieldsToUpdate);
    }

    let mut set = Assignments::new();
    set.set_opt("amount_cents", changes.amount_cents)
        .set_opt("description", changes.description.clone());
    if let Some(date) = changes.date {
        let period = MonthYear::of(date);
        set.set("date", date)
            .set("month", period.month)
            .set("year", period.year);
    }
    set.touch("updated_at");

    let mut where_ = Predicates::owned_by("user_id", owner.get());
    where_.eq("id", id);

    let sql = format!("UPDATE incomes SET {} WHERE {}", set.to_sql(), where_.to_sql());
    let mut params = set.into_params();
    params.extend(where_.into_params());

    let rows = conn.execute(&sql, bind(&params).as_slice())?;
    if rows == 0 {
        return Ok(None);
    }
    info!(income_id = id, owner = owner.get(), "Updated income");

    Ok(get_income(conn, owner, id)?)
}

pub fn delete_income(conn: &Connection, owner: OwnerId, id: i64) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "DELETE FROM incomes WHERE id = ? AND user_id = ?",
        params![id, owner.get()],
    )?;
    if rows > 0 {
        info!(income_id = id, owner = owner.get(), "Deleted income");
    }
    Ok(rows > 0)
}

pub fn total_for_month(
    conn: &Connection,
    owner: OwnerId,
    period: MonthYear,
) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COALESCE(SUM(amount_cents), 0) FROM incomes
         WHERE user_id = ? AND month = ? AND year = ?",
        params![owner.get(), period.month, period.year],
        |row| row.get(0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::queries::test_support::{date, insert_user, migrated_conn};

    fn new_income(cents: i64, on: &str) -> NewIncome {
        NewIncome {
            amount_cents: cents,
            description: "Salario".into(),
            date: date(on),
        }
    }

    #[test]
    fn test_create_and_list_by_period() {
        let conn = migrated_conn();
        let owner = insert_user(&conn, "a@example.com");
        create_income(&conn, owner, &new_income(300_000, "2024-03-01")).unwrap();
        create_income(&conn, owner, &new_income(50_000, "2024-04-01")).unwrap();

        let filter = IncomeFilter {
            month: Some(4),
            year: Some(2024),
            ..Default::default()
        };
        let april = list_incomes(&conn, owner, &filter).unwrap();
        assert_eq!(april.len(), 1);
        assert_eq!(april[0].amount_cents, 50_000);

        let period = MonthYear {
            month: 3,
            year: 2024,
        };
        assert_eq!(total_for_month(&conn, owner, period).unwrap(), 300_000);
    }

    #[test]
    fn test_partial_update_keeps_other_fields() {
        let conn = migrated_conn();
        let owner = insert_user(&conn, "a@example.com");
        let created = create_income(&conn, owner, &new_income(1000, "2024-03-01")).unwrap();

        let changes = IncomeChanges {
            description: Some("Bono".into()),
            ..Default::default()
        };
        let updated = update_income(&conn, owner, created.id, &changes)
            .unwrap()
            .unwrap();

        assert_eq!(updated.description, "Bono");
        assert_eq!(updated.amount_cents, 1000);
        assert_eq!(updated.date, created.date);
        assert_eq!((updated.month, updated.year), (3, 2024));
    }

    #[test]
    fn test_update_date_recomputes_period() {
        let conn = migrated_conn();
        let owner = insert_user(&conn, "a@example.com");
        let created = create_income(&conn, owner, &new_income(1000, "2024-12-31")).unwrap();

        let changes = IncomeChanges {
            date: Some(date("2025-02-10")),
            ..Default::default()
        };
        let updated = update_income(&conn, owner, created.id, &changes)
            .unwrap()
            .unwrap();
        assert_eq!((updated.month, updated.year), (2, 2025));
    }

    #[test]
    fn test_delete_is_owner_scoped() {
        let conn = migrated_conn();
        let owner = insert_user(&conn, "a@example.com");
        let other = insert_user(&conn, "b@example.com");
        let created = create_income(&conn, owner, &new_income(1000, "2024-03-01")).unwrap();

        assert!(!delete_income(&conn, other, created.id).unwrap());
        assert!(delete_income(&conn, owner, created.id).unwrap());
        assert!(get_income(&conn, owner, created.id).unwrap().is_none());
    }

    #[test]
    fn test_empty_update_is_rejected() {
        let conn = migrated_conn();
        let owner = insert_user(&conn, "a@example.com");
        let err = update_income(&conn, owner, 1, &IncomeChanges::default()).unwrap_err();
        assert!(matches!(err, AppError::NoFieldsToUpdate));
    }
}
