//! Read-only aggregates behind the dashboard. Amounts are in cents.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::OwnerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    Income,
    Expense,
}

/// One month's total of either incomes or expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthFlow {
    pub month: u32,
    pub kind: FlowKind,
    pub total_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryYearTotal {
    pub name: String,
    pub icon: String,
    pub color: String,
    pub total_cents: i64,
    pub count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct YearTotals {
    pub income_cents: i64,
    pub expense_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayTotal {
    pub date: NaiveDate,
    pub total_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryAllTimeTotal {
    pub name: String,
    pub icon: String,
    pub total_cents: i64,
}

/// All-time income minus all-time expenses.
pub fn all_time_balance(conn: &Connection, owner: OwnerId) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT
            (SELECT COALESCE(SUM(amount_cents), 0) FROM incomes WHERE user_id = ?1)
          - (SELECT COALESCE(SUM(amount_cents), 0) FROM expenses WHERE user_id = ?1)",
        [owner.get()],
        |row| row.get(0),
    )
}

/// Per-month income and expense totals of a year. Months without activity
/// have no row.
pub fn month_flows(conn: &Connection, owner: OwnerId, year: i32) -> rusqlite::Result<Vec<MonthFlow>> {
    let mut stmt = conn.prepare(
        "SELECT month, 'income' AS kind, SUM(amount_cents) FROM incomes
         WHERE user_id = ?1 AND year = ?2 GROUP BY month
         UNION ALL
         SELECT month, 'expense' AS kind, SUM(amount_cents) FROM expenses
         WHERE user_id = ?1 AND year = ?2 GROUP BY month
         ORDER BY 1",
    )?;
    let flows = stmt
        .query_map(params![owner.get(), year], |row| {
            let kind: String = row.get(1)?;
            Ok(MonthFlow {
                month: row.get(0)?,
                kind: if kind == "income" {
                    FlowKind::Income
                } else {
                    FlowKind::Expense
                },
                total_cents: row.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(flows)
}

/// Expense categories with the most spending in a year. Unused categories are skipped.
pub fn top_categories(
    conn: &Connection,
    owner: OwnerId,
    year: i32,
    limit: i64,
) -> rusqlite::Result<Vec<CategoryYearTotal>> {
    let mut stmt = conn.prepare(
        "SELECT c.name, c.icon, c.color, SUM(e.amount_cents) AS total, COUNT(e.id)
         FROM expenses e
         JOIN categories c ON c.id = e.category_id
         WHERE e.user_id = ? AND e.year = ?
         GROUP BY c.id
         ORDER BY total DESC, c.name
         LIMIT ?",
    )?;
    let totals = stmt
        .query_map(params![owner.get(), year, limit], |row| {
            Ok(CategoryYearTotal {
                name: row.get(0)?,
                icon: row.get(1)?,
                color: row.get(2)?,
                total_cents: row.get(3)?,
                count: row.get(4)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(totals)
}

pub fn year_totals(conn: &Connection, owner: OwnerId, year: i32) -> rusqlite::Result<YearTotals> {
    conn.query_row(
        "SELECT
            (SELECT COALESCE(SUM(amount_cents), 0) FROM incomes WHERE user_id = ?1 AND year = ?2),
            (SELECT COALESCE(SUM(amount_cents), 0) FROM expenses WHERE user_id = ?1 AND year = ?2)",
        params![owner.get(), year],
        |row| {
            Ok(YearTotals {
                income_cents: row.get(0)?,
                expense_cents: row.get(1)?,
            })
        },
    )
}

/// Summed expenses of every day that has at least one expense.
pub fn daily_expense_totals(conn: &Connection, owner: OwnerId) -> rusqlite::Result<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT SUM(amount_cents) FROM expenses WHERE user_id = ? GROUP BY date ORDER BY date",
    )?;
    let totals = stmt
        .query_map([owner.get()], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<i64>>>()?;
    Ok(totals)
}

/// The day with the highest total spending. Ties go to the later day.
pub fn peak_expense_day(conn: &Connection, owner: OwnerId) -> rusqlite::Result<Option<DayTotal>> {
    conn.query_row(
        "SELECT date, SUM(amount_cents) AS total FROM expenses
         WHERE user_id = ?
         GROUP BY date
         ORDER BY total DESC, date DESC
         LIMIT 1",
        [owner.get()],
        |row| {
            Ok(DayTotal {
                date: row.get(0)?,
                total_cents: row.get(1)?,
            })
        },
    )
    .optional()
}

/// The category with the highest cumulative spending.
pub fn top_category_all_time(
    conn: &Connection,
    owner: OwnerId,
) -> rusqlite::Result<Option<CategoryAllTimeTotal>> {
    conn.query_row(
        "SELECT c.name, c.icon, SUM(e.amount_cents) AS total
         FROM expenses e
         JOIN categories c ON c.id = e.category_id
         WHERE e.user_id = ?
         GROUP BY c.id
         ORDER BY total DESC, c.name
         LIMIT 1",
        [owner.get()],
        |row| {
            Ok(CategoryAllTimeTotal {
                name: row.get(0)?,
                icon: row.get(1)?,
                total_cents: row.get(2)?,
            })
        },
    )
    .optional()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::queries::test_support::{date, insert_user, migrated_conn};
    use crate::db::queries::{expenses, incomes};
    use crate::models::{NewExpense, NewIncome};

    fn spend(conn: &Connection, owner: OwnerId, category_id: i64, cents: i64, on: &str) {
        expenses::create_expense(
            conn,
            owner,
            &NewExpense {
                category_id,
                payment_method_id: 1,
                amount_cents: cents,
                description: "Gasto".into(),
                date: date(on),
            },
        )
        .unwrap();
    }

    fn earn(conn: &Connection, owner: OwnerId, cents: i64, on: &str) {
        incomes::create_income(
            conn,
            owner,
            &NewIncome {
                amount_cents: cents,
                description: "Ingreso".into(),
                date: date(on),
            },
        )
        .unwrap();
    }

    #[test]
    fn test_all_time_balance_spans_periods() {
        let conn = migrated_conn();
        let owner = insert_user(&conn, "a@example.com");
        earn(&conn, owner, 10_000, "2023-06-01");
        spend(&conn, owner, 1, 2_500, "2024-03-01");

        assert_eq!(all_time_balance(&conn, owner).unwrap(), 7_500);
    }

    #[test]
    fn test_month_flows_only_active_months() {
        let conn = migrated_conn();
        let owner = insert_user(&conn, "a@example.com");
        earn(&conn, owner, 1000, "2024-01-10");
        spend(&conn, owner, 1, 300, "2024-01-11");
        spend(&conn, owner, 1, 200, "2024-01-12");
        spend(&conn, owner, 1, 700, "2024-05-01");
        spend(&conn, owner, 1, 999, "2023-05-01");

        let flows = month_flows(&conn, owner, 2024).unwrap();
        assert_eq!(flows.len(), 3);
        assert!(flows.contains(&MonthFlow {
            month: 1,
            kind: FlowKind::Expense,
            total_cents: 500
        }));
        assert!(flows.contains(&MonthFlow {
            month: 1,
            kind: FlowKind::Income,
            total_cents: 1000
        }));
        assert!(flows.contains(&MonthFlow {
            month: 5,
            kind: FlowKind::Expense,
            total_cents: 700
        }));
    }

    #[test]
    fn test_top_categories_ranked_with_counts() {
        let conn = migrated_conn();
        let owner = insert_user(&conn, "a@example.com");
        spend(&conn, owner, 1, 100, "2024-02-01");
        spend(&conn, owner, 1, 100, "2024-02-02");
        spend(&conn, owner, 2, 500, "2024-02-03");

        let top = top_categories(&conn, owner, 2024, 5).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].total_cents, 500);
        assert_eq!(top[1].total_cents, 200);
        assert_eq!(top[1].count, 2);
    }

    #[test]
    fn test_daily_totals_and_peak_day() {
        let conn = migrated_conn();
        let owner = insert_user(&conn, "a@example.com");
        spend(&conn, owner, 1, 1000, "2024-03-01");
        spend(&conn, owner, 1, 2000, "2024-03-03");
        spend(&conn, owner, 2, 1000, "2024-03-03");

        assert_eq!(daily_expense_totals(&conn, owner).unwrap(), vec![1000, 3000]);

        let peak = peak_expense_day(&conn, owner).unwrap().unwrap();
        assert_eq!(peak.date, date("2024-03-03"));
        assert_eq!(peak.total_cents, 3000);

        let top = top_category_all_time(&conn, owner).unwrap().unwrap();
        assert_eq!(top.total_cents, 3000);
    }

    #[test]
    fn test_statistics_without_expenses() {
        let conn = migrated_conn();
        let owner = insert_user(&conn, "a@example.com");

        assert!(daily_expense_totals(&conn, owner).unwrap().is_empty());
        assert!(peak_expense_day(&conn, owner).unwrap().is_none());
        assert!(top_category_all_time(&conn, owner).unwrap().is_none());
        assert_eq!(year_totals(&conn, owner, 2024).unwrap(), YearTotals::default());
    }
}
