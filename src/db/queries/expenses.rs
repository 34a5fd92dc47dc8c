use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use crate::date_utils::MonthYear;
use crate::db::sql::{bind, Assignments, Predicates};
use crate::error::{AppError, AppResult};
use crate::models::{
    CategoryKind, CategoryTotal, Expense, ExpenseChanges, ExpenseWithRelations, NewExpense,
    OwnerId, PaymentMethodTotal,
};
use crate::validation::FieldError;

use super::{categories, payment_methods};

/// Optional listing filters. Paired fields only apply when both halves are set.
#[derive(Debug, Default, Clone)]
pub struct ExpenseFilter {
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub category_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ExpenseFilter {
    fn predicates(&self, owner: OwnerId) -> Predicates {
        let mut where_ = Predicates::owned_by("e.user_id", owner.get());
        if let (Some(month), Some(year)) = (self.month, self.year) {
            where_.eq("e.month", month).eq("e.year", year);
        }
        if let Some(category_id) = self.category_id {
            where_.eq("e.category_id", category_id);
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            where_.between("e.date", start, end);
        }
        where_
    }
}

const EXPENSE_SELECT: &str = "SELECT e.id, e.user_id, e.category_id, e.payment_method_id,
        e.amount_cents, e.description, e.date, e.month, e.year, e.created_at, e.updated_at,
        c.name, c.icon, c.color, p.name, p.icon
     FROM expenses e
     JOIN categories c ON c.id = e.category_id
     JOIN payment_methods p ON p.id = e.payment_method_id";

const NEWEST_FIRST: &str = "ORDER BY e.date DESC, e.created_at DESC, e.id DESC";

fn map_expense(row: &Row) -> rusqlite::Result<ExpenseWithRelations> {
    Ok(ExpenseWithRelations {
        expense: Expense {
            id: row.get(0)?,
            user_id: row.get(1)?,
            category_id: row.get(2)?,
            payment_method_id: row.get(3)?,
            amount_cents: row.get(4)?,
            description: row.get(5)?,
            date: row.get(6)?,
            month: row.get(7)?,
            year: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        },
        category_name: row.get(11)?,
        category_icon: row.get(12)?,
        category_color: row.get(13)?,
        payment_method_name: row.get(14)?,
        payment_method_icon: row.get(15)?,
    })
}

pub fn list_expenses(
    conn: &Connection,
    owner: OwnerId,
    filter: &ExpenseFilter,
) -> rusqlite::Result<Vec<ExpenseWithRelations>> {
    let where_ = filter.predicates(owner);
    let sql = format!("{EXPENSE_SELECT} WHERE {} {NEWEST_FIRST}", where_.to_sql());

    let mut stmt = conn.prepare(&sql)?;
    let expenses = stmt
        .query_map(where_.params().as_slice(), map_expense)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    debug!(owner = owner.get(), count = expenses.len(), "Listed expenses");
    Ok(expenses)
}

/// The most recent expenses of an owner across all periods.
pub fn list_recent_expenses(
    conn: &Connection,
    owner: OwnerId,
    limit: i64,
) -> rusqlite::Result<Vec<ExpenseWithRelations>> {
    let mut stmt = conn.prepare(&format!(
        "{EXPENSE_SELECT} WHERE e.user_id = ? {NEWEST_FIRST} LIMIT ?"
    ))?;
    let expenses = stmt
        .query_map(params![owner.get(), limit], map_expense)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(expenses)
}

pub fn get_expense(
    conn: &Connection,
    owner: OwnerId,
    id: i64,
) -> rusqlite::Result<Option<ExpenseWithRelations>> {
    conn.query_row(
        &format!("{EXPENSE_SELECT} WHERE e.id = ? AND e.user_id = ?"),
        params![id, owner.get()],
        map_expense,
    )
    .optional()
}

/// Reject category or payment method ids that would break the foreign keys,
/// and categories that classify income.
pub fn check_references(
    conn: &Connection,
    category_id: Option<i64>,
    payment_method_id: Option<i64>,
) -> AppResult<()> {
    let mut errors = Vec::new();

    if let Some(id) = category_id {
        match categories::get_category(conn, id)? {
            None => errors.push(FieldError::new("categoriaId", "La categoría no existe")),
            Some(category) if category.kind != CategoryKind::Expense => errors.push(
                FieldError::new("categoriaId", "La categoría no corresponde a un gasto"),
            ),
            Some(_) => {}
        }
    }
    if let Some(id) = payment_method_id {
        if payment_methods::get_payment_method(conn, id)?.is_none() {
            errors.push(FieldError::new("metodoPagoId", "El método de pago no existe"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::InvalidFields(errors))
    }
}

pub fn create_expense(
    conn: &Connection,
    owner: OwnerId,
    expense: &NewExpense,
) -> AppResult<ExpenseWithRelations> {
    let period = MonthYear::of(expense.date);
    conn.execute(
        "INSERT INTO expenses (user_id, category_id, payment_method_id, amount_cents,
         description, date, month, year)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            owner.get(),
            expense.category_id,
            expense.payment_method_id,
            expense.amount_cents,
            expense.description,
            expense.date,
            period.month,
            period.year
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!(expense_id = id, owner = owner.get(), amount_cents = expense.amount_cents, "Created expense");

    get_expense(conn, owner, id)?
        .ok_or_else(|| AppError::Internal("expense vanished after insert".into()))
}

/// Apply the supplied fields. Changing the date moves the expense to the
/// period of the new date.
///
/// Returns `Ok(None)` when no expense with this id belongs to `owner`.
pub fn update_expense(
    conn: &Connection,
    owner: OwnerId,
    id: i64,
    changes: &ExpenseChanges,
) -> AppResult<Option<ExpenseWithRelations>> {
    if changes.is_empty() {
        return Err(AppError::NoFieldsToUpdate);
    }

    let mut set = Assignments::new();
    set.set_opt("category_id", changes.category_id)
        .set_opt("payment_method_id", changes.payment_method_id)
        .set_opt("amount_cents", changes.amount_cents)
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

    let sql = format!("UPDATE expenses SET {} WHERE {}", set.to_sql(), where_.to_sql());
    let mut params = set.into_params();
    params.extend(where_.into_params());

    let rows = conn.execute(&sql, bind(&params).as_slice())?;
    if rows == 0 {
        return Ok(None);
    }
    info!(expense_id = id, owner = owner.get(), "Updated expense");

    Ok(get_expense(conn, owner, id)?)
}

pub fn delete_expense(conn: &Connection, owner: OwnerId, id: i64) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "DELETE FROM expenses WHERE id = ? AND user_id = ?",
        params![id, owner.get()],
    )?;
    if rows > 0 {
        info!(expense_id = id, owner = owner.get(), "Deleted expense");
    }
    Ok(rows > 0)
}

pub fn total_for_month(
    conn: &Connection,
    owner: OwnerId,
    period: MonthYear,
) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COALESCE(SUM(amount_cents), 0) FROM expenses
         WHERE user_id = ? AND month = ? AND year = ?",
        params![owner.get(), period.month, period.year],
        |row| row.get(0),
    )
}

/// Spending per expense category for a month, including untouched categories.
pub fn category_totals(
    conn: &Connection,
    owner: OwnerId,
    period: MonthYear,
) -> rusqlite::Result<Vec<CategoryTotal>> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.name, c.icon, c.color,
                COALESCE(SUM(e.amount_cents), 0) AS total,
                COUNT(e.id)
         FROM categories c
         LEFT JOIN expenses e ON e.category_id = c.id
              AND e.user_id = ? AND e.month = ? AND e.year = ?
         WHERE c.kind = 'expense'
         GROUP BY c.id
         ORDER BY total DESC, c.name",
    )?;
    let totals = stmt
        .query_map(params![owner.get(), period.month, period.year], |row| {
            Ok(CategoryTotal {
                id: row.get(0)?,
                name: row.get(1)?,
                icon: row.get(2)?,
                color: row.get(3)?,
                total_cents: row.get(4)?,
                count: row.get(5)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(totals)
}

/// Spending per active payment method for a month.
pub fn payment_method_totals(
    conn: &Connection,
    owner: OwnerId,
    period: MonthYear,
) -> rusqlite::Result<Vec<PaymentMethodTotal>> {
    let mut stmt = conn.prepare(
        "SELECT p.id, p.name, p.icon,
                COALESCE(SUM(e.amount_cents), 0) AS total,
                COUNT(e.id)
         FROM payment_methods p
         LEFT JOIN expenses e ON e.payment_method_id = p.id
              AND e.user_id = ? AND e.month = ? AND e.year = ?
         WHERE p.active = 1
         GROUP BY p.id
         ORDER BY total DESC, p.name",
    )?;
    let totals = stmt
        .query_map(params![owner.get(), period.month, period.year], |row| {
            Ok(PaymentMethodTotal {
                id: row.get(0)?,
                name: row.get(1)?,
                icon: row.get(2)?,
                total_cents: row.get(3)?,
                count: row.get(4)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(totals)
}
