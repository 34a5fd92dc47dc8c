//! Dashboard aggregations.
//!
//! Each summary issues its queries concurrently, one pooled connection per
//! query, waits for every branch, and only then folds the rows. A failing
//! branch fails the whole summary.

use crate::date_utils::MonthYear;
use crate::db::queries::dashboard::{
    self as queries, CategoryYearTotal, FlowKind, MonthFlow, YearTotals,
};
use crate::db::queries::{expenses, incomes};
use crate::db::{with_conn, DbPool};
use crate::error::AppResult;
use crate::models::money::to_decimal;
use crate::models::{
    AnnualSummary, CategorySpending, CategoryTotal, GeneralStatistics, MonthTotals,
    MonthlySummary, OwnerId, PeakDay, TopCategory, TopSpendingCategory,
};

const RECENT_EXPENSES: i64 = 5;
const TOP_CATEGORIES: i64 = 5;

pub async fn monthly_summary(
    pool: &DbPool,
    owner: OwnerId,
    period: MonthYear,
) -> AppResult<MonthlySummary> {
    let (expense_total, income_total, balance, by_category, recent) = tokio::join!(
        with_conn(pool, move |conn| Ok(expenses::total_for_month(conn, owner, period)?)),
        with_conn(pool, move |conn| Ok(incomes::total_for_month(conn, owner, period)?)),
        with_conn(pool, move |conn| Ok(queries::all_time_balance(conn, owner)?)),
        with_conn(pool, move |conn| Ok(expenses::category_totals(conn, owner, period)?)),
        with_conn(pool, move |conn| Ok(expenses::list_recent_expenses(
            conn,
            owner,
            RECENT_EXPENSES
        )?)),
    );

    let total_gastos = to_decimal(expense_total?);
    let total_ingresos = to_decimal(income_total?);

    tracing::debug!(
        owner = owner.get(),
        month = period.month,
        year = period.year,
        "Built monthly summary"
    );

    Ok(MonthlySummary {
        total_gastos,
        total_ingresos,
        balance_actual: to_decimal(balance?),
        balance_mes: total_ingresos - total_gastos,
        gastos_por_categoria: by_category?.into_iter().map(category_spending).collect(),
        ultimos_gastos: recent?,
    })
}

pub async fn annual_summary(pool: &DbPool, owner: OwnerId, year: i32) -> AppResult<AnnualSummary> {
    let (flows, top, totals) = tokio::join!(
        with_conn(pool, move |conn| Ok(queries::month_flows(conn, owner, year)?)),
        with_conn(pool, move |conn| Ok(queries::top_categories(
            conn,
            owner,
            year,
            TOP_CATEGORIES
        )?)),
        with_conn(pool, move |conn| Ok(queries::year_totals(conn, owner, year)?)),
    );

    let (flows, top, totals) = (flows?, top?, totals?);
    tracing::debug!(owner = owner.get(), year, "Built annual summary");

    Ok(annual_from_parts(&flows, top, totals))
}

pub async fn general_statistics(pool: &DbPool, owner: OwnerId) -> AppResult<GeneralStatistics> {
    let (daily, peak, top) = tokio::join!(
        with_conn(pool, move |conn| Ok(queries::daily_expense_totals(conn, owner)?)),
        with_conn(pool, move |conn| Ok(queries::peak_expense_day(conn, owner)?)),
        with_conn(pool, move |conn| Ok(queries::top_category_all_time(conn, owner)?)),
    );

    let (daily, peak, top) = (daily?, peak?, top?);

    Ok(GeneralStatistics {
        promedio_gasto_diario: average_daily(&daily),
        dia_mayor_gasto: peak.map(|day| PeakDay {
            fecha: day.date,
            total: to_decimal(day.total_cents),
        }),
        categoria_mayor_gasto: top.map(|category| TopSpendingCategory {
            nombre: category.name,
            icono: category.icon,
            total: to_decimal(category.total_cents),
        }),
    })
}

fn category_spending(total: CategoryTotal) -> CategorySpending {
    CategorySpending {
        nombre: total.name,
        icono: total.icon,
        color: total.color,
        total: to_decimal(total.total_cents),
    }
}

fn annual_from_parts(
    flows: &[MonthFlow],
    top: Vec<CategoryYearTotal>,
    totals: YearTotals,
) -> AnnualSummary {
    let total_ingresos_anual = to_decimal(totals.income_cents);
    let total_gastos_anual = to_decimal(totals.expense_cents);

    AnnualSummary {
        resumen_por_mes: fill_months(flows),
        top_categorias: top
            .into_iter()
            .map(|c| TopCategory {
                nombre: c.name,
                icono: c.icon,
                color: c.color,
                total: to_decimal(c.total_cents),
                cantidad: c.count,
            })
            .collect(),
        total_ingresos_anual,
        total_gastos_anual,
        balance_anual: total_ingresos_anual - total_gastos_anual,
    }
}

/// Twelve rows, January first, zero where a month had no activity.
pub fn fill_months(flows: &[MonthFlow]) -> Vec<MonthTotals> {
    let mut cents = [(0_i64, 0_i64); 12];
    for flow in flows.iter().filter(|f| (1..=12).contains(&f.month)) {
        let slot = &mut cents[(flow.month - 1) as usize];
        match flow.kind {
            FlowKind::Income => slot.0 += flow.total_cents,
            FlowKind::Expense => slot.1 += flow.total_cents,
        }
    }

    cents
        .iter()
        .zip(1..)
        .map(|(&(income, expense), mes)| MonthTotals {
            mes,
            ingresos: to_decimal(income),
            gastos: to_decimal(expense),
        })
        .collect()
}

/// Mean over days that have expenses. Days without activity do not dilute it.
pub fn average_daily(daily_totals: &[i64]) -> f64 {
    if daily_totals.is_empty() {
        return 0.0;
    }
    let sum: i64 = daily_totals.iter().sum();
    to_decimal(sum) / daily_totals.len() as f64
}
