//! Response shapes of the dashboard aggregations.
//!
//! Totals are decimals rather than cents: balances are computed from the
//! same decimal values the client receives, so `balanceMes` always equals
//! `totalIngresos - totalGastos` on the client side.

use chrono::NaiveDate;
use serde::Serialize;

use super::ExpenseWithRelations;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub total_gastos: f64,
    pub total_ingresos: f64,
    /// All-time income minus all-time expenses, not scoped to the month.
    pub balance_actual: f64,
    pub balance_mes: f64,
    pub gastos_por_categoria: Vec<CategorySpending>,
    pub ultimos_gastos: Vec<ExpenseWithRelations>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySpending {
    pub nombre: String,
    pub icono: String,
    pub color: String,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualSummary {
    pub resumen_por_mes: Vec<MonthTotals>,
    pub top_categorias: Vec<TopCategory>,
    pub total_ingresos_anual: f64,
    pub total_gastos_anual: f64,
    pub balance_anual: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthTotals {
    pub mes: u32,
    pub ingresos: f64,
    pub gastos: f64,
}

impl MonthTotals {
    pub fn empty(mes: u32) -> Self {
        Self {
            mes,
            ingresos: 0.0,
            gastos: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopCategory {
    pub nombre: String,
    pub icono: String,
    pub color: String,
    pub total: f64,
    pub cantidad: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralStatistics {
    pub promedio_gasto_diario: f64,
    pub dia_mayor_gasto: Option<PeakDay>,
    pub categoria_mayor_gasto: Option<TopSpendingCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakDay {
    pub fecha: NaiveDate,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopSpendingCategory {
    pub nombre: String,
    pub icono: String,
    pub total: f64,
}
