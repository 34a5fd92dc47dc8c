pub mod categories;
pub mod dashboard;
pub mod expenses;
pub mod incomes;
pub mod payment_methods;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::auth;
use crate::date_utils::MonthYear;
use crate::state::AppState;
use crate::validation::Validator;

pub fn routes() -> Router<AppState> {
    Router::new()
        // Authentication
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/perfil", get(auth::profile))
        // Expenses
        .route("/gastos", get(expenses::list).post(expenses::create))
        .route(
            "/gastos/estadisticas/categorias",
            get(expenses::category_stats),
        )
        .route(
            "/gastos/estadisticas/metodos-pago",
            get(expenses::payment_method_stats),
        )
        .route(
            "/gastos/:id",
            get(expenses::show)
                .put(expenses::update)
                .delete(expenses::delete),
        )
        // Incomes
        .route("/ingresos", get(incomes::list).post(incomes::create))
        .route("/ingresos/total/mes", get(incomes::monthly_total))
        .route(
            "/ingresos/:id",
            get(incomes::show).put(incomes::update).delete(incomes::delete),
        )
        // Reference data
        .route("/categorias", get(categories::index).post(categories::create))
        .route("/categorias/tipo/:tipo", get(categories::by_kind))
        .route("/categorias/:id", get(categories::show))
        .route(
            "/metodos-pago",
            get(payment_methods::index).post(payment_methods::create),
        )
        .route("/metodos-pago/:id", get(payment_methods::show))
        // Dashboard
        .route("/dashboard/mensual", get(dashboard::monthly))
        .route("/dashboard/anual", get(dashboard::annual))
        .route("/dashboard/estadisticas", get(dashboard::statistics))
        // Health check
        .route("/health", get(health))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "OK",
        "message": "API de finanzas funcionando",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Ruta no encontrada" })),
    )
}

/// `?mes=&anio=` query parameters. Empty values count as absent.
#[derive(Debug, Default, Deserialize)]
pub struct PeriodParams {
    #[serde(default, deserialize_with = "crate::form_utils::deserialize_optional_string")]
    pub mes: Option<String>,
    #[serde(default, deserialize_with = "crate::form_utils::deserialize_optional_string")]
    pub anio: Option<String>,
}

impl PeriodParams {
    /// Both halves must be present and valid.
    pub fn required(&self, v: &mut Validator) -> Option<MonthYear> {
        if self.mes.is_none() {
            v.error("mes", "El mes es requerido");
        }
        if self.anio.is_none() {
            v.error("anio", "El año es requerido");
        }
        let month = v.query_month("mes", self.mes.as_deref());
        let year = v.query_year("anio", self.anio.as_deref());
        Some(MonthYear {
            month: month?,
            year: year?,
        })
    }

    /// Missing halves default to the current month and year.
    pub fn or_current(&self, v: &mut Validator) -> Option<MonthYear> {
        let current = MonthYear::current();
        let month = v.query_month("mes", self.mes.as_deref());
        let year = v.query_year("anio", self.anio.as_deref());
        if !v.is_ok() {
            return None;
        }
        Some(MonthYear {
            month: month.unwrap_or(current.month),
            year: year.unwrap_or(current.year),
        })
    }
}
