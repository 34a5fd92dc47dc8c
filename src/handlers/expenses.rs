use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::AuthUser;
use crate::db::queries::expenses::{self, ExpenseFilter};
use crate::db::with_conn;
use crate::error::{AppError, AppResult};
use crate::extract::{JsonBody, PathParam, QueryParams};
use crate::handlers::PeriodParams;
use crate::models::{
    CategoryTotal, ExpenseChanges, ExpenseWithRelations, NewExpense, PaymentMethodTotal,
};
use crate::state::AppState;
use crate::validation::Validator;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default, deserialize_with = "crate::form_utils::deserialize_optional_string")]
    pub mes: Option<String>,
    #[serde(default, deserialize_with = "crate::form_utils::deserialize_optional_string")]
    pub anio: Option<String>,
    #[serde(
        default,
        rename = "categoriaId",
        deserialize_with = "crate::form_utils::deserialize_optional_string"
    )]
    pub categoria_id: Option<String>,
    #[serde(
        default,
        rename = "fechaInicio",
        deserialize_with = "crate::form_utils::deserialize_optional_string"
    )]
    pub fecha_inicio: Option<String>,
    #[serde(
        default,
        rename = "fechaFin",
        deserialize_with = "crate::form_utils::deserialize_optional_string"
    )]
    pub fecha_fin: Option<String>,
}

/// Expense payload. Every field is loose so that all problems are reported at once.
#[derive(Debug, Deserialize)]
pub struct ExpenseBody {
    #[serde(rename = "categoriaId")]
    pub categoria_id: Option<Value>,
    #[serde(rename = "metodoPagoId")]
    pub metodo_pago_id: Option<Value>,
    pub monto: Option<Value>,
    pub descripcion: Option<Value>,
    pub fecha: Option<Value>,
}

const CATEGORY_REQUIRED: &str = "La categoría es requerida";
const PAYMENT_METHOD_REQUIRED: &str = "El método de pago es requerido";
const AMOUNT_INVALID: &str = "El monto debe ser un número positivo";
const DESCRIPTION_REQUIRED: &str = "La descripción es requerida";
const DATE_INVALID: &str = "La fecha debe ser válida";

fn not_found() -> AppError {
    AppError::NotFound("Gasto no encontrado".into())
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(params): QueryParams<ListParams>,
) -> AppResult<Json<Vec<ExpenseWithRelations>>> {
    let mut v = Validator::new();
    let filter = ExpenseFilter {
        month: v.query_month("mes", params.mes.as_deref()),
        year: v.query_year("anio", params.anio.as_deref()),
        category_id: v.query_id("categoriaId", params.categoria_id.as_deref()),
        start_date: v.query_date("fechaInicio", params.fecha_inicio.as_deref()),
        end_date: v.query_date("fechaFin", params.fecha_fin.as_deref()),
    };
    v.finish()?;

    let owner = auth.owner;
    let expenses = with_conn(&state.db, move |conn| {
        Ok(expenses::list_expenses(conn, owner, &filter)?)
    })
    .await?;
    Ok(Json(expenses))
}

pub async fn show(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(id): PathParam<i64>,
) -> AppResult<Json<ExpenseWithRelations>> {
    let owner = auth.owner;
    let expense = with_conn(&state.db, move |conn| Ok(expenses::get_expense(conn, owner, id)?))
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(expense))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(body): JsonBody<ExpenseBody>,
) -> AppResult<impl IntoResponse> {
    let mut v = Validator::new();
    let category_id = v.int("categoriaId", body.categoria_id.as_ref(), CATEGORY_REQUIRED);
    let payment_method_id = v.int(
        "metodoPagoId",
        body.metodo_pago_id.as_ref(),
        PAYMENT_METHOD_REQUIRED,
    );
    let amount_cents = v.amount("monto", body.monto.as_ref(), AMOUNT_INVALID);
    let description = v.text("descripcion", body.descripcion.as_ref(), DESCRIPTION_REQUIRED);
    let date = v.date("fecha", body.fecha.as_ref(), DATE_INVALID);

    let (
        Some(category_id),
        Some(payment_method_id),
        Some(amount_cents),
        Some(description),
        Some(date),
    ) = (category_id, payment_method_id, amount_cents, description, date)
    else {
        return Err(v.into_error());
    };

    let owner = auth.owner;
    let new_expense = NewExpense {
        category_id,
        payment_method_id,
        amount_cents,
        description,
        date,
    };
    let expense = with_conn(&state.db, move |conn| {
        expenses::check_references(conn, Some(category_id), Some(payment_method_id))?;
        expenses::create_expense(conn, owner, &new_expense)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(expense)))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(id): PathParam<i64>,
    JsonBody(body): JsonBody<ExpenseBody>,
) -> AppResult<Json<ExpenseWithRelations>> {
    let mut v = Validator::new();
    let changes = ExpenseChanges {
        category_id: body
            .categoria_id
            .as_ref()
            .and_then(|value| v.int("categoriaId", Some(value), CATEGORY_REQUIRED)),
        payment_method_id: body
            .metodo_pago_id
            .as_ref()
            .and_then(|value| v.int("metodoPagoId", Some(value), PAYMENT_METHOD_REQUIRED)),
        amount_cents: body
            .monto
            .as_ref()
            .and_then(|value| v.amount("monto", Some(value), AMOUNT_INVALID)),
        description: body
            .descripcion
            .as_ref()
            .and_then(|value| v.text("descripcion", Some(value), DESCRIPTION_REQUIRED)),
        date: body
            .fecha
            .as_ref()
            .and_then(|value| v.date("fecha", Some(value), DATE_INVALID)),
    };
    v.finish()?;
    if changes.is_empty() {
        return Err(AppError::NoFieldsToUpdate);
    }

    let owner = auth.owner;
    let expense = with_conn(&state.db, move |conn| {
        expenses::check_references(conn, changes.category_id, changes.payment_method_id)?;
        expenses::update_expense(conn, owner, id, &changes)
    })
    .await?
    .ok_or_else(not_found)?;

    Ok(Json(expense))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(id): PathParam<i64>,
) -> AppResult<Json<Value>> {
    let owner = auth.owner;
    let deleted = with_conn(&state.db, move |conn| {
        Ok(expenses::delete_expense(conn, owner, id)?)
    })
    .await?;
    if !deleted {
        return Err(not_found());
    }
    Ok(Json(json!({ "mensaje": "Gasto eliminado exitosamente" })))
}

pub async fn category_stats(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(params): QueryParams<PeriodParams>,
) -> AppResult<Json<Vec<CategoryTotal>>> {
    let mut v = Validator::new();
    let Some(period) = params.required(&mut v) else {
        return Err(v.into_error());
    };

    let owner = auth.owner;
    let totals = with_conn(&state.db, move |conn| {
        Ok(expenses::category_totals(conn, owner, period)?)
    })
    .await?;
    Ok(Json(totals))
}

pub async fn payment_method_stats(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(params): QueryParams<PeriodParams>,
) -> AppResult<Json<Vec<PaymentMethodTotal>>> {
    let mut v = Validator::new();
    let Some(period) = params.required(&mut v) else {
        return Err(v.into_error());
    };

    let owner = auth.owner;
    let totals = with_conn(&state.db, move |conn| {
        Ok(expenses::payment_method_totals(conn, owner, period)?)
    })
    .await?;
    Ok(Json(totals))
}
