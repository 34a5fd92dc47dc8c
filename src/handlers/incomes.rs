use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::AuthUser;
use crate::db::queries::incomes::{self, IncomeFilter};
use crate::db::with_conn;
use crate::error::{AppError, AppResult};
use crate::extract::{JsonBody, PathParam, QueryParams};
use crate::handlers::PeriodParams;
use crate::models::money::to_decimal;
use crate::models::{Income, IncomeChanges, NewIncome};
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

#[derive(Debug, Deserialize)]
pub struct IncomeBody {
    pub monto: Option<Value>,
    pub descripcion: Option<Value>,
    pub fecha: Option<Value>,
}

const AMOUNT_INVALID: &str = "El monto debe ser un número positivo";
const DESCRIPTION_REQUIRED: &str = "La descripción es requerida";
const DATE_INVALID: &str = "La fecha debe ser válida";

fn not_found() -> AppError {
    AppError::NotFound("Ingreso no encontrado".into())
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(params): QueryParams<ListParams>,
) -> AppResult<Json<Vec<Income>>> {
    let mut v = Validator::new();
    let filter = IncomeFilter {
        month: v.query_month("mes", params.mes.as_deref()),
        year: v.query_year("anio", params.anio.as_deref()),
        start_date: v.query_date("fechaInicio", params.fecha_inicio.as_deref()),
        end_date: v.query_date("fechaFin", params.fecha_fin.as_deref()),
    };
    v.finish()?;

    let owner = auth.owner;
    let incomes = with_conn(&state.db, move |conn| {
        Ok(incomes::list_incomes(conn, owner, &filter)?)
    })
    .await?;
    Ok(Json(incomes))
}

pub async fn show(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(id): PathParam<i64>,
) -> AppResult<Json<Income>> {
    let owner = auth.owner;
    let income = with_conn(&state.db, move |conn| Ok(incomes::get_income(conn, owner, id)?))
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(income))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(body): JsonBody<IncomeBody>,
) -> AppResult<impl IntoResponse> {
    let mut v = Validator::new();
    let amount_cents = v.amount("monto", body.monto.as_ref(), AMOUNT_INVALID);
    let description = v.text("descripcion", body.descripcion.as_ref(), DESCRIPTION_REQUIRED);
    let date = v.date("fecha", body.fecha.as_ref(), DATE_INVALID);
    let (Some(amount_cents), Some(description), Some(date)) = (amount_cents, description, date)
    else {
        return Err(v.into_error());
    };

    let owner = auth.owner;
    let new_income = NewIncome {
        amount_cents,
        description,
        date,
    };
    let income = with_conn(&state.db, move |conn| {
        incomes::create_income(conn, owner, &new_income)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(income)))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(id): PathParam<i64>,
    JsonBody(body): JsonBody<IncomeBody>,
) -> AppResult<Json<Income>> {
    let mut v = Validator::new();
    let changes = IncomeChanges {
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
    let income = with_conn(&state.db, move |conn| {
        incomes::update_income(conn, owner, id, &changes)
    })
    .await?
    .ok_or_else(not_found)?;
    Ok(Json(income))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(id): PathParam<i64>,
) -> AppResult<Json<Value>> {
    let owner = auth.owner;
    let deleted = with_conn(&state.db, move |conn| {
        Ok(incomes::delete_income(conn, owner, id)?)
    })
    .await?;
    if !deleted {
        return Err(not_found());
    }
    Ok(Json(json!({ "mensaje": "Ingreso eliminado exitosamente" })))
}

pub async fn monthly_total(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(params): QueryParams<PeriodParams>,
) -> AppResult<Json<Value>> {
    let mut v = Validator::new();
    let Some(period) = params.required(&mut v) else {
        return Err(v.into_error());
    };

    let owner = auth.owner;
    let total = with_conn(&state.db, move |conn| {
        Ok(incomes::total_for_month(conn, owner, period)?)
    })
    .await?;
    Ok(Json(json!({ "total": to_decimal(total) })))
}
