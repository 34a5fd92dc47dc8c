use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;
use serde_json::Value;

use crate::auth::AuthUser;
use crate::db::queries::payment_methods;
use crate::db::with_conn;
use crate::error::{AppError, AppResult};
use crate::extract::{JsonBody, PathParam};
use crate::models::{NewPaymentMethod, PaymentMethod};
use crate::state::AppState;
use crate::validation::Validator;

#[derive(Debug, Deserialize)]
pub struct PaymentMethodBody {
    pub nombre: Option<Value>,
    pub descripcion: Option<Value>,
    pub icono: Option<Value>,
}

pub async fn index(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> AppResult<Json<Vec<PaymentMethod>>> {
    let methods = with_conn(&state.db, |conn| {
        Ok(payment_methods::list_active_payment_methods(conn)?)
    })
    .await?;
    Ok(Json(methods))
}

pub async fn show(
    State(state): State<AppState>,
    _auth: AuthUser,
    PathParam(id): PathParam<i64>,
) -> AppResult<Json<PaymentMethod>> {
    let method = with_conn(&state.db, move |conn| {
        Ok(payment_methods::get_payment_method(conn, id)?)
    })
    .await?
    .ok_or_else(|| AppError::NotFound("Método de pago no encontrado".into()))?;
    Ok(Json(method))
}

pub async fn create(
    State(state): State<AppState>,
    _auth: AuthUser,
    JsonBody(body): JsonBody<PaymentMethodBody>,
) -> AppResult<impl IntoResponse> {
    let mut v = Validator::new();
    let Some(name) = v.text("nombre", body.nombre.as_ref(), "El nombre es requerido") else {
        return Err(v.into_error());
    };

    let method = NewPaymentMethod {
        name,
        description: body
            .descripcion
            .as_ref()
            .and_then(Value::as_str)
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
        icon: body
            .icono
            .as_ref()
            .and_then(Value::as_str)
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty())
            .unwrap_or_else(|| "credit-card".into()),
    };

    let created = with_conn(&state.db, move |conn| {
        Ok(payment_methods::create_payment_method(conn, &method)?)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(created)))
}
