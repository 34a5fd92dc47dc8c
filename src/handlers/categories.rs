use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;
use serde_json::Value;

use crate::auth::AuthUser;
use crate::db::queries::categories;
use crate::db::with_conn;
use crate::error::{AppError, AppResult};
use crate::extract::{JsonBody, PathParam};
use crate::models::{Category, CategoryKind, NewCategory};
use crate::state::AppState;
use crate::validation::Validator;

#[derive(Debug, Deserialize)]
pub struct CategoryBody {
    pub nombre: Option<Value>,
    pub descripcion: Option<Value>,
    pub icono: Option<Value>,
    pub color: Option<Value>,
    pub tipo: Option<Value>,
}

pub async fn index(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> AppResult<Json<Vec<Category>>> {
    let list = with_conn(&state.db, |conn| Ok(categories::list_categories(conn)?)).await?;
    Ok(Json(list))
}

pub async fn by_kind(
    State(state): State<AppState>,
    _auth: AuthUser,
    PathParam(tipo): PathParam<String>,
) -> AppResult<Json<Vec<Category>>> {
    let kind = CategoryKind::from_wire(&tipo).ok_or_else(|| {
        AppError::Validation("Tipo de categoría inválido. Debe ser 'gasto' o 'ingreso'".into())
    })?;

    let list = with_conn(&state.db, move |conn| {
        Ok(categories::list_categories_by_kind(conn, kind)?)
    })
    .await?;
    Ok(Json(list))
}

pub async fn show(
    State(state): State<AppState>,
    _auth: AuthUser,
    PathParam(id): PathParam<i64>,
) -> AppResult<Json<Category>> {
    let category = with_conn(&state.db, move |conn| Ok(categories::get_category(conn, id)?))
        .await?
        .ok_or_else(|| AppError::NotFound("Categoría no encontrada".into()))?;
    Ok(Json(category))
}

pub async fn create(
    State(state): State<AppState>,
    _auth: AuthUser,
    JsonBody(body): JsonBody<CategoryBody>,
) -> AppResult<impl IntoResponse> {
    let mut v = Validator::new();
    let name = v.text("nombre", body.nombre.as_ref(), "El nombre es requerido");
    let kind = match body.tipo.as_ref().and_then(Value::as_str) {
        Some(tipo) => CategoryKind::from_wire(tipo),
        None => None,
    };
    if kind.is_none() {
        v.error("tipo", "El tipo debe ser 'gasto' o 'ingreso'");
    }
    let description = body
        .descripcion
        .as_ref()
        .and_then(Value::as_str)
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());
    let (Some(name), Some(kind)) = (name, kind) else {
        return Err(v.into_error());
    };

    let mut category = NewCategory {
        name,
        description,
        icon: "tag".into(),
        color: "#6b7280".into(),
        kind,
    };
    if let Some(icon) = body.icono.as_ref().and_then(Value::as_str) {
        category.icon = icon.trim().to_string();
    }
    if let Some(color) = body.color.as_ref().and_then(Value::as_str) {
        category.color = color.trim().to_string();
    }

    let created = with_conn(&state.db, move |conn| {
        Ok(categories::create_category(conn, &category)?)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(created)))
}
