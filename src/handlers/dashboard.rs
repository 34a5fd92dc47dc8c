use axum::extract::State;
use axum::response::Json;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::date_utils::MonthYear;
use crate::error::AppResult;
use crate::extract::QueryParams;
use crate::handlers::PeriodParams;
use crate::models::{AnnualSummary, GeneralStatistics, MonthlySummary};
use crate::services::dashboard;
use crate::state::AppState;
use crate::validation::Validator;

#[derive(Debug, Deserialize)]
pub struct YearParams {
    #[serde(default, deserialize_with = "crate::form_utils::deserialize_optional_string")]
    pub anio: Option<String>,
}

pub async fn monthly(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(params): QueryParams<PeriodParams>,
) -> AppResult<Json<MonthlySummary>> {
    let mut v = Validator::new();
    let Some(period) = params.or_current(&mut v) else {
        return Err(v.into_error());
    };

    let summary = dashboard::monthly_summary(&state.db, auth.owner, period).await?;
    Ok(Json(summary))
}

pub async fn annual(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(params): QueryParams<YearParams>,
) -> AppResult<Json<AnnualSummary>> {
    let mut v = Validator::new();
    let year = v.query_year("anio", params.anio.as_deref());
    v.finish()?;

    let year = year.unwrap_or_else(|| MonthYear::current().year);
    let summary = dashboard::annual_summary(&state.db, auth.owner, year).await?;
    Ok(Json(summary))
}

pub async fn statistics(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<GeneralStatistics>> {
    let stats = dashboard::general_statistics(&state.db, auth.owner).await?;
    Ok(Json(stats))
}
