use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Income {
    pub id: i64,
    #[serde(rename = "usuario_id")]
    pub user_id: i64,
    #[serde(rename = "monto", with = "super::money")]
    pub amount_cents: i64,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "fecha")]
    pub date: NaiveDate,
    #[serde(rename = "mes")]
    pub month: u32,
    #[serde(rename = "anio")]
    pub year: i32,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct NewIncome {
    pub amount_cents: i64,
    pub description: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Default)]
pub struct IncomeChanges {
    pub amount_cents: Option<i64>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
}

impl IncomeChanges {
    pub fn is_empty(&self) -> bool {
        self.amount_cents.is_none() && self.description.is_none() && self.date.is_none()
    }
}
