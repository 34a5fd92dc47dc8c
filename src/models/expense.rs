use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    #[serde(rename = "usuario_id")]
    pub user_id: i64,
    #[serde(rename = "categoria_id")]
    pub category_id: i64,
    #[serde(rename = "metodo_pago_id")]
    pub payment_method_id: i64,
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

/// An expense with the display attributes of its category and payment method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseWithRelations {
    #[serde(flatten)]
    pub expense: Expense,
    #[serde(rename = "categoria_nombre")]
    pub category_name: String,
    #[serde(rename = "categoria_icono")]
    pub category_icon: String,
    #[serde(rename = "categoria_color")]
    pub category_color: String,
    #[serde(rename = "metodo_pago_nombre")]
    pub payment_method_name: String,
    #[serde(rename = "metodo_pago_icono")]
    pub payment_method_icon: String,
}

#[derive(Debug, Clone)]
pub struct NewExpense {
    pub category_id: i64,
    pub payment_method_id: i64,
    pub amount_cents: i64,
    pub description: String,
    pub date: NaiveDate,
}

/// Sparse set of expense fields to change. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct ExpenseChanges {
    pub category_id: Option<i64>,
    pub payment_method_id: Option<i64>,
    pub amount_cents: Option<i64>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
}

impl ExpenseChanges {
    pub fn is_empty(&self) -> bool {
        self.category_id.is_none()
            && self.payment_method_id.is_none()
            && self.amount_cents.is_none()
            && self.description.is_none()
            && self.date.is_none()
    }
}
