use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: i64,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion")]
    pub description: Option<String>,
    #[serde(rename = "icono")]
    pub icon: String,
    #[serde(rename = "activo")]
    pub active: bool,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewPaymentMethod {
    pub name: String,
    pub description: Option<String>,
    pub icon: String,
}

/// Spending per active payment method for a month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentMethodTotal {
    pub id: i64,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "icono")]
    pub icon: String,
    #[serde(rename = "total", with = "super::money")]
    pub total_cents: i64,
    #[serde(rename = "cantidad")]
    pub count: i64,
}
