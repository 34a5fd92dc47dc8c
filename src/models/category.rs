use serde::{Deserialize, Serialize};

/// Whether a category classifies expenses or income.
///
/// Stored as `expense` / `income`, exchanged with clients as `gasto` / `ingreso`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryKind {
    #[serde(rename = "gasto")]
    Expense,
    #[serde(rename = "ingreso")]
    Income,
}

impl CategoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
        }
    }

    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "expense" => Some(Self::Expense),
            "income" => Some(Self::Income),
            _ => None,
        }
    }

    /// Parse the client-facing name used in `/categorias/tipo/:tipo`.
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "gasto" => Some(Self::Expense),
            "ingreso" => Some(Self::Income),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion")]
    pub description: Option<String>,
    #[serde(rename = "icono")]
    pub icon: String,
    pub color: String,
    #[serde(rename = "tipo")]
    pub kind: CategoryKind,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    pub icon: String,
    pub color: String,
    pub kind: CategoryKind,
}

/// Spending in one expense category for a month, including categories
/// without any matching expense.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub id: i64,
    #[serde(rename = "categoria_nombre")]
    pub name: String,
    #[serde(rename = "categoria_icono")]
    pub icon: String,
    #[serde(rename = "categoria_color")]
    pub color: String,
    #[serde(rename = "total", with = "super::money")]
    pub total_cents: i64,
    #[serde(rename = "cantidad")]
    pub count: i64,
}
