pub mod category;
pub mod dashboard;
pub mod expense;
pub mod income;
pub mod payment_method;
pub mod user;

pub use category::{Category, CategoryKind, CategoryTotal, NewCategory};
pub use dashboard::{
    AnnualSummary, CategorySpending, GeneralStatistics, MonthTotals, MonthlySummary, PeakDay,
    TopCategory, TopSpendingCategory,
};
pub use expense::{Expense, ExpenseChanges, ExpenseWithRelations, NewExpense};
pub use income::{Income, IncomeChanges, NewIncome};
pub use payment_method::{NewPaymentMethod, PaymentMethod, PaymentMethodTotal};
pub use user::{OwnerId, User, UserCredentials};

/// Amounts are stored as integer cents and exposed to clients as decimals.
///
/// Use with `#[serde(with = "crate::models::money")]` on `i64` cent fields.
pub mod money {
    use serde::{Deserialize, Deserializer, Serializer};

    /// Largest accepted amount, 99 999 999.99.
    pub const MAX_CENTS: i64 = 9_999_999_999;

    pub fn to_decimal(cents: i64) -> f64 {
        cents as f64 / 100.0
    }

    pub fn from_decimal(amount: f64) -> i64 {
        (amount * 100.0).round() as i64
    }

    pub fn serialize<S>(cents: &i64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(to_decimal(*cents))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        f64::deserialize(deserializer).map(from_decimal)
    }

}
