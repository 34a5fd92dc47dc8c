pub mod categories;
pub mod dashboard;
pub mod expenses;
pub mod incomes;
pub mod payment_methods;
pub mod users;
