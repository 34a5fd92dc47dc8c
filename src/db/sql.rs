//! Parameterized WHERE and SET fragments assembled from optional fields.
//!
//! Column names are `&'static str` so only identifiers written in this crate
//! ever reach the SQL text. Every value is bound as a parameter.

use rusqlite::ToSql;

pub type Param = Box<dyn ToSql>;

/// Borrow owned parameters for `execute` / `query_map`.
pub fn bind(params: &[Param]) -> Vec<&dyn ToSql> {
    params.iter().map(|p| p.as_ref()).collect()
}

/// AND-ed predicates, always starting from an owner scope.
pub struct Predicates {
    clauses: Vec<String>,
    params: Vec<Param>,
}

impl Predicates {
    pub fn owned_by(column: &'static str, owner_id: i64) -> Self {
        Self {
            clauses: vec![format!("{column} = ?")],
            params: vec![Box::new(owner_id)],
        }
    }

    pub fn eq<T: ToSql + 'static>(&mut self, column: &'static str, value: T) -> &mut Self {
        self.clauses.push(format!("{column} = ?"));
        self.params.push(Box::new(value));
        self
    }

    /// Inclusive on both ends.
    pub fn between<T: ToSql + 'static>(
        &mut self,
        column: &'static str,
        low: T,
        high: T,
    ) -> &mut Self {
        self.clauses.push(format!("{column} BETWEEN ? AND ?"));
        self.params.push(Box::new(low));
        self.params.push(Box::new(high));
        self
    }

    /// The condition without the `WHERE` keyword.
    pub fn to_sql(&self) -> String {
        self.clauses.join(" AND ")
    }

    pub fn params(&self) -> Vec<&dyn ToSql> {
        bind(&self.params)
    }

    pub fn into_params(self) -> Vec<Param> {
        self.params
    }
}

/// Column assignments for a partial update.
#[derive(Default)]
pub struct Assignments {
    clauses: Vec<String>,
    params: Vec<Param>,
}

impl Assignments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<T: ToSql + 'static>(&mut self, column: &'static str, value: T) -> &mut Self {
        self.clauses.push(format!("{column} = ?"));
        self.params.push(Box::new(value));
        self
    }

    pub fn set_opt<T: ToSql + 'static>(
        &mut self,
        column: &'static str,
        value: Option<T>,
    ) -> &mut Self {
        if let Some(value) = value {
            self.set(column, value);
        }
        self
    }

    /// Refresh an update timestamp. Not counted by [`Assignments::is_empty`].
    pub fn touch(&mut self, column: &'static str) -> &mut Self {
        self.clauses
            .push(format!("{column} = strftime('%Y-%m-%d %H:%M:%f', 'now')"));
        self
    }

    /// True when no value has been assigned. Timestamps alone do not count.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// The assignment list without the `SET` keyword.
    pub fn to_sql(&self) -> String {
        self.clauses.join(", ")
    }

    pub fn into_params(self) -> Vec<Param> {
        self.params
    }
}
