//! Field-level input validation.
//!
//! Request bodies are deserialized loosely (every field an optional JSON
//! value) and checked here, so that all problems with a payload are reported
//! together before any database access happens.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::date_utils::{is_valid_month, parse_iso_date};
use crate::error::AppError;
use crate::models::money;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub path: String,
    pub msg: String,
}

impl FieldError {
    pub fn new(path: &str, msg: &str) -> Self {
        Self {
            path: path.to_string(),
            msg: msg.to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
    })
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, path: &str, msg: &str) {
        self.errors.push(FieldError::new(path, msg));
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.into_error())
        }
    }

    pub fn into_error(self) -> AppError {
        AppError::InvalidFields(self.errors)
    }

    /// An integer, given either as a JSON number or a numeric string.
    pub fn int(&mut self, path: &str, value: Option<&Value>, msg: &str) -> Option<i64> {
        let parsed = match value {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };
        if parsed.is_none() {
            self.error(path, msg);
        }
        parsed
    }

    /// A non-negative decimal amount no larger than [`money::MAX_CENTS`],
    /// returned in cents.
    pub fn amount(&mut self, path: &str, value: Option<&Value>, msg: &str) -> Option<i64> {
        let parsed = match value {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|amount| amount.is_finite() && *amount >= 0.0);

        match parsed.map(money::from_decimal) {
            Some(cents) if cents <= money::MAX_CENTS => Some(cents),
            Some(_) => {
                self.error(path, "El monto excede el máximo permitido");
                None
            }
            None => {
                self.error(path, msg);
                None
            }
        }
    }

    /// A string that is not blank once trimmed. Returns the trimmed text.
    pub fn text(&mut self, path: &str, value: Option<&Value>, msg: &str) -> Option<String> {
        self.text_min_len(path, value, 1, msg)
    }

    pub fn text_min_len(
        &mut self,
        path: &str,
        value: Option<&Value>,
        min_chars: usize,
        msg: &str,
    ) -> Option<String> {
        match value {
            Some(Value::String(s)) if s.trim().chars().count() >= min_chars => {
                Some(s.trim().to_string())
            }
            _ => {
                self.error(path, msg);
                None
            }
        }
    }

    /// A secret, checked for length but never trimmed.
    pub fn password(
        &mut self,
        path: &str,
        value: Option<&Value>,
        min_chars: usize,
        msg: &str,
    ) -> Option<String> {
        match value {
            Some(Value::String(s)) if s.chars().count() >= min_chars => Some(s.clone()),
            _ => {
                self.error(path, msg);
                None
            }
        }
    }

    /// An e-mail address, normalized to lower case.
    pub fn email(&mut self, path: &str, value: Option<&Value>, msg: &str) -> Option<String> {
        match value {
            Some(Value::String(s)) if email_regex().is_match(s.trim()) => {
                Some(s.trim().to_lowercase())
            }
            _ => {
                self.error(path, msg);
                None
            }
        }
    }

    pub fn date(&mut self, path: &str, value: Option<&Value>, msg: &str) -> Option<NaiveDate> {
        let parsed = match value {
            Some(Value::String(s)) => parse_iso_date(s),
            _ => None,
        };
        if parsed.is_none() {
            self.error(path, msg);
        }
        parsed
    }

    /// Optional query-string month. Absent stays absent; present must be 1-12.
    pub fn query_month(&mut self, path: &str, value: Option<&str>) -> Option<u32> {
        let raw = value?;
        match raw.parse::<u32>() {
            Ok(month) if is_valid_month(month) => Some(month),
            _ => {
                self.error(path, "El mes debe ser un número entre 1 y 12");
                None
            }
        }
    }

    pub fn query_year(&mut self, path: &str, value: Option<&str>) -> Option<i32> {
        let raw = value?;
        match raw.parse::<i32>() {
            Ok(year) if (1..=9999).contains(&year) => Some(year),
            _ => {
                self.error(path, "El año debe ser un número válido");
                None
            }
        }
    }

    pub fn query_id(&mut self, path: &str, value: Option<&str>) -> Option<i64> {
        let raw = value?;
        match raw.parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => {
                self.error(path, "Debe ser un número entero");
                None
            }
        }
    }

    pub fn query_date(&mut self, path: &str, value: Option<&str>) -> Option<NaiveDate> {
        let raw = value?;
        let parsed = parse_iso_date(raw);
        if parsed.is_none() {
            self.error(path, "La fecha debe ser válida");
        }
        parsed
    }
}
