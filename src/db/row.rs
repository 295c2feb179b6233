//! Typed boundary between SQL rows and the repositories.
//!
//! `ProcRow` is the only place column values are read out of the driver, so a
//! missing or renamed column fails in one spot instead of being scattered
//! through every repository. All accessors return `Option`: SQL NULL and
//! absent columns both map to `None`, never a panic.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use rusqlite::types::Value;

/// Named parameters for a procedure call. Names are stored with the `:`
/// prefix rusqlite expects.
#[derive(Debug, Default)]
pub struct ProcParams {
    values: Vec<(String, Value)>,
}

impl ProcParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.values.push((format!(":{name}"), value.into()));
        self
    }

    pub fn add_datetime(self, name: &str, value: DateTime<Utc>) -> Self {
        self.add(name, to_timestamp(value))
    }

    /// Borrowed view in the shape `rusqlite` binds.
    pub(crate) fn bindings(&self) -> Vec<(&str, &dyn rusqlite::ToSql)> {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), value as &dyn rusqlite::ToSql))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One materialized result row: column name plus owned value.
#[derive(Debug, Clone)]
pub struct ProcRow {
    columns: Vec<(String, Value)>,
}

impl ProcRow {
    pub(crate) fn new(columns: Vec<(String, Value)>) -> Self {
        Self { columns }
    }

    fn value(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn i64(&self, column: &str) -> Option<i64> {
        match self.value(column)? {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn f64(&self, column: &str) -> Option<f64> {
        match self.value(column)? {
            Value::Real(v) => Some(*v),
            Value::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn text(&self, column: &str) -> Option<&str> {
        match self.value(column)? {
            Value::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn bool(&self, column: &str) -> Option<bool> {
        Some(self.i64(column)? != 0)
    }

    pub fn datetime(&self, column: &str) -> Option<DateTime<Utc>> {
        parse_timestamp(self.text(column)?)
    }
}

/// Fixed-width RFC 3339 UTC, so lexicographic comparison in SQL matches
/// chronological order.
pub fn to_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn now_timestamp() -> String {
    to_timestamp(Utc::now())
}

/// Accepts our own RFC 3339 text plus SQLite's `datetime('now')` format, the
/// latter for rows seeded by migrations.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> ProcRow {
        ProcRow::new(vec![
            ("user_id".into(), Value::Integer(7)),
            ("username".into(), Value::Text("alice".into())),
            ("balance".into(), Value::Real(12.5)),
            ("developer".into(), Value::Integer(1)),
            ("last_login".into(), Value::Null),
        ])
    }

    #[test]
    fn accessors_read_typed_values() {
        let row = sample_row();
        assert_eq!(row.i64("user_id"), Some(7));
        assert_eq!(row.text("username"), Some("alice"));
        assert_eq!(row.f64("balance"), Some(12.5));
        assert_eq!(row.bool("developer"), Some(true));
    }

    #[test]
    fn null_and_missing_columns_are_none() {
        let row = sample_row();
        assert_eq!(row.text("last_login"), None);
        assert_eq!(row.i64("no_such_column"), None);
    }

    #[test]
    fn integer_columns_coerce_to_f64() {
        let row = ProcRow::new(vec![("points".into(), Value::Integer(500))]);
        assert_eq!(row.f64("points"), Some(500.0));
    }

    #[test]
    fn timestamps_round_trip() {
        let now = Utc::now();
        let parsed = parse_timestamp(&to_timestamp(now)).unwrap();
        assert_eq!(parsed.timestamp_micros(), now.timestamp_micros());
    }

    #[test]
    fn timestamps_sort_lexicographically() {
        let earlier = to_timestamp(Utc::now());
        let later = to_timestamp(Utc::now() + chrono::Duration::seconds(5));
        assert!(earlier < later);
    }

    #[test]
    fn sqlite_datetime_format_parses() {
        assert!(parse_timestamp("2024-03-01 12:00:00").is_some());
    }

    #[test]
    fn params_carry_prefixed_names() {
        let params = ProcParams::new().add("user_id", 3i64);
        let bindings = params.bindings();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].0, ":user_id");
    }
}
