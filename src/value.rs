//! Data values, records and structured date descriptors
//!
//! `Value` is the single currency flowing through encodable: data records hold
//! values, scales map values to values, and formatters turn values into labels.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::{EncodableError, Result};

/// A single data value
///
/// Deserialized untagged from JSON. RFC 3339 strings become `DateTime`,
/// every other string stays a `String`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Number(f64),
    DateTime(DateTime<Utc>),
    String(String),
}

/// A data record: field name to value
pub type Datum = HashMap<String, Value>;

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value, coercing booleans, date-times (epoch
    /// milliseconds) and numeric strings. NaN counts as undefined.
    pub fn as_f64(&self) -> Option<f64> {
        let n = match self {
            Value::Null => return None,
            Value::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Number(n) => *n,
            Value::DateTime(dt) => dt.timestamp_millis() as f64,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
        };
        if n.is_nan() {
            None
        } else {
            Some(n)
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Interpret the value as an instant.
    ///
    /// Numbers are epoch milliseconds; strings may be RFC 3339, `%Y-%m-%d %H:%M:%S`
    /// or `%Y-%m-%d` (the latter two read as UTC).
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            Value::Number(n) if n.is_finite() => DateTime::from_timestamp_millis(*n as i64),
            Value::String(s) => parse_datetime_str(s),
            _ => None,
        }
    }

    /// Canonical key used for deduplication and color assignment
    pub fn to_key_string(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Number(n) => format_number_key(*n),
            Value::DateTime(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            Value::String(s) => s.clone(),
        }
    }
}

fn format_number_key(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn parse_datetime_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&ndt));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(Utc.from_utc_datetime(&ndt));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| Utc.from_utc_datetime(&ndt))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_key_string())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::DateTime(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

// =============================================================================
// Structured date descriptors
// =============================================================================

/// Month given either as a number (1-12) or as an English month name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MonthSpec {
    Number(u32),
    Name(String),
}

impl MonthSpec {
    fn to_month(&self) -> Result<u32> {
        match self {
            MonthSpec::Number(n) if (1..=12).contains(n) => Ok(*n),
            MonthSpec::Number(n) => Err(EncodableError::InvalidConfig(format!(
                "Month {} is out of range 1-12",
                n
            ))),
            MonthSpec::Name(name) => {
                const MONTHS: [&str; 12] = [
                    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov",
                    "dec",
                ];
                let lower = name.to_lowercase();
                MONTHS
                    .iter()
                    .position(|m| lower.starts_with(m))
                    .map(|i| i as u32 + 1)
                    .ok_or_else(|| {
                        EncodableError::InvalidConfig(format!("Unknown month name '{}'", name))
                    })
            }
        }
    }
}

/// A Vega-Lite style date-time object, e.g. `{"year": 2020, "month": 3, "date": 1}`
///
/// Omitted components default to the start of the enclosing period
/// (January, the 1st, midnight).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateTimeSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quarter: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<MonthSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milliseconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc: Option<bool>,
}

impl DateTimeSpec {
    /// Resolve to an instant. `utc` on the descriptor wins over `use_local_time`.
    pub fn resolve(&self, use_local_time: bool) -> Result<DateTime<Utc>> {
        let year = self.year.unwrap_or(2012);
        let month = match (&self.month, self.quarter) {
            (Some(month), _) => month.to_month()?,
            (None, Some(q)) if (1..=4).contains(&q) => (q - 1) * 3 + 1,
            (None, Some(q)) => {
                return Err(EncodableError::InvalidConfig(format!(
                    "Quarter {} is out of range 1-4",
                    q
                )))
            }
            (None, None) => 1,
        };
        let invalid = || EncodableError::InvalidConfig(format!("Invalid date-time {:?}", self));
        let naive = NaiveDate::from_ymd_opt(year, month, self.date.unwrap_or(1))
            .and_then(|d| {
                d.and_hms_milli_opt(
                    self.hours.unwrap_or(0),
                    self.minutes.unwrap_or(0),
                    self.seconds.unwrap_or(0),
                    self.milliseconds.unwrap_or(0),
                )
            })
            .ok_or_else(invalid)?;

        let local = use_local_time && !self.utc.unwrap_or(false);
        if local {
            Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
                .ok_or_else(invalid)
        } else {
            Ok(Utc.from_utc_datetime(&naive))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_deserialization() {
        let values: Vec<Value> =
            serde_json::from_value(json!([null, true, 1.5, "a", "2020-01-01T00:00:00Z"])).unwrap();
        assert_eq!(values[0], Value::Null);
        assert_eq!(values[1], Value::Boolean(true));
        assert_eq!(values[2], Value::Number(1.5));
        assert_eq!(values[3], Value::String("a".into()));
        assert!(matches!(values[4], Value::DateTime(_)));
    }

    #[test]
    fn test_key_string() {
        assert_eq!(Value::Number(1.0).to_key_string(), "1");
        assert_eq!(Value::Number(1.5).to_key_string(), "1.5");
        assert_eq!(Value::from("abc").to_key_string(), "abc");
        assert_eq!(Value::Null.to_key_string(), "null");
    }

    #[test]
    fn test_as_f64_coercion() {
        assert_eq!(Value::from("42").as_f64(), Some(42.0));
        assert_eq!(Value::from("abc").as_f64(), None);
        assert_eq!(Value::Number(f64::NAN).as_f64(), None);
        assert_eq!(Value::Boolean(true).as_f64(), Some(1.0));
    }

    #[test]
    fn test_as_datetime_from_strings() {
        let dt = Value::from("2020-03-01").as_datetime().unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2020, 3, 1, 0, 0, 0).unwrap());
        let dt = Value::Number(0.0).as_datetime().unwrap();
        assert_eq!(dt.timestamp_millis(), 0);
    }

    #[test]
    fn test_datetime_spec_resolve_utc() {
        let spec: DateTimeSpec =
            serde_json::from_value(json!({"year": 2020, "month": "feb", "date": 3, "hours": 4}))
                .unwrap();
        let dt = spec.resolve(false).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2020, 2, 3, 4, 0, 0).unwrap());
    }

    #[test]
    fn test_datetime_spec_quarter() {
        let spec = DateTimeSpec {
            year: Some(2021),
            quarter: Some(3),
            ..Default::default()
        };
        let dt = spec.resolve(false).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2021, 7, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_datetime_spec_invalid() {
        let spec = DateTimeSpec {
            year: Some(2021),
            month: Some(MonthSpec::Number(2)),
            date: Some(30),
            ..Default::default()
        };
        assert!(spec.resolve(false).is_err());
        let spec = DateTimeSpec {
            month: Some(MonthSpec::Name("smarch".into())),
            ..Default::default()
        };
        assert!(spec.resolve(false).is_err());
    }
}
