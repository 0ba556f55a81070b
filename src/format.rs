//! Label formatters keyed by a format string
//!
//! Number formats are printf-style (`%.2f`, `%d`, `%e`), plus the percent
//! shorthand `.1%` (multiply by 100, one decimal, `%` suffix). Time formats are
//! strftime strings.

use chrono::format::{Item, StrftimeItems};
use chrono::Local;
use sprintf::{vsprintf, Printf};

use crate::channel::DataType;
use crate::{EncodableError, Result, Value};

/// How a printf-style format consumes its argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    Integer,
    Float,
}

/// Turns values into display strings
#[derive(Debug, Clone, PartialEq)]
pub enum Formatter {
    /// printf-style number format
    Number { format: String, conversion: Conversion },
    /// `.N%` shorthand
    Percent { precision: usize },
    /// strftime format
    Time { format: String, use_local_time: bool },
    /// Display the value as-is
    Passthrough,
}

/// Parse `.N%` or `%`; `None` for anything else
fn parse_percent(format: &str) -> Option<usize> {
    let body = format.strip_suffix('%')?;
    if body.is_empty() {
        return Some(0);
    }
    body.strip_prefix('.')?.parse().ok()
}

fn conversion_of(format: &str) -> Option<Conversion> {
    let mut chars = format.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            continue;
        }
        if chars.peek() == Some(&'%') {
            chars.next();
            continue;
        }
        for c in chars.by_ref() {
            match c {
                '-' | '+' | ' ' | '#' | '.' | '0'..='9' | 'h' | 'l' | 'L' | 'q' | 'j' | 'z' | 't' => {}
                'd' | 'i' => return Some(Conversion::Integer),
                _ => return Some(Conversion::Float),
            }
        }
    }
    None
}

/// Formatter for numbers
pub fn create_number_formatter(format: &str) -> Result<Formatter> {
    if let Some(precision) = parse_percent(format) {
        return Ok(Formatter::Percent { precision });
    }
    let conversion = conversion_of(format).ok_or_else(|| {
        EncodableError::InvalidConfig(format!("Number format '{}' has no conversion", format))
    })?;
    let formatter = Formatter::Number {
        format: format.to_string(),
        conversion,
    };
    formatter.try_format_number(0.0)?;
    Ok(formatter)
}

/// Formatter for instants
pub fn create_time_formatter(format: &str, use_local_time: bool) -> Result<Formatter> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(EncodableError::InvalidConfig(format!(
            "Invalid time format '{}'",
            format
        )));
    }
    Ok(Formatter::Time {
        format: format.to_string(),
        use_local_time,
    })
}

/// Formatter for a field's data type and optional format string
pub fn create_formatter(
    format: Option<&str>,
    data_type: Option<DataType>,
    use_local_time: bool,
) -> Result<Formatter> {
    match (format, data_type) {
        (None, _) | (Some(""), _) => Ok(Formatter::Passthrough),
        (Some(format), Some(DataType::Temporal)) => create_time_formatter(format, use_local_time),
        (Some(format), Some(DataType::Quantitative)) => create_number_formatter(format),
        _ => Ok(Formatter::Passthrough),
    }
}

impl Formatter {
    fn try_format_number(&self, x: f64) -> Result<String> {
        let result = match self {
            Formatter::Number {
                format,
                conversion: Conversion::Integer,
            } => vsprintf(format, &[&(x.round() as i64) as &dyn Printf]),
            Formatter::Number { format, .. } => vsprintf(format, &[&x as &dyn Printf]),
            Formatter::Percent { precision } => {
                return Ok(format!("{:.*}%", *precision, x * 100.0));
            }
            _ => return Ok(x.to_string()),
        };
        result.map_err(|e| {
            EncodableError::InvalidConfig(format!("Cannot format {} with {:?}: {:?}", x, self, e))
        })
    }

    /// Format a value; values the formatter cannot read are displayed as-is
    pub fn format(&self, value: &Value) -> String {
        if value.is_null() {
            return String::new();
        }
        match self {
            Formatter::Passthrough => value.to_string(),
            Formatter::Number { .. } | Formatter::Percent { .. } => value
                .as_f64()
                .and_then(|x| self.try_format_number(x).ok())
                .unwrap_or_else(|| value.to_string()),
            Formatter::Time {
                format,
                use_local_time,
            } => match value.as_datetime() {
                Some(dt) if *use_local_time => dt.with_timezone(&Local).format(format).to_string(),
                Some(dt) => dt.format(format).to_string(),
                None => value.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_number_formats() {
        let f = create_number_formatter("%.2f").unwrap();
        assert_eq!(f.format(&Value::from(3.14159)), "3.14");

        let f = create_number_formatter("%d items").unwrap();
        assert_eq!(f.format(&Value::from(41.7)), "42 items");

        let f = create_number_formatter("%e").unwrap();
        assert!(f.format(&Value::from(1500.0)).starts_with("1.5"));
    }

    #[test]
    fn test_percent_shorthand() {
        let f = create_number_formatter(".1%").unwrap();
        assert_eq!(f.format(&Value::from(0.256)), "25.6%");
        let f = create_number_formatter("%").unwrap();
        assert_eq!(f.format(&Value::from(0.5)), "50%");
    }

    #[test]
    fn test_invalid_number_format() {
        assert!(matches!(
            create_number_formatter("no conversion"),
            Err(EncodableError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_time_format() {
        let f = create_time_formatter("%Y-%m-%d", false).unwrap();
        let dt = Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(f.format(&Value::DateTime(dt)), "2021-03-04");
        assert_eq!(f.format(&Value::from("2021-03-04")), "2021-03-04");
        assert!(create_time_formatter("%Q", false).is_err());
    }

    #[test]
    fn test_unreadable_values_pass_through() {
        let f = create_number_formatter("%.1f").unwrap();
        assert_eq!(f.format(&Value::from("abc")), "abc");
        assert_eq!(f.format(&Value::Null), "");
    }

    #[test]
    fn test_create_formatter_by_type() {
        assert_eq!(
            create_formatter(None, Some(DataType::Quantitative), false).unwrap(),
            Formatter::Passthrough
        );
        assert!(matches!(
            create_formatter(Some("%H:%M"), Some(DataType::Temporal), false).unwrap(),
            Formatter::Time { .. }
        ));
        assert!(matches!(
            create_formatter(Some(".0%"), Some(DataType::Quantitative), false).unwrap(),
            Formatter::Percent { precision: 0 }
        ));
    }

    #[test]
    fn test_discrete_types_ignore_format() {
        for data_type in [DataType::Nominal, DataType::Ordinal, DataType::Geojson] {
            let f = create_formatter(Some("%.1f"), Some(data_type), false).unwrap();
            assert_eq!(f, Formatter::Passthrough);
            assert_eq!(f.format(&Value::from("42")), "42");
        }
        assert_eq!(
            create_formatter(Some("%.1f"), None, false).unwrap(),
            Formatter::Passthrough
        );
    }
}
