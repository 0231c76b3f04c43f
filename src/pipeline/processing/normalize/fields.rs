use chrono::{DateTime, Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::{Coordinates, ObjectKind};

/// Leading four-digit year, e.g. "2015", "2015-03", "2015/03/15 10:00"
static LEADING_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d{4})(?:\D|$)").expect("static regex is valid"));

/// Shared helpers for pulling aliased, loosely typed fields out of raw records
pub struct FieldUtils;

impl FieldUtils {
    /// Walks `path` through nested objects. A JSON `null` counts as absent.
    pub fn lookup<'a>(data: &'a Value, path: &[&str]) -> Option<&'a Value> {
        let mut current = data;
        for key in path {
            current = current.get(*key)?;
        }
        (!current.is_null()).then_some(current)
    }

    /// First non-null value among `paths`, in order
    pub fn first_present<'a>(data: &'a Value, paths: &[&[&str]]) -> Option<&'a Value> {
        paths.iter().find_map(|path| Self::lookup(data, path))
    }

    /// Numbers, or strings holding a number
    pub fn as_f64_lenient(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Integers, integral floats (`4.0`) and strings holding either
    pub fn as_i64_lenient(value: &Value) -> Option<i64> {
        let number = match value {
            Value::Number(n) => return n.as_i64().or_else(|| Self::integral(n.as_f64()?)),
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        Self::integral(number)
    }

    fn integral(number: f64) -> Option<i64> {
        (number.is_finite() && number.fract() == 0.0 && number.abs() < i64::MAX as f64)
            .then_some(number as i64)
    }

    /// Trimmed, non-empty string from the first matching key
    pub fn string_field(data: &Value, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|key| data.get(*key))
            .filter_map(|v| v.as_str())
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(str::to_string)
    }

    pub fn bool_field(data: &Value, key: &str) -> Option<bool> {
        data.get(key).and_then(Value::as_bool)
    }

    /// String ids are taken as-is, numeric ids are stringified
    pub fn id_field(data: &Value) -> Option<String> {
        match data.get("id")? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Extracts the issue date (when it is a full date) and the year.
    pub fn parse_passport_date(raw: &str) -> Option<(i32, Option<NaiveDate>)> {
        let raw = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Some((date.year(), Some(date)));
        }
        if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
            let date = datetime.date_naive();
            return Some((date.year(), Some(date)));
        }
        LEADING_YEAR
            .captures(raw)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<i32>().ok())
            .map(|year| (year, None))
    }

    /// Deterministic id for records that arrive without one
    pub fn fallback_id(kind: ObjectKind, name: &str, coordinates: &Coordinates) -> String {
        let key = format!("{}:{}:{}:{}", kind, name, coordinates.lat, coordinates.lng);
        Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes()).to_string()
    }
}
