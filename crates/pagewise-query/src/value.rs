//! Runtime value types for field comparison.
//!
//! A [`Value`] is a borrowed view of one field of a record. Records are open
//! mappings, so a field may hold a string, a number, a boolean, a nested
//! array/object, or nothing at all.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

use serde_json::Value as Json;

/// Runtime value for comparison, borrowed from the source record.
///
/// # Example
///
/// ```
/// use pagewise_query::{Number, Value};
/// use serde_json::json;
///
/// let raw = json!(42);
/// assert_eq!(Value::from_json(Some(&raw)), Value::Number(Number::U64(42)));
/// assert_eq!(Value::from_json(None), Value::None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    /// String value (borrowed).
    String(&'a str),
    /// Numeric value.
    Number(Number),
    /// Boolean value.
    Bool(bool),
    /// Nested array or object, compared through its JSON text.
    Composite(&'a Json),
    /// Field absent or null.
    None,
}

impl<'a> Value<'a> {
    /// Builds a view over an optional JSON value. `null` maps to [`Value::None`].
    pub fn from_json(raw: Option<&'a Json>) -> Self {
        match raw {
            None | Some(Json::Null) => Value::None,
            Some(Json::String(s)) => Value::String(s),
            Some(Json::Number(n)) => Value::Number(Number::from_json(n)),
            Some(Json::Bool(b)) => Value::Bool(*b),
            Some(other) => Value::Composite(other),
        }
    }

    /// Returns `true` if the field is absent or null.
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Extracts the string value, if present.
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extracts the boolean value, if present.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the text form used by the string operators.
    ///
    /// Strings are returned as-is, numbers and booleans are formatted the
    /// way JSON prints them, composites as compact JSON. Absent values have
    /// no text.
    pub fn text(&self) -> Option<Cow<'a, str>> {
        match self {
            Value::String(s) => Some(Cow::Borrowed(s)),
            Value::Number(n) => Some(Cow::Owned(n.to_string())),
            Value::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
            Value::Composite(json) => Some(Cow::Owned(json.to_string())),
            Value::None => None,
        }
    }

    /// Numeric reading used by loose comparisons.
    ///
    /// Booleans count as 0/1 and strings are parsed after trimming; a blank
    /// string reads as zero.
    pub(crate) fn numeric(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(n.to_f64()),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    Some(0.0)
                } else {
                    trimmed.parse::<f64>().ok()
                }
            }
            _ => None,
        }
    }

    /// Rank used to order values of different kinds.
    pub(crate) fn kind_rank(&self) -> u8 {
        match self {
            Value::Bool(_) => 0,
            Value::Number(_) => 1,
            Value::String(_) => 2,
            Value::Composite(_) => 3,
            Value::None => 4,
        }
    }
}

/// Numeric value.
///
/// Numbers are stored in one of three variants to preserve precision;
/// comparisons between different variants go through `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// Converts a JSON number, keeping integer precision where possible.
    pub fn from_json(n: &serde_json::Number) -> Self {
        if let Some(u) = n.as_u64() {
            Number::U64(u)
        } else if let Some(i) = n.as_i64() {
            Number::I64(i)
        } else {
            Number::F64(n.as_f64().unwrap_or(f64::NAN))
        }
    }

    /// Converts the number to f64 for comparison.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Returns `true` for a floating-point NaN.
    pub fn is_nan(self) -> bool {
        matches!(self, Number::F64(n) if n.is_nan())
    }

    /// Compares two numbers, handling mixed types.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => Some(a.cmp(&b)),
            (Number::U64(a), Number::U64(b)) => Some(a.cmp(&b)),
            (Number::F64(a), Number::F64(b)) => a.partial_cmp(&b),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::I64(n) => write!(f, "{n}"),
            Number::U64(n) => write!(f, "{n}"),
            // Whole floats print without a fraction, like JSON producers do.
            Number::F64(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            Number::F64(n) => write!(f, "{n}"),
        }
    }
}

impl From<Number> for Json {
    fn from(n: Number) -> Self {
        match n {
            Number::I64(i) => Json::from(i),
            Number::U64(u) => Json::from(u),
            Number::F64(f) => serde_json::Number::from_f64(f)
                .map(Json::Number)
                .unwrap_or(Json::Null),
        }
    }
}

impl From<i32> for Number {
    fn from(n: i32) -> Self {
        Number::I64(n as i64)
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::I64(n)
    }
}

impl From<u32> for Number {
    fn from(n: u32) -> Self {
        Number::U64(n as u64)
    }
}

impl From<u64> for Number {
    fn from(n: u64) -> Self {
        Number::U64(n)
    }
}

impl From<usize> for Number {
    fn from(n: usize) -> Self {
        Number::U64(n as u64)
    }
}

impl From<f64> for Number {
    fn from(n: f64) -> Self {
        Number::F64(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_json_maps_every_kind() {
        let s = json!("x");
        let n = json!(-3);
        let f = json!(1.5);
        let b = json!(true);
        let arr = json!([1, 2]);
        let null = json!(null);

        assert_eq!(Value::from_json(Some(&s)), Value::String("x"));
        assert_eq!(Value::from_json(Some(&n)), Value::Number(Number::I64(-3)));
        assert_eq!(Value::from_json(Some(&f)), Value::Number(Number::F64(1.5)));
        assert_eq!(Value::from_json(Some(&b)), Value::Bool(true));
        assert_eq!(Value::from_json(Some(&arr)), Value::Composite(&arr));
        assert_eq!(Value::from_json(Some(&null)), Value::None);
        assert_eq!(Value::from_json(None), Value::None);
    }

    #[test]
    fn text_forms() {
        assert_eq!(Value::String("abc").text().as_deref(), Some("abc"));
        assert_eq!(Value::Number(Number::U64(7)).text().as_deref(), Some("7"));
        assert_eq!(Value::Number(Number::F64(2.0)).text().as_deref(), Some("2"));
        assert_eq!(Value::Number(Number::F64(2.5)).text().as_deref(), Some("2.5"));
        assert_eq!(Value::Bool(false).text().as_deref(), Some("false"));
        assert_eq!(Value::None.text(), None);
    }

    #[test]
    fn numeric_reading() {
        assert_eq!(Value::String(" 12 ").numeric(), Some(12.0));
        assert_eq!(Value::String("").numeric(), Some(0.0));
        assert_eq!(Value::String("abc").numeric(), None);
        assert_eq!(Value::Bool(true).numeric(), Some(1.0));
        assert_eq!(Value::None.numeric(), None);
    }

    #[test]
    fn number_comparisons_mixed_types() {
        assert_eq!(
            Number::I64(5).compare(Number::U64(10)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Number::I64(5).compare(Number::F64(5.0)),
            Some(Ordering::Equal)
        );
        assert_eq!(Number::F64(f64::NAN).compare(Number::F64(1.0)), None);
    }

    #[test]
    fn number_round_trips_through_json() {
        assert_eq!(Json::from(Number::I64(-1)), json!(-1));
        assert_eq!(Json::from(Number::F64(f64::NAN)), Json::Null);
    }
}
