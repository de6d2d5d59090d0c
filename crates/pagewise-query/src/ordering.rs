//! Ordering types for result sorting.
//!
//! Provides [`Dir`] for sort direction and [`OrderBy`] for field-based
//! ordering. Only the first ordering of a list is applied when sorting; the
//! rest are kept so they can be echoed back to a server or a UI.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QueryError;
use crate::value::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dir {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl Dir {
    /// Returns `true` if this is ascending order.
    pub fn is_asc(self) -> bool {
        matches!(self, Dir::Asc)
    }

    /// Returns `true` if this is descending order.
    pub fn is_desc(self) -> bool {
        matches!(self, Dir::Desc)
    }

    /// Applies this direction to an ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Dir::Asc => ordering,
            Dir::Desc => ordering.reverse(),
        }
    }

    /// Returns the opposite direction.
    pub fn flip(self) -> Dir {
        match self {
            Dir::Asc => Dir::Desc,
            Dir::Desc => Dir::Asc,
        }
    }

    /// Returns the wire name of this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Asc => "asc",
            Dir::Desc => "desc",
        }
    }
}

impl fmt::Display for Dir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single ordering: a field and a direction.
///
/// Serializes as `{"field": "...", "type": "asc" | "desc"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    /// The field to sort by.
    pub field: String,
    /// The sort direction.
    #[serde(rename = "type", default)]
    pub dir: Dir,
}

impl OrderBy {
    /// Creates a new ascending ordering for the given field.
    pub fn asc(field: impl Into<String>) -> Self {
        OrderBy::new(field, Dir::Asc)
    }

    /// Creates a new descending ordering for the given field.
    pub fn desc(field: impl Into<String>) -> Self {
        OrderBy::new(field, Dir::Desc)
    }

    /// Creates a new ordering with the given direction.
    pub fn new(field: impl Into<String>, dir: Dir) -> Self {
        OrderBy {
            field: field.into(),
            dir,
        }
    }

    /// Compares two values according to this ordering.
    pub fn compare(&self, a: &Value<'_>, b: &Value<'_>) -> Ordering {
        self.dir.apply(compare_values(a, b))
    }
}

impl FromStr for OrderBy {
    type Err = QueryError;

    /// Parses `field` or `field:asc` / `field:desc`.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (field, dir) = match input.split_once(':') {
            Some((field, "asc")) => (field, Dir::Asc),
            Some((field, "desc")) => (field, Dir::Desc),
            Some(_) => {
                return Err(QueryError::InvalidOrdering {
                    input: input.to_string(),
                })
            }
            None => (input, Dir::Asc),
        };
        if field.trim().is_empty() {
            return Err(QueryError::InvalidOrdering {
                input: input.to_string(),
            });
        }
        Ok(OrderBy::new(field.trim(), dir))
    }
}

/// Total ascending order over field values.
///
/// Values of the same kind compare naturally (numbers numerically, strings
/// lexically, `false < true`). Different kinds rank
/// bool < number < string < composite, and absent values sort last.
/// NaN sorts after every other number and equal to another NaN.
pub fn compare_values(a: &Value<'_>, b: &Value<'_>) -> Ordering {
    match (a, b) {
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => a
            .compare(*b)
            .unwrap_or_else(|| a.is_nan().cmp(&b.is_nan())),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Composite(a), Value::Composite(b)) => a.to_string().cmp(&b.to_string()),
        _ => a.kind_rank().cmp(&b.kind_rank()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Number;
    use serde_json::json;

    #[test]
    fn dir_apply() {
        assert_eq!(Dir::Asc.apply(Ordering::Less), Ordering::Less);
        assert_eq!(Dir::Desc.apply(Ordering::Less), Ordering::Greater);
        assert_eq!(Dir::Desc.apply(Ordering::Equal), Ordering::Equal);
        assert_eq!(Dir::Asc.flip(), Dir::Desc);
    }

    #[test]
    fn order_by_serde_uses_type_key() {
        let o: OrderBy = serde_json::from_value(json!({"field": "a", "type": "desc"})).unwrap();
        assert_eq!(o, OrderBy::desc("a"));
        let o: OrderBy = serde_json::from_value(json!({"field": "a"})).unwrap();
        assert_eq!(o, OrderBy::asc("a"));
        assert_eq!(
            serde_json::to_value(OrderBy::asc("b")).unwrap(),
            json!({"field": "b", "type": "asc"})
        );
    }

    #[test]
    fn order_by_from_str() {
        assert_eq!("name".parse::<OrderBy>().unwrap(), OrderBy::asc("name"));
        assert_eq!("name:desc".parse::<OrderBy>().unwrap(), OrderBy::desc("name"));
        assert!("name:sideways".parse::<OrderBy>().is_err());
        assert!(":asc".parse::<OrderBy>().is_err());
    }

    #[test]
    fn compare_same_kind() {
        assert_eq!(
            compare_values(&Value::String("apple"), &Value::String("banana")),
            Ordering::Less
        );
        assert_eq!(
            compare_values(&Value::Number(Number::I64(20)), &Value::Number(Number::U64(3))),
            Ordering::Greater
        );
        assert_eq!(
            compare_values(&Value::Bool(false), &Value::Bool(true)),
            Ordering::Less
        );
    }

    #[test]
    fn nan_sorts_after_numbers() {
        let keys = [3.0, f64::NAN, -1.0, 7.5, f64::NAN, 0.0, 2.0];
        let mut values: Vec<Value> = keys.iter().map(|k| Value::Number(Number::F64(*k))).collect();
        values.push(Value::Number(Number::I64(5)));
        values.sort_by(compare_values);

        let sorted: Vec<f64> = values
            .iter()
            .filter_map(|v| match v {
                Value::Number(n) => Some(n.to_f64()),
                _ => None,
            })
            .collect();
        assert_eq!(&sorted[..6], &[-1.0, 0.0, 2.0, 3.0, 5.0, 7.5]);
        assert!(sorted[6..].iter().all(|k| k.is_nan()));
    }

    #[test]
    fn compare_mixed_kinds_and_none() {
        let nested = json!([1]);
        assert_eq!(
            compare_values(&Value::Number(Number::I64(99)), &Value::String("1")),
            Ordering::Less
        );
        assert_eq!(
            compare_values(&Value::Composite(&nested), &Value::String("z")),
            Ordering::Greater
        );
        assert_eq!(compare_values(&Value::None, &Value::String("a")), Ordering::Greater);
        assert_eq!(compare_values(&Value::None, &Value::None), Ordering::Equal);
    }

    #[test]
    fn nan_compares_equal() {
        let nan = Value::Number(Number::F64(f64::NAN));
        let one = Value::Number(Number::F64(1.0));
        assert_eq!(compare_values(&nan, &one), Ordering::Equal);
    }

    #[test]
    fn desc_puts_none_first() {
        let order = OrderBy::desc("x");
        assert_eq!(order.compare(&Value::None, &Value::String("a")), Ordering::Less);
    }
}
