//! Field access for queryable items.
//!
//! The pipeline reads fields through an accessor function
//! `Fn(&T, &str) -> Value<'_>`. [`Seekable`] packages that accessor as a
//! trait; it is implemented for JSON records so that loosely-typed datasets
//! work out of the box, and can be implemented by hand for typed structs.

use serde_json::{Map, Value as Json};

use crate::value::Value;

/// One record of a dataset: an open mapping from field name to value.
pub type Record = Map<String, Json>;

/// Trait for types whose fields can be read by name.
///
/// # Manual Implementation
///
/// ```
/// use pagewise_query::{Number, Seekable, Value};
///
/// struct Task {
///     name: String,
///     priority: u8,
/// }
///
/// impl Seekable for Task {
///     fn seeker_field_value(&self, field: &str) -> Value<'_> {
///         match field {
///             "name" => Value::String(&self.name),
///             "priority" => Value::Number(Number::U64(self.priority as u64)),
///             _ => Value::None,
///         }
///     }
/// }
/// ```
pub trait Seekable {
    /// Returns the value of a field, or [`Value::None`] if it is absent.
    fn seeker_field_value(&self, field: &str) -> Value<'_>;

    /// Returns an accessor function suitable for the pipeline functions.
    fn accessor<'a>(item: &'a Self, field: &str) -> Value<'a>
    where
        Self: Sized,
    {
        item.seeker_field_value(field)
    }
}

impl Seekable for Record {
    fn seeker_field_value(&self, field: &str) -> Value<'_> {
        Value::from_json(self.get(field))
    }
}

/// JSON values are read as records when they are objects; any other JSON
/// value has no fields.
impl Seekable for Json {
    fn seeker_field_value(&self, field: &str) -> Value<'_> {
        Value::from_json(self.get(field))
    }
}
