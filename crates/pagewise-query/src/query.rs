//! Query builder and executor.
//!
//! A [`Query`] bundles a where-clause, an ordering list and an optional
//! limit. It deserializes from the same shape a list's options or a fetch
//! request use (`where`, `orderby`, `limit`) and runs the pipeline stages in
//! their fixed order.

use serde::{Deserialize, Serialize};

use crate::condition::{Condition, ConditionOption, Pattern};
use crate::op::Op;
use crate::ordering::{Dir, OrderBy};
use crate::pipeline::{self, Processed};
use crate::value::Value;

/// A where-clause, an ordering and a limit.
///
/// # Example
///
/// ```
/// use pagewise_query::{Query, Record, Seekable};
/// use serde_json::json;
///
/// let people: Vec<Record> = serde_json::from_value(json!([
///     {"name": "Ann", "age": 31},
///     {"name": "Bob", "age": 17},
///     {"name": "Cid", "age": 45},
/// ])).unwrap();
///
/// let query = Query::new()
///     .and_ge("age", 18)
///     .order_desc("age")
///     .limit(1)
///     .build();
///
/// let adults = query.process(&people, Record::accessor);
/// assert_eq!(adults.len(), 1);
/// assert_eq!(adults[0]["name"], "Cid");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    #[serde(rename = "where", default)]
    conditions: Vec<Condition>,
    #[serde(default)]
    orderby: Vec<OrderBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    limit: Option<usize>,
}

impl Query {
    /// Creates a new empty query. An empty query keeps every item.
    pub fn new() -> Self {
        Query::default()
    }

    /// Creates a query from its parts.
    pub fn from_parts(conditions: Vec<Condition>, orderby: Vec<OrderBy>, limit: Option<usize>) -> Self {
        Query {
            conditions,
            orderby,
            limit,
        }
    }

    // ========================================================================
    // Where-clause builders
    // ========================================================================

    /// Appends a condition.
    pub fn and_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Appends a condition with a pattern.
    pub fn and(self, field: &str, op: Op, value: impl Into<Pattern>) -> Self {
        self.and_condition(Condition::new(field, op, value))
    }

    /// Appends an equality condition.
    pub fn and_eq(self, field: &str, value: impl Into<Pattern>) -> Self {
        self.and(field, Op::Eq, value)
    }

    /// Appends a case-insensitive equality condition.
    pub fn and_eq_insensitive(self, field: &str, value: &str) -> Self {
        self.and_condition(Condition::new(field, Op::Eq, value).insensitive())
    }

    /// Appends a not-equal condition.
    pub fn and_ne(self, field: &str, value: impl Into<Pattern>) -> Self {
        self.and(field, Op::Ne, value)
    }

    /// Appends a greater-than condition.
    pub fn and_gt(self, field: &str, value: impl Into<Pattern>) -> Self {
        self.and(field, Op::Gt, value)
    }

    /// Appends a greater-than-or-equal condition.
    pub fn and_ge(self, field: &str, value: impl Into<Pattern>) -> Self {
        self.and(field, Op::Ge, value)
    }

    /// Appends a less-than condition.
    pub fn and_lt(self, field: &str, value: impl Into<Pattern>) -> Self {
        self.and(field, Op::Lt, value)
    }

    /// Appends a less-than-or-equal condition.
    pub fn and_le(self, field: &str, value: impl Into<Pattern>) -> Self {
        self.and(field, Op::Le, value)
    }

    /// Appends a prefix match (`like_r`).
    pub fn and_starts_with(self, field: &str, value: &str) -> Self {
        self.and(field, Op::LikeR, value)
    }

    /// Appends a suffix match (`like_l`).
    pub fn and_ends_with(self, field: &str, value: &str) -> Self {
        self.and(field, Op::LikeL, value)
    }

    /// Appends a substring match (`like_b`).
    pub fn and_contains(self, field: &str, value: &str) -> Self {
        self.and(field, Op::LikeB, value)
    }

    /// Appends an `is_null` condition.
    pub fn and_is_null(self, field: &str) -> Self {
        self.and_condition(Condition::unary(field, Op::IsNull))
    }

    /// Appends an `is_not_null` condition.
    pub fn and_is_not_null(self, field: &str) -> Self {
        self.and_condition(Condition::unary(field, Op::IsNotNull))
    }

    /// Appends a regular expression condition.
    ///
    /// The pattern is compiled when the query runs; a broken pattern lets
    /// every record pass and is reported in [`Processed::errors`].
    pub fn and_regexp(self, field: &str, pattern: &str, flags: &str) -> Self {
        let mut condition = Condition::new(field, Op::Regexp, pattern);
        if !flags.is_empty() {
            condition.option = Some(ConditionOption::from(flags));
        }
        self.and_condition(condition)
    }

    // ========================================================================
    // Ordering and limit
    // ========================================================================

    /// Adds an ordering. Only the first ordering is applied when sorting.
    pub fn order_by(mut self, field: &str, dir: Dir) -> Self {
        self.orderby.push(OrderBy::new(field, dir));
        self
    }

    /// Adds an ascending ordering.
    pub fn order_asc(self, field: &str) -> Self {
        self.order_by(field, Dir::Asc)
    }

    /// Adds a descending ordering.
    pub fn order_desc(self, field: &str) -> Self {
        self.order_by(field, Dir::Desc)
    }

    /// Sets the maximum number of results. Zero means no limit.
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n).filter(|n| *n > 0);
        self
    }

    /// Finalizes the query.
    pub fn build(self) -> Self {
        self
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Returns the where-clause.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Returns the orderings.
    pub fn orderings(&self) -> &[OrderBy] {
        &self.orderby
    }

    /// Returns the limit, if set.
    pub fn get_limit(&self) -> Option<usize> {
        self.limit
    }

    /// Returns `true` if this query has no conditions.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Tests a single item against the where-clause.
    ///
    /// Conditions that cannot be evaluated count as passed.
    pub fn matches<T, F>(&self, item: &T, accessor: F) -> bool
    where
        for<'a> F: Fn(&'a T, &str) -> Value<'a>,
    {
        !pipeline::filter(std::slice::from_ref(item), &self.conditions, accessor).is_empty()
    }

    /// Applies the where-clause only, keeping dataset order.
    pub fn filter<'a, T, F>(&self, items: &'a [T], accessor: F) -> Vec<&'a T>
    where
        for<'b> F: Fn(&'b T, &str) -> Value<'b>,
    {
        pipeline::filter(items, &self.conditions, accessor)
    }

    /// Runs filter, sort and limit, returning records and condition errors.
    pub fn run<'a, T, F>(&self, items: &'a [T], accessor: F) -> Processed<'a, T>
    where
        for<'b> F: Fn(&'b T, &str) -> Value<'b>,
    {
        pipeline::process(items, &self.conditions, &self.orderby, self.limit, accessor)
    }

    /// Runs filter, sort and limit, returning only the records.
    pub fn process<'a, T, F>(&self, items: &'a [T], accessor: F) -> Vec<&'a T>
    where
        for<'b> F: Fn(&'b T, &str) -> Value<'b>,
    {
        self.run(items, accessor).records
    }

    /// Runs the pipeline and clones the surviving items.
    pub fn process_cloned<T, F>(&self, items: &[T], accessor: F) -> Vec<T>
    where
        T: Clone,
        for<'a> F: Fn(&'a T, &str) -> Value<'a>,
    {
        self.run(items, accessor).cloned()
    }

    /// Counts the items that pass the where-clause (ignores the limit).
    pub fn count<T, F>(&self, items: &[T], accessor: F) -> usize
    where
        for<'a> F: Fn(&'a T, &str) -> Value<'a>,
    {
        pipeline::filter(items, &self.conditions, accessor).len()
    }
}
