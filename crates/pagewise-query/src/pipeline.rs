//! Filter, sort and limit stages.
//!
//! The stages borrow the input: every result is a `Vec<&T>` pointing into
//! the caller's dataset, in dataset order unless sorted. [`process`] runs the
//! three stages in the fixed order filter → sort → limit.

use tracing::{debug, warn};

use crate::condition::{Condition, PreparedCondition};
use crate::error::ConditionError;
use crate::ordering::OrderBy;
use crate::value::Value;

/// Output of a pipeline run.
#[derive(Debug)]
pub struct Processed<'a, T> {
    /// Surviving records, borrowed from the input.
    pub records: Vec<&'a T>,
    /// Condition errors met while filtering. Each failed condition was
    /// treated as passed.
    pub errors: Vec<ConditionError>,
}

impl<'a, T> Processed<'a, T> {
    /// Number of surviving records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if nothing survived.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Clones the surviving records into an owned dataset.
    pub fn cloned(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.records.iter().map(|record| (*record).clone()).collect()
    }
}

/// Keeps the records that satisfy every condition.
///
/// Conditions are evaluated left to right and evaluation stops at the first
/// one that fails. An empty where-clause returns every record in order.
pub fn filter<'a, T, F>(items: &'a [T], conditions: &[Condition], accessor: F) -> Vec<&'a T>
where
    for<'b> F: Fn(&'b T, &str) -> Value<'b>,
{
    filter_report(items, conditions, accessor).records
}

/// Like [`filter`], also returning the condition errors that were met.
///
/// A condition with an unknown operator or a broken regular expression is
/// logged once per run and then treated as always passing.
pub fn filter_report<'a, T, F>(
    items: &'a [T],
    conditions: &[Condition],
    accessor: F,
) -> Processed<'a, T>
where
    for<'b> F: Fn(&'b T, &str) -> Value<'b>,
{
    let mut errors = Vec::new();
    let prepared: Vec<PreparedCondition<'_>> = conditions
        .iter()
        .filter(|condition| !condition.is_inert())
        .filter_map(|condition| match condition.prepare() {
            Ok(prepared) => Some(prepared),
            Err(error) => {
                warn!(%error, condition = %condition, "condition ignored, records pass it");
                errors.push(error);
                None
            }
        })
        .collect();

    if prepared.is_empty() {
        return Processed {
            records: items.iter().collect(),
            errors,
        };
    }

    let records: Vec<&'a T> = items
        .iter()
        .filter(|item| {
            prepared
                .iter()
                .all(|condition| condition.matches(&accessor(*item, condition.field())))
        })
        .collect();

    debug!(
        input = items.len(),
        kept = records.len(),
        conditions = prepared.len(),
        "filtered dataset"
    );
    Processed { records, errors }
}

/// Sorts by the first ordering only.
///
/// The sort is stable, so records with equal keys keep their relative order
/// in both directions. Further orderings are ignored.
pub fn sort<'a, T, F>(mut items: Vec<&'a T>, orderby: &[OrderBy], accessor: F) -> Vec<&'a T>
where
    for<'b> F: Fn(&'b T, &str) -> Value<'b>,
{
    let Some(order) = orderby.first() else {
        return items;
    };
    if orderby.len() > 1 {
        debug!(
            ignored = orderby.len() - 1,
            field = %order.field,
            "only the first ordering is applied"
        );
    }
    items.sort_by(|a, b| order.compare(&accessor(*a, &order.field), &accessor(*b, &order.field)));
    items
}

/// Keeps the first `n` items. `None` and `Some(0)` keep everything.
pub fn limit<T>(mut items: Vec<T>, n: Option<usize>) -> Vec<T> {
    if let Some(n) = n.filter(|n| *n > 0) {
        items.truncate(n);
    }
    items
}

/// Runs filter, then sort, then limit.
pub fn process<'a, T, F>(
    items: &'a [T],
    conditions: &[Condition],
    orderby: &[OrderBy],
    n: Option<usize>,
    accessor: F,
) -> Processed<'a, T>
where
    for<'b> F: Fn(&'b T, &str) -> Value<'b>,
{
    let Processed { records, errors } = filter_report(items, conditions, &accessor);
    let records = limit(sort(records, orderby, &accessor), n);
    Processed { records, errors }
}
