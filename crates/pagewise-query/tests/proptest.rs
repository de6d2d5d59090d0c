//! Property-based tests for the pipeline and pager using proptest.

use proptest::prelude::*;
use pagewise_query::{
    compute_metadata, filter, limit, page_slice, sort, Condition, Number, Op, OrderBy, Value,
};

// ============================================================================
// Test helpers
// ============================================================================

#[derive(Debug, Clone)]
struct Row {
    id: usize,
    key: i64,
    tag: String,
}

fn row_accessor<'a>(row: &'a Row, field: &str) -> Value<'a> {
    match field {
        "key" => Value::Number(Number::I64(row.key)),
        "tag" => Value::String(&row.tag),
        _ => Value::None,
    }
}

fn rows_strategy() -> impl Strategy<Value = Vec<Row>> {
    prop::collection::vec((-5i64..5, "[a-c]{1,2}"), 0..60).prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(id, (key, tag))| Row { id, key, tag })
            .collect()
    })
}

fn ids(rows: &[&Row]) -> Vec<usize> {
    rows.iter().map(|row| row.id).collect()
}

// ============================================================================
// Pipeline properties
// ============================================================================

proptest! {
    /// An empty where-clause returns the dataset unchanged.
    #[test]
    fn empty_where_is_identity(rows in rows_strategy()) {
        let out = filter(&rows, &[], row_accessor);
        prop_assert_eq!(out.len(), rows.len());
        for (kept, original) in out.iter().zip(rows.iter()) {
            prop_assert!(std::ptr::eq(*kept, original));
        }
    }

    /// A single eq condition keeps exactly the equal records, in order.
    #[test]
    fn eq_selects_equal_records(rows in rows_strategy(), wanted in -5i64..5) {
        let out = filter(&rows, &[Condition::new("key", Op::Eq, wanted)], row_accessor);
        let expected: Vec<usize> = rows.iter().filter(|r| r.key == wanted).map(|r| r.id).collect();
        prop_assert_eq!(ids(&out), expected);
    }

    /// Filtering never grows the dataset.
    #[test]
    fn filter_never_grows(rows in rows_strategy(), threshold in -6i64..6) {
        let out = filter(&rows, &[Condition::new("key", Op::Gt, threshold)], row_accessor);
        prop_assert!(out.len() <= rows.len());
    }

    /// Ties keep their input order in both directions.
    #[test]
    fn sort_is_stable(rows in rows_strategy(), desc in any::<bool>()) {
        let order = if desc { OrderBy::desc("key") } else { OrderBy::asc("key") };
        let sorted = sort(rows.iter().collect(), &[order], row_accessor);
        prop_assert_eq!(sorted.len(), rows.len());
        for pair in sorted.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if desc {
                prop_assert!(a.key >= b.key);
            } else {
                prop_assert!(a.key <= b.key);
            }
            if a.key == b.key {
                prop_assert!(a.id < b.id);
            }
        }
    }

    /// Limit keeps the leading min(n, len) records.
    #[test]
    fn limit_keeps_prefix(rows in rows_strategy(), n in 0usize..80) {
        let all: Vec<&Row> = rows.iter().collect();
        let out = limit(all.clone(), Some(n));
        if n == 0 {
            prop_assert_eq!(out.len(), all.len());
        } else {
            prop_assert_eq!(out.len(), n.min(all.len()));
            prop_assert_eq!(ids(&out), ids(&all[..out.len()]));
        }
    }
}

// ============================================================================
// Pager properties
// ============================================================================

proptest! {
    /// A page never holds more than the page size nor more than remains.
    #[test]
    fn page_slice_bounds(len in 0usize..200, offset in 0usize..250, pagesize in 1usize..30) {
        let items: Vec<usize> = (0..len).collect();
        let page = page_slice(&items, offset, pagesize);
        prop_assert!(page.len() <= pagesize);
        prop_assert!(page.len() <= len.saturating_sub(offset));
        if let Some(first) = page.first() {
            prop_assert_eq!(*first, offset);
        }
    }

    /// The page window is contiguous, bounded and contains the current page.
    #[test]
    fn window_contains_current_page(
        rowcount in 1usize..500,
        pagesize in 1usize..25,
        show_pages in 1usize..12,
        page_seed in any::<usize>(),
    ) {
        let totalpages = rowcount.div_ceil(pagesize);
        let offset = (page_seed % totalpages) * pagesize;
        let meta = compute_metadata(rowcount, offset, pagesize, show_pages).unwrap();

        prop_assert_eq!(meta.totalpages, totalpages);
        prop_assert_eq!(meta.pages.len(), show_pages.min(totalpages));
        prop_assert!(meta.pages.contains(&meta.currpage));
        prop_assert!(meta.pages.windows(2).all(|w| w[1] == w[0] + 1));
        prop_assert!(meta.pages.iter().all(|p| (1..=totalpages).contains(p)));
        prop_assert!(meta.firstrec <= meta.lastrec);
        prop_assert!(meta.lastrec <= rowcount);
        prop_assert_eq!(meta.lastpage, *meta.pages.last().unwrap());
    }
}
