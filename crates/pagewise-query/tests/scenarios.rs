//! End-to-end scenarios over JSON records.

use pagewise_query::{
    compute_metadata, ConditionError, Op, Pager, Pagination, Query, QueryError, Record, Seekable,
};
use serde_json::json;

fn records(raw: serde_json::Value) -> Vec<Record> {
    serde_json::from_value(raw).unwrap()
}

fn field(rows: &[&Record], name: &str) -> Vec<serde_json::Value> {
    rows.iter().map(|r| r.get(name).cloned().unwrap_or_default()).collect()
}

// ============================================================================
// Pagination
// ============================================================================

#[test]
fn first_page_of_ninety_five_rows() {
    let p = compute_metadata(95, 0, 10, 5).unwrap();
    assert_eq!(
        p,
        Pagination {
            firstrec: 1,
            lastrec: 10,
            rowcount: 95,
            currpage: 1,
            lastpage: 5,
            pages: vec![1, 2, 3, 4, 5],
            totalpages: 10,
            show_pages: 5,
            pagesize: 10,
        }
    );
}

#[test]
fn last_page_of_ninety_five_rows() {
    let p = compute_metadata(95, 90, 10, 5).unwrap();
    assert_eq!(p.currpage, 10);
    assert_eq!(p.pages, vec![6, 7, 8, 9, 10]);
    assert_eq!(p.firstrec, 91);
    assert_eq!(p.lastrec, 95);
}

#[test]
fn empty_dataset_has_no_pages() {
    let p = compute_metadata(0, 0, 10, 5).unwrap();
    assert_eq!(p.totalpages, 0);
    assert!(p.pages.is_empty());
    assert_eq!(p.firstrec, 0);
    assert_eq!(p.lastrec, 0);
}

#[test]
fn pagination_serializes_with_wire_names() {
    let p = compute_metadata(3, 0, 2, 5).unwrap();
    assert_eq!(
        serde_json::to_value(&p).unwrap(),
        json!({
            "firstrec": 1, "lastrec": 2, "rowcount": 3, "currpage": 1,
            "lastpage": 2, "pages": [1, 2], "totalpages": 2,
            "show_pages": 5, "pagesize": 2
        })
    );
}

#[test]
fn zero_page_size_is_an_error() {
    assert_eq!(compute_metadata(10, 0, 0, 5), Err(QueryError::ZeroPageSize));
}

// ============================================================================
// Filtering and sorting
// ============================================================================

#[test]
fn gt_keeps_larger_records() {
    let data = records(json!([{"a": 1}, {"a": 2}, {"a": 3}]));
    let out = Query::new().and_gt("a", 2).build().process(&data, Record::accessor);
    assert_eq!(field(&out, "a"), vec![json!(3)]);
}

#[test]
fn ascending_string_sort() {
    let data = records(json!([{"a": "b"}, {"a": "a"}]));
    let out = Query::new().order_asc("a").build().process(&data, Record::accessor);
    assert_eq!(field(&out, "a"), vec![json!("a"), json!("b")]);
}

#[test]
fn broken_regex_keeps_records_and_reports() {
    let data = records(json!([{"a": "x"}, {"a": "y"}]));
    let report = Query::new()
        .and_regexp("a", "[unclosed", "")
        .build()
        .run(&data, Record::accessor);
    assert_eq!(report.len(), 2);
    assert!(matches!(
        report.errors.as_slice(),
        [ConditionError::InvalidRegex { .. }]
    ));
}

#[test]
fn unsupported_regex_flag_is_reported() {
    let data = records(json!([{"a": "x"}]));
    let report = Query::new()
        .and_regexp("a", "y", "q")
        .build()
        .run(&data, Record::accessor);
    assert_eq!(report.len(), 1);
    assert_eq!(report.errors, vec![ConditionError::InvalidRegexFlag { flag: 'q' }]);
}

#[test]
fn numeric_strings_compare_loosely() {
    let data = records(json!([{"n": "5"}, {"n": 5}, {"n": "6"}]));
    let out = Query::new().and_eq("n", 5).build().process(&data, Record::accessor);
    assert_eq!(out.len(), 2);
}

#[test]
fn missing_fields_pass() {
    let data = records(json!([{"a": 1}, {"b": 2}]));
    let out = Query::new().and_eq("a", 9).build().process(&data, Record::accessor);
    assert_eq!(field(&out, "b"), vec![json!(2)]);
}

#[test]
fn conditions_parse_from_cli_syntax() {
    let data = records(json!([
        {"name": "Smithson"},
        {"name": "smith"},
        {"name": "Jones"}
    ]));
    let query = Query::new()
        .and_condition("name:like_r:smith:i".parse().unwrap())
        .build();
    assert_eq!(query.conditions()[0].op.op(), Some(Op::LikeR));
    assert_eq!(query.count(&data, Record::accessor), 2);
}

// ============================================================================
// Pipeline + pager together
// ============================================================================

#[test]
fn process_then_page() {
    let data: Vec<Record> = (1..=23)
        .map(|n| {
            let serde_json::Value::Object(map) = json!({"n": n, "even": n % 2 == 0}) else {
                unreachable!()
            };
            map
        })
        .collect();
    let working = Query::new()
        .and_eq("even", true)
        .order_desc("n")
        .build()
        .process(&data, Record::accessor);
    assert_eq!(working.len(), 11);

    let pager = Pager::new(4, 3).unwrap();
    let offset = pager.offset_of(3);
    let page = pager.slice(&working, offset);
    assert_eq!(field(page, "n"), vec![json!(6), json!(4), json!(2)]);

    let meta = pager.metadata(working.len(), offset);
    assert_eq!(meta.currpage, 3);
    assert_eq!(meta.pages, vec![1, 2, 3]);
    assert_eq!((meta.firstrec, meta.lastrec), (9, 11));
    assert!(page[0].seeker_field_value("even").as_bool().unwrap());
}
