//! End-to-end runs of the `pagewise` binary.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::{json, Value};
use tempfile::TempDir;

fn people_file() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("people.json");
    let people = json!([
        {"id": 1, "name": "Ann", "age": 31},
        {"id": 2, "name": "Bob", "age": 17},
        {"id": 3, "name": "Cid", "age": 45},
        {"id": 4, "name": "Dee", "age": 31},
        {"id": 5, "name": "Eve", "age": 22},
        {"id": 6, "name": "Fay", "age": 58},
        {"id": 7, "name": "Gus", "age": 39}
    ]);
    std::fs::write(&path, people.to_string()).unwrap();
    (dir, path)
}

fn pagewise(file: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pagewise"))
        .arg(file)
        .args(args)
        .env_remove("PAGEWISE_LOG")
        .output()
        .unwrap()
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn ids(doc: &Value) -> Vec<u64> {
    doc["records"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|r| r["id"].as_u64())
        .collect()
}

#[test]
fn filters_sorts_and_pages() {
    let (_dir, file) = people_file();
    let out = pagewise(&file, &["-w", "age:ge:30", "-o", "age:desc", "-s", "2", "-O", "json"]);
    let doc = stdout_json(&out);

    assert_eq!(ids(&doc), vec![6, 3]);
    assert_eq!(doc["pagination"]["rowcount"], 5);
    assert_eq!(doc["pagination"]["totalpages"], 3);
    assert_eq!(doc["pagination"]["pages"], json!([1, 2, 3]));
}

#[test]
fn shows_requested_page_as_text() {
    let (_dir, file) = people_file();
    let out = pagewise(&file, &["-w", "age:ge:30", "-o", "age:desc", "-s", "2", "-p", "2"]);
    assert!(out.status.success());
    let text = String::from_utf8(out.stdout).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "id  name  age");
    assert!(lines[1].starts_with("7   Gus"));
    assert!(lines[2].starts_with("1   Ann"));
    assert!(text.contains("records 3-4 of 5 | page 2/3 | 1 [2] 3"));
}

#[test]
fn out_of_range_page_falls_back_to_first() {
    let (_dir, file) = people_file();
    let out = pagewise(&file, &["-s", "3", "-p", "9", "-O", "json"]);
    let doc = stdout_json(&out);
    assert_eq!(ids(&doc), vec![1, 2, 3]);
    assert_eq!(doc["pagination"]["currpage"], 1);
    assert!(String::from_utf8_lossy(&out.stderr).contains("page out of range"));
}

#[test]
fn limit_and_all() {
    let (_dir, file) = people_file();
    let doc = stdout_json(&pagewise(&file, &["-o", "name:desc", "-l", "4", "--all", "-O", "json"]));
    assert_eq!(ids(&doc), vec![7, 6, 5, 4]);
    assert!(doc.get("pagination").is_none());
}

#[test]
fn csv_output() {
    let (_dir, file) = people_file();
    let out = pagewise(&file, &["-w", "name:like_r:c:i", "-O", "csv"]);
    assert!(out.status.success());
    assert_eq!(String::from_utf8(out.stdout).unwrap(), "id,name,age\n3,Cid,45\n");
}

#[test]
fn huge_page_window_shows_every_page() {
    let (_dir, file) = people_file();
    let max = usize::MAX.to_string();
    let doc = stdout_json(&pagewise(&file, &["-s", "2", "--pages", &max, "-O", "json"]));
    assert_eq!(doc["pagination"]["pages"], json!([1, 2, 3, 4]));
}

#[test]
fn xml_output() {
    let (_dir, file) = people_file();
    let out = pagewise(&file, &["-w", "name:eq:Cid", "-O", "xml"]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let xml = String::from_utf8(out.stdout).unwrap();

    assert!(xml.starts_with("<page>"), "{xml}");
    assert!(xml.contains("<record><id>3</id><name>Cid</name><age>45</age></record>"), "{xml}");
    assert!(xml.contains("<totalpages>1</totalpages>"), "{xml}");
    assert_eq!(xml.matches("<record>").count(), 1);
}

#[test]
fn xml_with_unusual_field_names_does_not_crash() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("odd.json");
    std::fs::write(&file, json!([{"first name": "Ann", "1st": true}]).to_string()).unwrap();

    let out = pagewise(&file, &["-O", "xml"]);
    match out.status.code() {
        Some(0) => assert!(String::from_utf8_lossy(&out.stdout).starts_with("<page>")),
        Some(1) => assert!(String::from_utf8_lossy(&out.stderr).contains("error: rendering output")),
        other => panic!("unexpected exit status {other:?}"),
    }
}

#[test]
fn yaml_config_is_applied_before_flags() {
    let (dir, file) = people_file();
    let config = dir.path().join("list.yaml");
    std::fs::write(
        &config,
        "where:\n  - field: age\n    condition: lt\n    value: 40\norderby:\n  - field: name\n    type: desc\npagesize: 2\n",
    )
    .unwrap();

    let config_arg = config.to_string_lossy().into_owned();
    let doc = stdout_json(&pagewise(&file, &["-c", &config_arg, "-O", "json"]));
    assert_eq!(ids(&doc), vec![7, 5]);
    assert_eq!(doc["pagination"]["totalpages"], 3);

    // Flags add conditions and replace the ordering.
    let doc = stdout_json(&pagewise(
        &file,
        &["-c", &config_arg, "-w", "age:gt:20", "-o", "id", "-O", "json"],
    ));
    assert_eq!(ids(&doc), vec![1, 4]);
    assert_eq!(doc["pagination"]["rowcount"], 4);
}

#[test]
fn broken_regex_is_reported_but_not_fatal() {
    let (_dir, file) = people_file();
    let doc = stdout_json(&pagewise(&file, &["-w", "name:regexp:(", "-O", "json"]));
    assert_eq!(doc["pagination"]["rowcount"], 7);
    assert_eq!(doc["errors"].as_array().unwrap().len(), 1);
}

#[test]
fn missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let out = pagewise(&dir.path().join("nope.json"), &[]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("error: loading records"), "stderr: {stderr}");
}

#[test]
fn bad_condition_is_a_usage_error() {
    let (_dir, file) = people_file();
    let out = pagewise(&file, &["-w", "age:between:1"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn zero_page_size_fails() {
    let (_dir, file) = people_file();
    let out = pagewise(&file, &["-s", "0"]);
    assert_eq!(out.status.code(), Some(1));
}
