//! File processing through the public processor API

use logshape::shape::config::Loader;
use logshape::shape::processor::{process_file, ProcessingError, ProcessingSpec};
use std::io::Write;
use tempfile::NamedTempFile;

fn log_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn json_report_for_every_line() {
    let file = log_file("a=1, b=2\n(1, 2, 3)\n");
    let spec = ProcessingSpec::from_string("shape-json").unwrap();
    let output = process_file(file.path(), &spec, &Loader::new().build().unwrap()).unwrap();

    let reports: serde_json::Value = serde_json::from_str(&output).unwrap();
    let reports = reports.as_array().unwrap();
    assert_eq!(reports.len(), 2);

    assert_eq!(reports[0]["line"], 1);
    assert_eq!(reports[0]["format"], "comma");
    assert_eq!(reports[0]["truncated"], false);
    assert_eq!(reports[0]["columns"][0]["name"], "a");
    assert_eq!(reports[0]["columns"][0]["value"], "1");
    assert_eq!(reports[0]["columns"][0]["kind"], "Number");
    assert_eq!(reports[0]["schema"].as_str().unwrap().len(), 40);

    assert_eq!(reports[1]["format"], "plain");
    assert_eq!(reports[1]["columns"][0]["name"], "col_0");
    assert_eq!(reports[1]["columns"][0]["value"], "1, 2, 3");
    assert_eq!(reports[1]["columns"][0]["kind"], "Invalid");
    assert_eq!(reports[1]["schema"], "0".repeat(40));
}

#[test]
fn simple_report_numbers_lines() {
    let file = log_file("a=1, b=2\nerror: file not found\n");
    let spec = ProcessingSpec::from_string("shape-simple").unwrap();
    let output = process_file(file.path(), &spec, &Loader::new().build().unwrap()).unwrap();
    let lines: Vec<&str> = output.lines().collect();

    assert!(lines[0].starts_with("1: comma "));
    assert_eq!(lines[1], "  a = 1");
    assert_eq!(lines[2], "  b = 2");
    assert_eq!(lines[3], "2: comma -");
    assert_eq!(lines[4], "  ~ error");
    assert_eq!(lines.len(), 8);
}

#[test]
fn config_file_layers_over_defaults() {
    let mut config_file = NamedTempFile::new().unwrap();
    writeln!(
        config_file,
        "[output]\ninclude_free_row = false\nblank_key_prefix = \"field\""
    )
    .unwrap();
    let config = Loader::new().with_file(config_file.path()).build().unwrap();
    assert_eq!(config.limits.max_tokens, 8192);

    let file = log_file("10.0.0.1 - 404 /index.html\n");
    let spec = ProcessingSpec::from_string("shape-simple").unwrap();
    let output = process_file(file.path(), &spec, &config).unwrap();
    let lines: Vec<&str> = output.lines().collect();

    assert_eq!(
        &lines[1..],
        &["  field0 = 10.0.0.1", "  field1 = 404", "  field2 = /index.html"]
    );
}

#[test]
fn long_lines_are_truncated() {
    let config = Loader::new()
        .set_override("limits.max_line_bytes", 5_i64)
        .unwrap()
        .build()
        .unwrap();
    let file = log_file("a=1, b=2\n");
    let spec = ProcessingSpec::from_string("shape-json").unwrap();
    let output = process_file(file.path(), &spec, &config).unwrap();

    let reports: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(reports[0]["truncated"], true);
    assert_eq!(reports[0]["columns"].as_array().unwrap().len(), 1);
    assert_eq!(reports[0]["columns"][0]["value"], "1");
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let spec = ProcessingSpec::from_string("shape-simple").unwrap();
    let result = process_file(
        dir.path().join("absent.log"),
        &spec,
        &Loader::new().build().unwrap(),
    );
    assert!(matches!(result, Err(ProcessingError::Io(_))));
}
