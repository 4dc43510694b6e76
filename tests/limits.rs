//! Pathological nesting stays cheap and never exhausts a worker thread's stack

use logshape::shape::config::ShapeConfig;
use logshape::shape::processor::{process_line, ProcessingSpec};
use logshape::shape::scanner::Scanner;
use logshape::shape::{parse_line, DataParser, Element, ElementKind};
use std::thread;
use std::time::{Duration, Instant};

fn nested(depth: usize) -> String {
    format!("{}a=1", "(".repeat(depth))
}

fn max_group_depth(elements: &[Element]) -> usize {
    elements
        .iter()
        .filter(|element| !element.children().is_empty())
        .map(|element| {
            let own = usize::from(element.is_kind(ElementKind::Group));
            own + max_group_depth(element.children())
        })
        .max()
        .unwrap_or(0)
}

#[test]
fn deep_line_parses_on_a_default_sized_thread() {
    let result = thread::spawn(|| {
        let line = nested(8000);
        let result = parse_line(&line);
        let depth = max_group_depth(&result.pairs);
        (result.depth_limited, depth)
    })
    .join()
    .unwrap();

    assert_eq!(result, (true, 128));
}

#[test]
fn deep_line_reports_are_flagged() {
    let output = thread::spawn(|| {
        let spec = ProcessingSpec::from_string("shape-json").unwrap();
        process_line(&nested(8000), &spec, &ShapeConfig::default()).unwrap()
    })
    .join()
    .unwrap();

    let reports: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(reports[0]["truncated"], true);
}

#[test]
fn unbounded_nesting_is_paired_in_linear_time() {
    let elapsed = thread::Builder::new()
        .stack_size(256 * 1024 * 1024)
        .spawn(|| {
            let line = nested(4000);
            let started = Instant::now();
            let result = DataParser::new(Scanner::new(&line))
                .with_max_depth(usize::MAX)
                .parse();
            let elapsed = started.elapsed();
            assert!(!result.depth_limited);
            assert_eq!(result.pairs.len(), 1);
            elapsed
        })
        .unwrap()
        .join()
        .unwrap();

    assert!(elapsed < Duration::from_secs(2), "took {:?}", elapsed);
}
