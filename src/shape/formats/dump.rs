//! Aligned span dump
//!
//! The line is printed once as a header, then every element gets one row, children before
//! their parent. A row shows the element name, its span and a caret ruler under the header
//! marking where the span begins and ends, followed by the span's text:
//!
//!                  a=1
//!     word   0:1   ^    a
//!      key   0:1   ^    a
//!
//! The ruler is padded to the full line length so the quoted text lines up in one column.
//! Zero-length spans (blank keys) get an empty ruler.

use crate::shape::element::Element;
use crate::shape::parser::ParseResult;
use crate::shape::span::{InputLine, Span};
use std::fmt::Write;

const HEADER_INDENT: &str = "             ";

pub fn to_dump_str(input: InputLine<'_>, elements: &[Element]) -> String {
    let mut result = header(input);
    for element in elements {
        append_element(&mut result, input, element);
    }
    result
}

/// Dumps the pairs of a parse result followed by its free row
pub fn result_to_dump_str(input: InputLine<'_>, parsed: &ParseResult) -> String {
    let mut result = header(input);
    for element in parsed.pairs.iter().chain(&parsed.free_row) {
        append_element(&mut result, input, element);
    }
    result
}

fn header(input: InputLine<'_>) -> String {
    format!("{}{}\n", HEADER_INDENT, input.as_str())
}

fn append_element(result: &mut String, input: InputLine<'_>, element: &Element) {
    for child in element.children() {
        append_element(result, input, child);
    }

    let span = element.span();
    let _ = write!(
        result,
        "{:>4} {:>3}:{:<3} ",
        element.short_name(),
        span.begin,
        span.end
    );
    result.push_str(&ruler(span, input.len()));
    let _ = writeln!(result, "  {}", input.substring(span));
}

fn ruler(span: Span, width: usize) -> String {
    let mut marks = String::with_capacity(width.max(span.end));
    for column in 0..span.end {
        let mark = if column == span.begin || column + 1 == span.end {
            '^'
        } else if column > span.begin {
            '-'
        } else {
            ' '
        };
        marks.push(mark);
    }
    for _ in span.end..width {
        marks.push(' ');
    }
    marks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::parser::parse_line;

    #[test]
    fn test_ruler_marks_both_ends() {
        assert_eq!(ruler(Span::new(2, 6), 8), "  ^--^  ");
        assert_eq!(ruler(Span::new(0, 1), 3), "^  ");
        assert_eq!(ruler(Span::new(1, 3), 3), " ^^");
    }

    #[test]
    fn test_ruler_for_blank_span() {
        assert_eq!(ruler(Span::empty_at(2), 4), "    ");
    }

    #[test]
    fn test_dump_of_simple_pair() {
        let line = "a=1";
        let input = InputLine::new(line);
        let dump = result_to_dump_str(input, &parse_line(line));
        let rows: Vec<&str> = dump.lines().collect();
        assert_eq!(
            rows,
            vec![
                "             a=1",
                "word   0:1   ^    a",
                " key   0:1   ^    a",
                " num   2:3     ^  1",
                " val   2:3     ^  1",
                "pair   0:3   ^-^  a=1",
            ]
        );
    }

    #[test]
    fn test_rows_align_under_header() {
        let line = "name: bob; age: 42";
        let input = InputLine::new(line);
        let dump = result_to_dump_str(input, &parse_line(line));
        for row in dump.lines().skip(1) {
            // name, span columns, ruler padded to the line, two spaces
            assert_eq!(&row[13 + line.len()..13 + line.len() + 2], "  ");
        }
    }
}
