//! Treeviz formatter for element trees
//!
//! One line per element, nesting drawn with box characters, 2 columns per level:
//!
//!     ├─ pair: a=1
//!     │ ├─ key: a
//!     │ │ └─ word: a
//!     │ └─ val: 1
//!     │   └─ num: 1
//!     └─ pair: b=2
//!
//! Labels are the element's text, truncated to 30 characters. Blank keys show `∅`.

use crate::shape::element::Element;
use crate::shape::parser::ParseResult;
use crate::shape::span::InputLine;

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let mut truncated = s.chars().take(max_chars).collect::<String>();
        truncated.push_str("...");
        truncated
    } else {
        s.to_string()
    }
}

pub fn to_treeviz_str(input: InputLine<'_>, elements: &[Element]) -> String {
    let items: Vec<&Element> = elements.iter().collect();
    render(input, &items)
}

/// Renders the pairs of a parse result followed by its free row
pub fn result_to_treeviz_str(input: InputLine<'_>, parsed: &ParseResult) -> String {
    let items: Vec<&Element> = parsed.pairs.iter().chain(&parsed.free_row).collect();
    render(input, &items)
}

fn render(input: InputLine<'_>, items: &[&Element]) -> String {
    let mut result = String::new();
    for (i, item) in items.iter().enumerate() {
        let is_last = i == items.len() - 1;
        append_element(&mut result, input, item, "", is_last);
    }
    result
}

fn append_element(
    result: &mut String,
    input: InputLine<'_>,
    element: &Element,
    prefix: &str,
    is_last: bool,
) {
    let connector = if is_last { "└─" } else { "├─" };
    let span = element.span();
    let label = if span.is_empty() {
        "∅".to_string()
    } else {
        truncate(&input.substring(span), 30)
    };

    result.push_str(&format!(
        "{}{} {}: {}\n",
        prefix,
        connector,
        element.short_name(),
        label
    ));

    let new_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
    let children = element.children();
    for (i, child) in children.iter().enumerate() {
        let is_last = i == children.len() - 1;
        append_element(result, input, child, &new_prefix, is_last);
    }
}
