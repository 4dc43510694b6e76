//! Bracket grouping
//!
//!     One pass over the token stream folds every matched bracket pair into a
//!     [ElementKind::Group] element and, on the same walk, feeds each token to the format
//!     classifiers.
//!
//!     Open levels are kept as an explicit stack of owned element lists, each tagged with the
//!     bracket that opened it. The bottom level is the top of the line and is tagged with the
//!     `Invalid` sentinel, which no closer ever matches.
//!
//! Recovery
//!
//!     Grouping never fails:
//!         - A closer that does not match the innermost open bracket is kept as a plain leaf.
//!         - Brackets still open at the end of the line are closed in reverse order, as if
//!           their closers had appeared.
//!         - A level that is empty or holds only whitespace produces no group at all.
//!         - Brackets opened beyond the depth bound stay plain leaves, and so do their closers.
//!           Later passes recurse once per nesting level, so their stack use stays bounded too.

use crate::shape::element::{Element, ElementKind};
use crate::shape::format::{FormatClassifier, FormatDescriptor, TokenHistogram};
use crate::shape::scanner::{TokenKind, TokenSource};
use tracing::debug;

/// Nesting depth used when the caller sets no bound of its own
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// The grouped top level plus the delimiter format chosen for the line
#[derive(Debug, Clone)]
pub struct Grouping {
    pub elements: Vec<Element>,
    pub format: FormatDescriptor,
    pub histogram: TokenHistogram,
    /// Set when brackets beyond the depth bound were kept flat
    pub depth_limited: bool,
}

struct Level {
    opener: TokenKind,
    elements: Vec<Element>,
}

/// Consumes the whole token stream and groups it, nesting at most [DEFAULT_MAX_DEPTH] levels
pub fn group_tokens<S: TokenSource + ?Sized>(source: &mut S) -> Grouping {
    group_tokens_within(source, DEFAULT_MAX_DEPTH)
}

/// Consumes the whole token stream and groups it, nesting at most `max_depth` levels
pub fn group_tokens_within<S: TokenSource + ?Sized>(source: &mut S, max_depth: usize) -> Grouping {
    let mut classifier = FormatClassifier::new();
    let mut stack = vec![Level {
        opener: TokenKind::Invalid,
        elements: Vec::new(),
    }];
    // openers past the bound, innermost last
    let mut flat_openers: Vec<TokenKind> = Vec::new();
    let mut depth_limited = false;

    while let Some(token) = source.next_token() {
        classifier.observe(token.kind);

        if token.kind.is_opening() {
            if stack.len() > max_depth {
                flat_openers.push(token.kind);
                depth_limited = true;
            } else {
                stack.push(Level {
                    opener: token.kind,
                    elements: Vec::new(),
                });
                continue;
            }
        } else if let Some(opener) = token.kind.opener_for() {
            if let Some(&flat) = flat_openers.last() {
                if flat == opener {
                    flat_openers.pop();
                }
            } else if stack.len() > 1 && stack.last().is_some_and(|level| level.opener == opener) {
                close_level(&mut stack);
                continue;
            }
        }

        if let Some(level) = stack.last_mut() {
            level.elements.push(Element::leaf(token));
        }
    }

    while stack.len() > 1 {
        close_level(&mut stack);
    }

    let format = classifier.decide();
    debug!(
        format = format.name,
        semi = ?classifier.semi_state(),
        comma = ?classifier.comma_state(),
        "discovered line format"
    );
    if depth_limited {
        debug!(max_depth, "brackets beyond the depth bound kept flat");
    }

    Grouping {
        elements: stack.pop().map(|level| level.elements).unwrap_or_default(),
        format,
        histogram: classifier.into_histogram(),
        depth_limited,
    }
}

/// Pops the innermost level and wraps it into a group on the level below
fn close_level(stack: &mut Vec<Level>) {
    let Some(level) = stack.pop() else {
        return;
    };
    if level.elements.iter().all(Element::is_whitespace) {
        return;
    }
    if let Some(parent) = stack.last_mut() {
        parent
            .elements
            .push(Element::node(ElementKind::Group, level.elements));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::scanner::Scanner;
    use crate::shape::span::Span;

    fn group(line: &str) -> Grouping {
        group_tokens(&mut Scanner::new(line))
    }

    fn names(elements: &[Element]) -> Vec<&'static str> {
        elements.iter().map(Element::short_name).collect()
    }

    #[test]
    fn test_flat_line() {
        let grouping = group("a=1, b=2");
        assert_eq!(
            names(&grouping.elements),
            vec!["word", "sep", "num", "comm", "wspc", "word", "sep", "num"]
        );
        assert_eq!(grouping.format, FormatDescriptor::COMMA);
    }

    #[test]
    fn test_matched_brackets_become_group() {
        let grouping = group("x (1 2) y");
        assert_eq!(
            names(&grouping.elements),
            vec!["word", "wspc", "grp", "wspc", "word"]
        );
        let inner = &grouping.elements[2];
        assert_eq!(names(inner.children()), vec!["num", "wspc", "num"]);
        // The brackets themselves are not part of the group
        assert_eq!(inner.span(), Span::new(3, 6));
    }

    #[test]
    fn test_nested_groups() {
        let grouping = group("[a {b} c]");
        assert_eq!(grouping.elements.len(), 1);
        let outer = &grouping.elements[0];
        assert_eq!(
            names(outer.children()),
            vec!["word", "wspc", "grp", "wspc", "word"]
        );
        assert_eq!(names(outer.children()[2].children()), vec!["word"]);
    }

    #[test]
    fn test_stray_closer_is_a_leaf() {
        let grouping = group("foo) bar");
        assert_eq!(
            names(&grouping.elements),
            vec!["word", "rpar", "wspc", "word"]
        );
    }

    #[test]
    fn test_mismatched_closer_stays_inside_level() {
        let grouping = group("(a] b)");
        assert_eq!(grouping.elements.len(), 1);
        assert_eq!(
            names(grouping.elements[0].children()),
            vec!["word", "rsqu", "wspc", "word"]
        );
    }

    #[test]
    fn test_unterminated_bracket_is_force_closed() {
        let grouping = group("head <a (b");
        assert_eq!(names(&grouping.elements), vec!["word", "wspc", "grp"]);
        let angle = &grouping.elements[2];
        assert_eq!(names(angle.children()), vec!["word", "wspc", "grp"]);
        assert_eq!(names(angle.children()[2].children()), vec!["word"]);
    }

    #[test]
    fn test_empty_and_blank_brackets_vanish() {
        let grouping = group("a () b ( ) c");
        assert_eq!(
            names(&grouping.elements),
            vec!["word", "wspc", "wspc", "word", "wspc", "wspc", "word"]
        );
    }

    #[test]
    fn test_empty_input() {
        let grouping = group("");
        assert!(grouping.elements.is_empty());
        assert_eq!(grouping.histogram.total(), 0);
        assert_eq!(grouping.format, FormatDescriptor::COMMA);
    }

    #[test]
    fn test_histogram_counts_brackets() {
        let grouping = group("(a)(b)");
        assert_eq!(grouping.histogram.count(TokenKind::LParen), 2);
        assert_eq!(grouping.histogram.count(TokenKind::RParen), 2);
        assert_eq!(names(&grouping.elements), vec!["grp", "grp"]);
    }

    #[test]
    fn test_brackets_past_depth_bound_stay_flat() {
        let grouping = group_tokens_within(&mut Scanner::new("((a)) b"), 1);
        assert!(grouping.depth_limited);
        assert_eq!(names(&grouping.elements), vec!["grp", "wspc", "word"]);
        assert_eq!(
            names(grouping.elements[0].children()),
            vec!["lpar", "word", "rpar"]
        );
    }

    #[test]
    fn test_default_depth_is_not_reported_for_shallow_lines() {
        assert!(!group("a=(b=[c])").depth_limited);
    }
}
