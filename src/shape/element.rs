//! The element tree
//!
//!     An element is either a single token (a leaf) or a labeled node that owns an ordered list
//!     of child elements. Nodes are produced by bracket grouping ([ElementKind::Group]) and by
//!     the pairing engine ([ElementKind::Key], [ElementKind::Value], [ElementKind::Pair]).
//!
//! Span Invariant
//!
//!     A node's span always runs from its first child's begin to its last child's end. Every
//!     mutation of a node's children goes through [Element::assign_children] or is followed by
//!     [Element::update_span], which recompute the span. The one childless node is the blank
//!     key synthesized for anonymous columns, whose span is zero-length by construction.
//!
//!     Children are owned outright and only ever moved between containers, so the tree can never
//!     alias or cycle. Cloning an element deep-clones its subtree.

use crate::shape::scanner::{Token, TokenKind};
use crate::shape::span::Span;
use serde::Serialize;
use std::fmt;

/// Labels for non-leaf elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ElementKind {
    Group,
    Key,
    Value,
    Pair,
}

impl ElementKind {
    pub fn short_name(&self) -> &'static str {
        match self {
            ElementKind::Group => "grp",
            ElementKind::Key => "key",
            ElementKind::Value => "val",
            ElementKind::Pair => "pair",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Leaf(Token),
    Node {
        kind: ElementKind,
        span: Span,
        children: Vec<Element>,
    },
}

impl Element {
    pub fn leaf(token: Token) -> Self {
        Element::Leaf(token)
    }

    /// Builds a node whose span covers `children`.
    ///
    /// Callers pass at least one child; an empty list yields a zero-length span at offset 0.
    pub fn node(kind: ElementKind, children: Vec<Element>) -> Self {
        let span = covering_span(&children).unwrap_or_default();
        Element::Node {
            kind,
            span,
            children,
        }
    }

    /// A zero-length key positioned at `offset`
    pub fn blank_key(offset: usize) -> Self {
        Element::Node {
            kind: ElementKind::Key,
            span: Span::empty_at(offset),
            children: Vec::new(),
        }
    }

    pub fn pair(key: Element, value: Element) -> Self {
        Element::node(ElementKind::Pair, vec![key, value])
    }

    pub fn span(&self) -> Span {
        match self {
            Element::Leaf(token) => token.span,
            Element::Node { span, .. } => *span,
        }
    }

    /// The wrapped token kind, for leaves only
    pub fn token_kind(&self) -> Option<TokenKind> {
        match self {
            Element::Leaf(token) => Some(token.kind),
            Element::Node { .. } => None,
        }
    }

    /// The node label, for nodes only
    pub fn kind(&self) -> Option<ElementKind> {
        match self {
            Element::Leaf(_) => None,
            Element::Node { kind, .. } => Some(*kind),
        }
    }

    pub fn is_token(&self, kind: TokenKind) -> bool {
        self.token_kind() == Some(kind)
    }

    /// Wildcard-aware token comparison, `TokenKind::Any` on either side matches
    pub fn matches(&self, kind: TokenKind) -> bool {
        self.token_kind().is_some_and(|own| own.matches(kind))
    }

    pub fn is_kind(&self, kind: ElementKind) -> bool {
        self.kind() == Some(kind)
    }

    pub fn is_whitespace(&self) -> bool {
        self.is_token(TokenKind::Whitespace)
    }

    /// Typed leaves and bracket groups can stand alone as anonymous columns
    pub fn is_typed_content(&self) -> bool {
        match self {
            Element::Leaf(token) => token.kind.is_typed_content(),
            Element::Node { kind, .. } => *kind == ElementKind::Group,
        }
    }

    pub fn children(&self) -> &[Element] {
        match self {
            Element::Leaf(_) => &[],
            Element::Node { children, .. } => children,
        }
    }

    /// Mutable access to a node's children. Call [Element::update_span] after editing.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Element>> {
        match self {
            Element::Leaf(_) => None,
            Element::Node { children, .. } => Some(children),
        }
    }

    /// Consumes the element, returning a node's children or the leaf itself
    pub fn into_children(self) -> Vec<Element> {
        match self {
            Element::Leaf(_) => vec![self],
            Element::Node { children, .. } => children,
        }
    }

    /// Replaces a node's children and recomputes its span. Leaves are left untouched.
    pub fn assign_children(&mut self, new_children: Vec<Element>) {
        if let Element::Node { children, .. } = self {
            *children = new_children;
        }
        self.update_span();
    }

    pub fn update_span(&mut self) {
        if let Element::Node { span, children, .. } = self {
            if let Some(covering) = covering_span(children) {
                *span = covering;
            }
        }
    }

    /// The token kind of a scalar value: a `Value` node with exactly one leaf child.
    /// Anything else reports `TokenKind::Invalid`.
    pub fn value_token(&self) -> TokenKind {
        match self {
            Element::Node {
                kind: ElementKind::Value,
                children,
                ..
            } if children.len() == 1 => children[0].token_kind().unwrap_or(TokenKind::Invalid),
            _ => TokenKind::Invalid,
        }
    }

    pub fn pair_key(&self) -> Option<&Element> {
        match self {
            Element::Node {
                kind: ElementKind::Pair,
                children,
                ..
            } => children.first(),
            _ => None,
        }
    }

    pub fn pair_value(&self) -> Option<&Element> {
        match self {
            Element::Node {
                kind: ElementKind::Pair,
                children,
                ..
            } => children.get(1),
            _ => None,
        }
    }

    /// Name shown in the aligned dump
    pub fn short_name(&self) -> &'static str {
        match self {
            Element::Leaf(token) => token.kind.short_name(),
            Element::Node { kind, .. } => kind.short_name(),
        }
    }

    /// Visits this element and all descendants, parents before children
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Element)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }
}

fn covering_span(children: &[Element]) -> Option<Span> {
    match (children.first(), children.last()) {
        (Some(first), Some(last)) => Some(Span::covering(first.span(), last.span())),
        _ => None,
    }
}

/// Removes leading and trailing whitespace leaves
pub fn strip_whitespace(elements: &mut Vec<Element>) {
    let trailing = elements
        .iter()
        .rev()
        .take_while(|element| element.is_whitespace())
        .count();
    elements.truncate(elements.len() - trailing);
    let leading = elements
        .iter()
        .take_while(|element| element.is_whitespace())
        .count();
    elements.drain(..leading);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(kind: TokenKind, begin: usize, end: usize) -> Element {
        Element::leaf(Token::new(kind, Span::new(begin, end)))
    }

    #[test]
    fn test_node_span_covers_children() {
        let node = Element::node(
            ElementKind::Value,
            vec![
                leaf(TokenKind::Word, 2, 5),
                leaf(TokenKind::Whitespace, 5, 6),
                leaf(TokenKind::Number, 6, 8),
            ],
        );
        assert_eq!(node.span(), Span::new(2, 8));
    }

    #[test]
    fn test_assign_children_recomputes_span() {
        let mut node = Element::node(
            ElementKind::Group,
            vec![leaf(TokenKind::Word, 1, 4), leaf(TokenKind::Number, 5, 9)],
        );
        node.assign_children(vec![leaf(TokenKind::Number, 5, 9)]);
        assert_eq!(node.span(), Span::new(5, 9));
    }

    #[test]
    fn test_update_span_after_manual_edit() {
        let mut node = Element::node(
            ElementKind::Group,
            vec![leaf(TokenKind::Word, 1, 4), leaf(TokenKind::Number, 5, 9)],
        );
        if let Some(children) = node.children_mut() {
            children.pop();
        }
        node.update_span();
        assert_eq!(node.span(), Span::new(1, 4));
    }

    #[test]
    fn test_blank_key() {
        let key = Element::blank_key(7);
        assert_eq!(key.span(), Span::empty_at(7));
        assert!(key.is_kind(ElementKind::Key));
        assert!(key.children().is_empty());
    }

    #[test]
    fn test_value_token() {
        let scalar = Element::node(ElementKind::Value, vec![leaf(TokenKind::Number, 0, 2)]);
        assert_eq!(scalar.value_token(), TokenKind::Number);

        let list = Element::node(
            ElementKind::Value,
            vec![leaf(TokenKind::Number, 0, 2), leaf(TokenKind::Number, 3, 4)],
        );
        assert_eq!(list.value_token(), TokenKind::Invalid);

        let key = Element::node(ElementKind::Key, vec![leaf(TokenKind::Word, 0, 2)]);
        assert_eq!(key.value_token(), TokenKind::Invalid);
    }

    #[test]
    fn test_pair_accessors() {
        let key = Element::node(ElementKind::Key, vec![leaf(TokenKind::Word, 0, 1)]);
        let value = Element::node(ElementKind::Value, vec![leaf(TokenKind::Number, 2, 3)]);
        let pair = Element::pair(key.clone(), value.clone());
        assert_eq!(pair.span(), Span::new(0, 3));
        assert_eq!(pair.pair_key(), Some(&key));
        assert_eq!(pair.pair_value(), Some(&value));
        assert_eq!(key.pair_key(), None);
    }

    #[test]
    fn test_clone_is_deep() {
        let original = Element::node(
            ElementKind::Group,
            vec![Element::node(
                ElementKind::Group,
                vec![leaf(TokenKind::Word, 1, 2)],
            )],
        );
        let mut copy = original.clone();
        if let Some(children) = copy.children_mut() {
            children[0].assign_children(vec![leaf(TokenKind::Number, 1, 2)]);
        }
        assert_ne!(original, copy);
        assert!(original.children()[0].children()[0].is_token(TokenKind::Word));
    }

    #[test]
    fn test_strip_whitespace() {
        let mut elements = vec![
            leaf(TokenKind::Whitespace, 0, 1),
            leaf(TokenKind::Word, 1, 3),
            leaf(TokenKind::Whitespace, 3, 4),
            leaf(TokenKind::Word, 4, 6),
            leaf(TokenKind::Whitespace, 6, 7),
            leaf(TokenKind::Whitespace, 7, 8),
        ];
        strip_whitespace(&mut elements);
        assert_eq!(elements.len(), 3);
        assert_eq!(elements[0].span(), Span::new(1, 3));
        assert_eq!(elements[2].span(), Span::new(4, 6));

        let mut only_white = vec![leaf(TokenKind::Whitespace, 0, 1)];
        strip_whitespace(&mut only_white);
        assert!(only_white.is_empty());
    }

    #[test]
    fn test_walk_visits_every_element() {
        let tree = Element::node(
            ElementKind::Group,
            vec![
                leaf(TokenKind::Word, 1, 2),
                Element::node(ElementKind::Group, vec![leaf(TokenKind::Number, 4, 5)]),
            ],
        );
        let mut names = Vec::new();
        tree.walk(&mut |element| names.push(element.short_name()));
        assert_eq!(names, vec!["grp", "word", "grp", "num"]);
    }
}
