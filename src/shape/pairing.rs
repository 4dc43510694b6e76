//! Pairing engine
//!
//!     Turns one grouped element list into key/value pairs. Bracket groups are paired first,
//!     innermost out, and a group that yields pairs has its children replaced by them. Only the
//!     outermost call feeds the schema hasher.
//!
//!     Each level is first planned over element indices without touching the tree, and only
//!     a plan that found pairs is built, moving every element once. A group that pairs
//!     nothing keeps its children as they are.
//!
//! Splitting
//!
//!     The level is scanned left to right and everything up to a [TokenKind::Separator] is
//!     buffered. At each separator the buffer is split into the tail of the previous value and
//!     the key of the next field:
//!         1. The buffer is searched backward, stopping before its first element, for the
//!            format's appender or terminator. The nearest one wins and is dropped; what comes
//!            before it closes the previous value.
//!         2. Without a delimiter, once this level has emitted something, the last
//!            non-whitespace element is taken as the key and the rest extends the previous
//!            value.
//!         3. Otherwise the whole buffer is the key.
//!     After a delimiter split the key is always a single element; anything else between the
//!     delimiter and the key falls back into the value. Values lose their comma leaves, keys
//!     and values both lose surrounding whitespace, and empty ones are not emitted.
//!
//! Merging
//!
//!     Emitted items are merged pairwise: a key directly followed by a value becomes a pair,
//!     a value without a key goes to the free row and a key without a value is dropped.
//!
//! Fallbacks
//!
//!     At the top level a single pair whose value holds more than one element is treated as a
//!     false positive: the key node and the value's elements lead the free row and the schema
//!     is discarded.
//!     When a level ends up with no pairs at all, every typed element of its free row becomes
//!     an anonymous column behind a blank key. The other leftovers feed the schema hash.

use crate::shape::element::{Element, ElementKind};
use crate::shape::format::FormatDescriptor;
use crate::shape::scanner::TokenKind;
use crate::shape::schema::SchemaHasher;
use crate::shape::span::{InputLine, Span};
use tracing::{debug, trace};

/// Pairs found on one level plus the elements nothing claimed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pairing {
    pub pairs: Vec<Element>,
    pub free_row: Vec<Element>,
}

/// Pairs up a grouped top-level element list.
///
/// Passing a hasher marks this as the outermost call: key text is fed to it in pair order and
/// the single-pair collapse rule is applied.
pub fn pair_up(
    input: InputLine<'_>,
    format: FormatDescriptor,
    mut elements: Vec<Element>,
    hasher: Option<&mut SchemaHasher>,
) -> Pairing {
    let pairer = Pairer { input, format };
    pairer.rewrite_groups(&mut elements);
    pairer.plan_level(&elements, hasher).build(elements)
}

struct Pairer<'a> {
    input: InputLine<'a>,
    format: FormatDescriptor,
}

/// A run of element indices that becomes one `Key` or `Value` node
struct Piece {
    kind: ElementKind,
    members: Vec<usize>,
}

impl Piece {
    fn span(&self, elements: &[Element]) -> Span {
        match (self.members.first(), self.members.last()) {
            (Some(&first), Some(&last)) => {
                Span::covering(elements[first].span(), elements[last].span())
            }
            _ => Span::default(),
        }
    }

    fn build(self, slots: &mut [Option<Element>]) -> Element {
        let children = self
            .members
            .into_iter()
            .filter_map(|index| slots.get_mut(index).and_then(Option::take))
            .collect();
        Element::node(self.kind, children)
    }
}

enum FreeItem {
    Element(usize),
    Piece(Piece),
}

impl FreeItem {
    fn span(&self, elements: &[Element]) -> Span {
        match self {
            FreeItem::Element(index) => elements[*index].span(),
            FreeItem::Piece(piece) => piece.span(elements),
        }
    }

    fn is_whitespace(&self, elements: &[Element]) -> bool {
        matches!(self, FreeItem::Element(index) if elements[*index].is_whitespace())
    }

    fn build(self, slots: &mut [Option<Element>]) -> Option<Element> {
        match self {
            FreeItem::Element(index) => slots.get_mut(index).and_then(Option::take),
            FreeItem::Piece(piece) => Some(piece.build(slots)),
        }
    }
}

enum PlannedPair {
    Field { key: Piece, value: Piece },
    Anonymous(usize),
}

/// The outcome of pairing one level, as indices into that level's elements.
///
/// Planning only reads the elements. [LevelPlan::build] then moves each element into its
/// place exactly once.
struct LevelPlan {
    pairs: Vec<PlannedPair>,
    free_row: Vec<FreeItem>,
}

impl LevelPlan {
    fn build(self, elements: Vec<Element>) -> Pairing {
        let mut slots: Vec<Option<Element>> = elements.into_iter().map(Some).collect();
        let pairs = self
            .pairs
            .into_iter()
            .filter_map(|pair| match pair {
                PlannedPair::Field { key, value } => {
                    Some(Element::pair(key.build(&mut slots), value.build(&mut slots)))
                }
                PlannedPair::Anonymous(index) => {
                    let element = slots.get_mut(index).and_then(Option::take)?;
                    Some(Element::pair(Element::blank_key(element.span().begin), element))
                }
            })
            .collect();
        let free_row = self
            .free_row
            .into_iter()
            .filter_map(|item| item.build(&mut slots))
            .collect();
        Pairing { pairs, free_row }
    }
}

impl Pairer<'_> {
    /// Pairs every group below `elements`, innermost first
    fn rewrite_groups(&self, elements: &mut [Element]) {
        for element in elements.iter_mut() {
            if !element.is_kind(ElementKind::Group) {
                continue;
            }
            if let Some(children) = element.children_mut() {
                self.rewrite_groups(children);
            }
            element.update_span();

            let plan = self.plan_level(element.children(), None);
            if plan.pairs.is_empty() {
                continue;
            }
            trace!(span = %element.span(), pairs = plan.pairs.len(), "paired group");
            let children = element
                .children_mut()
                .map(std::mem::take)
                .unwrap_or_default();
            element.assign_children(plan.build(children).pairs);
        }
    }

    fn plan_level(&self, elements: &[Element], mut hasher: Option<&mut SchemaHasher>) -> LevelPlan {
        let mut emitted = Vec::new();
        let mut key_comps = Vec::new();

        for (index, element) in elements.iter().enumerate() {
            if element.is_token(TokenKind::Separator) {
                self.split_segment(elements, std::mem::take(&mut key_comps), &mut emitted);
            } else {
                key_comps.push(index);
            }
        }

        let mut free_row: Vec<FreeItem> = if emitted.is_empty() {
            key_comps.into_iter().map(FreeItem::Element).collect()
        } else {
            push_value(elements, &mut emitted, key_comps);
            Vec::new()
        };

        let mut pairs = Vec::new();
        let mut items = emitted.into_iter().peekable();
        while let Some(item) = items.next() {
            if item.kind == ElementKind::Value {
                free_row.push(FreeItem::Piece(item));
                continue;
            }
            match items.next_if(|next| next.kind == ElementKind::Value) {
                Some(value) => {
                    if let Some(hasher) = hasher.as_deref_mut() {
                        hasher.update(self.input.bytes(item.span(elements)));
                    }
                    pairs.push(PlannedPair::Field { key: item, value });
                }
                None => trace!(key = %self.input.substring(item.span(elements)), "key without value"),
            }
        }

        if let Some(hasher) = hasher.as_deref_mut() {
            let holds_value_list = matches!(
                pairs.as_slice(),
                [PlannedPair::Field { value, .. }] if value.members.len() > 1
            );
            if holds_value_list {
                if let Some(PlannedPair::Field { key, value }) = pairs.pop() {
                    debug!(
                        span = %Span::covering(key.span(elements), value.span(elements)),
                        "collapsing single pair into free row"
                    );
                    let mut collapsed = vec![FreeItem::Piece(key)];
                    collapsed.extend(value.members.into_iter().map(FreeItem::Element));
                    collapsed.append(&mut free_row);
                    free_row = collapsed;
                    hasher.invalidate();
                }
            }
        }

        if pairs.is_empty() {
            let mut leftovers = Vec::with_capacity(free_row.len());
            for item in free_row {
                if let FreeItem::Element(index) = item {
                    if elements[index].is_typed_content() {
                        pairs.push(PlannedPair::Anonymous(index));
                        continue;
                    }
                }
                if !item.is_whitespace(elements) {
                    if let Some(hasher) = hasher.as_deref_mut() {
                        hasher.update(self.input.bytes(item.span(elements)));
                    }
                }
                leftovers.push(item);
            }
            free_row = leftovers;
        }

        LevelPlan { pairs, free_row }
    }

    /// Splits the buffer in front of one separator into a value tail and the next key
    fn split_segment(&self, elements: &[Element], mut comps: Vec<usize>, emitted: &mut Vec<Piece>) {
        let delimiter = (1..comps.len()).rev().find(|&at| {
            elements[comps[at]]
                .token_kind()
                .is_some_and(|kind| self.format.is_appender(kind) || self.format.is_terminator(kind))
        });

        let (value, mut key) = match delimiter {
            Some(at) => {
                let mut rest = comps.split_off(at + 1);
                comps.truncate(at);
                strip_whitespace(elements, &mut rest);
                let key = rest.pop();
                comps.append(&mut rest);
                (comps, key.into_iter().collect::<Vec<_>>())
            }
            None if !emitted.is_empty() && !comps.is_empty() => {
                while comps.last().is_some_and(|&index| elements[index].is_whitespace()) {
                    comps.pop();
                }
                let key = comps.pop();
                (comps, key.into_iter().collect())
            }
            None => (Vec::new(), comps),
        };

        trace!(
            delimiter = ?delimiter,
            key = ?key.iter().map(|&index| self.input.substring(elements[index].span())).collect::<Vec<_>>(),
            "split segment"
        );

        push_value(elements, emitted, value);
        strip_whitespace(elements, &mut key);
        if !key.is_empty() {
            emitted.push(Piece {
                kind: ElementKind::Key,
                members: key,
            });
        }
    }
}

/// Drops whitespace indices from both ends of a run
fn strip_whitespace(elements: &[Element], run: &mut Vec<usize>) {
    while run.last().is_some_and(|&index| elements[index].is_whitespace()) {
        run.pop();
    }
    let leading = run
        .iter()
        .take_while(|&&index| elements[index].is_whitespace())
        .count();
    run.drain(..leading);
}

fn push_value(elements: &[Element], emitted: &mut Vec<Piece>, mut value: Vec<usize>) {
    strip_whitespace(elements, &mut value);
    value.retain(|&index| !elements[index].is_token(TokenKind::Comma));
    if !value.is_empty() {
        emitted.push(Piece {
            kind: ElementKind::Value,
            members: value,
        });
    }
}
