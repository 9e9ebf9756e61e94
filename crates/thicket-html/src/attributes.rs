//! Attribute resolution for a freshly opened element.
//!
//! Attribute tokens follow their element token as one contiguous run. Each
//! is classified against the attributes already committed to the target
//! element, which makes namespace declarations order sensitive: a prefixed
//! attribute is only kept if `xmlns:prefix` appeared earlier in the same run.

use core::fmt;

use thicket_dom::{AttrName, DomTree, ElementData, NodeId, XML_NAMESPACE};

use crate::entities::EntityDecoder;
use crate::names::is_valid_attribute_name;
use crate::token::{Token, TokenKind};

/// Why an attribute was left out of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// The name has more than one colon.
    TooManyColons,
    /// The prefix or local part around the colon is empty.
    EmptyNamePart,
    /// The prefix was not declared earlier on the same element.
    UndeclaredPrefix(String),
    /// An un-prefixed name that is not a valid attribute name.
    InvalidName,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyColons => f.write_str("more than one colon in name"),
            Self::EmptyNamePart => f.write_str("empty prefix or local name"),
            Self::UndeclaredPrefix(prefix) => {
                write!(f, "prefix `{prefix}` is not declared earlier on this element")
            }
            Self::InvalidName => f.write_str("invalid attribute name"),
        }
    }
}

/// What to do with one attribute token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeDecision {
    /// Set `name` to `value` on the element.
    Set {
        /// The resolved attribute name.
        name: AttrName,
        /// The value to store.
        value: String,
    },
    /// Leave the attribute out.
    Drop(DropReason),
}

/// An attribute token that did not make it into the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedAttribute {
    /// Index of the attribute token in the token stream.
    pub token_index: usize,
    /// The lowercased attribute name.
    pub name: String,
    /// Why it was dropped.
    pub reason: DropReason,
}

/// The outcome of consuming one attribute run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeRun {
    /// Index of the first token after the run.
    pub next: usize,
    /// Attributes that were dropped, in token order.
    pub dropped: Vec<DroppedAttribute>,
}

/// Decide what `token` contributes to `element`, given the attributes
/// already set on it.
#[must_use]
pub fn classify_attribute<D: EntityDecoder + ?Sized>(
    element: &ElementData,
    token: &Token,
    decoder: &D,
) -> AttributeDecision {
    let name = token.primary.to_lowercase();

    let Some((prefix, local)) = name.split_once(':') else {
        if !is_valid_attribute_name(&name) {
            return AttributeDecision::Drop(DropReason::InvalidName);
        }
        return AttributeDecision::Set {
            value: decoder.decode(token.value()),
            name: AttrName::new(name),
        };
    };

    if local.contains(':') {
        return AttributeDecision::Drop(DropReason::TooManyColons);
    }
    let (prefix, local) = (prefix.trim(), local.trim());
    if prefix.is_empty() || local.is_empty() {
        return AttributeDecision::Drop(DropReason::EmptyNamePart);
    }

    match prefix {
        "xmlns" => AttributeDecision::Set {
            name: AttrName::namespace_declaration(local),
            value: token.value().to_string(),
        },
        "xml" => AttributeDecision::Set {
            name: AttrName::namespaced(XML_NAMESPACE, local),
            value: token.value().to_string(),
        },
        _ => match element.lookup_namespace(prefix) {
            // A prefix bound to the empty URI names no namespace.
            Some("") => AttributeDecision::Set {
                name: AttrName::new(local),
                value: decoder.decode(token.value()),
            },
            Some(uri) => AttributeDecision::Set {
                name: AttrName::namespaced(uri, local),
                value: decoder.decode(token.value()),
            },
            None => AttributeDecision::Drop(DropReason::UndeclaredPrefix(prefix.to_string())),
        },
    }
}

/// Consume the attribute tokens starting at `start` and apply them to `target`.
///
/// Stops at the first token that is not an attribute and returns its index.
/// Dropped attributes are reported, never raised.
pub fn read_attributes<D: EntityDecoder + ?Sized>(
    tree: &mut DomTree,
    target: NodeId,
    tokens: &[Token],
    start: usize,
    decoder: &D,
) -> AttributeRun {
    let mut run = AttributeRun {
        next: start,
        dropped: Vec::new(),
    };

    while let Some(token) = tokens
        .get(run.next)
        .filter(|t| t.kind == TokenKind::Attribute)
    {
        let token_index = run.next;
        run.next += 1;

        let Some(element) = tree.as_element_mut(target) else {
            continue;
        };
        match classify_attribute(element, token, decoder) {
            AttributeDecision::Set { name, value } => element.set_attribute(name, value),
            AttributeDecision::Drop(reason) => {
                log::trace!(
                    "dropping attribute {:?} on <{}>: {reason}",
                    token.primary,
                    element.tag_name
                );
                run.dropped.push(DroppedAttribute {
                    token_index,
                    name: token.primary.to_lowercase(),
                    reason,
                });
            }
        }
    }

    run
}
