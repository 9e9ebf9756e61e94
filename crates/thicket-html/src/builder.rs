use strum_macros::Display;

use thicket_common::warning::Warnings;
use thicket_dom::{DomTree, ElementData, NodeId, NodeType};

use crate::attributes::read_attributes;
use crate::doctype::resolve_document;
use crate::entities::{EntityDecoder, HtmlEntities};
use crate::names::{is_void_element, sanitize_element_name};
use crate::token::{Token, TokenKind};

/// The kind of silent recovery a [`ParseIssue`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum IssueKind {
    /// The doctype declaration could not be parsed and was ignored.
    DoctypeIgnored,
    /// A close tag matched no open element and was ignored.
    OrphanCloseTag,
    /// Open elements were closed implicitly by a close tag for an ancestor.
    ImplicitClose,
    /// An attribute was left out of the tree.
    AttributeDropped,
}

/// A recoverable irregularity met while building the tree.
///
/// Issues are informational: the tree has already been repaired when one
/// is recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// What kind of recovery took place.
    pub kind: IssueKind,
    /// Human readable description.
    pub message: String,
    /// Index into the token stream of the token that caused it.
    pub token_index: usize,
}

/// Builds a document tree from a tag-soup token stream.
///
/// A builder is single use: construct it over one token slice, then call
/// [`TreeBuilder::run`] or [`TreeBuilder::run_with_issues`].
pub struct TreeBuilder<'a> {
    /// Input tokens from the tokenizer.
    tokens: &'a [Token],

    /// Current position in token stream.
    position: usize,

    /// Currently open elements, innermost last. Entries only mark elements
    /// as insertion point candidates; the tree owns the nodes.
    stack_of_open_elements: Vec<NodeId>,

    /// Tree under construction. `NodeId::ROOT` is the `html` element.
    tree: DomTree,

    /// Decoder for attribute values.
    decoder: Box<dyn EntityDecoder + 'a>,

    /// Recoveries made so far.
    issues: Vec<ParseIssue>,

    /// Log deduplication for this build only.
    warnings: Warnings,
}

impl<'a> TreeBuilder<'a> {
    /// Create a builder over `tokens` using the default [`HtmlEntities`] decoder.
    ///
    /// The doctype is resolved immediately, so the tree starts with its root
    /// (and doctype, if one was accepted) before any token is assembled.
    #[must_use]
    pub fn new(tokens: &'a [Token]) -> Self {
        let mut warnings = Warnings::new();
        let (tree, rejection) = resolve_document(tokens, &mut warnings);
        let issues = rejection
            .map(|r| ParseIssue {
                kind: IssueKind::DoctypeIgnored,
                message: format!("doctype ignored: {}", r.error),
                token_index: r.token_index,
            })
            .into_iter()
            .collect();
        Self {
            tokens,
            position: 0,
            stack_of_open_elements: Vec::new(),
            tree,
            decoder: Box::new(HtmlEntities),
            issues,
            warnings,
        }
    }

    /// Use `decoder` for attribute values instead of [`HtmlEntities`].
    #[must_use]
    pub fn with_decoder(mut self, decoder: impl EntityDecoder + 'a) -> Self {
        self.decoder = Box::new(decoder);
        self
    }

    /// Build the tree, discarding any recorded issues.
    #[must_use]
    pub fn run(self) -> DomTree {
        self.run_with_issues().0
    }

    /// Build the tree and return it together with every recovery made.
    #[must_use]
    pub fn run_with_issues(mut self) -> (DomTree, Vec<ParseIssue>) {
        let tokens = self.tokens;
        while let Some(token) = tokens.get(self.position) {
            let token_index = self.position;
            self.position += 1;
            self.process_token(token, token_index);
        }
        if !self.stack_of_open_elements.is_empty() {
            log::trace!(
                "{} element(s) left open at end of input",
                self.stack_of_open_elements.len()
            );
        }
        (self.tree, self.issues)
    }

    /// The insertion point: the innermost open element, or the root.
    fn current_node(&self) -> NodeId {
        self.stack_of_open_elements
            .last()
            .copied()
            .unwrap_or(NodeId::ROOT)
    }

    fn current_tag_name(&self) -> &str {
        self.tree
            .as_element(self.current_node())
            .map_or("", |e| e.tag_name.as_str())
    }

    fn process_token(&mut self, token: &Token, token_index: usize) {
        match token.kind {
            TokenKind::Element => self.open_element(token),
            TokenKind::CloseElement => self.close_element(token, token_index),
            TokenKind::Comment => self.insert_leaf(NodeType::Comment(token.primary.clone())),
            TokenKind::Cdata => self.insert_leaf(NodeType::Cdata(token.primary.clone())),
            TokenKind::Text => {
                // Textarea content is not markup: keep it exactly as written.
                let data = if self.current_tag_name().eq_ignore_ascii_case("textarea") {
                    token.raw.clone()
                } else {
                    token.primary.clone()
                };
                self.insert_leaf(NodeType::Text(data));
            }
            // Doctypes were handled up front. Attributes outside an element's
            // run have no element to attach to.
            TokenKind::DocTypeDeclaration | TokenKind::Attribute => {}
        }
    }

    fn insert_leaf(&mut self, node_type: NodeType) {
        let parent = self.current_node();
        let _ = self.tree.create_child(parent, node_type);
    }

    fn open_element(&mut self, token: &Token) {
        let name = sanitize_element_name(&token.primary);

        // Repeated or implicit <html> tags merge into the existing insertion point.
        let target = if name == "html" {
            self.current_node()
        } else {
            let parent = self.current_node();
            self.tree
                .create_child(parent, NodeType::Element(ElementData::new(name.as_str())))
        };

        let run = read_attributes(
            &mut self.tree,
            target,
            self.tokens,
            self.position,
            self.decoder.as_ref(),
        );
        self.position = run.next;
        for dropped in run.dropped {
            self.issues.push(ParseIssue {
                kind: IssueKind::AttributeDropped,
                message: format!("<{name}> attribute `{}` dropped: {}", dropped.name, dropped.reason),
                token_index: dropped.token_index,
            });
        }

        if !is_void_element(&name) {
            self.stack_of_open_elements.push(target);
        }
    }

    fn close_element(&mut self, token: &Token, token_index: usize) {
        let name = sanitize_element_name(&token.primary);

        let matched = self
            .stack_of_open_elements
            .iter()
            .rposition(|&id| self.tree.as_element(id).is_some_and(|e| e.tag_name == name));

        let Some(index) = matched else {
            let _ = self
                .warnings
                .warn_once("Tree", &format!("ignoring </{name}> with no matching open element"));
            self.issues.push(ParseIssue {
                kind: IssueKind::OrphanCloseTag,
                message: format!("</{name}> has no matching open element"),
                token_index,
            });
            return;
        };

        let implicitly_closed = self.stack_of_open_elements.len() - index - 1;
        if implicitly_closed > 0 {
            let names: Vec<&str> = self.stack_of_open_elements[index + 1..]
                .iter()
                .rev()
                .filter_map(|&id| self.tree.as_element(id).map(|e| e.tag_name.as_str()))
                .collect();
            self.issues.push(ParseIssue {
                kind: IssueKind::ImplicitClose,
                message: format!("</{name}> implicitly closed {}", names.join(", ")),
                token_index,
            });
        }
        self.stack_of_open_elements.truncate(index);
    }
}

/// Build a tree from `tokens` with the default entity decoder.
#[must_use]
pub fn build_tree(tokens: &[Token]) -> DomTree {
    TreeBuilder::new(tokens).run()
}
