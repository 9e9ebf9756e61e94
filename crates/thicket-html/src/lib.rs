//! Tag-soup tree construction for thicket.
//!
//! # Scope
//!
//! This crate turns a pre-lexed HTML token stream into a [`DomTree`]
//! rooted at a single `html` element, repairing malformed markup instead of
//! rejecting it:
//! - **Doctype resolution** - the first doctype token is parsed; a bad one
//!   is dropped and an internal subset is stripped
//! - **Tree assembly** - a stack of open elements with close-tag recovery,
//!   void elements, `html` tag merging and literal textarea text
//! - **Attribute resolution** - plain, `xml:` and `xmlns:`-declared
//!   namespaced attributes, validated and otherwise silently dropped
//!
//! # Not Implemented
//!
//! - Tokenization (the caller supplies [`Token`]s)
//! - HTML5 insertion modes, foster parenting, adoption agency
//! - Serialization
//!
//! [`DomTree`]: thicket_dom::DomTree

/// Attribute run classification and resolution.
pub mod attributes;
/// Tree assembly from the token stream.
pub mod builder;
/// Document type declaration parsing.
pub mod doctype;
/// Pluggable entity decoding.
pub mod entities;
/// Element and attribute name rules.
pub mod names;
/// Token types consumed by the builder.
pub mod token;

pub use attributes::{AttributeDecision, DropReason};
pub use builder::{IssueKind, ParseIssue, TreeBuilder, build_tree};
pub use doctype::DoctypeError;
pub use entities::{EntityDecoder, HtmlEntities, PassThrough};
pub use token::{Token, TokenKind};
