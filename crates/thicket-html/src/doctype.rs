//! Document type declaration handling.
//!
//! The first `DocTypeDeclaration` token's raw text is parsed with the XML
//! `doctypedecl` grammar:
//!
//! ```text
//! '<!DOCTYPE' S Name (S ExternalID)? S? ('[' intSubset ']' S?)? '>'
//! ExternalID ::= 'SYSTEM' S SystemLiteral | 'PUBLIC' S PubidLiteral S SystemLiteral
//! ```
//!
//! A declaration that does not parse is dropped and the document gets a
//! bare `html` root. An accepted internal subset is never kept on the tree.

use thicket_common::warning::Warnings;
use thicket_dom::{DocumentType, DomTree};
use thiserror::Error;

use crate::token::{Token, TokenKind};

/// Why a doctype declaration was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DoctypeError {
    /// The text does not begin with `<!DOCTYPE`.
    #[error("declaration does not start with `<!DOCTYPE`")]
    MissingKeyword,
    /// Whitespace was required but something else was found.
    #[error("expected whitespace at byte {0}")]
    ExpectedWhitespace(usize),
    /// The root element name is not an XML name.
    #[error("invalid name at byte {0}")]
    InvalidName(usize),
    /// A quoted literal was required.
    #[error("expected a quoted literal at byte {0}")]
    ExpectedLiteral(usize),
    /// A quoted literal has no closing quote.
    #[error("unterminated literal starting at byte {0}")]
    UnterminatedLiteral(usize),
    /// The public identifier contains a character XML does not allow there.
    #[error("character {0:?} is not allowed in a public identifier")]
    InvalidPublicIdChar(char),
    /// The internal subset contains something other than markup declarations.
    #[error("unsupported internal subset content at byte {0}")]
    UnsupportedSubset(usize),
    /// The internal subset is never closed with `]`.
    #[error("unterminated internal subset")]
    UnterminatedSubset,
    /// Extra content where `>` or the end of the declaration was expected.
    #[error("unexpected {found:?} at byte {at}")]
    UnexpectedContent {
        /// Byte offset into the trimmed declaration.
        at: usize,
        /// The offending character.
        found: char,
    },
    /// The declaration ends before `>`.
    #[error("unexpected end of declaration")]
    UnexpectedEnd,
}

/// A rejected doctype, reported back to the builder as an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctypeRejection {
    /// Index of the rejected token in the token stream.
    pub token_index: usize,
    /// Why it was rejected.
    pub error: DoctypeError,
}

/// Create the output tree from the first doctype token in `tokens`, if any.
///
/// Never fails: a declaration that cannot be parsed is discarded, reported
/// through `warnings`, and the tree starts with no doctype. The internal
/// subset of an accepted declaration is removed.
#[must_use]
pub fn resolve_document(
    tokens: &[Token],
    warnings: &mut Warnings,
) -> (DomTree, Option<DoctypeRejection>) {
    let Some((token_index, token)) = tokens
        .iter()
        .enumerate()
        .find(|(_, t)| t.kind == TokenKind::DocTypeDeclaration)
    else {
        return (DomTree::new(), None);
    };

    match parse_doctype(&token.raw) {
        Ok(Some(mut doctype)) => {
            if doctype.internal_subset.take().is_some() {
                log::debug!("stripped internal subset from <!DOCTYPE {}>", doctype.name);
            }
            (DomTree::with_doctype(doctype), None)
        }
        Ok(None) => (DomTree::new(), None),
        Err(error) => {
            let _ = warnings.warn_once("Doctype", &format!("ignoring declaration: {error}"));
            (DomTree::new(), Some(DoctypeRejection { token_index, error }))
        }
    }
}

/// Parse a raw doctype declaration.
///
/// Blank input means there is no declaration and yields `Ok(None)`.
///
/// # Errors
///
/// Returns a [`DoctypeError`] describing the first violation of the
/// declaration grammar.
pub fn parse_doctype(raw: &str) -> Result<Option<DocumentType>, DoctypeError> {
    let text = raw.trim_matches(is_xml_space);
    if text.is_empty() {
        return Ok(None);
    }
    DoctypeParser { input: text, pos: 0 }.parse().map(Some)
}

const fn is_xml_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == ':'
}

fn is_name_char(c: char) -> bool {
    is_name_start(c) || c.is_numeric() || c == '-' || c == '.' || c == '\u{00B7}'
}

fn is_pubid_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || " \r\n-'()+,./:=?;!*#@$_%".contains(c)
}

struct DoctypeParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> DoctypeParser<'a> {
    fn parse(mut self) -> Result<DocumentType, DoctypeError> {
        if !self.eat("<!DOCTYPE") {
            return Err(DoctypeError::MissingKeyword);
        }
        self.require_space()?;
        let name = self.name()?.to_string();
        let mut doctype = DocumentType {
            name,
            public_id: None,
            system_id: None,
            internal_subset: None,
        };

        if self.skip_space() {
            if self.eat("SYSTEM") {
                self.require_space()?;
                doctype.system_id = Some(self.literal()?.to_string());
                let _ = self.skip_space();
            } else if self.eat("PUBLIC") {
                self.require_space()?;
                let public = self.literal()?;
                if let Some(bad) = public.chars().find(|&c| !is_pubid_char(c)) {
                    return Err(DoctypeError::InvalidPublicIdChar(bad));
                }
                doctype.public_id = Some(public.to_string());
                self.require_space()?;
                doctype.system_id = Some(self.literal()?.to_string());
                let _ = self.skip_space();
            }
        }

        if self.eat("[") {
            doctype.internal_subset = Some(self.internal_subset()?.to_string());
            let _ = self.skip_space();
        }

        if !self.eat(">") {
            return Err(self.unexpected());
        }
        if self.pos < self.input.len() {
            return Err(self.unexpected());
        }
        Ok(doctype)
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn eat(&mut self, expected: &str) -> bool {
        if self.rest().starts_with(expected) {
            self.pos += expected.len();
            true
        } else {
            false
        }
    }

    fn unexpected(&self) -> DoctypeError {
        self.peek().map_or(DoctypeError::UnexpectedEnd, |found| {
            DoctypeError::UnexpectedContent {
                at: self.pos,
                found,
            }
        })
    }

    /// Skip whitespace, returning whether any was present.
    fn skip_space(&mut self) -> bool {
        let start = self.pos;
        let skipped = self.rest().len() - self.rest().trim_start_matches(is_xml_space).len();
        self.pos += skipped;
        self.pos > start
    }

    fn require_space(&mut self) -> Result<(), DoctypeError> {
        if self.skip_space() {
            Ok(())
        } else {
            Err(DoctypeError::ExpectedWhitespace(self.pos))
        }
    }

    fn name(&mut self) -> Result<&'a str, DoctypeError> {
        let rest = self.rest();
        if !rest.starts_with(is_name_start) {
            return Err(DoctypeError::InvalidName(self.pos));
        }
        let len = rest.find(|c| !is_name_char(c)).unwrap_or(rest.len());
        self.pos += len;
        Ok(&rest[..len])
    }

    fn literal(&mut self) -> Result<&'a str, DoctypeError> {
        let start = self.pos;
        let quote = match self.peek() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(DoctypeError::ExpectedLiteral(start)),
        };
        let body = &self.rest()[1..];
        let len = body
            .find(quote)
            .ok_or(DoctypeError::UnterminatedLiteral(start))?;
        self.pos += len + 2;
        Ok(&body[..len])
    }

    /// Consume the internal subset through its closing `]`, returning its content.
    fn internal_subset(&mut self) -> Result<&'a str, DoctypeError> {
        let start = self.pos;
        loop {
            let _ = self.skip_space();
            let rest = self.rest();
            if rest.is_empty() {
                return Err(DoctypeError::UnterminatedSubset);
            }
            if rest.starts_with(']') {
                let content = &self.input[start..self.pos];
                self.pos += 1;
                return Ok(content);
            }
            if rest.starts_with('%') {
                self.pos += 1;
                let _ = self.name()?;
                if !self.eat(";") {
                    return Err(DoctypeError::UnsupportedSubset(self.pos));
                }
            } else if rest.starts_with("<!--") {
                self.skip_past("-->")?;
            } else if rest.starts_with("<?") {
                self.skip_past("?>")?;
            } else if ["<!ELEMENT", "<!ATTLIST", "<!ENTITY", "<!NOTATION"]
                .iter()
                .any(|keyword| rest.starts_with(*keyword))
            {
                self.markup_declaration()?;
            } else {
                return Err(DoctypeError::UnsupportedSubset(self.pos));
            }
        }
    }

    fn skip_past(&mut self, terminator: &str) -> Result<(), DoctypeError> {
        let end = self
            .rest()
            .find(terminator)
            .ok_or(DoctypeError::UnterminatedSubset)?;
        self.pos += end + terminator.len();
        Ok(())
    }

    /// Consume a `<!KEYWORD ...>` declaration, honouring quoted literals.
    fn markup_declaration(&mut self) -> Result<(), DoctypeError> {
        let mut quote: Option<char> = None;
        for (offset, c) in self.rest().char_indices() {
            match (quote, c) {
                (Some(q), c) if c == q => quote = None,
                (None, '"' | '\'') => quote = Some(c),
                (None, '>') => {
                    self.pos += offset + 1;
                    return Ok(());
                }
                _ => {}
            }
        }
        Err(DoctypeError::UnterminatedSubset)
    }
}
