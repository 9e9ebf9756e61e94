use core::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// The lexical category of a [`Token`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize,
)]
pub enum TokenKind {
    /// A `<!DOCTYPE ...>` declaration. Only the first one is consulted.
    DocTypeDeclaration,
    /// An element open tag; its attributes follow as a run of
    /// [`TokenKind::Attribute`] tokens.
    Element,
    /// An element close tag.
    CloseElement,
    /// One attribute of the immediately preceding element.
    Attribute,
    /// A comment.
    Comment,
    /// A CDATA section.
    Cdata,
    /// Character data.
    Text,
}

/// One lexical unit produced by the tokenizer.
///
/// `primary` carries the decoded payload (tag name, attribute name, decoded
/// text). `secondary` is only meaningful on attribute tokens, where it holds
/// the attribute value. `raw` is the verbatim source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// What kind of token this is.
    pub kind: TokenKind,
    /// Decoded payload: tag name, attribute name, comment or text data.
    pub primary: String,
    /// Attribute value, absent for valueless attributes and other kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
    /// Undecoded source text.
    #[serde(default)]
    pub raw: String,
}

impl Token {
    /// Create a token with no secondary payload.
    #[must_use]
    pub fn new(kind: TokenKind, primary: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            kind,
            primary: primary.into(),
            secondary: None,
            raw: raw.into(),
        }
    }

    /// A doctype declaration whose raw text is `raw`.
    #[must_use]
    pub fn doctype(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self::new(TokenKind::DocTypeDeclaration, raw.clone(), raw)
    }

    /// An element open tag.
    #[must_use]
    pub fn element(name: impl Into<String>) -> Self {
        let name = name.into();
        let raw = format!("<{name}>");
        Self::new(TokenKind::Element, name, raw)
    }

    /// An element close tag.
    #[must_use]
    pub fn close(name: impl Into<String>) -> Self {
        let name = name.into();
        let raw = format!("</{name}>");
        Self::new(TokenKind::CloseElement, name, raw)
    }

    /// An attribute with a value.
    #[must_use]
    pub fn attribute(name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut token = Self::flag(name);
        token.secondary = Some(value.into());
        token
    }

    /// An attribute written without a value, such as `disabled`.
    #[must_use]
    pub fn flag(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(TokenKind::Attribute, name.clone(), name)
    }

    /// A comment.
    #[must_use]
    pub fn comment(data: impl Into<String>) -> Self {
        let data = data.into();
        let raw = format!("<!--{data}-->");
        Self::new(TokenKind::Comment, data, raw)
    }

    /// A CDATA section.
    #[must_use]
    pub fn cdata(data: impl Into<String>) -> Self {
        let data = data.into();
        let raw = format!("<![CDATA[{data}]]>");
        Self::new(TokenKind::Cdata, data, raw)
    }

    /// Character data: `decoded` is the entity-decoded text, `raw` the source.
    #[must_use]
    pub fn text(decoded: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::new(TokenKind::Text, decoded, raw)
    }

    /// The attribute value: `secondary`, falling back to `primary`.
    #[must_use]
    pub fn value(&self) -> &str {
        self.secondary.as_deref().unwrap_or(&self.primary)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Attribute => match &self.secondary {
                Some(value) => write!(f, "Attribute({}=\"{value}\")", self.primary),
                None => write!(f, "Attribute({})", self.primary),
            },
            kind => write!(f, "{kind}({:?})", self.primary),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_value_falls_back_to_primary() {
        assert_eq!(Token::attribute("href", "/a").value(), "/a");
        assert_eq!(Token::flag("disabled").value(), "disabled");
    }

    #[test]
    fn test_deserialize_with_missing_fields() {
        let json = r#"[
            {"kind": "Element", "primary": "div"},
            {"kind": "Attribute", "primary": "id", "secondary": "main"},
            {"kind": "Text", "primary": "&", "raw": "&amp;"}
        ]"#;
        let tokens: Vec<Token> = serde_json::from_str(json).expect("valid token json");

        assert_eq!(tokens[0].kind, TokenKind::Element);
        assert_eq!(tokens[0].raw, "");
        assert_eq!(tokens[1].secondary.as_deref(), Some("main"));
        assert_eq!(tokens[2].raw, "&amp;");
    }

    #[test]
    fn test_display() {
        assert_eq!(Token::element("div").to_string(), "Element(\"div\")");
        assert_eq!(Token::attribute("a", "b").to_string(), "Attribute(a=\"b\")");
    }

    #[test]
    fn test_kind_names_match_wire_names() {
        for kind in TokenKind::iter() {
            let wire = serde_json::to_string(&kind).expect("kind serializes");
            assert_eq!(wire, format!("\"{kind}\""));
        }
    }
}
