//! Entity decoding.
//!
//! The tree builder does not decode markup escapes itself: it calls an
//! injected [`EntityDecoder`] for attribute values. Any `Fn(&str) -> String`
//! is a decoder. [`HtmlEntities`] is the default, covering numeric references
//! and the commonly used named references.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Turns markup-escaped text into literal text.
///
/// Implementations must be total: every input produces some output.
pub trait EntityDecoder {
    /// Decode `input`, leaving anything unrecognized as it is.
    fn decode(&self, input: &str) -> String;
}

impl<F> EntityDecoder for F
where
    F: Fn(&str) -> String,
{
    fn decode(&self, input: &str) -> String {
        self(input)
    }
}

/// A decoder that returns its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl EntityDecoder for PassThrough {
    fn decode(&self, input: &str) -> String {
        input.to_string()
    }
}

/// Decodes `&name;`, `&#NNN;` and `&#xHH;` references.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlEntities;

impl EntityDecoder for HtmlEntities {
    fn decode(&self, input: &str) -> String {
        decode_html(input)
    }
}

/// Longest reference name we try to match, semicolon excluded.
const MAX_REFERENCE_LEN: usize = 32;

/// Named references recognized without a trailing semicolon.
const LEGACY_NAMES: &[&str] = &["amp", "quot", "lt", "gt"];

/// Maps entity names (without the leading `&` and trailing `;`) to their
/// replacement strings.
static NAMED_ENTITIES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("amp", "&"),
        ("lt", "<"),
        ("gt", ">"),
        ("quot", "\""),
        ("apos", "'"),
        ("nbsp", "\u{00A0}"),
        ("copy", "\u{00A9}"),
        ("reg", "\u{00AE}"),
        ("trade", "\u{2122}"),
        ("mdash", "\u{2014}"),
        ("ndash", "\u{2013}"),
        ("hellip", "\u{2026}"),
        ("bull", "\u{2022}"),
        ("middot", "\u{00B7}"),
        ("lsquo", "\u{2018}"),
        ("rsquo", "\u{2019}"),
        ("ldquo", "\u{201C}"),
        ("rdquo", "\u{201D}"),
        ("laquo", "\u{00AB}"),
        ("raquo", "\u{00BB}"),
        ("sect", "\u{00A7}"),
        ("para", "\u{00B6}"),
        ("cent", "\u{00A2}"),
        ("pound", "\u{00A3}"),
        ("euro", "\u{20AC}"),
        ("yen", "\u{00A5}"),
        ("times", "\u{00D7}"),
        ("divide", "\u{00F7}"),
        ("plusmn", "\u{00B1}"),
        ("ne", "\u{2260}"),
        ("le", "\u{2264}"),
        ("ge", "\u{2265}"),
        ("deg", "\u{00B0}"),
        ("frac12", "\u{00BD}"),
        ("frac14", "\u{00BC}"),
        ("frac34", "\u{00BE}"),
        ("larr", "\u{2190}"),
        ("rarr", "\u{2192}"),
        ("uarr", "\u{2191}"),
        ("darr", "\u{2193}"),
        ("alpha", "\u{03B1}"),
        ("beta", "\u{03B2}"),
        ("gamma", "\u{03B3}"),
        ("delta", "\u{03B4}"),
        ("pi", "\u{03C0}"),
        ("sigma", "\u{03C3}"),
        ("omega", "\u{03C9}"),
        ("Agrave", "\u{00C0}"),
        ("Aacute", "\u{00C1}"),
        ("Acirc", "\u{00C2}"),
        ("Atilde", "\u{00C3}"),
        ("Auml", "\u{00C4}"),
        ("agrave", "\u{00E0}"),
        ("aacute", "\u{00E1}"),
        ("acirc", "\u{00E2}"),
        ("atilde", "\u{00E3}"),
        ("auml", "\u{00E4}"),
        ("Egrave", "\u{00C8}"),
        ("Eacute", "\u{00C9}"),
        ("egrave", "\u{00E8}"),
        ("eacute", "\u{00E9}"),
        ("Igrave", "\u{00CC}"),
        ("Iacute", "\u{00CD}"),
        ("igrave", "\u{00EC}"),
        ("iacute", "\u{00ED}"),
        ("Ograve", "\u{00D2}"),
        ("Oacute", "\u{00D3}"),
        ("ograve", "\u{00F2}"),
        ("oacute", "\u{00F3}"),
        ("ouml", "\u{00F6}"),
        ("Ouml", "\u{00D6}"),
        ("Ugrave", "\u{00D9}"),
        ("Uacute", "\u{00DA}"),
        ("ugrave", "\u{00F9}"),
        ("uacute", "\u{00FA}"),
        ("uuml", "\u{00FC}"),
        ("Uuml", "\u{00DC}"),
        ("szlig", "\u{00DF}"),
        ("ntilde", "\u{00F1}"),
        ("Ntilde", "\u{00D1}"),
        ("ccedil", "\u{00E7}"),
        ("Ccedil", "\u{00C7}"),
    ])
});

/// Look up a named character reference (no `&`, no `;`).
#[must_use]
pub fn lookup_entity(name: &str) -> Option<&'static str> {
    NAMED_ENTITIES.get(name).copied()
}

/// Decode every recognized reference in `input`.
#[must_use]
pub fn decode_html(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        match decode_reference(&rest[1..]) {
            Some((replacement, consumed)) => {
                out.push_str(&replacement);
                rest = &rest[1 + consumed..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Decode the reference at the start of `after_amp`, returning the
/// replacement and how many bytes of `after_amp` it used.
fn decode_reference(after_amp: &str) -> Option<(String, usize)> {
    if let Some(terminated) = after_amp
        .find(';')
        .filter(|&end| end > 0 && end <= MAX_REFERENCE_LEN)
        .map(|end| &after_amp[..end])
        .filter(|body| !body.contains(['&', ' ', '\t', '\n', '<']))
    {
        let consumed = terminated.len() + 1;
        if let Some(numeric) = terminated.strip_prefix('#') {
            return decode_numeric(numeric).map(|c| (c.to_string(), consumed));
        }
        if let Some(named) = lookup_entity(terminated) {
            return Some((named.to_string(), consumed));
        }
    }

    // An unterminated legacy name followed by `=` or an alphanumeric stays
    // literal, so query strings like `?a=1&gt=5` survive.
    LEGACY_NAMES
        .iter()
        .find(|name| after_amp.starts_with(**name))
        .filter(|name| {
            !after_amp[name.len()..]
                .starts_with(|c: char| c == '=' || c.is_ascii_alphanumeric())
        })
        .and_then(|name| lookup_entity(name).map(|text| (text.to_string(), name.len())))
}

/// Decode the digits of `&#...;`. Out-of-range code points become U+FFFD.
fn decode_numeric(body: &str) -> Option<char> {
    let (digits, radix) = match body.strip_prefix(['x', 'X']) {
        Some(hex) => (hex, 16),
        None => (body, 10),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    let code = u32::from_str_radix(digits, radix).unwrap_or(u32::MAX);
    if code == 0 {
        return Some('\u{FFFD}');
    }
    Some(char::from_u32(code).unwrap_or('\u{FFFD}'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_references() {
        assert_eq!(decode_html("a &amp; b"), "a & b");
        assert_eq!(decode_html("&lt;p&gt;"), "<p>");
        assert_eq!(decode_html("caf&eacute;"), "caf\u{00E9}");
    }

    #[test]
    fn test_numeric_references() {
        assert_eq!(decode_html("&#65;&#x42;&#X43;"), "ABC");
        assert_eq!(decode_html("&#0;"), "\u{FFFD}");
        assert_eq!(decode_html("&#xD800;"), "\u{FFFD}");
        assert_eq!(decode_html("&#99999999999;"), "\u{FFFD}");
    }

    #[test]
    fn test_unknown_references_are_left_alone() {
        assert_eq!(decode_html("&bogus; & &#xZZ; &"), "&bogus; & &#xZZ; &");
        assert_eq!(decode_html("&;"), "&;");
    }

    #[test]
    fn test_legacy_references_without_semicolon() {
        assert_eq!(decode_html("a &amp b"), "a & b");
        assert_eq!(decode_html("x&lt;y &gt"), "x<y >");
        assert_eq!(decode_html("&copy 2024"), "&copy 2024");
    }

    #[test]
    fn test_legacy_references_before_name_characters_stay_literal() {
        assert_eq!(decode_html("a&ampb"), "a&ampb");
        assert_eq!(decode_html("?x=1&lt=2"), "?x=1&lt=2");
        assert_eq!(
            decode_html("/search?a=1&gt=5&amplitude=3&quote=x"),
            "/search?a=1&gt=5&amplitude=3&quote=x"
        );
        assert_eq!(decode_html("?a=1&amp;b=2&quot"), "?a=1&b=2\"");
    }

    #[test]
    fn test_closures_are_decoders() {
        let upper = |s: &str| s.to_uppercase();
        assert_eq!(upper.decode("abc"), "ABC");
        assert_eq!(PassThrough.decode("&amp;"), "&amp;");
        assert_eq!(HtmlEntities.decode("&amp;"), "&");
    }
}
