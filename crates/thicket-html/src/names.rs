//! Element and attribute name rules shared by the tree builder.

use std::sync::LazyLock;

use regex::Regex;

/// Elements that never take children and never wait for a close tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "br", "hr", "iframe", "input", "img", "link", "meta", "param",
];

/// Plain attribute names: a letter or underscore, then letters, digits, `_`, `-` or `.`.
static VALID_ATTRIBUTE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_\-.]*$").expect("attribute name pattern is valid")
});

/// Normalize an element name: drop everything up to the last colon, then lowercase.
///
/// `svg:Rect` becomes `rect`, `a:b:DIV` becomes `div`.
#[must_use]
pub fn sanitize_element_name(name: &str) -> String {
    let local = name.rsplit_once(':').map_or(name, |(_, local)| local);
    local.to_lowercase()
}

/// Returns true if `name` (already sanitized) is a void element.
#[must_use]
pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// Returns true if `name` may be used as an un-prefixed attribute name.
#[must_use]
pub fn is_valid_attribute_name(name: &str) -> bool {
    VALID_ATTRIBUTE_NAME.is_match(name)
}
