//! Document tree for thicket.
//!
//! This crate provides the arena-based tree that the tag-soup builder in
//! `thicket-html` assembles. The root of every tree is a single `html`
//! element; the document type declaration, when one was accepted, is kept
//! alongside the tree rather than as a node in it.
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships,
//! providing O(1) access and traversal without borrow checker issues. Nodes
//! are attached under a parent as they are created and never removed.

mod dump;

pub use dump::{dump_tree, write_tree};

/// The reserved namespace bound to the `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// The namespace that holds `xmlns:` prefix declarations.
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// A type-safe index into the document tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root `html` element is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// A node in the arena together with its structural links.
#[derive(Debug, Clone)]
pub struct Node {
    /// What kind of node this is and its payload.
    pub node_type: NodeType,
    /// The element this node is attached under, `None` only for the root.
    pub parent: Option<NodeId>,
    /// Child nodes in document order.
    pub children: Vec<NodeId>,
}

/// The node variants a tag-soup document is made of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeType {
    /// An element with a name, attributes and children.
    Element(ElementData),
    /// Literal character data.
    Text(String),
    /// A comment's contents.
    Comment(String),
    /// The contents of a CDATA section.
    Cdata(String),
}

/// The name of an attribute, optionally qualified by a namespace URI.
///
/// Namespace declarations (`xmlns:foo="..."`) are attributes in
/// [`XMLNS_NAMESPACE`] whose local name is the declared prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttrName {
    /// Namespace URI, `None` for plain attributes.
    pub namespace: Option<String>,
    /// Local part of the name.
    pub local: String,
}

impl AttrName {
    /// A plain attribute name with no namespace.
    #[must_use]
    pub fn new(local: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local: local.into(),
        }
    }

    /// An attribute name in the given namespace.
    #[must_use]
    pub fn namespaced(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local: local.into(),
        }
    }

    /// The name of the attribute that binds `prefix` to a namespace.
    #[must_use]
    pub fn namespace_declaration(prefix: impl Into<String>) -> Self {
        Self::namespaced(XMLNS_NAMESPACE, prefix)
    }

    /// Returns true if this name declares a namespace prefix.
    #[must_use]
    pub fn is_namespace_declaration(&self) -> bool {
        self.namespace.as_deref() == Some(XMLNS_NAMESPACE)
    }
}

/// A single attribute on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// The (possibly namespaced) attribute name.
    pub name: AttrName,
    /// The attribute value.
    pub value: String,
}

/// Element-specific data.
///
/// Attribute names are unique per element; [`ElementData::set_attribute`]
/// replaces the value of an existing attribute in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// The element's (sanitized, lowercase) local name.
    pub tag_name: String,
    attrs: Vec<Attribute>,
}

impl ElementData {
    /// Create element data with no attributes.
    #[must_use]
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attrs: Vec::new(),
        }
    }

    /// All attributes in the order they were first set.
    #[must_use]
    pub fn attrs(&self) -> &[Attribute] {
        &self.attrs
    }

    /// Set an attribute. Last write wins if the name is already present.
    pub fn set_attribute(&mut self, name: AttrName, value: impl Into<String>) {
        let value = value.into();
        if let Some(existing) = self.attrs.iter_mut().find(|a| a.name == name) {
            existing.value = value;
        } else {
            self.attrs.push(Attribute { name, value });
        }
    }

    /// Value of the plain (non-namespaced) attribute `local`.
    #[must_use]
    pub fn attr(&self, local: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name.namespace.is_none() && a.name.local == local)
            .map(|a| a.value.as_str())
    }

    /// Value of the attribute `local` in `namespace`.
    #[must_use]
    pub fn attr_ns(&self, namespace: &str, local: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name.namespace.as_deref() == Some(namespace) && a.name.local == local)
            .map(|a| a.value.as_str())
    }

    /// Namespace bindings declared on this element, as `(prefix, uri)` pairs.
    pub fn namespaces(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs
            .iter()
            .filter(|a| a.name.is_namespace_declaration())
            .map(|a| (a.name.local.as_str(), a.value.as_str()))
    }

    /// The URI bound to `prefix` by a declaration on this element.
    ///
    /// Only this element is consulted; bindings are not inherited.
    #[must_use]
    pub fn lookup_namespace(&self, prefix: &str) -> Option<&str> {
        self.attr_ns(XMLNS_NAMESPACE, prefix)
    }

    /// The prefixed form of `name` as it would be written on this element.
    ///
    /// Names in a namespace without a prefix declared on this element are
    /// written in `{uri}local` form.
    #[must_use]
    pub fn qualified_name(&self, name: &AttrName) -> String {
        match name.namespace.as_deref() {
            None => name.local.clone(),
            Some(XMLNS_NAMESPACE) => format!("xmlns:{}", name.local),
            Some(XML_NAMESPACE) => format!("xml:{}", name.local),
            Some(uri) => self
                .namespaces()
                .find(|&(_, bound)| bound == uri)
                .map_or_else(
                    || format!("{{{uri}}}{}", name.local),
                    |(prefix, _)| format!("{prefix}:{}", name.local),
                ),
        }
    }
}

/// A parsed document type declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentType {
    /// The declared root element name.
    pub name: String,
    /// The public identifier, if an external id with `PUBLIC` was given.
    pub public_id: Option<String>,
    /// The system identifier, if an external id was given.
    pub system_id: Option<String>,
    /// The raw internal subset between `[` and `]`, if any.
    pub internal_subset: Option<String>,
}

/// Arena-based document tree with O(1) node access and traversal.
///
/// All nodes are stored in a contiguous vector, using indices for all
/// relationships. The root `html` element is always [`NodeId::ROOT`].
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
    doctype: Option<DocumentType>,
}

impl DomTree {
    /// Create a tree holding only an empty `html` root and no doctype.
    #[must_use]
    pub fn new() -> Self {
        let root = Node {
            node_type: NodeType::Element(ElementData::new("html")),
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![root],
            doctype: None,
        }
    }

    /// Create a tree with an empty `html` root and the given doctype.
    #[must_use]
    pub fn with_doctype(doctype: DocumentType) -> Self {
        let mut tree = Self::new();
        tree.doctype = Some(doctype);
        tree
    }

    /// The document type declaration, if one was accepted.
    #[must_use]
    pub const fn doctype(&self) -> Option<&DocumentType> {
        self.doctype.as_ref()
    }

    /// Get the root element ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a mutable reference to a node by its ID.
    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Get the number of nodes in the tree, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree holds at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a node and append it as the last child of `parent`.
    ///
    /// An unknown `parent` leaves the new node at the root instead, so the
    /// tree stays single-rooted.
    pub fn create_child(&mut self, parent: NodeId, node_type: NodeType) -> NodeId {
        let parent = if parent.0 < self.nodes.len() {
            parent
        } else {
            NodeId::ROOT
        };
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            node_type,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Get the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.first().copied())
    }

    /// Get the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.last().copied())
    }

    /// Check if `descendant` is a descendant of `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Iterate over the descendants of a node in document order, excluding
    /// the node itself.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> DescendantIterator<'_> {
        DescendantIterator {
            tree: self,
            pending: self.children(id).iter().rev().copied().collect(),
        }
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get mutable element data if this node is an element.
    pub fn as_element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(|n| match &mut n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// First element named `tag` at or below `from`, depth-first.
    #[must_use]
    pub fn find_element(&self, from: NodeId, tag: &str) -> Option<NodeId> {
        std::iter::once(from)
            .chain(self.descendants(from))
            .find(|&id| self.as_element(id).is_some_and(|e| e.tag_name == tag))
    }

    /// Concatenated text and CDATA content at or below `id`.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        std::iter::once(id)
            .chain(self.descendants(id))
            .filter_map(|n| match self.get(n).map(|node| &node.node_type) {
                Some(NodeType::Text(s) | NodeType::Cdata(s)) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Pre-order iterator over the descendants of a node.
pub struct DescendantIterator<'a> {
    tree: &'a DomTree,
    pending: Vec<NodeId>,
}

impl Iterator for DescendantIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.pending.pop()?;
        self.pending
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tree_has_html_root() {
        let tree = DomTree::new();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.as_element(tree.root()).map(|e| e.tag_name.as_str()), Some("html"));
        assert!(tree.doctype().is_none());
    }

    #[test]
    fn test_unknown_parent_falls_back_to_root() {
        let mut tree = DomTree::new();
        let orphan = tree.create_child(NodeId(42), NodeType::Text("x".to_string()));
        assert_eq!(tree.parent(orphan), Some(NodeId::ROOT));
        assert_eq!(tree.children(NodeId::ROOT), &[orphan]);
    }

    #[test]
    fn test_set_attribute_last_write_wins() {
        let mut data = ElementData::new("div");
        data.set_attribute(AttrName::new("id"), "a");
        data.set_attribute(AttrName::new("class"), "x");
        data.set_attribute(AttrName::new("id"), "b");

        assert_eq!(data.attrs().len(), 2);
        assert_eq!(data.attr("id"), Some("b"));
        assert_eq!(data.attrs()[0].name.local, "id");
    }

    #[test]
    fn test_plain_and_namespaced_attributes_are_distinct() {
        let mut data = ElementData::new("div");
        data.set_attribute(AttrName::new("lang"), "en");
        data.set_attribute(AttrName::namespaced(XML_NAMESPACE, "lang"), "fr");

        assert_eq!(data.attr("lang"), Some("en"));
        assert_eq!(data.attr_ns(XML_NAMESPACE, "lang"), Some("fr"));
    }

    #[test]
    fn test_lookup_namespace_and_qualified_name() {
        let mut data = ElementData::new("root");
        data.set_attribute(AttrName::namespace_declaration("xsi"), "urn:example");
        data.set_attribute(AttrName::namespaced("urn:example", "type"), "t");
        data.set_attribute(AttrName::namespaced("urn:other", "x"), "y");

        assert_eq!(data.lookup_namespace("xsi"), Some("urn:example"));
        assert_eq!(data.lookup_namespace("xlink"), None);
        assert_eq!(data.namespaces().collect::<Vec<_>>(), vec![("xsi", "urn:example")]);

        let names: Vec<String> = data
            .attrs()
            .iter()
            .map(|a| data.qualified_name(&a.name))
            .collect();
        assert_eq!(names, vec!["xmlns:xsi", "xsi:type", "{urn:other}x"]);
    }

    #[test]
    fn test_children_in_insertion_order() {
        let mut tree = DomTree::new();
        let a = tree.create_child(NodeId::ROOT, NodeType::Text("a".to_string()));
        let b = tree.create_child(NodeId::ROOT, NodeType::Comment("b".to_string()));

        assert_eq!(tree.children(NodeId::ROOT), &[a, b]);
        assert_eq!(tree.first_child(NodeId::ROOT), Some(a));
        assert_eq!(tree.last_child(NodeId::ROOT), Some(b));
        assert_eq!(tree.parent(b), Some(NodeId::ROOT));
    }
}
