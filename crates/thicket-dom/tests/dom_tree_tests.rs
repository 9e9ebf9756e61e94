//! Tests for tree construction, navigation and the document type slot.

use thicket_dom::{
    AttrName, DocumentType, DomTree, ElementData, NodeId, NodeType, XMLNS_NAMESPACE, dump_tree,
};

fn element(tag: &str) -> NodeType {
    NodeType::Element(ElementData::new(tag))
}

#[test]
fn test_descendants_in_document_order() {
    let mut tree = DomTree::new();
    let body = tree.create_child(NodeId::ROOT, element("body"));
    let p = tree.create_child(body, element("p"));
    let text = tree.create_child(p, NodeType::Text("x".to_string()));
    let footer = tree.create_child(body, element("footer"));

    let order: Vec<NodeId> = tree.descendants(NodeId::ROOT).collect();
    assert_eq!(order, vec![body, p, text, footer]);
    let ancestors: Vec<NodeId> = tree.ancestors(text).collect();
    assert_eq!(ancestors, vec![p, body, NodeId::ROOT]);
    assert!(tree.is_descendant_of(text, body));
    assert!(!tree.is_descendant_of(footer, p));
}

#[test]
fn test_every_created_node_is_attached() {
    let mut tree = DomTree::new();
    let div = tree.create_child(NodeId::ROOT, element("div"));
    let lost = tree.create_child(NodeId(100), element("span"));

    assert_eq!(tree.parent(div), Some(NodeId::ROOT));
    assert_eq!(tree.parent(lost), Some(NodeId::ROOT));
    assert_eq!(tree.descendants(NodeId::ROOT).count() + 1, tree.len());
    assert!(!tree.is_empty());
}

#[test]
fn test_text_content_includes_cdata() {
    let mut tree = DomTree::new();
    let script = tree.create_child(NodeId::ROOT, element("script"));
    let _ = tree.create_child(script, NodeType::Text("a".to_string()));
    let _ = tree.create_child(script, NodeType::Comment("skipped".to_string()));
    let _ = tree.create_child(script, NodeType::Cdata("<b>".to_string()));

    assert_eq!(tree.text_content(NodeId::ROOT), "a<b>");
}

#[test]
fn test_doctype_dump() {
    let tree = DomTree::with_doctype(DocumentType {
        name: "html".to_string(),
        public_id: Some("-//W3C//DTD HTML 4.01//EN".to_string()),
        system_id: Some("http://www.w3.org/TR/html4/strict.dtd".to_string()),
        internal_subset: None,
    });
    assert_eq!(
        dump_tree(&tree),
        "<!DOCTYPE html PUBLIC \"-//W3C//DTD HTML 4.01//EN\" \"http://www.w3.org/TR/html4/strict.dtd\">\n<html>\n"
    );
}

#[test]
fn test_element_data_edits_through_tree() {
    let mut tree = DomTree::new();
    let svg = tree.create_child(NodeId::ROOT, element("svg"));
    if let Some(data) = tree.as_element_mut(svg) {
        data.set_attribute(
            AttrName::namespace_declaration("xlink"),
            "http://www.w3.org/1999/xlink",
        );
    }
    let data = tree.as_element(svg).unwrap();
    assert!(data.attrs()[0].name.is_namespace_declaration());
    assert_eq!(
        data.attr_ns(XMLNS_NAMESPACE, "xlink"),
        Some("http://www.w3.org/1999/xlink")
    );
    assert!(tree.as_element_mut(NodeId(99)).is_none());
}
