//! Tests for DOM construction, lookup and serialization.

use readygate_dom::{DomTree, NodeId, NodeType, escape_attribute};

#[test]
fn test_skeleton_has_head_and_body() {
    let tree = DomTree::with_skeleton();
    let html = tree.document_element().unwrap();
    let head = tree.head().unwrap();
    let body = tree.body().unwrap();

    assert_eq!(tree.parent(head), Some(html));
    assert_eq!(tree.parent(body), Some(html));
    assert_eq!(tree.children(html), &[head, body]);
}

#[test]
fn test_empty_document_has_no_head() {
    let tree = DomTree::new();
    assert!(tree.head().is_none());
    assert!(tree.body().is_none());
    assert_eq!(tree.len(), 1);
}

#[test]
fn test_set_attribute_overwrites_in_place() {
    let mut tree = DomTree::new();
    let script = tree.create_element("SCRIPT");
    assert!(tree.set_attribute(script, "type", "text/javascript"));
    assert!(tree.set_attribute(script, "src", "a.js"));
    assert!(tree.set_attribute(script, "type", "module"));

    let element = tree.as_element(script).unwrap();
    assert_eq!(element.tag_name, "script");
    assert_eq!(
        element.attrs,
        vec![
            ("type".to_string(), "module".to_string()),
            ("src".to_string(), "a.js".to_string()),
        ]
    );
}

#[test]
fn test_set_attribute_on_text_is_rejected() {
    let mut tree = DomTree::new();
    let text = tree.alloc(NodeType::Text("hi".to_string()));
    assert!(!tree.set_attribute(text, "id", "x"));
}

#[test]
fn test_get_element_by_id_returns_first_in_tree_order() {
    let mut tree = DomTree::with_skeleton();
    let body = tree.body().unwrap();
    let first = tree.create_element("div");
    let _ = tree.set_attribute(first, "id", "marker");
    let second = tree.create_element("span");
    let _ = tree.set_attribute(second, "id", "marker");
    tree.append_child(body, first);
    tree.append_child(body, second);

    assert_eq!(tree.get_element_by_id("marker"), Some(first));
    assert_eq!(tree.get_element_by_id("missing"), None);
}

#[test]
fn test_detached_elements_are_not_found() {
    let mut tree = DomTree::with_skeleton();
    let orphan = tree.create_element("script");
    let _ = tree.set_attribute(orphan, "id", "orphan");
    assert_eq!(tree.get_element_by_id("orphan"), None);
    assert!(tree.elements_by_tag_name("script").is_empty());
}

#[test]
fn test_elements_by_tag_name_in_document_order() {
    let mut tree = DomTree::with_skeleton();
    let head = tree.head().unwrap();
    let body = tree.body().unwrap();
    let a = tree.create_element("script");
    let b = tree.create_element("script");
    tree.append_child(body, a);
    tree.append_child(head, b);

    assert_eq!(tree.elements_by_tag_name("script"), vec![b, a]);
}

#[test]
fn test_serialize_void_and_normal_elements() {
    let mut tree = DomTree::with_skeleton();
    let head = tree.head().unwrap();
    let link = tree.create_element("link");
    let _ = tree.set_attribute(link, "rel", "stylesheet");
    let _ = tree.set_attribute(link, "href", "/a.css");
    tree.append_child(head, link);
    let script = tree.create_element("script");
    let _ = tree.set_attribute(script, "src", "/a.js?x=1&y=\"2\"");
    tree.append_child(head, script);

    assert_eq!(
        tree.inner_html(head),
        "<link rel=\"stylesheet\" href=\"/a.css\"><script src=\"/a.js?x=1&amp;y=&quot;2&quot;\"></script>"
    );
}

#[test]
fn test_inner_html_setter_keeps_markup_verbatim() {
    let mut tree = DomTree::with_skeleton();
    let body = tree.body().unwrap();
    let div = tree.create_element("div");
    tree.append_child(body, div);
    let text = tree.alloc(NodeType::Text("old <text>".to_string()));
    tree.append_child(div, text);
    assert_eq!(tree.inner_html(div), "old &lt;text&gt;");

    tree.set_inner_html(div, "line one<br/>line two<br/>");

    assert_eq!(tree.inner_html(div), "line one<br/>line two<br/>");
    assert_eq!(tree.parent(text), None);
}

#[test]
fn test_append_child_moves_existing_node() {
    let mut tree = DomTree::with_skeleton();
    let head = tree.head().unwrap();
    let body = tree.body().unwrap();
    let node = tree.create_element("p");
    tree.append_child(head, node);
    tree.append_child(body, node);

    assert!(tree.children(head).is_empty());
    assert_eq!(tree.children(body), &[node]);
}

#[test]
fn test_outer_html_of_document() {
    let tree = DomTree::with_skeleton();
    assert_eq!(
        tree.outer_html(NodeId::ROOT),
        "<html><head></head><body></body></html>"
    );
}

#[test]
fn test_escape_attribute() {
    assert_eq!(escape_attribute("a&b\"c<d"), "a&amp;b&quot;c<d");
}
