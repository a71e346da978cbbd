//! End-to-end template filling and large-tree behaviour

use meldtree::util::testing::init_test_setup;
use meldtree::{MeldTree, NodeData, NodeId, Tag, TreeNodeConvert};
use rstest::rstest;

const DEEP: usize = 100_000;

#[rstest]
fn given_template_when_filling_slot_then_clone_and_original_diverge() {
    init_test_setup();
    let mut tree = MeldTree::new();
    let div = tree.insert_node(NodeData::element("div"), None).unwrap();
    let span = tree
        .insert_node(
            NodeData::element("span").with_meld_id("x").with_text("hi"),
            Some(div),
        )
        .unwrap();

    let order = tree.iterate(div).unwrap();
    assert_eq!(order, vec![div, span]);

    let found = tree.find_by_id(div, "x").unwrap();
    assert_eq!(found, Some(span));

    let copy = tree.clone_node(div, None).unwrap();
    let copy_span = tree.find_by_id(copy, "x").unwrap().unwrap();
    assert_ne!(copy_span, span);

    tree.inject_content(span, "hello", false).unwrap();

    let span_node = tree.node(span).unwrap();
    assert_eq!(span_node.data.text, None);
    assert_eq!(span_node.children().len(), 1);
    let payload = tree.data(span_node.children()[0]).unwrap();
    assert_eq!(payload.tag, Tag::Replace);
    assert_eq!(payload.text.as_deref(), Some("hello"));
    assert!(!payload.structure);

    // the copy still shows the untouched template
    let copy_span = tree.node(copy_span).unwrap();
    assert_eq!(copy_span.data.text.as_deref(), Some("hi"));
    assert!(!copy_span.has_children());

    let rendered = tree.to_tree_string().to_string();
    assert!(rendered.starts_with("div"));
    assert!(rendered.contains(r#"<replace> "hello""#));
}

/// div > div > ... > span (meld:id=bottom)
fn chain(len: usize) -> (MeldTree, NodeId, NodeId) {
    let mut tree = MeldTree::new();
    let top = tree.insert_node(NodeData::element("div"), None).unwrap();
    let mut current = top;
    for _ in 1..len - 1 {
        current = tree
            .insert_node(NodeData::element("div"), Some(current))
            .unwrap();
    }
    let bottom = tree
        .insert_node(
            NodeData::element("span").with_meld_id("bottom"),
            Some(current),
        )
        .unwrap();
    (tree, top, bottom)
}

#[rstest]
fn given_very_deep_tree_when_traversing_then_no_recursion_limit_is_hit() {
    let (tree, top, bottom) = chain(DEEP);

    assert_eq!(tree.count_nodes(top).unwrap(), DEEP);
    assert_eq!(tree.depth(top).unwrap(), DEEP);
    assert_eq!(tree.find_by_id(top, "bottom").unwrap(), Some(bottom));
    assert_eq!(tree.lineage(bottom).unwrap().len(), DEEP);

    let order = tree.iterate(top).unwrap();
    assert_eq!(order.first(), Some(&top));
    assert_eq!(order.last(), Some(&bottom));
    assert_eq!(tree.postorder(top).unwrap().first(), Some(&bottom));
}

#[rstest]
fn given_very_deep_tree_when_cloning_and_mutating_then_operations_complete() {
    let (mut tree, top, bottom) = chain(DEEP);

    let copy = tree.clone_node(top, None).unwrap();
    assert_eq!(tree.len(), DEEP * 2);
    let copy_bottom = tree.find_by_id(copy, "bottom").unwrap().unwrap();
    assert_ne!(copy_bottom, bottom);

    let standalone = tree.clone_tree(top).unwrap();
    assert_eq!(standalone.len(), DEEP);

    tree.inject_content(top, "flat", false).unwrap();
    assert_eq!(tree.count_nodes(top).unwrap(), 2);
    assert!(!tree.contains(bottom));

    assert_eq!(tree.remove(copy).unwrap(), DEEP);
    assert_eq!(tree.len(), 2);
}
