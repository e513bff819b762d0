//! Legend tree: the hierarchical layer/group/item structure the packers annotate.
//!
//! Heights are precomputed by the renderer in a consistent unit (pixels in practice).
//! The only field the packers ever write is `split_before`.
//!
//! Field names on the wire follow the renderer's contract (`headerHeight`, `splitBefore`).
//! Unknown fields (ids, names, symbology handles) ride along in `extra` so the caller
//! gets its own tree back with annotations added.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// A top-level legend entry, one per map layer. The unit the section packers move around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    /// Total rendered height of the layer including its header and all descendants.
    pub height: f64,
    #[serde(default)]
    pub header_height: f64,
    #[serde(default)]
    pub items: Vec<Node>,
    /// Start a new section immediately before this layer.
    #[serde(default)]
    pub split_before: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A node nested inside a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Group(Group),
    Item(Item),
}

/// A titled container of further nodes (e.g. a dynamic layer's sublayer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[serde(default)]
    pub height: f64,
    /// Height of the group's own title row, excluding children.
    #[serde(default)]
    pub header_height: f64,
    #[serde(default)]
    pub items: Vec<Node>,
    #[serde(default)]
    pub split_before: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A leaf symbol row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub height: f64,
    #[serde(default)]
    pub split_before: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ────────────────────────────────────────────────────────────────────────────
// Test constructors
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
impl Layer {
    /// A flat layer with no children.
    pub fn new(height: f64) -> Self {
        Self::with_items(height, 0.0, Vec::new())
    }

    pub fn with_items(height: f64, header_height: f64, items: Vec<Node>) -> Self {
        Self {
            height,
            header_height,
            items,
            split_before: false,
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
impl Node {
    pub fn item(height: f64) -> Self {
        Node::Item(Item {
            height,
            split_before: false,
            extra: Map::new(),
        })
    }

    /// A group whose declared height is its header plus the summed heights of `items`.
    pub fn group(header_height: f64, items: Vec<Node>) -> Self {
        let height = header_height + items.iter().map(Node::height).sum::<f64>();
        Node::Group(Group {
            height,
            header_height,
            items,
            split_before: false,
            extra: Map::new(),
        })
    }
}

impl Node {
    /// Declared height of this node and everything below it.
    pub fn height(&self) -> f64 {
        match self {
            Node::Group(g) => g.height,
            Node::Item(i) => i.height,
        }
    }

    /// Vertical space this node occupies before its first child: the header for a group,
    /// the whole row for an item.
    pub fn own_height(&self) -> f64 {
        match self {
            Node::Group(g) => g.header_height,
            Node::Item(i) => i.height,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Group(g) => &g.items,
            Node::Item(_) => &[],
        }
    }

    pub fn split_before(&self) -> bool {
        match self {
            Node::Group(g) => g.split_before,
            Node::Item(i) => i.split_before,
        }
    }

    pub fn set_split_before(&mut self, split: bool) {
        match self {
            Node::Group(g) => g.split_before = split,
            Node::Item(i) => i.split_before = split,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Traversal helpers
// ────────────────────────────────────────────────────────────────────────────

/// Visits `nodes` depth-first in rendering order (a group before its children).
pub fn walk<'a>(nodes: &'a [Node], visit: &mut impl FnMut(&'a Node)) {
    for node in nodes {
        visit(node);
        if let Node::Group(g) = node {
            walk(&g.items, visit);
        }
    }
}

/// Mutable counterpart of [`walk`], same visiting order.
pub fn walk_mut(nodes: &mut [Node], visit: &mut impl FnMut(&mut Node)) {
    for node in nodes.iter_mut() {
        visit(node);
        if let Node::Group(g) = node {
            walk_mut(&mut g.items, visit);
        }
    }
}

/// Assigns top-level section breaks. `split_points[i]` decides the break before
/// `layers[i + 1]`; the first layer never gets one.
pub fn assign_layer_splits(layers: &mut [Layer], split_points: &[bool]) {
    let Some((first, rest)) = layers.split_first_mut() else {
        return;
    };
    first.split_before = false;
    for (layer, &split) in rest.iter_mut().zip(split_points) {
        layer.split_before = split;
    }
}

/// Sets `split_before` on the nodes at the given pre-order ordinals (sorted ascending).
pub fn apply_node_splits(layer: &mut Layer, ordinals: &[usize]) {
    let mut ordinal = 0usize;
    walk_mut(&mut layer.items, &mut |node| {
        if ordinals.binary_search(&ordinal).is_ok() {
            node.set_split_before(true);
        }
        ordinal += 1;
    });
}

/// Number of sections the breaks in `layers` actually produce, nested breaks included.
/// A break on the first layer starts nothing.
pub fn count_sections(layers: &[Layer]) -> usize {
    if layers.is_empty() {
        return 0;
    }
    let mut sections = 1 + layers.iter().skip(1).filter(|l| l.split_before).count();
    for layer in layers {
        walk(&layer.items, &mut |node| {
            if node.split_before() {
                sections += 1;
            }
        });
    }
    sections
}

/// Removes every section break in the tree, top level and nested.
pub fn clear_splits(layers: &mut [Layer]) {
    for layer in layers.iter_mut() {
        layer.split_before = false;
        walk_mut(&mut layer.items, &mut |node| node.set_split_before(false));
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserializes_renderer_contract() {
        let layer: Layer = serde_json::from_value(json!({
            "type": "layer",
            "id": "roads",
            "height": 110,
            "items": [
                {
                    "type": "group",
                    "headerHeight": 10,
                    "items": [
                        { "type": "item", "height": 20 },
                        { "type": "item", "height": 40, "name": "Highway" }
                    ]
                },
                { "type": "item", "height": 20 }
            ]
        }))
        .expect("valid legend layer");

        assert_eq!(layer.height, 110.0);
        assert_eq!(layer.header_height, 0.0);
        assert_eq!(layer.extra.get("id"), Some(&json!("roads")));
        assert_eq!(layer.items.len(), 2);
        match &layer.items[0] {
            Node::Group(g) => {
                assert_eq!(g.header_height, 10.0);
                assert_eq!(g.items.len(), 2);
                assert_eq!(g.items[1].height(), 40.0);
            }
            other => panic!("expected group, got {other:?}"),
        }
    }

    #[test]
    fn test_serializes_split_before_and_passthrough_fields() {
        let mut layer: Layer = serde_json::from_value(json!({
            "height": 20,
            "items": [{ "type": "item", "height": 20, "name": "Lakes" }]
        }))
        .unwrap();
        layer.items[0].set_split_before(true);

        let out = serde_json::to_value(&layer).unwrap();
        assert_eq!(out["items"][0]["type"], json!("item"));
        assert_eq!(out["items"][0]["splitBefore"], json!(true));
        assert_eq!(out["items"][0]["name"], json!("Lakes"));
        assert_eq!(out["splitBefore"], json!(false));
    }

    #[test]
    fn test_walk_is_preorder() {
        let nodes = vec![
            Node::group(1.0, vec![Node::item(2.0), Node::item(3.0)]),
            Node::item(4.0),
        ];
        let mut seen = Vec::new();
        walk(&nodes, &mut |n| seen.push(n.own_height()));
        assert_eq!(seen, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_group_constructor_sums_children() {
        let g = Node::group(10.0, vec![Node::item(20.0), Node::item(40.0)]);
        assert_eq!(g.height(), 70.0);
        assert_eq!(g.own_height(), 10.0);
        assert_eq!(g.children().len(), 2);
    }

    #[test]
    fn test_assign_layer_splits_never_marks_first() {
        let mut layers = vec![Layer::new(1.0), Layer::new(1.0), Layer::new(1.0)];
        layers[0].split_before = true;
        assign_layer_splits(&mut layers, &[true, false]);
        let flags: Vec<bool> = layers.iter().map(|l| l.split_before).collect();
        assert_eq!(flags, vec![false, true, false]);
    }

    #[test]
    fn test_assign_layer_splits_empty_is_noop() {
        let mut layers: Vec<Layer> = vec![];
        assign_layer_splits(&mut layers, &[]);
        assert!(layers.is_empty());
    }

    #[test]
    fn test_count_sections_ignores_break_on_first_layer() {
        let mut layers = vec![Layer::new(1.0), Layer::new(1.0), Layer::new(1.0)];
        assert_eq!(count_sections(&layers), 1);
        layers[0].split_before = true;
        layers[2].split_before = true;
        assert_eq!(count_sections(&layers), 2);
        assert_eq!(count_sections(&[]), 0);
    }

    #[test]
    fn test_apply_and_clear_node_splits() {
        let mut layers = vec![Layer::with_items(
            60.0,
            0.0,
            vec![
                Node::group(10.0, vec![Node::item(20.0), Node::item(20.0)]),
                Node::item(10.0),
            ],
        )];
        apply_node_splits(&mut layers[0], &[2, 3]);

        let mut flags = Vec::new();
        walk(&layers[0].items, &mut |n| flags.push(n.split_before()));
        assert_eq!(flags, vec![false, false, true, true]);

        layers[0].split_before = true;
        assert_eq!(count_sections(&layers), 3);
        clear_splits(&mut layers);
        assert_eq!(count_sections(&layers), 1);
        assert!(!layers[0].split_before);
        let mut any = false;
        walk(&layers[0].items, &mut |n| any |= n.split_before());
        assert!(!any);
    }
}
