use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::layout::LayoutError;

/// Input tree as supplied by the caller (typically deserialized from JSON).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn branch(name: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            name: Some(name.into()),
            value: None,
            children,
        }
    }

    pub fn leaf(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: Some(name.into()),
            value: Some(value),
            children: Vec::new(),
        }
    }

    /// A real observation slot with no recorded value.
    pub fn unobserved(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            value: None,
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

/// Payload carried by every node that came from the input tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Datum {
    pub name: Option<String>,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rect {
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
}

impl Rect {
    pub fn new(x0: f64, x1: f64, y0: f64, y1: f64) -> Self {
        Self { x0, x1, y0, y1 }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Shrink by `padding` on all four sides. A side pair that would cross
    /// collapses onto its midpoint.
    pub fn inset(self, padding: f64) -> Self {
        let (x0, x1) = inset_span(self.x0, self.x1, padding);
        let (y0, y1) = inset_span(self.y0, self.y1, padding);
        Self { x0, x1, y0, y1 }
    }
}

fn inset_span(lo: f64, hi: f64, padding: f64) -> (f64, f64) {
    let (a, b) = (lo + padding, hi - padding);
    if a <= b {
        (a, b)
    } else {
        let mid = (lo + hi) / 2.0;
        (mid, mid)
    }
}

/// Inscribed circle of a leaf, with the center relative to the leaf's `(x0, y0)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Circle {
    pub cx: f64,
    pub cy: f64,
    pub r: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyNode {
    pub id: NodeId,
    pub depth: usize,
    pub height: usize,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// `None` only for placeholder cells inserted by alignment.
    pub data: Option<Datum>,
    pub rect: Rect,
    pub color: Option<Color>,
    pub circle: Option<Circle>,
}

impl HierarchyNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_placeholder(&self) -> bool {
        self.data.is_none()
    }

    pub fn name(&self) -> Option<&str> {
        self.data.as_ref().and_then(|d| d.name.as_deref())
    }

    pub fn value(&self) -> Option<f64> {
        self.data.as_ref().and_then(|d| d.value)
    }
}

/// Arena-backed tree. Node 0 is the root; children are owned top-down through
/// the id lists and `parent` is a plain back reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Hierarchy {
    nodes: Vec<HierarchyNode>,
    aligned: bool,
}

impl Hierarchy {
    pub fn from_tree(tree: &TreeNode) -> Self {
        let mut nodes = Vec::new();
        push_subtree(tree, 0, None, &mut nodes);
        Self {
            nodes,
            aligned: false,
        }
    }

    pub fn root(&self) -> &HierarchyNode {
        &self.nodes[0]
    }

    pub fn node(&self, id: NodeId) -> &HierarchyNode {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut HierarchyNode {
        &mut self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_aligned(&self) -> bool {
        self.aligned
    }

    pub(crate) fn mark_aligned(&mut self) {
        self.aligned = true;
    }

    pub fn levels(&self) -> usize {
        self.root().height + 1
    }

    /// Preorder.
    pub fn descendants(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![NodeId(0)];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        order
    }

    pub fn nodes_at_depth(&self, depth: usize) -> Vec<NodeId> {
        self.descendants()
            .into_iter()
            .filter(|id| self.node(*id).depth == depth)
            .collect()
    }

    /// Childless nodes in preorder, placeholders included.
    pub fn leaves(&self) -> Vec<NodeId> {
        self.descendants()
            .into_iter()
            .filter(|id| self.node(*id).is_leaf())
            .collect()
    }

    /// Values of leaves that carry an observation, in preorder.
    pub fn leaf_values(&self) -> Vec<f64> {
        self.leaves()
            .into_iter()
            .filter_map(|id| self.node(id).value())
            .collect()
    }

    pub fn value_extent(&self) -> Option<(f64, f64)> {
        self.leaf_values().into_iter().fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    /// Check the shape the layout depends on: at least a group level above the
    /// leaves, every leaf at the same depth, and finite leaf values.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let levels = self.levels();
        if levels < 2 {
            return Err(LayoutError::TooShallow { levels });
        }
        let expected = levels - 1;
        for id in self.descendants() {
            let node = self.node(id);
            if node.is_leaf() && node.depth != expected {
                return Err(LayoutError::UnevenLeafDepth {
                    name: node.name().map(str::to_string),
                    depth: node.depth,
                    expected,
                });
            }
            if node.value().is_some_and(|v| !v.is_finite()) {
                return Err(LayoutError::NonFiniteValue {
                    name: node.name().map(str::to_string),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn push_placeholder(&mut self, parent: NodeId) -> NodeId {
        let id = NodeId(self.nodes.len());
        let depth = self.node(parent).depth + 1;
        self.nodes.push(HierarchyNode {
            id,
            depth,
            height: 0,
            parent: Some(parent),
            children: Vec::new(),
            data: None,
            rect: Rect::default(),
            color: None,
            circle: None,
        });
        self.node_mut(parent).children.push(id);
        id
    }
}

fn push_subtree(
    tree: &TreeNode,
    depth: usize,
    parent: Option<NodeId>,
    nodes: &mut Vec<HierarchyNode>,
) -> NodeId {
    let id = NodeId(nodes.len());
    nodes.push(HierarchyNode {
        id,
        depth,
        height: 0,
        parent,
        children: Vec::new(),
        data: Some(Datum {
            name: tree.name.clone(),
            value: tree.value,
        }),
        rect: Rect::default(),
        color: None,
        circle: None,
    });
    let mut height = 0;
    let mut children = Vec::with_capacity(tree.children.len());
    for child in &tree.children {
        let child_id = push_subtree(child, depth + 1, Some(id), nodes);
        height = height.max(nodes[child_id.0].height + 1);
        children.push(child_id);
    }
    let node = &mut nodes[id.0];
    node.children = children;
    node.height = height;
    id
}
