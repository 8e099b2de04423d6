use tracing::debug;

use crate::tree::{Hierarchy, NodeId};

use super::LayoutError;

/// A hierarchy whose groups all hold the same number of cells.
#[derive(Debug, Clone)]
pub struct Alignment {
    pub hierarchy: Hierarchy,
    /// Number of levels, `maxDepth + 1`.
    pub levels: usize,
    /// Group-level nodes, left to right.
    pub groups: Vec<NodeId>,
    /// Largest child count over the groups before padding.
    pub max_children: usize,
    /// Rows per leaf grid after clamping to `max_children`.
    pub map_height: usize,
    pub columns: usize,
    pub placeholders: usize,
}

impl Alignment {
    pub fn cells(&self) -> usize {
        self.columns * self.map_height
    }
}

/// Pad every group with placeholder cells up to `columns * map_height`.
///
/// Returns a new hierarchy; the input is left untouched. Aligning an already
/// aligned hierarchy with the same `map_height` adds nothing.
pub fn align(tree: &Hierarchy, map_height: usize) -> Result<Alignment, LayoutError> {
    tree.validate()?;
    if map_height == 0 {
        return Err(LayoutError::InvalidMapHeight);
    }

    let levels = tree.levels();
    let groups = tree.nodes_at_depth(levels - 2);
    let max_children = groups
        .iter()
        .map(|id| tree.node(*id).children.len())
        .max()
        .unwrap_or(0);

    let map_height = map_height.min(max_children).max(1);
    let columns = max_children.div_ceil(map_height);
    let cells = columns * map_height;

    let mut hierarchy = tree.clone();
    let mut placeholders = 0;
    for &group in &groups {
        while hierarchy.node(group).children.len() < cells {
            hierarchy.push_placeholder(group);
            placeholders += 1;
        }
    }
    hierarchy.mark_aligned();

    debug!(
        groups = groups.len(),
        max_children, map_height, columns, placeholders, "aligned heatmap groups"
    );

    Ok(Alignment {
        hierarchy,
        levels,
        groups,
        max_children,
        map_height,
        columns,
        placeholders,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeNode;

    fn groups_of(sizes: &[usize]) -> Hierarchy {
        let groups = sizes
            .iter()
            .enumerate()
            .map(|(g, &n)| {
                TreeNode::branch(
                    format!("g{g}"),
                    (0..n)
                        .map(|i| TreeNode::leaf(format!("g{g}-{i}"), i as f64))
                        .collect(),
                )
            })
            .collect();
        Hierarchy::from_tree(&TreeNode::branch("root", groups))
    }

    #[test]
    fn pads_groups_to_uniform_grid() {
        let tree = groups_of(&[7, 3, 5]);
        let aligned = align(&tree, 3).unwrap();
        assert_eq!(aligned.levels, 3);
        assert_eq!(aligned.max_children, 7);
        assert_eq!(aligned.map_height, 3);
        assert_eq!(aligned.columns, 3);
        assert_eq!(aligned.cells(), 9);
        assert_eq!(aligned.placeholders, 2 + 6 + 4);
        for &group in &aligned.groups {
            let node = aligned.hierarchy.node(group);
            assert_eq!(node.children.len(), 9);
            for &child in &node.children {
                let child = aligned.hierarchy.node(child);
                assert_eq!(child.depth, node.depth + 1);
                assert_eq!(child.height, 0);
            }
        }
        assert!(aligned.hierarchy.is_aligned());
        assert!(!tree.is_aligned());
    }

    #[test]
    fn placeholders_follow_real_children() {
        let aligned = align(&groups_of(&[2, 4]), 2).unwrap();
        let first = aligned.hierarchy.node(aligned.groups[0]);
        let kinds: Vec<bool> = first
            .children
            .iter()
            .map(|id| aligned.hierarchy.node(*id).is_placeholder())
            .collect();
        assert_eq!(kinds, [false, false, true, true]);
    }

    #[test]
    fn clamps_map_height_to_largest_group() {
        let aligned = align(&groups_of(&[3]), 5).unwrap();
        assert_eq!(aligned.map_height, 3);
        assert_eq!(aligned.columns, 1);
        assert_eq!(aligned.placeholders, 0);
    }

    #[test]
    fn realigning_is_a_no_op() {
        let once = align(&groups_of(&[6, 1, 4]), 4).unwrap();
        let twice = align(&once.hierarchy, 4).unwrap();
        assert_eq!(twice.placeholders, 0);
        assert_eq!(twice.map_height, once.map_height);
        assert_eq!(twice.columns, once.columns);
        assert_eq!(twice.hierarchy, once.hierarchy);
    }

    #[test]
    fn root_can_be_the_group_level() {
        let tree = Hierarchy::from_tree(&TreeNode::branch(
            "only",
            vec![TreeNode::leaf("a", 1.0), TreeNode::leaf("b", 2.0)],
        ));
        let aligned = align(&tree, 5).unwrap();
        assert_eq!(aligned.levels, 2);
        assert_eq!(aligned.groups, vec![NodeId(0)]);
    }

    #[test]
    fn zero_map_height_is_rejected() {
        assert_eq!(
            align(&groups_of(&[2]), 0).unwrap_err(),
            LayoutError::InvalidMapHeight
        );
    }
}
