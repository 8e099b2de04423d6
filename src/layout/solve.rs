use serde::Serialize;
use tracing::debug;

use crate::tree::Rect;

use super::align::Alignment;

/// `actual_height` may exceed the requested height once the header floor applies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutMetrics {
    pub width: f64,
    pub requested_height: f64,
    pub actual_height: f64,
    pub levels: usize,
    pub groups: usize,
    pub map_height: usize,
    pub columns: usize,
    pub unit_width: f64,
    pub unit_height: f64,
    /// Full-weight row height; every header band is half of this.
    pub cell_height: f64,
    pub map_cell_width: f64,
    pub map_cell_height: f64,
    pub header_floor_applied: bool,
}

impl LayoutMetrics {
    pub fn band_height(&self) -> f64 {
        self.cell_height / 2.0
    }

    pub fn map_top(&self) -> f64 {
        (self.levels - 1) as f64 * self.band_height()
    }
}

// Groups and their leaf grids first, then header levels bottom-up from child widths.
pub(super) fn solve(
    alignment: &mut Alignment,
    width: f64,
    height: f64,
    min_header_height: f64,
) -> LayoutMetrics {
    let levels = alignment.levels;
    let map_height = alignment.map_height;
    let columns = alignment.columns;
    let group_count = alignment.groups.len();
    let header_rows = (levels - 1) as f64;

    let unit_height = height / (header_rows / 2.0 + map_height as f64);
    let unit_width = width / group_count as f64;
    let map_cell_width = unit_width / columns as f64;

    let uh = unit_width.min(unit_height);
    let header_floor_applied = uh < min_header_height * 2.0;
    let (cell_height, map_cell_height) = if header_floor_applied {
        let cell_height = min_header_height * 2.0;
        // Headers alone may overflow the canvas; leaf rows then collapse to zero.
        let remaining = ((height - header_rows * cell_height / 2.0) / map_height as f64).max(0.0);
        (cell_height, map_cell_width.min(remaining))
    } else {
        (uh, map_cell_width.min(unit_height))
    };
    let actual_height = header_rows * cell_height / 2.0 + map_cell_height * map_height as f64;

    if header_floor_applied {
        debug!(
            uh,
            min_header_height, actual_height, "header bands raised to minimum height"
        );
    }

    let metrics = LayoutMetrics {
        width,
        requested_height: height,
        actual_height,
        levels,
        groups: group_count,
        map_height,
        columns,
        unit_width,
        unit_height,
        cell_height,
        map_cell_width,
        map_cell_height,
        header_floor_applied,
    };

    let band = metrics.band_height();
    let map_top = metrics.map_top();
    let group_top = (levels - 2) as f64 * band;
    let hierarchy = &mut alignment.hierarchy;

    let mut x = 0.0;
    for &group in &alignment.groups {
        let children = hierarchy.node(group).children.clone();
        for (i, child) in children.into_iter().enumerate() {
            let row = (i % map_height) as f64;
            let column = (i / map_height) as f64;
            let y = map_top + row * map_cell_height;
            let cell_x = x + map_cell_width * column;
            hierarchy.node_mut(child).rect =
                Rect::new(cell_x, cell_x + map_cell_width, y, y + map_cell_height);
        }
        hierarchy.node_mut(group).rect = Rect::new(x, x + unit_width, group_top, group_top + band);
        x += unit_width;
    }

    for level in (0..levels.saturating_sub(2)).rev() {
        let mut x = 0.0;
        let y = level as f64 * band;
        for id in hierarchy.nodes_at_depth(level) {
            let w: f64 = hierarchy
                .node(id)
                .children
                .iter()
                .map(|child| hierarchy.node(*child).rect.width())
                .sum();
            hierarchy.node_mut(id).rect = Rect::new(x, x + w, y, y + band);
            x += w;
        }
    }

    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::align::align;
    use crate::tree::{Hierarchy, TreeNode};

    fn single_group() -> Hierarchy {
        Hierarchy::from_tree(&TreeNode::branch(
            "root",
            vec![TreeNode::branch(
                "A",
                vec![
                    TreeNode::leaf("a", 10.0),
                    TreeNode::leaf("b", 20.0),
                    TreeNode::leaf("c", 30.0),
                ],
            )],
        ))
    }

    #[test]
    fn narrow_canvas_raises_header_bands() {
        let mut aligned = align(&single_group(), 5).unwrap();
        let metrics = solve(&mut aligned, 300.0, 150.0, 45.0);
        assert!(metrics.header_floor_applied);
        assert_eq!(metrics.unit_height, 37.5);
        assert_eq!(metrics.cell_height, 90.0);
        assert_eq!(metrics.map_cell_height, 20.0);
        assert_eq!(metrics.actual_height, 150.0);

        let h = &aligned.hierarchy;
        let group = h.node(aligned.groups[0]);
        assert_eq!(group.rect, Rect::new(0.0, 300.0, 45.0, 90.0));
        let tops: Vec<f64> = group.children.iter().map(|c| h.node(*c).rect.y0).collect();
        assert_eq!(tops, [90.0, 110.0, 130.0]);
        for &child in &group.children {
            let rect = h.node(child).rect;
            assert_eq!((rect.x0, rect.x1), (0.0, 300.0));
            assert_eq!(rect.height(), 20.0);
        }
        assert_eq!(h.root().rect, Rect::new(0.0, 300.0, 0.0, 45.0));
    }

    #[test]
    fn ample_canvas_uses_square_cells() {
        let tree = Hierarchy::from_tree(&TreeNode::branch(
            "root",
            vec![
                TreeNode::branch(
                    "left",
                    (0..4).map(|i| TreeNode::leaf(format!("l{i}"), i as f64)).collect(),
                ),
                TreeNode::branch(
                    "right",
                    (0..4).map(|i| TreeNode::leaf(format!("r{i}"), i as f64)).collect(),
                ),
            ],
        ));
        let mut aligned = align(&tree, 2).unwrap();
        let metrics = solve(&mut aligned, 400.0, 1000.0, 45.0);
        assert!(!metrics.header_floor_applied);
        assert_eq!(metrics.cell_height, 200.0);
        assert_eq!(metrics.map_cell_width, 100.0);
        assert_eq!(metrics.map_cell_height, 100.0);
        assert_eq!(metrics.actual_height, 400.0);

        let h = &aligned.hierarchy;
        let left = h.node(aligned.groups[0]);
        let rects: Vec<Rect> = left.children.iter().map(|c| h.node(*c).rect).collect();
        assert_eq!(rects[0], Rect::new(0.0, 100.0, 200.0, 300.0));
        assert_eq!(rects[1], Rect::new(0.0, 100.0, 300.0, 400.0));
        assert_eq!(rects[2], Rect::new(100.0, 200.0, 200.0, 300.0));
        assert_eq!(rects[3], Rect::new(100.0, 200.0, 300.0, 400.0));
        assert_eq!(h.node(aligned.groups[1]).rect, Rect::new(200.0, 400.0, 100.0, 200.0));
        assert_eq!(h.root().rect, Rect::new(0.0, 400.0, 0.0, 100.0));
    }

    #[test]
    fn header_levels_sum_child_widths() {
        let region = |name: &str, groups: usize| {
            TreeNode::branch(
                name,
                (0..groups)
                    .map(|g| {
                        TreeNode::branch(
                            format!("{name}-{g}"),
                            vec![TreeNode::leaf("x", 1.0), TreeNode::leaf("y", 2.0)],
                        )
                    })
                    .collect(),
            )
        };
        let tree = Hierarchy::from_tree(&TreeNode::branch(
            "world",
            vec![region("north", 1), region("south", 3)],
        ));
        let mut aligned = align(&tree, 2).unwrap();
        let metrics = solve(&mut aligned, 800.0, 600.0, 10.0);
        let h = &aligned.hierarchy;
        let regions = h.nodes_at_depth(1);
        assert_eq!(h.node(regions[0]).rect.width(), 200.0);
        assert_eq!(h.node(regions[1]).rect.x0, 200.0);
        assert_eq!(h.node(regions[1]).rect.width(), 600.0);
        assert_eq!(h.node(regions[1]).rect.y0, metrics.band_height());
        assert_eq!(h.root().rect.width(), 800.0);
    }

    #[test]
    fn actual_height_matches_band_accounting() {
        let mut aligned = align(&single_group(), 2).unwrap();
        let m = solve(&mut aligned, 120.0, 640.0, 45.0);
        let expected = (m.levels - 1) as f64 * m.cell_height / 2.0
            + m.map_cell_height * m.map_height as f64;
        assert_eq!(m.actual_height, expected);
    }

    #[test]
    fn oversized_headers_collapse_leaf_rows() {
        let mut aligned = align(&single_group(), 5).unwrap();
        let m = solve(&mut aligned, 300.0, 60.0, 45.0);
        assert!(m.header_floor_applied);
        assert_eq!(m.map_cell_height, 0.0);
        assert_eq!(m.actual_height, 90.0);
        for id in aligned.hierarchy.leaves() {
            assert_eq!(aligned.hierarchy.node(id).rect.height(), 0.0);
        }
    }
}
