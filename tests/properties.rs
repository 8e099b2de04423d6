use hheatmap::color::{Color, ColorRamp, ColorScale};
use hheatmap::legend::{OPEN_CEILING, bucket_boundaries, nice_floor};
use hheatmap::{
    HeatmapConfig, HeatmapLayout, Hierarchy, NumberFormat, TreeNode, compute_heatmap_layout,
    compute_legend,
};
use proptest::prelude::*;

fn build_tree(groups: &[Vec<Option<f64>>]) -> TreeNode {
    TreeNode::branch(
        "root",
        groups
            .iter()
            .enumerate()
            .map(|(g, leaves)| {
                TreeNode::branch(
                    format!("g{g}"),
                    leaves
                        .iter()
                        .enumerate()
                        .map(|(i, value)| match value {
                            Some(v) => TreeNode::leaf(format!("g{g}-{i}"), *v),
                            None => TreeNode::unobserved(format!("g{g}-{i}")),
                        })
                        .collect(),
                )
            })
            .collect(),
    )
}

fn groups_strategy() -> impl Strategy<Value = Vec<Vec<Option<f64>>>> {
    prop::collection::vec(
        prop::collection::vec(prop::option::weighted(0.8, -1.0e6f64..1.0e6), 1..12),
        1..6,
    )
}

fn tolerance(layout: &HeatmapLayout) -> f64 {
    1e-9 * layout.width().max(layout.actual_height()).max(1.0)
}

proptest! {
    #[test]
    fn prop_layout_invariants(
        groups in groups_strategy(),
        width in 50.0f64..2000.0,
        height in 50.0f64..2000.0,
        map_height in 1usize..8,
    ) {
        let config = HeatmapConfig::default()
            .with_size(width, height)
            .with_map_height(map_height);
        let layout = compute_heatmap_layout(&Hierarchy::from_tree(&build_tree(&groups)), &config)
            .unwrap();
        let eps = tolerance(&layout);

        let widest = groups.iter().map(Vec::len).max().unwrap_or(0);
        let rows = map_height.min(widest);
        let cells = widest.div_ceil(rows) * rows;
        prop_assert_eq!(layout.metrics.map_height, rows);
        for &group in &layout.groups {
            prop_assert_eq!(layout.hierarchy.node(group).children.len(), cells);
        }

        for node in layout.nodes() {
            let Some(parent) = node.parent else { continue };
            let outer = layout.hierarchy.node(parent).rect;
            prop_assert!(node.rect.x0 >= outer.x0 - eps);
            prop_assert!(node.rect.x1 <= outer.x1 + eps);
            prop_assert!(node.rect.y0 >= outer.y1 - eps);
        }

        let root = layout.hierarchy.root().rect;
        prop_assert!((root.width() - width).abs() <= eps);

        let bottom = layout.nodes().map(|n| n.rect.y1).fold(f64::NEG_INFINITY, f64::max);
        prop_assert!((bottom - layout.actual_height()).abs() <= eps);
        prop_assert!(layout.actual_height() >= 0.0);
    }

    #[test]
    fn prop_legend_covers_every_value(groups in groups_strategy(), segments in 1usize..12) {
        let config = HeatmapConfig::default();
        let layout = compute_heatmap_layout(&Hierarchy::from_tree(&build_tree(&groups)), &config)
            .unwrap();
        let legend = compute_legend(&layout, &config, segments, &NumberFormat::default()).unwrap();
        for value in layout.hierarchy.leaf_values() {
            let hits = legend
                .cells
                .iter()
                .filter(|c| value >= c.floor && value < c.ceiling)
                .count();
            prop_assert_eq!(hits, 1);
        }
        for pair in legend.cells.windows(2) {
            prop_assert!(pair[0].floor < pair[1].floor);
        }
    }

    #[test]
    fn prop_buckets_are_contiguous(
        min in -1.0e6f64..1.0e6,
        span in 1.0e-3f64..1.0e6,
        segments in 1usize..20,
    ) {
        let max = min + span;
        prop_assume!(max > min);
        let buckets = bucket_boundaries(min, max, segments).unwrap();
        prop_assert_eq!(buckets[0].floor, min);
        for pair in buckets.windows(2) {
            prop_assert!(pair[0].floor < pair[1].floor);
            prop_assert_eq!(pair[0].ceiling, pair[1].floor);
        }
        let last = buckets[buckets.len() - 1];
        prop_assert_eq!(last.floor, max);
        prop_assert_eq!(last.ceiling, OPEN_CEILING);
    }

    #[test]
    fn prop_nice_floor_stays_within_one_digit(value in -1.0e9f64..1.0e9) {
        prop_assume!(value.abs() > 1e-6);
        let rounded = nice_floor(value);
        prop_assert!(rounded <= value + value.abs() * 1e-9);
        prop_assert!(value - rounded <= value.abs() / 10.0 + value.abs() * 1e-9);
    }

    #[test]
    fn prop_scale_output_stays_between_stops(value in -1.0e4f64..1.0e4) {
        let low = Color::rgb(16.0, 123.0, 171.0);
        let high = Color::rgb(222.0, 231.0, 198.0);
        let scale = ColorScale::new(ColorRamp::Stops(vec![low, high]), [-100.0, 100.0]);
        let color = scale.apply(value);
        for (c, a, b) in [(color.r, low.r, high.r), (color.g, low.g, high.g), (color.b, low.b, high.b)] {
            prop_assert!(c >= a.min(b) - 1e-9 && c <= a.max(b) + 1e-9);
        }
    }
}
