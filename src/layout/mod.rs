mod align;
mod error;
mod finalize;
mod solve;

pub use align::{Alignment, align};
pub use error::LayoutError;
pub use solve::LayoutMetrics;

use finalize::{Palette, finalize};
use solve::solve;

use crate::color::ColorScale;
use crate::config::HeatmapConfig;
use crate::tree::{Hierarchy, HierarchyNode, NodeId};

/// A fully placed and colored heatmap.
#[derive(Debug, Clone)]
pub struct HeatmapLayout {
    pub hierarchy: Hierarchy,
    pub metrics: LayoutMetrics,
    /// Group-level nodes, left to right.
    pub groups: Vec<NodeId>,
    pub group_scale: ColorScale,
    pub cell_scale: ColorScale,
}

impl HeatmapLayout {
    /// Vertical extent actually used, which callers should size their canvas to.
    pub fn actual_height(&self) -> f64 {
        self.metrics.actual_height
    }

    pub fn width(&self) -> f64 {
        self.metrics.width
    }

    pub fn nodes(&self) -> impl Iterator<Item = &HierarchyNode> + '_ {
        self.hierarchy
            .descendants()
            .into_iter()
            .map(|id| self.hierarchy.node(id))
    }
}

/// Align, solve, build the color scales, then inset and color.
///
/// The input hierarchy is not modified; passing an already aligned hierarchy
/// with the same configuration reproduces the same geometry.
pub fn compute_heatmap_layout(
    tree: &Hierarchy,
    config: &HeatmapConfig,
) -> Result<HeatmapLayout, LayoutError> {
    config.validate()?;
    let mut alignment = align(tree, config.map_height)?;
    let metrics = solve(
        &mut alignment,
        config.width,
        config.height,
        config.min_header_height,
    );

    let (group_scale, cell_scale) = build_scales(&alignment.hierarchy, config);
    finalize(
        &mut alignment.hierarchy,
        alignment.levels,
        config.padding,
        &Palette {
            group: &group_scale,
            cell: &cell_scale,
            empty: config.empty_color,
        },
    );

    Ok(HeatmapLayout {
        hierarchy: alignment.hierarchy,
        metrics,
        groups: alignment.groups,
        group_scale,
        cell_scale,
    })
}

/// Group colors are keyed by depth over `[0, root.height - 1]`; cell colors
/// by value over the extent of observed leaf values.
fn build_scales(hierarchy: &Hierarchy, config: &HeatmapConfig) -> (ColorScale, ColorScale) {
    let root_height = hierarchy.root().height;
    let group_domain = if root_height <= 1 {
        [0.0, 0.0]
    } else {
        [0.0, (root_height - 1) as f64]
    };
    let cell_domain = hierarchy
        .value_extent()
        .map(|(lo, hi)| [lo, hi])
        .unwrap_or([0.0, 0.0]);
    (
        ColorScale::new(config.group_colors.clone(), group_domain),
        ColorScale::new(config.cell_colors.clone(), cell_domain),
    )
}
