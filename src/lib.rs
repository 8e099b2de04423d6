#[cfg(feature = "cli")]
pub mod cli;
pub mod color;
pub mod config;
pub mod format;
pub mod layout;
pub mod layout_dump;
pub mod legend;
pub mod render;
pub mod theme;
pub mod tree;

#[cfg(feature = "cli")]
pub use cli::run;
pub use color::{Color, ColorRamp, ColorScale};
pub use config::{Config, HeatmapConfig, RenderConfig};
pub use format::NumberFormat;
pub use layout::{HeatmapLayout, LayoutError, LayoutMetrics, align, compute_heatmap_layout};
pub use legend::{Legend, LegendCell, compute_legend};
pub use render::render_svg;
pub use theme::Theme;
pub use tree::{Hierarchy, HierarchyNode, NodeId, TreeNode};

/// Legend as configured by `config.render`, or `None` when disabled.
pub fn configured_legend(layout: &HeatmapLayout, config: &Config) -> anyhow::Result<Option<Legend>> {
    if !config.render.show_legend {
        return Ok(None);
    }
    let format = NumberFormat::parse(&config.render.legend_format)?;
    let legend = compute_legend(
        layout,
        &config.heatmap,
        config.render.legend_segments,
        &format,
    )?;
    Ok(Some(legend))
}

/// Lay out `tree` and render it, legend included when enabled, as an SVG string.
pub fn render_heatmap_svg(tree: &TreeNode, config: &Config) -> anyhow::Result<String> {
    let layout = compute_heatmap_layout(&Hierarchy::from_tree(tree), &config.heatmap)?;
    let legend = configured_legend(&layout, config)?;
    Ok(render_svg(&layout, legend.as_ref(), &config.theme, &config.render))
}
