use hheatmap::config::{Config, parse_config};
use hheatmap::layout_dump::LayoutDump;
use hheatmap::{Hierarchy, TreeNode, compute_heatmap_layout, configured_legend, render_heatmap_svg};
use wasm_bindgen::prelude::*;

fn to_js(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn load_inputs(tree_json: &str, options_json: Option<String>) -> Result<(TreeNode, Config), JsValue> {
    let tree: TreeNode = serde_json::from_str(tree_json).map_err(to_js)?;
    let config = match options_json {
        Some(raw) => parse_config(&raw).map_err(to_js)?,
        None => Config::default(),
    };
    Ok((tree, config))
}

/// Render a tree given as JSON into an SVG string. `options_json` uses the
/// same shape as the CLI config file.
#[wasm_bindgen]
pub fn render_heatmap(tree_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let (tree, config) = load_inputs(tree_json, options_json)?;
    render_heatmap_svg(&tree, &config).map_err(to_js)
}

/// Node rectangles, colors, and legend as JSON, for callers that draw
/// the heatmap themselves.
#[wasm_bindgen]
pub fn layout_heatmap(tree_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let (tree, config) = load_inputs(tree_json, options_json)?;
    let layout =
        compute_heatmap_layout(&Hierarchy::from_tree(&tree), &config.heatmap).map_err(to_js)?;
    let legend = configured_legend(&layout, &config).map_err(to_js)?;
    serde_json::to_string(&LayoutDump::from_layout(&layout, legend.as_ref())).map_err(to_js)
}
