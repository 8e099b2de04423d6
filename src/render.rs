use crate::config::RenderConfig;
use crate::layout::HeatmapLayout;
use crate::legend::Legend;
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

/// Rough glyph advance used to decide whether a header label fits its band.
const CHAR_WIDTH_RATIO: f64 = 0.6;

pub fn render_svg(
    layout: &HeatmapLayout,
    legend: Option<&Legend>,
    theme: &Theme,
    config: &RenderConfig,
) -> String {
    let mut svg = String::new();
    let width = layout.width().max(legend.map(|l| l.width).unwrap_or(0.0));
    let legend_block = match legend {
        Some(l) if !l.cells.is_empty() => {
            config.legend_gap + config.legend_height + theme.font_size * 1.5
        }
        _ => 0.0,
    };
    let height = layout.actual_height() + legend_block;

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"0 0 {width:.2} {height:.2}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        config.background
    ));

    for node in layout.nodes() {
        let rect = node.rect;
        let fill = node.color.map(|c| c.to_hex()).unwrap_or_default();
        match (node.is_leaf(), node.value(), node.circle) {
            (true, Some(_), Some(circle)) => {
                svg.push_str(&format!(
                    "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{}\"/>",
                    rect.x0 + circle.cx,
                    rect.y0 + circle.cy,
                    circle.r,
                    fill
                ));
            }
            (true, _, _) => {
                svg.push_str(&format!(
                    "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"/>",
                    rect.x0,
                    rect.y0,
                    rect.width(),
                    rect.height(),
                    fill
                ));
            }
            (false, _, _) => {
                svg.push_str(&format!(
                    "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
                    rect.x0,
                    rect.y0,
                    rect.width(),
                    rect.height(),
                    fill,
                    theme.stroke_color
                ));
                if let Some(name) = node.name().filter(|_| config.show_labels) {
                    let estimated = name.chars().count() as f64 * theme.font_size * CHAR_WIDTH_RATIO;
                    if estimated <= rect.width() && theme.font_size <= rect.height() {
                        svg.push_str(&text_svg(
                            rect.x0 + rect.width() / 2.0,
                            rect.y0 + rect.height() / 2.0,
                            name,
                            &theme.header_text_color,
                            theme,
                        ));
                    }
                }
            }
        }
    }

    if let Some(legend) = legend.filter(|l| !l.cells.is_empty()) {
        let top = layout.actual_height() + config.legend_gap;
        for cell in &legend.cells {
            svg.push_str(&format!(
                "<rect x=\"{:.2}\" y=\"{top:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"/>",
                cell.x,
                cell.width,
                config.legend_height,
                cell.color.to_hex()
            ));
            svg.push_str(&text_svg(
                cell.x + cell.width / 2.0,
                top + config.legend_height + theme.font_size * 0.75,
                &cell.label,
                &theme.text_color,
                theme,
            ));
        }
    }

    svg.push_str("</svg>");
    svg
}

fn text_svg(x: f64, y: f64, text: &str, fill: &str, theme: &Theme) -> String {
    format!(
        "<text x=\"{x:.2}\" y=\"{y:.2}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
        escape_xml(&theme.font_family),
        theme.font_size,
        fill,
        escape_xml(text)
    )
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = theme
        .font_family
        .split(',')
        .next()
        .map(|family| family.trim().trim_matches('"').to_string())
        .unwrap_or_else(|| "Inter".to_string());
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
