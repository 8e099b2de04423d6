use crate::config::{Config, load_config};
use crate::configured_legend;
use crate::layout::compute_heatmap_layout;
use crate::layout_dump::write_layout_dump;
use crate::render::{render_svg, write_output_svg};
use crate::tree::{Hierarchy, TreeNode};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "hhmap", version, about = "Hierarchical heatmap layout and renderer")]
pub struct Args {
    /// Input tree (.json / .json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for SVG and JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config file (JSON or JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Canvas width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f64>,

    /// Canvas height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f64>,

    /// Inset applied to every cell
    #[arg(short = 'p', long = "padding")]
    pub padding: Option<f64>,

    /// Rows per leaf grid
    #[arg(short = 'm', long = "mapHeight")]
    pub map_height: Option<usize>,

    /// Number of legend segments
    #[arg(short = 's', long = "segments")]
    pub segments: Option<usize>,

    /// Legend label format, e.g. ".2s" or ",.0f"
    #[arg(short = 'f', long = "format")]
    pub format: Option<String>,

    /// Skip the legend
    #[arg(long = "noLegend")]
    pub no_legend: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = apply_overrides(load_config(args.config.as_deref())?, &args);

    let input = read_input(args.input.as_deref())?;
    let tree: TreeNode = json5::from_str(&input)?;
    let hierarchy = Hierarchy::from_tree(&tree);

    let layout = compute_heatmap_layout(&hierarchy, &config.heatmap)?;
    if layout.actual_height() > config.heatmap.height {
        eprintln!(
            "warning: header bands need {:.0}px, taller than the requested {:.0}px",
            layout.actual_height(),
            config.heatmap.height
        );
    }

    let legend = configured_legend(&layout, &config)?;

    match args.output_format {
        OutputFormat::Svg => {
            let svg = render_svg(&layout, legend.as_ref(), &config.theme, &config.render);
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => write_png(&layout, legend.as_ref(), &config, args.output.as_deref())?,
        OutputFormat::Json => {
            write_layout_dump(args.output.as_deref(), &layout, legend.as_ref())?;
        }
    }

    Ok(())
}

#[cfg(feature = "png")]
fn write_png(
    layout: &crate::layout::HeatmapLayout,
    legend: Option<&crate::legend::Legend>,
    config: &Config,
    output: Option<&Path>,
) -> Result<()> {
    let output = output.ok_or_else(|| anyhow::anyhow!("Output path required for png output"))?;
    let svg = render_svg(layout, legend, &config.theme, &config.render);
    crate::render::write_output_png(&svg, output, &config.theme)
}

#[cfg(not(feature = "png"))]
fn write_png(
    _layout: &crate::layout::HeatmapLayout,
    _legend: Option<&crate::legend::Legend>,
    _config: &Config,
    _output: Option<&Path>,
) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn apply_overrides(mut config: Config, args: &Args) -> Config {
    if let Some(width) = args.width {
        config.heatmap.width = width;
    }
    if let Some(height) = args.height {
        config.heatmap.height = height;
    }
    if let Some(padding) = args.padding {
        config.heatmap.padding = padding;
    }
    if let Some(rows) = args.map_height {
        config.heatmap.map_height = rows;
    }
    if let Some(segments) = args.segments {
        config.render.legend_segments = segments;
    }
    if let Some(format) = &args.format {
        config.render.legend_format = format.clone();
    }
    if args.no_legend {
        config.render.show_legend = false;
    }
    config
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}
