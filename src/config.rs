use crate::color::{Color, ColorRamp};
use crate::layout::LayoutError;
use crate::theme::Theme;
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_GROUP_COLORS: [Color; 2] = [
    Color::rgb(16.0, 123.0, 171.0),
    Color::rgb(63.0, 149.0, 187.0),
];
pub const DEFAULT_CELL_COLORS: [Color; 2] = [
    Color::rgb(222.0, 231.0, 198.0),
    Color::rgb(102.0, 120.0, 72.0),
];
pub const DEFAULT_EMPTY_COLOR: Color = Color::rgb(238.0, 238.0, 238.0);

// `brighter` steps applied when a single seed color expands into a ramp.
pub const GROUP_SEED_BRIGHTNESS: f64 = 1.5;
pub const CELL_SEED_BRIGHTNESS: f64 = 2.0;

#[derive(Debug, Clone)]
pub struct HeatmapConfig {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
    pub legend_cell_width: f64,
    /// Requested rows per leaf grid; clamped to the largest group size.
    pub map_height: usize,
    /// Compared against `2 * min_header_height` since bands are half a cell.
    pub min_header_height: f64,
    pub group_colors: ColorRamp,
    pub cell_colors: ColorRamp,
    pub empty_color: Color,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            width: 720.0,
            height: 480.0,
            padding: 0.0,
            legend_cell_width: 30.0,
            map_height: 5,
            min_header_height: 45.0,
            group_colors: ColorRamp::Stops(DEFAULT_GROUP_COLORS.to_vec()),
            cell_colors: ColorRamp::Stops(DEFAULT_CELL_COLORS.to_vec()),
            empty_color: DEFAULT_EMPTY_COLOR,
        }
    }
}

impl HeatmapConfig {
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_legend_cell_width(mut self, width: f64) -> Self {
        self.legend_cell_width = width;
        self
    }

    pub fn with_map_height(mut self, rows: usize) -> Self {
        self.map_height = rows;
        self
    }

    pub fn with_min_header_height(mut self, height: f64) -> Self {
        self.min_header_height = height;
        self
    }

    pub fn with_group_colors(mut self, ramp: ColorRamp) -> Self {
        self.group_colors = ramp;
        self
    }

    pub fn with_group_seed(self, seed: Color) -> Self {
        self.with_group_colors(ColorRamp::from_seed(seed, GROUP_SEED_BRIGHTNESS))
    }

    pub fn with_cell_colors(mut self, ramp: ColorRamp) -> Self {
        self.cell_colors = ramp;
        self
    }

    pub fn with_cell_seed(self, seed: Color) -> Self {
        self.with_cell_colors(ColorRamp::from_seed(seed, CELL_SEED_BRIGHTNESS))
    }

    pub fn with_empty_color(mut self, color: Color) -> Self {
        self.empty_color = color;
        self
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        let valid_extent = |v: f64| v.is_finite() && v > 0.0;
        if !valid_extent(self.width) || !valid_extent(self.height) {
            return Err(LayoutError::InvalidSize {
                width: self.width,
                height: self.height,
            });
        }
        for (name, value) in [
            ("padding", self.padding),
            ("legend cell width", self.legend_cell_width),
            ("min header height", self.min_header_height),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(LayoutError::InvalidParameter { name, value });
            }
        }
        if self.map_height == 0 {
            return Err(LayoutError::InvalidMapHeight);
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub background: String,
    pub legend_segments: usize,
    pub legend_format: String,
    pub legend_gap: f64,
    pub legend_height: f64,
    pub show_labels: bool,
    pub show_legend: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background: "#FFFFFF".to_string(),
            legend_segments: 5,
            legend_format: ".2s".to_string(),
            legend_gap: 12.0,
            legend_height: 16.0,
            show_labels: true,
            show_legend: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub heatmap: HeatmapConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::classic();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            heatmap: HeatmapConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ColorsValue {
    Seed(String),
    Stops(Vec<String>),
}

impl ColorsValue {
    fn into_ramp(self, seed_brightness: f64) -> Result<ColorRamp, LayoutError> {
        match self {
            ColorsValue::Seed(seed) => Ok(ColorRamp::from_seed(
                Color::parse(&seed)?,
                seed_brightness,
            )),
            ColorsValue::Stops(stops) => ColorRamp::stops(
                stops
                    .iter()
                    .map(|s| Color::parse(s))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f64>,
    text_color: Option<String>,
    header_text_color: Option<String>,
    stroke_color: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct HeatmapConfigFile {
    width: Option<f64>,
    height: Option<f64>,
    padding: Option<f64>,
    legend_cell_width: Option<f64>,
    map_height: Option<usize>,
    min_header_height: Option<f64>,
    group_colors: Option<ColorsValue>,
    cell_colors: Option<ColorsValue>,
    empty_color: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    legend_segments: Option<usize>,
    legend_format: Option<String>,
    legend_gap: Option<f64>,
    legend_height: Option<f64>,
    show_labels: Option<bool>,
    show_legend: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    heatmap: Option<HeatmapConfigFile>,
    render: Option<RenderConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Merge a JSON (or JSON5) config document over the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = json5::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "dark" {
            config.theme = Theme::dark();
        } else if theme_name == "classic" || theme_name == "default" {
            config.theme = Theme::classic();
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.header_text_color {
            config.theme.header_text_color = v;
        }
        if let Some(v) = vars.stroke_color {
            config.theme.stroke_color = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
    }

    if let Some(heatmap) = parsed.heatmap {
        if let Some(v) = heatmap.width {
            config.heatmap.width = v;
        }
        if let Some(v) = heatmap.height {
            config.heatmap.height = v;
        }
        if let Some(v) = heatmap.padding {
            config.heatmap.padding = v;
        }
        if let Some(v) = heatmap.legend_cell_width {
            config.heatmap.legend_cell_width = v;
        }
        if let Some(v) = heatmap.map_height {
            config.heatmap.map_height = v;
        }
        if let Some(v) = heatmap.min_header_height {
            config.heatmap.min_header_height = v;
        }
        if let Some(v) = heatmap.group_colors {
            config.heatmap.group_colors = v.into_ramp(GROUP_SEED_BRIGHTNESS)?;
        }
        if let Some(v) = heatmap.cell_colors {
            config.heatmap.cell_colors = v.into_ramp(CELL_SEED_BRIGHTNESS)?;
        }
        if let Some(v) = heatmap.empty_color {
            config.heatmap.empty_color = Color::parse(&v)?;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.legend_segments {
            config.render.legend_segments = v;
        }
        if let Some(v) = render.legend_format {
            config.render.legend_format = v;
        }
        if let Some(v) = render.legend_gap {
            config.render.legend_gap = v;
        }
        if let Some(v) = render.legend_height {
            config.render.legend_height = v;
        }
        if let Some(v) = render.show_labels {
            config.render.show_labels = v;
        }
        if let Some(v) = render.show_legend {
            config.render.show_legend = v;
        }
    }

    config.render.background = config.theme.background.clone();

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = HeatmapConfig::default();
        assert_eq!(config.padding, 0.0);
        assert_eq!(config.legend_cell_width, 30.0);
        assert_eq!(config.map_height, 5);
        assert_eq!(config.min_header_height, 45.0);
        assert_eq!(config.empty_color.to_hex(), "#eeeeee");
        assert_eq!(config.group_colors.sample(0.0).to_hex(), "#107bab");
        assert_eq!(config.cell_colors.sample(1.0).to_hex(), "#667848");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn seed_colors_expand_to_brighter_gradient() {
        let seed = Color::parse("#336699").unwrap();
        let config = HeatmapConfig::default().with_cell_seed(seed);
        let end = config.cell_colors.sample(1.0);
        assert_eq!(end.to_rgb8(), seed.brighter(CELL_SEED_BRIGHTNESS).to_rgb8());
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(matches!(
            HeatmapConfig::default().with_size(0.0, 10.0).validate(),
            Err(LayoutError::InvalidSize { .. })
        ));
        assert!(matches!(
            HeatmapConfig::default().with_padding(-1.0).validate(),
            Err(LayoutError::InvalidParameter { name: "padding", .. })
        ));
        assert_eq!(
            HeatmapConfig::default().with_map_height(0).validate(),
            Err(LayoutError::InvalidMapHeight)
        );
    }

    #[test]
    fn parses_config_file_overrides() {
        let config = parse_config(
            r##"{
                // JSON5 comments are accepted
                theme: "dark",
                themeVariables: { fontSize: 11 },
                heatmap: {
                    width: 400,
                    mapHeight: 3,
                    padding: 1.5,
                    groupColors: "#107bab",
                    cellColors: ["#000000", "#ffffff", "#ff0000"],
                    emptyColor: "lightgray",
                },
                render: { legendSegments: 8, showLabels: false },
            }"##,
        )
        .unwrap();
        assert_eq!(config.heatmap.width, 400.0);
        assert_eq!(config.heatmap.map_height, 3);
        assert_eq!(config.heatmap.padding, 1.5);
        assert_eq!(config.heatmap.empty_color.to_hex(), "#d3d3d3");
        assert_eq!(config.heatmap.cell_colors.sample(0.5).to_hex(), "#ffffff");
        assert_eq!(config.render.legend_segments, 8);
        assert!(!config.render.show_labels);
        assert_eq!(config.theme.font_size, 11.0);
        assert_eq!(config.render.background, Theme::dark().background);
    }

    #[test]
    fn rejects_malformed_colors() {
        let err = parse_config(r##"{"heatmap": {"emptyColor": "#zzz"}}"##).unwrap_err();
        assert!(err.to_string().contains("#zzz"));
    }
}
