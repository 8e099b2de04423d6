use serde::{Deserialize, Serialize};

/// Presentation settings for the SVG renderer. Cell and group fills come from
/// the color scales, not from here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f64,
    pub text_color: String,
    pub header_text_color: String,
    pub stroke_color: String,
    pub background: String,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "\"trebuchet ms\", verdana, arial, sans-serif".to_string(),
            font_size: 12.0,
            text_color: "#333333".to_string(),
            header_text_color: "#FFFFFF".to_string(),
            stroke_color: "#FFFFFF".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn dark() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 12.0,
            text_color: "#D7E0F0".to_string(),
            header_text_color: "#F8FAFF".to_string(),
            stroke_color: "#1C2430".to_string(),
            background: "#11161F".to_string(),
        }
    }
}
