use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub caption_font_size: f32,
    pub edge_label_font_size: f32,
    pub node_fill: String,
    pub node_border: String,
    pub node_text_color: String,
    pub anchor_color: String,
    pub line_color: String,
    pub line_width: f32,
    pub edge_label_color: String,
    pub edge_label_background: String,
    pub background: String,
}

impl Theme {
    /// Blue module blocks on a light grey canvas.
    pub fn workflow() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 14.0,
            caption_font_size: 11.0,
            edge_label_font_size: 12.0,
            node_fill: "#4A90E2".to_string(),
            node_border: "#2A5CAA".to_string(),
            node_text_color: "#FFFFFF".to_string(),
            anchor_color: "#2A5CAA".to_string(),
            line_color: "#555555".to_string(),
            line_width: 2.0,
            edge_label_color: "#333333".to_string(),
            edge_label_background: "#FFFFFF".to_string(),
            background: "#F0F0F0".to_string(),
        }
    }

    pub fn light() -> Self {
        Self {
            font_family: "\"trebuchet ms\", verdana, arial, sans-serif".to_string(),
            font_size: 14.0,
            caption_font_size: 11.0,
            edge_label_font_size: 12.0,
            node_fill: "#F8FAFF".to_string(),
            node_border: "#C7D2E5".to_string(),
            node_text_color: "#1C2430".to_string(),
            anchor_color: "#7A8AA6".to_string(),
            line_color: "#7A8AA6".to_string(),
            line_width: 1.4,
            edge_label_color: "#1C2430".to_string(),
            edge_label_background: "#FFFFFF".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "workflow" | "default" => Some(Self::workflow()),
            "light" | "base" => Some(Self::light()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::workflow()
    }
}
