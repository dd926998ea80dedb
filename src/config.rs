use crate::ir::Direction;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeSize {
    pub width: f32,
    pub height: f32,
}

impl NodeSize {
    /// Extent along the rank axis.
    pub fn along(&self, direction: Direction) -> f32 {
        if direction.is_horizontal() {
            self.width
        } else {
            self.height
        }
    }

    /// Extent across the rank axis.
    pub fn cross(&self, direction: Direction) -> f32 {
        if direction.is_horizontal() {
            self.height
        } else {
            self.width
        }
    }
}

impl Default for NodeSize {
    fn default() -> Self {
        Self {
            width: 180.0,
            height: 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub direction: Direction,
    pub node_size: NodeSize,
    pub rank_separation: f32,
    pub node_separation: f32,
    /// Upper bound on barycenter sweeps; never fewer than four are allowed.
    pub max_sweeps: usize,
}

impl LayoutConfig {
    pub const MIN_SWEEPS: usize = 4;

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn sweep_cap(&self) -> usize {
        self.max_sweeps.max(Self::MIN_SWEEPS)
    }

    /// Distance between consecutive ranks along the layout axis.
    pub fn rank_step(&self) -> f32 {
        self.node_size.along(self.direction) + self.rank_separation
    }

    /// Distance between neighbours within a rank.
    pub fn order_step(&self) -> f32 {
        self.node_size.cross(self.direction) + self.node_separation
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            direction: Direction::TopToBottom,
            node_size: NodeSize::default(),
            rank_separation: 120.0,
            node_separation: 60.0,
            max_sweeps: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Fraction of the content size kept as margin when fitting the view.
    pub fit_padding: f32,
}

impl ViewportConfig {
    /// Clamps `zoom` into range. An inverted or NaN bound never panics: the
    /// upper bound wins and NaN bounds are ignored.
    pub fn clamp_zoom(&self, zoom: f32) -> f32 {
        zoom.max(self.min_zoom).min(self.max_zoom)
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.2,
            max_zoom: 2.0,
            fit_padding: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: "#F0F0F0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub viewport: ViewportConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] json5::Error),
    #[error("unknown theme `{0}`")]
    UnknownTheme(String),
    #[error("invalid viewport: min zoom {min} exceeds max zoom {max}")]
    ZoomRange { min: f32, max: f32 },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    primary_color: Option<String>,
    primary_border_color: Option<String>,
    primary_text_color: Option<String>,
    line_color: Option<String>,
    edge_label_background: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    direction: Option<Direction>,
    node_width: Option<f32>,
    node_height: Option<f32>,
    rank_separation: Option<f32>,
    node_separation: Option<f32>,
    max_sweeps: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ViewportConfigFile {
    min_zoom: Option<f32>,
    max_zoom: Option<f32>,
    fit_padding: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    viewport: Option<ViewportConfigFile>,
}

/// Loads defaults, then applies overrides from an optional JSON or JSON5 file.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> Result<Config, ConfigError> {
    let mut config = Config::default();
    let parsed: ConfigFile = json5::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme =
            Theme::by_name(theme_name).ok_or_else(|| ConfigError::UnknownTheme(theme_name.to_string()))?;
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.primary_color {
            config.theme.node_fill = v;
        }
        if let Some(v) = vars.primary_border_color {
            config.theme.anchor_color = v.clone();
            config.theme.node_border = v;
        }
        if let Some(v) = vars.primary_text_color {
            config.theme.node_text_color = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.edge_label_background {
            config.theme.edge_label_background = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
    }
    config.render.background = config.theme.background.clone();

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.direction {
            config.layout.direction = v;
        }
        if let Some(v) = layout.node_width {
            config.layout.node_size.width = v.max(1.0);
        }
        if let Some(v) = layout.node_height {
            config.layout.node_size.height = v.max(1.0);
        }
        if let Some(v) = layout.rank_separation {
            config.layout.rank_separation = v.max(0.0);
        }
        if let Some(v) = layout.node_separation {
            config.layout.node_separation = v.max(0.0);
        }
        if let Some(v) = layout.max_sweeps {
            config.layout.max_sweeps = v;
        }
    }

    if let Some(viewport) = parsed.viewport {
        if let Some(v) = viewport.min_zoom {
            config.viewport.min_zoom = v;
        }
        if let Some(v) = viewport.max_zoom {
            config.viewport.max_zoom = v;
        }
        if let Some(v) = viewport.fit_padding {
            config.viewport.fit_padding = v.max(0.0);
        }
        let (min, max) = (config.viewport.min_zoom, config.viewport.max_zoom);
        if !(min > 0.0 && min <= max) {
            return Err(ConfigError::ZoomRange { min, max });
        }
    }

    Ok(config)
}
