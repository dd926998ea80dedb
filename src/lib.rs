pub mod config;
pub mod contract;
pub mod interaction;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod text_metrics;
pub mod theme;
pub mod workflow;

#[cfg(feature = "cli")]
pub mod cli;

#[cfg(feature = "cli")]
pub use cli::run;

pub use config::{Config, LayoutConfig, NodeSize, RenderConfig, ViewportConfig};
pub use contract::{Scene, build_scene};
pub use interaction::{InteractionError, InteractionState, SurfaceSize, Viewport};
pub use ir::{Direction, Edge, Graph, Node};
pub use layout::{LayoutedEdge, LayoutedGraph, LayoutedNode, Point, Rect, compute_layout};
pub use render::render_svg;
pub use theme::Theme;
pub use workflow::{
    MalformedWorkflowError, WorkflowDocument, WorkflowError, adapt, parse_workflow, to_document,
};

/// Everything a one-shot render needs besides the workflow itself.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub viewport: ViewportConfig,
    pub render: RenderConfig,
}

impl RenderOptions {
    pub fn workflow() -> Self {
        Self::default()
    }

    pub fn light() -> Self {
        let theme = Theme::light();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..RenderConfig::default()
        };
        Self {
            theme,
            render,
            ..Self::default()
        }
    }
}

impl From<Config> for RenderOptions {
    fn from(config: Config) -> Self {
        Self {
            theme: config.theme,
            layout: config.layout,
            viewport: config.viewport,
            render: config.render,
        }
    }
}

/// Lays out a workflow and frames it on a fresh interaction session.
pub fn scene_for_graph(graph: &Graph, options: &RenderOptions) -> (LayoutedGraph, InteractionState, Scene) {
    let layout = compute_layout(graph, &options.layout);
    let mut state = InteractionState::new(&layout, &options.viewport);
    state.fit_view(
        layout.bounds(),
        SurfaceSize {
            width: options.render.width,
            height: options.render.height,
        },
    );
    let scene = build_scene(&layout, &state);
    (layout, state, scene)
}

/// Parses workflow JSON and renders it to SVG.
pub fn render_workflow_svg(input: &str, options: &RenderOptions) -> Result<String, WorkflowError> {
    let graph = parse_workflow(input)?;
    let (_, _, scene) = scene_for_graph(&graph, options);
    Ok(render_svg(&scene, &options.theme, &options.render))
}
