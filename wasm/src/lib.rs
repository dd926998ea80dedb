use serde::Deserialize;
use wasm_bindgen::prelude::*;
use workflow_viz::layout_dump::LayoutDump;
use workflow_viz::{
    Direction, InteractionState, LayoutedGraph, Point, RenderOptions, SurfaceSize, build_scene,
    compute_layout, parse_workflow, render_svg, scene_for_graph,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkflowRenderOptions {
    theme: Option<String>,
    direction: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    width: Option<f32>,
    height: Option<f32>,
}

fn parse_options(options_json: Option<String>) -> Result<WorkflowRenderOptions, String> {
    match options_json {
        Some(raw) => serde_json::from_str(&raw).map_err(|error| error.to_string()),
        None => Ok(WorkflowRenderOptions::default()),
    }
}

fn build_render_options(options: WorkflowRenderOptions) -> Result<RenderOptions, String> {
    let mut render_options = if options.theme.as_deref() == Some("light") {
        RenderOptions::light()
    } else {
        RenderOptions::workflow()
    };

    if let Some(direction) = options.direction.as_deref() {
        render_options.layout.direction =
            Direction::from_token(direction).ok_or_else(|| format!("unknown direction `{direction}`"))?;
    }
    if let Some(font_family) = options.font_family {
        render_options.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        render_options.theme.font_size = font_size;
    }
    if let Some(width) = options.width {
        render_options.render.width = width;
    }
    if let Some(height) = options.height {
        render_options.render.height = height;
    }
    Ok(render_options)
}

fn layout_json(code: &str, options_json: Option<String>) -> Result<String, String> {
    let options = build_render_options(parse_options(options_json)?)?;
    let graph = parse_workflow(code).map_err(|error| error.to_string())?;
    let layout = compute_layout(&graph, &options.layout);
    serde_json::to_string(&LayoutDump::from_layout(&layout)).map_err(|error| error.to_string())
}

fn svg(code: &str, options_json: Option<String>) -> Result<String, String> {
    let options = build_render_options(parse_options(options_json)?)?;
    workflow_viz::render_workflow_svg(code, &options).map_err(|error| error.to_string())
}

#[wasm_bindgen]
pub fn layout_workflow(code: &str, options_json: Option<String>) -> Result<String, JsValue> {
    layout_json(code, options_json).map_err(|error| JsValue::from_str(&error))
}

#[wasm_bindgen]
pub fn render_workflow_svg(code: &str, options_json: Option<String>) -> Result<String, JsValue> {
    svg(code, options_json).map_err(|error| JsValue::from_str(&error))
}

/// One interactive viewing session over a laid-out workflow.
#[wasm_bindgen]
pub struct WorkflowViewer {
    layout: LayoutedGraph,
    state: InteractionState,
    options: RenderOptions,
}

impl WorkflowViewer {
    fn open(code: &str, options_json: Option<String>) -> Result<Self, String> {
        let options = build_render_options(parse_options(options_json)?)?;
        let graph = parse_workflow(code).map_err(|error| error.to_string())?;
        let (layout, state, _) = scene_for_graph(&graph, &options);
        Ok(Self {
            layout,
            state,
            options,
        })
    }

    fn try_move(&mut self, id: &str, x: f32, y: f32) -> Result<(), String> {
        self.state
            .move_node(id, Point::new(x, y))
            .map_err(|error| error.to_string())
    }

    fn scene_string(&self) -> Result<String, String> {
        serde_json::to_string(&build_scene(&self.layout, &self.state)).map_err(|error| error.to_string())
    }
}

#[wasm_bindgen]
impl WorkflowViewer {
    #[wasm_bindgen(constructor)]
    pub fn new(code: &str, options_json: Option<String>) -> Result<WorkflowViewer, JsValue> {
        Self::open(code, options_json).map_err(|error| JsValue::from_str(&error))
    }

    pub fn move_node(&mut self, id: &str, x: f32, y: f32) -> Result<(), JsValue> {
        self.try_move(id, x, y).map_err(|error| JsValue::from_str(&error))
    }

    pub fn clear_override(&mut self, id: &str) -> bool {
        self.state.clear_override(id)
    }

    pub fn set_viewport(&mut self, x: f32, y: f32, zoom: f32) {
        self.state.set_viewport(Point::new(x, y), zoom);
    }

    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.state.pan_by(dx, dy);
    }

    pub fn zoom_at(&mut self, factor: f32, x: f32, y: f32) {
        self.state.zoom_at(factor, Point::new(x, y));
    }

    pub fn fit(&mut self, width: f32, height: f32) {
        self.state
            .fit_view(self.layout.bounds(), SurfaceSize { width, height });
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }

    pub fn zoom(&self) -> f32 {
        self.state.viewport().zoom
    }

    pub fn scene_json(&self) -> Result<String, JsValue> {
        self.scene_string().map_err(|error| JsValue::from_str(&error))
    }

    pub fn render_svg(&self) -> String {
        let scene = build_scene(&self.layout, &self.state);
        render_svg(&scene, &self.options.theme, &self.options.render)
    }
}
