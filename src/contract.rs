//! Toolkit-independent description of what a rendering surface draws.
//!
//! A surface that draws every [`NodeView`] and [`EdgeView`] of a [`Scene`] as
//! described, and honours its [`InteractionPolicy`], renders a workflow
//! faithfully. Positions already include the session's drag overrides.

use std::collections::HashMap;

use serde::Serialize;

use crate::config::ViewportConfig;
use crate::interaction::{InteractionState, Viewport};
use crate::ir::Direction;
use crate::layout::{LayoutedGraph, Point, Rect};

const FALLBACK_CAPTION: &str = "module";
const ARROW_SIZE: f32 = 12.0;
const LOOP_REACH: f32 = 40.0;
const EDGE_STROKE: &str = "#555555";
const EDGE_STROKE_WIDTH: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    fn point_on(self, rect: &Rect) -> Point {
        let center = rect.center();
        match self {
            Side::Top => Point::new(center.x, rect.y),
            Side::Bottom => Point::new(center.x, rect.bottom()),
            Side::Left => Point::new(rect.x, center.y),
            Side::Right => Point::new(rect.right(), center.y),
        }
    }

    /// Unit vector pointing away from the node.
    fn normal(self) -> (f32, f32) {
        match self {
            Side::Top => (0.0, -1.0),
            Side::Bottom => (0.0, 1.0),
            Side::Left => (-1.0, 0.0),
            Side::Right => (1.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AnchorKind {
    /// Edge targets attach here.
    Incoming,
    /// Edge sources attach here.
    Outgoing,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Anchor {
    pub kind: AnchorKind,
    pub side: Side,
    pub point: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeView {
    pub id: String,
    pub label: String,
    pub caption: String,
    pub bounds: Rect,
    pub incoming: Anchor,
    pub outgoing: Anchor,
    pub draggable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarkerKind {
    ArrowClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Marker {
    pub kind: MarkerKind,
    pub width: f32,
    pub height: f32,
}

impl Default for Marker {
    fn default() -> Self {
        Self {
            kind: MarkerKind::ArrowClosed,
            width: ARROW_SIZE,
            height: ARROW_SIZE,
        }
    }
}

/// Suggested connector stroke for surfaces without a palette of their own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrokeHint {
    pub color: String,
    pub width: f32,
}

impl Default for StrokeHint {
    fn default() -> Self {
        Self {
            color: EDGE_STROKE.to_string(),
            width: EDGE_STROKE_WIDTH,
        }
    }
}

/// Cubic Bézier connector from a source anchor to a target anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EdgePath {
    pub from: Point,
    pub control1: Point,
    pub control2: Point,
    pub to: Point,
}

impl EdgePath {
    pub fn point_at(&self, t: f32) -> Point {
        let u = 1.0 - t;
        let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
        Point::new(
            a * self.from.x + b * self.control1.x + c * self.control2.x + d * self.to.x,
            a * self.from.y + b * self.control1.y + c * self.control2.y + d * self.to.y,
        )
    }

    pub fn midpoint(&self) -> Point {
        self.point_at(0.5)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeView {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: String,
    pub path: EdgePath,
    pub marker: Marker,
    pub stroke: StrokeHint,
    pub animated: bool,
    pub self_loop: bool,
}

/// What the viewer lets the user do.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionPolicy {
    pub nodes_draggable: bool,
    pub nodes_connectable: bool,
    pub edges_deletable: bool,
    pub elements_selectable: bool,
    pub pan_on_scroll: bool,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub fit_view_padding: f32,
}

impl InteractionPolicy {
    pub fn from_config(config: &ViewportConfig) -> Self {
        Self {
            nodes_draggable: true,
            nodes_connectable: false,
            edges_deletable: false,
            elements_selectable: true,
            pan_on_scroll: true,
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            fit_view_padding: config.fit_padding,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub direction: Direction,
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
    pub bounds: Rect,
    pub viewport: Viewport,
    pub policy: InteractionPolicy,
}

/// Caption under the node label: the last `/` segment of the module
/// reference, or `"module"` when that segment is empty.
pub fn caption_for_ref(reference: &str) -> String {
    match reference.rsplit('/').next() {
        Some(segment) if !segment.is_empty() => segment.to_string(),
        _ => FALLBACK_CAPTION.to_string(),
    }
}

pub fn edge_label(source_port: &str, target_port: &str) -> String {
    format!("{source_port} → {target_port}")
}

/// Anchor sides for a direction: edges leave through the far side of the
/// rank axis and enter through the near side.
pub fn anchor_sides(direction: Direction) -> (Side, Side) {
    match direction {
        Direction::TopToBottom => (Side::Top, Side::Bottom),
        Direction::LeftToRight => (Side::Left, Side::Right),
    }
}

pub fn build_scene(layout: &LayoutedGraph, state: &InteractionState) -> Scene {
    let (incoming_side, outgoing_side) = anchor_sides(layout.direction);

    let nodes: Vec<NodeView> = layout
        .nodes
        .iter()
        .map(|node| {
            let center = state
                .rendered_position(layout, &node.node.id)
                .unwrap_or(node.position);
            let bounds = Rect::centered(center, layout.node_size);
            NodeView {
                id: node.node.id.clone(),
                label: node.node.label.clone(),
                caption: caption_for_ref(&node.node.reference),
                bounds,
                incoming: Anchor {
                    kind: AnchorKind::Incoming,
                    side: incoming_side,
                    point: incoming_side.point_on(&bounds),
                },
                outgoing: Anchor {
                    kind: AnchorKind::Outgoing,
                    side: outgoing_side,
                    point: outgoing_side.point_on(&bounds),
                },
                draggable: true,
            }
        })
        .collect();

    let edges: Vec<EdgeView> = {
        let by_id: HashMap<&str, &NodeView> =
            nodes.iter().map(|node| (node.id.as_str(), node)).collect();
        layout
            .edges
            .iter()
            .filter_map(|edge| {
                let source = *by_id.get(edge.edge.source.as_str())?;
                let target = *by_id.get(edge.edge.target.as_str())?;
                let path = if edge.self_loop {
                    loop_path(source, layout.direction)
                } else {
                    connector_path(&source.outgoing, &target.incoming)
                };
                Some(EdgeView {
                    id: edge.edge.id.clone(),
                    source: edge.edge.source.clone(),
                    target: edge.edge.target.clone(),
                    label: edge_label(&edge.edge.source_port, &edge.edge.target_port),
                    path,
                    marker: Marker::default(),
                    stroke: StrokeHint::default(),
                    animated: false,
                    self_loop: edge.self_loop,
                })
            })
            .collect()
    };

    let rects: Vec<Rect> = nodes.iter().map(|node| node.bounds).collect();
    Scene {
        direction: layout.direction,
        bounds: Rect::enclosing(&rects).unwrap_or_default(),
        nodes,
        edges,
        viewport: state.viewport(),
        policy: InteractionPolicy::from_config(state.config()),
    }
}

fn connector_path(from: &Anchor, to: &Anchor) -> EdgePath {
    let reach = ((to.point.x - from.point.x).abs() + (to.point.y - from.point.y).abs()) * 0.25;
    let reach = reach.max(ARROW_SIZE * 2.0);
    let (fx, fy) = from.side.normal();
    let (tx, ty) = to.side.normal();
    EdgePath {
        from: from.point,
        control1: from.point.offset(fx * reach, fy * reach),
        control2: to.point.offset(tx * reach, ty * reach),
        to: to.point,
    }
}

/// Self-loops leave the outgoing anchor and swing around the node's trailing
/// side back into the incoming anchor.
fn loop_path(node: &NodeView, direction: Direction) -> EdgePath {
    let side = match direction {
        Direction::TopToBottom => Side::Right,
        Direction::LeftToRight => Side::Bottom,
    };
    let (nx, ny) = side.normal();
    let extent = match direction {
        Direction::TopToBottom => node.bounds.width / 2.0,
        Direction::LeftToRight => node.bounds.height / 2.0,
    } + LOOP_REACH;
    EdgePath {
        from: node.outgoing.point,
        control1: node.outgoing.point.offset(nx * extent, ny * extent),
        control2: node.incoming.point.offset(nx * extent, ny * extent),
        to: node.incoming.point,
    }
}
