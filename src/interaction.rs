use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use thiserror::Error;

use crate::config::ViewportConfig;
use crate::layout::{LayoutedGraph, Point, Rect};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InteractionError {
    #[error("unknown node {0}")]
    UnknownNode(String),
}

/// Screen transform: `screen = graph * zoom + pan`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub pan: Point,
    pub zoom: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: Point::default(),
            zoom: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    pub width: f32,
    pub height: f32,
}

/// Session-local, render-only state layered over a computed layout.
///
/// Dragged positions and the viewport live here; the [`LayoutedGraph`] is
/// only ever read.
#[derive(Debug, Clone)]
pub struct InteractionState {
    config: ViewportConfig,
    viewport: Viewport,
    overrides: BTreeMap<String, Point>,
    known: HashSet<String>,
}

impl InteractionState {
    pub fn new(layout: &LayoutedGraph, config: &ViewportConfig) -> Self {
        Self {
            config: config.clone(),
            viewport: Viewport::default(),
            overrides: BTreeMap::new(),
            known: layout.nodes.iter().map(|node| node.node.id.clone()).collect(),
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn overrides(&self) -> &BTreeMap<String, Point> {
        &self.overrides
    }

    /// Drags a node to `position` (its new centre).
    pub fn move_node(&mut self, id: &str, position: Point) -> Result<(), InteractionError> {
        if !self.known.contains(id) {
            return Err(InteractionError::UnknownNode(id.to_string()));
        }
        tracing::trace!(node = id, x = position.x, y = position.y, "move node");
        self.overrides.insert(id.to_string(), position);
        Ok(())
    }

    /// Drops a drag override so the node returns to its computed position.
    pub fn clear_override(&mut self, id: &str) -> bool {
        self.overrides.remove(id).is_some()
    }

    pub fn rendered_position(&self, layout: &LayoutedGraph, id: &str) -> Option<Point> {
        if let Some(point) = self.overrides.get(id) {
            return Some(*point);
        }
        layout.node(id).map(|node| node.position)
    }

    /// Sets pan and zoom; zoom is clamped to the configured range and a
    /// non-finite zoom leaves the current one in place.
    pub fn set_viewport(&mut self, pan: Point, zoom: f32) {
        if pan.x.is_finite() && pan.y.is_finite() {
            self.viewport.pan = pan;
        }
        if zoom.is_finite() {
            self.viewport.zoom = self.config.clamp_zoom(zoom);
        }
        tracing::trace!(
            pan_x = self.viewport.pan.x,
            pan_y = self.viewport.pan.y,
            zoom = self.viewport.zoom,
            "set viewport"
        );
    }

    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        let pan = self.viewport.pan.offset(dx, dy);
        self.set_viewport(pan, self.viewport.zoom);
    }

    /// Scales the view by `factor` keeping the screen point `focus` fixed.
    pub fn zoom_at(&mut self, factor: f32, focus: Point) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let anchor = self.screen_to_graph(focus);
        let zoom = self.config.clamp_zoom(self.viewport.zoom * factor);
        let pan = Point::new(focus.x - anchor.x * zoom, focus.y - anchor.y * zoom);
        self.set_viewport(pan, zoom);
    }

    /// Frames `content` on a surface of `surface` size, leaving the configured
    /// padding around it.
    pub fn fit_view(&mut self, content: Rect, surface: SurfaceSize) {
        let padded_w = content.width * (1.0 + self.config.fit_padding);
        let padded_h = content.height * (1.0 + self.config.fit_padding);
        let zoom = if padded_w <= 0.0 || padded_h <= 0.0 {
            self.config.clamp_zoom(1.0)
        } else {
            self.config
                .clamp_zoom((surface.width / padded_w).min(surface.height / padded_h))
        };
        let center = content.center();
        let pan = Point::new(
            surface.width / 2.0 - center.x * zoom,
            surface.height / 2.0 - center.y * zoom,
        );
        self.set_viewport(pan, zoom);
    }

    pub fn graph_to_screen(&self, point: Point) -> Point {
        Point::new(
            point.x * self.viewport.zoom + self.viewport.pan.x,
            point.y * self.viewport.zoom + self.viewport.pan.y,
        )
    }

    pub fn screen_to_graph(&self, point: Point) -> Point {
        Point::new(
            (point.x - self.viewport.pan.x) / self.viewport.zoom,
            (point.y - self.viewport.pan.y) / self.viewport.zoom,
        )
    }

    /// Back to the state of a freshly rendered layout.
    pub fn reset(&mut self) {
        self.overrides.clear();
        self.viewport = Viewport::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::ir::{Edge, Graph, Node};
    use crate::layout::compute_layout;

    fn layout() -> LayoutedGraph {
        let graph = Graph::from_parts(
            vec![
                Node {
                    id: "a".into(),
                    label: "a".into(),
                    reference: String::new(),
                },
                Node {
                    id: "b".into(),
                    label: "b".into(),
                    reference: String::new(),
                },
            ],
            vec![Edge {
                id: "e0".into(),
                source: "a".into(),
                target: "b".into(),
                source_port: "out".into(),
                target_port: "in".into(),
            }],
        )
        .unwrap();
        compute_layout(&graph, &LayoutConfig::default())
    }

    #[test]
    fn move_node_overrides_only_rendered_position() {
        let layout = layout();
        let before = layout.clone();
        let mut state = InteractionState::new(&layout, &ViewportConfig::default());
        state.move_node("a", Point::new(500.0, -40.0)).unwrap();
        assert_eq!(state.rendered_position(&layout, "a"), Some(Point::new(500.0, -40.0)));
        assert_eq!(state.rendered_position(&layout, "b"), Some(layout.node("b").unwrap().position));
        assert_eq!(layout, before);
        assert_eq!(layout.node("a").unwrap().rank, 0);
    }

    #[test]
    fn move_unknown_node_fails() {
        let layout = layout();
        let mut state = InteractionState::new(&layout, &ViewportConfig::default());
        assert_eq!(
            state.move_node("ghost", Point::default()),
            Err(InteractionError::UnknownNode("ghost".into()))
        );
    }

    #[test]
    fn set_viewport_clamps_zoom() {
        let layout = layout();
        let mut state = InteractionState::new(&layout, &ViewportConfig::default());
        state.set_viewport(Point::new(10.0, 20.0), 10.0);
        assert_eq!(state.viewport().zoom, 2.0);
        state.set_viewport(Point::new(10.0, 20.0), 0.01);
        assert_eq!(state.viewport().zoom, 0.2);
        state.set_viewport(Point::new(0.0, 0.0), f32::NAN);
        assert_eq!(state.viewport().zoom, 0.2);
        assert_eq!(state.viewport().pan, Point::new(0.0, 0.0));
    }

    #[test]
    fn inverted_zoom_range_does_not_panic() {
        let layout = layout();
        let config = ViewportConfig {
            min_zoom: 3.0,
            max_zoom: 2.0,
            ..ViewportConfig::default()
        };
        let mut state = InteractionState::new(&layout, &config);
        state.set_viewport(Point::new(0.0, 0.0), 1.0);
        assert_eq!(state.viewport().zoom, 2.0);
        state.zoom_at(1.5, Point::new(10.0, 10.0));
        assert_eq!(state.viewport().zoom, 2.0);
        state.fit_view(
            layout.bounds(),
            SurfaceSize {
                width: 800.0,
                height: 600.0,
            },
        );
        assert_eq!(state.viewport().zoom, 2.0);
    }

    #[test]
    fn zoom_at_keeps_focus_fixed() {
        let layout = layout();
        let mut state = InteractionState::new(&layout, &ViewportConfig::default());
        state.set_viewport(Point::new(100.0, 50.0), 1.0);
        let focus = Point::new(300.0, 200.0);
        let before = state.screen_to_graph(focus);
        state.zoom_at(1.5, focus);
        let after = state.screen_to_graph(focus);
        assert!((before.x - after.x).abs() < 1e-3);
        assert!((before.y - after.y).abs() < 1e-3);
        assert_eq!(state.viewport().zoom, 1.5);
    }

    #[test]
    fn fit_view_centres_content() {
        let layout = layout();
        let mut state = InteractionState::new(&layout, &ViewportConfig::default());
        let content = layout.bounds();
        state.fit_view(
            content,
            SurfaceSize {
                width: 1200.0,
                height: 800.0,
            },
        );
        let center = state.graph_to_screen(content.center());
        assert!((center.x - 600.0).abs() < 1e-3);
        assert!((center.y - 400.0).abs() < 1e-3);
        let zoom = state.viewport().zoom;
        assert!(content.width * zoom <= 1200.0);
        assert!(content.height * zoom <= 800.0);
    }

    #[test]
    fn reset_discards_session_changes() {
        let layout = layout();
        let mut state = InteractionState::new(&layout, &ViewportConfig::default());
        state.move_node("b", Point::new(1.0, 1.0)).unwrap();
        state.pan_by(30.0, 0.0);
        state.reset();
        assert!(state.overrides().is_empty());
        assert_eq!(state.viewport(), Viewport::default());
        assert!(!state.clear_override("b"));
    }
}
