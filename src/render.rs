use crate::config::RenderConfig;
use crate::contract::{EdgePath, EdgeView, MarkerKind, NodeView, Scene};
use crate::layout::Point;
use crate::text_metrics::text_width;
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

const ANCHOR_RADIUS: f32 = 6.0;
const NODE_CORNER: f32 = 10.0;
const LABEL_PAD_X: f32 = 6.0;
const LABEL_PAD_Y: f32 = 2.0;

/// Draws `scene` as a static SVG of the configured surface size, with the
/// scene's viewport applied to the diagram group.
pub fn render_svg(scene: &Scene, theme: &Theme, render: &RenderConfig) -> String {
    let width = render.width.max(1.0);
    let height = render.height.max(1.0);
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">"
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        render.background
    ));

    svg.push_str("<defs>");
    for edge in &scene.edges {
        if edge.marker.kind == MarkerKind::ArrowClosed {
            svg.push_str(&format!(
                "<marker id=\"arrow-closed\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerUnits=\"userSpaceOnUse\" markerWidth=\"{}\" markerHeight=\"{}\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{}\"/></marker>",
                edge.marker.width, edge.marker.height, theme.line_color
            ));
            break;
        }
    }
    svg.push_str("</defs>");

    let viewport = scene.viewport;
    svg.push_str(&format!(
        "<g transform=\"translate({:.2} {:.2}) scale({:.4})\">",
        viewport.pan.x, viewport.pan.y, viewport.zoom
    ));

    for edge in &scene.edges {
        svg.push_str(&edge_svg(edge, theme));
    }
    for edge in &scene.edges {
        svg.push_str(&edge_label_svg(edge, theme));
    }
    for node in &scene.nodes {
        svg.push_str(&node_svg(node, theme));
    }

    svg.push_str("</g></svg>");
    svg
}

fn edge_svg(edge: &EdgeView, theme: &Theme) -> String {
    format!(
        "<path class=\"edge\" data-id=\"{}\" d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\" marker-end=\"url(#arrow-closed)\"/>",
        escape_xml(&edge.id),
        path_data(&edge.path),
        theme.line_color,
        theme.line_width
    )
}

fn edge_label_svg(edge: &EdgeView, theme: &Theme) -> String {
    if edge.label.is_empty() {
        return String::new();
    }
    let Point { x, y } = edge.path.midpoint();
    let size = theme.edge_label_font_size;
    let text_w = text_width(&edge.label, size, &theme.font_family);
    let box_w = text_w + LABEL_PAD_X * 2.0;
    let box_h = size + LABEL_PAD_Y * 2.0;
    format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{box_w:.2}\" height=\"{box_h:.2}\" rx=\"4\" ry=\"4\" fill=\"{}\"/><text x=\"{x:.2}\" y=\"{:.2}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{size}\" font-weight=\"500\" fill=\"{}\">{}</text>",
        x - box_w / 2.0,
        y - box_h / 2.0,
        theme.edge_label_background,
        y,
        escape_xml(&theme.font_family),
        theme.edge_label_color,
        escape_xml(&edge.label)
    )
}

fn node_svg(node: &NodeView, theme: &Theme) -> String {
    let bounds = node.bounds;
    let center = bounds.center();
    let mut out = String::new();
    out.push_str(&format!(
        "<g class=\"node\" data-id=\"{}\"><rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{NODE_CORNER}\" ry=\"{NODE_CORNER}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"2\"/>",
        escape_xml(&node.id),
        bounds.x,
        bounds.y,
        bounds.width,
        bounds.height,
        theme.node_fill,
        theme.node_border
    ));

    let gap = theme.caption_font_size * 0.5;
    let label_y = center.y - gap;
    let caption_y = center.y + theme.font_size * 0.5 + gap * 0.5;
    out.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{label_y:.2}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{}\" font-weight=\"600\" fill=\"{}\">{}</text>",
        center.x,
        escape_xml(&theme.font_family),
        theme.font_size,
        theme.node_text_color,
        escape_xml(&node.label)
    ));
    out.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{caption_y:.2}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\" fill-opacity=\"0.9\">{}</text>",
        center.x,
        escape_xml(&theme.font_family),
        theme.caption_font_size,
        theme.node_text_color,
        escape_xml(&node.caption)
    ));

    for anchor in [&node.incoming, &node.outgoing] {
        out.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{ANCHOR_RADIUS}\" fill=\"{}\"/>",
            anchor.point.x, anchor.point.y, theme.anchor_color
        ));
    }
    out.push_str("</g>");
    out
}

fn path_data(path: &EdgePath) -> String {
    format!(
        "M {:.2} {:.2} C {:.2} {:.2}, {:.2} {:.2}, {:.2} {:.2}",
        path.from.x,
        path.from.y,
        path.control1.x,
        path.control1.y,
        path.control2.x,
        path.control2.y,
        path.to.x,
        path.to.y
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
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options::default();
    if let Some(first) = theme.font_family.split(',').next() {
        opt.font_family = first.trim().trim_matches('"').to_string();
    }
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .ok_or_else(|| anyhow::anyhow!("Invalid render size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig, _theme: &Theme) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LayoutConfig, ViewportConfig};
    use crate::contract::build_scene;
    use crate::interaction::InteractionState;
    use crate::ir::{Edge, Graph, Node};
    use crate::layout::compute_layout;

    fn scene() -> Scene {
        let graph = Graph::from_parts(
            vec![
                Node {
                    id: "A".into(),
                    label: "Alpha & co".into(),
                    reference: "mods/alpha.json".into(),
                },
                Node {
                    id: "B".into(),
                    label: "Beta".into(),
                    reference: String::new(),
                },
            ],
            vec![Edge {
                id: "e0".into(),
                source: "A".into(),
                target: "B".into(),
                source_port: "out".into(),
                target_port: "in".into(),
            }],
        )
        .unwrap();
        let layout = compute_layout(&graph, &LayoutConfig::default());
        let state = InteractionState::new(&layout, &ViewportConfig::default());
        build_scene(&layout, &state)
    }

    #[test]
    fn render_svg_basic() {
        let svg = render_svg(&scene(), &Theme::workflow(), &RenderConfig::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("Alpha &amp; co"));
        assert!(svg.contains("alpha.json"));
        assert!(svg.contains(">module<"));
        assert!(svg.contains("out → in"));
        assert!(svg.contains("marker-end=\"url(#arrow-closed)\""));
        assert!(svg.contains("markerWidth=\"12\""));
    }

    #[test]
    fn path_data_is_cubic() {
        let scene = scene();
        let d = path_data(&scene.edges[0].path);
        assert!(d.starts_with("M "));
        assert!(d.contains(" C "));
    }

    #[test]
    fn escapes_xml() {
        assert_eq!(escape_xml("<a & 'b'>"), "&lt;a &amp; &apos;b&apos;&gt;");
    }
}
