use crate::contract::{caption_for_ref, edge_label};
use crate::ir::Direction;
use crate::layout::{LayoutedGraph, Rect};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub direction: Direction,
    pub node_width: f32,
    pub node_height: f32,
    pub bounds: Rect,
    pub crossings: usize,
    pub ranks: Vec<Vec<String>>,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDump {
    pub id: String,
    pub label: String,
    pub caption: String,
    pub rank: usize,
    pub order_in_rank: usize,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDump {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: String,
    pub reversed_for_ranking: bool,
    pub self_loop: bool,
}

impl LayoutDump {
    pub fn from_layout(layout: &LayoutedGraph) -> Self {
        let nodes = layout
            .nodes
            .iter()
            .map(|node| NodeDump {
                id: node.node.id.clone(),
                label: node.node.label.clone(),
                caption: caption_for_ref(&node.node.reference),
                rank: node.rank,
                order_in_rank: node.order_in_rank,
                x: node.position.x,
                y: node.position.y,
            })
            .collect();

        let edges = layout
            .edges
            .iter()
            .map(|edge| EdgeDump {
                id: edge.edge.id.clone(),
                source: edge.edge.source.clone(),
                target: edge.edge.target.clone(),
                label: edge_label(&edge.edge.source_port, &edge.edge.target_port),
                reversed_for_ranking: edge.reversed_for_ranking,
                self_loop: edge.self_loop,
            })
            .collect();

        let ranks = layout
            .ranks()
            .into_iter()
            .map(|bucket| bucket.into_iter().map(str::to_string).collect())
            .collect();

        LayoutDump {
            direction: layout.direction,
            node_width: layout.node_size.width,
            node_height: layout.node_size.height,
            bounds: layout.bounds(),
            crossings: layout.crossings(),
            ranks,
            nodes,
            edges,
        }
    }
}

/// Writes the dump as pretty JSON to `path`, or stdout when `None`.
pub fn write_layout_dump(path: Option<&Path>, layout: &LayoutedGraph) -> anyhow::Result<()> {
    let dump = LayoutDump::from_layout(layout);
    match path {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(writer, &dump)?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &dump)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::layout::compute_layout;
    use crate::workflow::parse_workflow;

    #[test]
    fn dump_lists_ranks_and_labels() {
        let graph = parse_workflow(
            r#"{"modules": [{"id": "a", "ref": "m/a.json"}, {"id": "b"}],
                "connections": [{"from": {"module": "a", "output": "o"}, "to": {"module": "b", "input": "i"}}]}"#,
        )
        .unwrap();
        let layout = compute_layout(&graph, &LayoutConfig::default());
        let dump = LayoutDump::from_layout(&layout);
        assert_eq!(dump.ranks, vec![vec!["a".to_string()], vec!["b".to_string()]]);
        assert_eq!(dump.nodes[0].caption, "a.json");
        assert_eq!(dump.edges[0].label, "o → i");
        let json = serde_json::to_value(&dump).unwrap();
        assert_eq!(json["direction"], "TB");
        assert_eq!(json["nodes"][1]["orderInRank"], 0);
    }
}
