mod ordering;
mod position;
mod ranking;
mod types;

pub use types::*;

use ordering::order_ranks;
use position::assign_positions;
use ranking::rank_graph;

use crate::config::LayoutConfig;
use crate::ir::Graph;
use std::collections::HashMap;

/// Computes a layered placement of `graph`.
///
/// Ranks come from longest paths (cycles broken at back-edges), orders from
/// barycenter sweeps, coordinates from a fixed grid. The result depends only on
/// `graph` (including insertion order) and `config`.
pub fn compute_layout(graph: &Graph, config: &LayoutConfig) -> LayoutedGraph {
    let ranking = rank_graph(graph);
    let ordering = order_ranks(&ranking, config.sweep_cap());
    let positions = assign_positions(&ranking.ranks, &ordering.order_in_rank, config);

    let mut index = HashMap::with_capacity(graph.nodes().len());
    let nodes: Vec<LayoutedNode> = graph
        .nodes()
        .iter()
        .enumerate()
        .map(|(idx, node)| {
            index.insert(node.id.clone(), idx);
            LayoutedNode {
                node: node.clone(),
                rank: ranking.ranks[idx],
                order_in_rank: ordering.order_in_rank[idx],
                position: positions[idx],
            }
        })
        .collect();

    let edges: Vec<LayoutedEdge> = graph
        .edges()
        .iter()
        .enumerate()
        .map(|(idx, edge)| LayoutedEdge {
            edge: edge.clone(),
            arrow: ArrowHint::Closed,
            reversed_for_ranking: ranking.reversed[idx],
            self_loop: edge.is_self_loop(),
        })
        .collect();

    tracing::debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        ranks = ranking.max_rank().map_or(0, |rank| rank + 1),
        components = ranking.components.len(),
        reversed = ranking.reversed.iter().filter(|r| **r).count(),
        crossings = ordering.crossings,
        "computed layout"
    );

    LayoutedGraph {
        direction: config.direction,
        node_size: config.node_size,
        nodes,
        edges,
        crossings: ordering.crossings,
        index,
    }
}
