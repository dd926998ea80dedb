use std::cmp::Ordering;
use std::collections::VecDeque;

use super::ranking::Ranking;

/// Node of the proper layered graph: either a real node or a placeholder on
/// an intermediate rank of a long edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Real(usize),
    Virtual,
}

/// Layered graph in which every edge joins two adjacent ranks.
struct LayerGraph {
    slots: Vec<Slot>,
    rank: Vec<usize>,
    up: Vec<Vec<usize>>,
    down: Vec<Vec<usize>>,
}

impl LayerGraph {
    fn build(ranking: &Ranking) -> Self {
        let node_count = ranking.ranks.len();
        let mut slots: Vec<Slot> = (0..node_count).map(Slot::Real).collect();
        let mut rank = ranking.ranks.clone();
        let mut up: Vec<Vec<usize>> = vec![Vec::new(); node_count];
        let mut down: Vec<Vec<usize>> = vec![Vec::new(); node_count];

        for pair in &ranking.effective {
            let Some((from, to)) = *pair else {
                continue;
            };
            let mut prev = from;
            for step in 1..ranking.ranks[to] - ranking.ranks[from] {
                let slot = slots.len();
                slots.push(Slot::Virtual);
                rank.push(ranking.ranks[from] + step);
                up.push(vec![prev]);
                down.push(Vec::new());
                down[prev].push(slot);
                prev = slot;
            }
            down[prev].push(to);
            up[to].push(prev);
        }

        Self {
            slots,
            rank,
            up,
            down,
        }
    }

    fn virtual_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Virtual))
            .count()
    }
}

#[derive(Debug, Clone)]
pub(super) struct RankOrder {
    /// Index of every real node among the real nodes of its rank.
    pub order_in_rank: Vec<usize>,
    pub crossings: usize,
}

/// Orders every rank to reduce crossings with alternating barycenter sweeps.
///
/// Slots are created real-first and then per edge in insertion order, so the
/// slot index doubles as the tie-break key.
pub(super) fn order_ranks(ranking: &Ranking, max_sweeps: usize) -> RankOrder {
    let node_count = ranking.ranks.len();
    let Some(max_rank) = ranking.max_rank() else {
        return RankOrder {
            order_in_rank: Vec::new(),
            crossings: 0,
        };
    };

    let graph = LayerGraph::build(ranking);
    let mut layers = initial_order(ranking, &graph, max_rank + 1);
    tracing::trace!(virtual_nodes = graph.virtual_count(), "built layered graph");

    let mut best = layers.clone();
    let mut best_crossings = count_crossings(&graph, &layers);
    let mut pair_start = layers.clone();
    for sweep in 0..max_sweeps {
        if best_crossings == 0 {
            break;
        }
        let downward = sweep % 2 == 0;
        if downward {
            pair_start.clone_from(&layers);
            for rank in 1..layers.len() {
                sort_by_barycenter(&graph, &mut layers, rank, rank - 1, &graph.up);
            }
        } else {
            for rank in (0..layers.len().saturating_sub(1)).rev() {
                sort_by_barycenter(&graph, &mut layers, rank, rank + 1, &graph.down);
            }
        }

        let crossings = count_crossings(&graph, &layers);
        tracing::trace!(sweep, downward, crossings, "barycenter sweep");
        if crossings < best_crossings {
            best_crossings = crossings;
            best.clone_from(&layers);
        }
        if !downward && layers == pair_start {
            break;
        }
    }

    let mut order_in_rank = vec![0usize; node_count];
    for layer in &best {
        let mut next = 0usize;
        for slot in layer {
            if let Slot::Real(node) = graph.slots[*slot] {
                order_in_rank[node] = next;
                next += 1;
            }
        }
    }

    RankOrder {
        order_in_rank,
        crossings: best_crossings,
    }
}

/// Breadth-first from the sources of each component, components in turn.
fn initial_order(ranking: &Ranking, graph: &LayerGraph, layer_count: usize) -> Vec<Vec<usize>> {
    let mut layers: Vec<Vec<usize>> = vec![Vec::new(); layer_count];
    let mut seen = vec![false; graph.slots.len()];
    let mut queue: VecDeque<usize> = VecDeque::new();

    for component in &ranking.components {
        for node in component {
            if graph.up[*node].is_empty() && !seen[*node] {
                seen[*node] = true;
                queue.push_back(*node);
            }
        }
        while let Some(slot) = queue.pop_front() {
            layers[graph.rank[slot]].push(slot);
            for next in &graph.down[slot] {
                if !seen[*next] {
                    seen[*next] = true;
                    queue.push_back(*next);
                }
            }
        }
    }

    for (slot, was_seen) in seen.iter().enumerate() {
        if !was_seen {
            layers[graph.rank[slot]].push(slot);
        }
    }
    layers
}

fn sort_by_barycenter(
    graph: &LayerGraph,
    layers: &mut [Vec<usize>],
    rank: usize,
    reference: usize,
    neighbors: &[Vec<usize>],
) {
    if layers[rank].len() <= 1 {
        return;
    }
    let mut reference_pos = vec![0usize; graph.slots.len()];
    for (idx, slot) in layers[reference].iter().enumerate() {
        reference_pos[*slot] = idx;
    }

    let mut keyed: Vec<(f64, usize)> = layers[rank]
        .iter()
        .enumerate()
        .map(|(current, slot)| {
            let list = &neighbors[*slot];
            let barycenter = if list.is_empty() {
                current as f64
            } else {
                list.iter().map(|n| reference_pos[*n] as f64).sum::<f64>() / list.len() as f64
            };
            (barycenter, *slot)
        })
        .collect();
    keyed.sort_by(|a, b| match a.0.partial_cmp(&b.0) {
        Some(Ordering::Equal) | None => a.1.cmp(&b.1),
        Some(ordering) => ordering,
    });
    layers[rank] = keyed.into_iter().map(|(_, slot)| slot).collect();
}

fn count_crossings(graph: &LayerGraph, layers: &[Vec<usize>]) -> usize {
    let mut pos = vec![0usize; graph.slots.len()];
    for layer in layers {
        for (idx, slot) in layer.iter().enumerate() {
            pos[*slot] = idx;
        }
    }

    let mut total = 0usize;
    for layer in layers {
        let mut segments: Vec<(usize, usize)> = Vec::new();
        for slot in layer {
            for next in &graph.down[*slot] {
                segments.push((pos[*slot], pos[*next]));
            }
        }
        for (i, a) in segments.iter().enumerate() {
            for b in &segments[i + 1..] {
                if (a.0 < b.0 && a.1 > b.1) || (a.0 > b.0 && a.1 < b.1) {
                    total += 1;
                }
            }
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::super::ranking::rank_graph;
    use super::*;
    use crate::ir::{Edge, Graph, Node};

    fn graph(nodes: &[&str], edges: &[(&str, &str)]) -> Graph {
        Graph::from_parts(
            nodes
                .iter()
                .map(|id| Node {
                    id: id.to_string(),
                    label: id.to_string(),
                    reference: String::new(),
                })
                .collect(),
            edges
                .iter()
                .enumerate()
                .map(|(idx, (s, t))| Edge {
                    id: format!("e{idx}"),
                    source: s.to_string(),
                    target: t.to_string(),
                    source_port: "out".to_string(),
                    target_port: "in".to_string(),
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn inserts_virtual_slots_for_long_edges() {
        let g = graph(&["a", "b", "c", "d"], &[("a", "b"), ("b", "c"), ("c", "d"), ("a", "d")]);
        let ranking = rank_graph(&g);
        let layered = LayerGraph::build(&ranking);
        assert_eq!(layered.virtual_count(), 2);
        assert_eq!(layered.rank[4], 1);
        assert_eq!(layered.rank[5], 2);
    }

    #[test]
    fn barycenter_untangles_crossed_pair() {
        let g = graph(&["a", "b", "c", "d"], &[("a", "c"), ("b", "d")]);
        let ranking = rank_graph(&g);
        let layered = LayerGraph::build(&ranking);
        let mut layers = vec![vec![0, 1], vec![3, 2]];
        assert_eq!(count_crossings(&layered, &layers), 1);
        sort_by_barycenter(&layered, &mut layers, 1, 0, &layered.up);
        assert_eq!(layers[1], vec![2, 3]);
        assert_eq!(count_crossings(&layered, &layers), 0);
    }

    #[test]
    fn sweeps_remove_avoidable_crossing() {
        // Breadth-first seeds ranks as [a, b, c] / [x, y], crossing a→y with b→x.
        let g = graph(
            &["a", "b", "c", "x", "y"],
            &[("a", "x"), ("a", "y"), ("b", "x"), ("c", "y")],
        );
        let ranking = rank_graph(&g);
        let layered = LayerGraph::build(&ranking);
        let initial = initial_order(&ranking, &layered, 2);
        assert_eq!(initial, vec![vec![0, 1, 2], vec![3, 4]]);
        assert_eq!(count_crossings(&layered, &initial), 1);

        let ordering = order_ranks(&ranking, 8);
        assert_eq!(ordering.crossings, 0);
        assert_eq!(ordering.order_in_rank, vec![1, 0, 2, 0, 1]);
    }

    #[test]
    fn ties_follow_insertion_order() {
        let g = graph(&["root", "m", "k"], &[("root", "m"), ("root", "k")]);
        let ranking = rank_graph(&g);
        let ordering = order_ranks(&ranking, 8);
        assert_eq!(ordering.order_in_rank, vec![0, 0, 1]);
    }

    #[test]
    fn empty_ranking_orders_nothing() {
        let g = Graph::new();
        let ranking = rank_graph(&g);
        let ordering = order_ranks(&ranking, 8);
        assert!(ordering.order_in_rank.is_empty());
        assert_eq!(ordering.crossings, 0);
    }
}
