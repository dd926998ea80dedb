use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use crate::ir::Graph;

/// Result of the ranking phase, indexed by node and edge insertion order.
#[derive(Debug, Clone)]
pub(super) struct Ranking {
    pub ranks: Vec<usize>,
    /// Ranking direction of every edge, `None` for self-loops.
    pub effective: Vec<Option<(usize, usize)>>,
    pub reversed: Vec<bool>,
    pub components: Vec<Vec<usize>>,
}

impl Ranking {
    pub fn max_rank(&self) -> Option<usize> {
        self.ranks.iter().copied().max()
    }
}

pub(super) fn rank_graph(graph: &Graph) -> Ranking {
    let node_count = graph.nodes().len();
    let endpoints: Vec<Option<(usize, usize)>> = graph
        .edges()
        .iter()
        .map(|edge| {
            if edge.is_self_loop() {
                return None;
            }
            let source = graph.node_index(&edge.source)?;
            let target = graph.node_index(&edge.target)?;
            Some((source, target))
        })
        .collect();

    let components = connected_components(node_count, &endpoints);

    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    let mut indeg = vec![0usize; node_count];
    for (edge_idx, pair) in endpoints.iter().enumerate() {
        if let Some((source, target)) = *pair {
            outgoing[source].push(edge_idx);
            indeg[target] += 1;
        }
    }

    // Topological pass per component. Ready nodes leave in insertion order;
    // once only cycles remain, the earliest unprocessed node is forced.
    let mut topo_pos = vec![usize::MAX; node_count];
    let mut order: Vec<usize> = Vec::with_capacity(node_count);
    for component in &components {
        let mut ready: BinaryHeap<Reverse<usize>> = component
            .iter()
            .copied()
            .filter(|idx| indeg[*idx] == 0)
            .map(Reverse)
            .collect();
        let mut remaining = component.len();
        let mut cursor = 0usize;
        while remaining > 0 {
            let Some(Reverse(node)) = ready.pop() else {
                while topo_pos[component[cursor]] != usize::MAX {
                    cursor += 1;
                }
                ready.push(Reverse(component[cursor]));
                continue;
            };
            if topo_pos[node] != usize::MAX {
                continue;
            }
            topo_pos[node] = order.len();
            order.push(node);
            remaining -= 1;
            for edge_idx in &outgoing[node] {
                if let Some((_, target)) = endpoints[*edge_idx] {
                    if topo_pos[target] != usize::MAX {
                        continue;
                    }
                    indeg[target] = indeg[target].saturating_sub(1);
                    if indeg[target] == 0 {
                        ready.push(Reverse(target));
                    }
                }
            }
        }
    }

    let mut reversed = vec![false; endpoints.len()];
    let mut effective = Vec::with_capacity(endpoints.len());
    let mut effective_out: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    for (edge_idx, pair) in endpoints.iter().enumerate() {
        let Some((source, target)) = *pair else {
            effective.push(None);
            continue;
        };
        let (from, to) = if topo_pos[target] < topo_pos[source] {
            reversed[edge_idx] = true;
            (target, source)
        } else {
            (source, target)
        };
        effective_out[from].push(to);
        effective.push(Some((from, to)));
    }

    // Longest path over the now acyclic graph, walked in topological order.
    let mut ranks = vec![0usize; node_count];
    for node in &order {
        let rank = ranks[*node];
        for next in &effective_out[*node] {
            ranks[*next] = ranks[*next].max(rank + 1);
        }
    }

    Ranking {
        ranks,
        effective,
        reversed,
        components,
    }
}

/// Weakly connected components, each listed in insertion order, ordered by
/// their earliest node.
fn connected_components(node_count: usize, endpoints: &[Option<(usize, usize)>]) -> Vec<Vec<usize>> {
    let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    for (source, target) in endpoints.iter().flatten() {
        neighbors[*source].push(*target);
        neighbors[*target].push(*source);
    }

    let mut component_of = vec![usize::MAX; node_count];
    let mut components: Vec<Vec<usize>> = Vec::new();
    for start in 0..node_count {
        if component_of[start] != usize::MAX {
            continue;
        }
        let id = components.len();
        let mut members = Vec::new();
        let mut queue = VecDeque::from([start]);
        component_of[start] = id;
        while let Some(node) = queue.pop_front() {
            members.push(node);
            for next in &neighbors[node] {
                if component_of[*next] == usize::MAX {
                    component_of[*next] = id;
                    queue.push_back(*next);
                }
            }
        }
        members.sort_unstable();
        components.push(members);
    }
    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Edge, Node};

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
    fn ranks_by_longest_path() {
        let g = graph(&["a", "b", "c", "d"], &[("a", "b"), ("b", "c"), ("a", "c"), ("c", "d")]);
        let ranking = rank_graph(&g);
        assert_eq!(ranking.ranks, vec![0, 1, 2, 3]);
        assert!(ranking.reversed.iter().all(|r| !r));
    }

    #[test]
    fn breaks_cycle_at_earliest_node() {
        let g = graph(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("c", "a")]);
        let ranking = rank_graph(&g);
        assert_eq!(ranking.ranks, vec![0, 1, 2]);
        assert_eq!(ranking.reversed, vec![false, false, true]);
        assert_eq!(ranking.effective[2], Some((0, 2)));
    }

    #[test]
    fn components_start_at_rank_zero() {
        let g = graph(&["a", "b", "x", "y", "z"], &[("a", "b"), ("y", "z"), ("x", "y")]);
        let ranking = rank_graph(&g);
        assert_eq!(ranking.ranks, vec![0, 1, 0, 1, 2]);
        assert_eq!(ranking.components, vec![vec![0, 1], vec![2, 3, 4]]);
    }

    #[test]
    fn self_loops_do_not_rank() {
        let g = graph(&["a", "b"], &[("a", "a"), ("a", "b")]);
        let ranking = rank_graph(&g);
        assert_eq!(ranking.ranks, vec![0, 1]);
        assert_eq!(ranking.effective[0], None);
        assert!(!ranking.reversed[0]);
    }

    #[test]
    fn two_cycle_flags_one_edge() {
        let g = graph(&["a", "b"], &[("b", "a"), ("a", "b")]);
        let ranking = rank_graph(&g);
        assert_eq!(ranking.reversed.iter().filter(|r| **r).count(), 1);
        assert_eq!(ranking.ranks, vec![0, 1]);
    }
}
