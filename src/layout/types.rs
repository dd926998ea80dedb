use std::collections::HashMap;

use serde::Serialize;

use crate::config::NodeSize;
use crate::ir::{Direction, Edge, Node};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn centered(center: Point, size: NodeSize) -> Self {
        Self {
            x: center.x - size.width / 2.0,
            y: center.y - size.height / 2.0,
            width: size.width,
            height: size.height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }

    pub fn expand(&self, margin_x: f32, margin_y: f32) -> Rect {
        Rect {
            x: self.x - margin_x,
            y: self.y - margin_y,
            width: self.width + margin_x * 2.0,
            height: self.height + margin_y * 2.0,
        }
    }

    /// Smallest rectangle covering all `rects`, or `None` when empty.
    pub fn enclosing<'a>(rects: impl IntoIterator<Item = &'a Rect>) -> Option<Rect> {
        rects
            .into_iter()
            .fold(None, |acc: Option<Rect>, rect| match acc {
                Some(acc) => Some(acc.union(rect)),
                None => Some(*rect),
            })
    }
}

/// How the end of an edge is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArrowHint {
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutedNode {
    #[serde(flatten)]
    pub node: Node,
    pub rank: usize,
    pub order_in_rank: usize,
    /// Centre of the node block.
    pub position: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutedEdge {
    #[serde(flatten)]
    pub edge: Edge,
    pub arrow: ArrowHint,
    /// The edge pointed against the rank order and was flipped while ranking.
    pub reversed_for_ranking: bool,
    pub self_loop: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutedGraph {
    pub direction: Direction,
    pub node_size: NodeSize,
    pub nodes: Vec<LayoutedNode>,
    pub edges: Vec<LayoutedEdge>,
    pub(crate) crossings: usize,
    #[serde(skip)]
    pub(crate) index: HashMap<String, usize>,
}

impl LayoutedGraph {
    pub fn node(&self, id: &str) -> Option<&LayoutedNode> {
        self.index.get(id).map(|idx| &self.nodes[*idx])
    }

    pub fn edge(&self, id: &str) -> Option<&LayoutedEdge> {
        self.edges.iter().find(|edge| edge.edge.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn rank_count(&self) -> usize {
        self.nodes.iter().map(|node| node.rank + 1).max().unwrap_or(0)
    }

    /// Edge crossings between adjacent ranks in the final order.
    pub fn crossings(&self) -> usize {
        self.crossings
    }

    /// Node ids grouped by rank, each rank listed in order.
    pub fn ranks(&self) -> Vec<Vec<&str>> {
        let mut ranks: Vec<Vec<&LayoutedNode>> = vec![Vec::new(); self.rank_count()];
        for node in &self.nodes {
            ranks[node.rank].push(node);
        }
        ranks
            .into_iter()
            .map(|mut bucket| {
                bucket.sort_by_key(|node| node.order_in_rank);
                bucket.into_iter().map(|node| node.node.id.as_str()).collect()
            })
            .collect()
    }

    pub fn node_rect(&self, node: &LayoutedNode) -> Rect {
        Rect::centered(node.position, self.node_size)
    }

    /// Area covered by all node blocks at their computed positions.
    pub fn bounds(&self) -> Rect {
        let rects: Vec<Rect> = self.nodes.iter().map(|node| self.node_rect(node)).collect();
        Rect::enclosing(&rects).unwrap_or_default()
    }
}
