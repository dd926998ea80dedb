use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::workflow::{EdgeEndpoint, MalformedWorkflowError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    #[serde(rename = "TB", alias = "TD")]
    TopToBottom,
    #[serde(rename = "LR")]
    LeftToRight,
}

impl Direction {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "TD" | "TB" => Some(Self::TopToBottom),
            "LR" => Some(Self::LeftToRight),
            _ => None,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::LeftToRight)
    }
}

/// A workflow module as seen by the layout engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    /// Opaque reference to the module source, usually a relative path.
    #[serde(rename = "ref", default)]
    pub reference: String,
}

/// A data-flow connection between an output port and an input port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub source_port: String,
    pub target_port: String,
}

impl Edge {
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// Validated module graph.
///
/// Nodes and edges keep their insertion order; every tie-break in the layout
/// engine falls back to it, so two graphs built from the same document lay
/// out identically.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    index: HashMap<String, usize>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph, rejecting duplicate ids and dangling edge endpoints.
    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self, MalformedWorkflowError> {
        let mut index = HashMap::with_capacity(nodes.len());
        for (idx, node) in nodes.iter().enumerate() {
            if index.insert(node.id.clone(), idx).is_some() {
                return Err(MalformedWorkflowError::DuplicateNodeId {
                    node_id: node.id.clone(),
                });
            }
        }

        let mut edge_ids: HashSet<&str> = HashSet::with_capacity(edges.len());
        for edge in &edges {
            if !edge_ids.insert(edge.id.as_str()) {
                return Err(MalformedWorkflowError::DuplicateEdgeId {
                    edge_id: edge.id.clone(),
                });
            }
            for (endpoint, node_id) in [
                (EdgeEndpoint::Source, &edge.source),
                (EdgeEndpoint::Target, &edge.target),
            ] {
                if !index.contains_key(node_id) {
                    return Err(MalformedWorkflowError::DanglingEdge {
                        edge_id: edge.id.clone(),
                        endpoint,
                        node_id: node_id.clone(),
                    });
                }
            }
        }

        Ok(Self {
            nodes,
            edges,
            index,
        })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|idx| &self.nodes[*idx])
    }

    /// Position of the node in insertion order.
    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
