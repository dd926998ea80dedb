use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ir::{Edge, Graph, Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeEndpoint {
    Source,
    Target,
}

impl std::fmt::Display for EdgeEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Target => f.write_str("target"),
        }
    }
}

/// Structural problems that prevent a workflow from becoming a [`Graph`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedWorkflowError {
    #[error("edge {edge_id} references unknown {endpoint} node {node_id}")]
    DanglingEdge {
        edge_id: String,
        endpoint: EdgeEndpoint,
        node_id: String,
    },
    #[error("duplicate node id {node_id}")]
    DuplicateNodeId { node_id: String },
    #[error("duplicate edge id {edge_id}")]
    DuplicateEdgeId { edge_id: String },
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("invalid workflow JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("workflow has neither `elements` nor `modules`")]
    UnknownShape,
    #[error(transparent)]
    Malformed(#[from] MalformedWorkflowError),
}

/// Element document: `{"elements": {"nodes": [...], "edges": [...]}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDocument {
    pub elements: Elements,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Elements {
    #[serde(default)]
    pub nodes: Vec<NodeElement>,
    #[serde(default)]
    pub edges: Vec<EdgeElement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeElement {
    pub data: NodeData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeElement {
    pub data: EdgeData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeData {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub source_port: String,
    #[serde(default)]
    pub target_port: String,
}

/// Concrete workflow as produced by the workflow builders: modules plus
/// port-level connections.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConcreteWorkflow {
    #[serde(default)]
    pub workflow_id: Option<String>,
    #[serde(default)]
    pub modules: Vec<ModuleEntry>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModuleEntry {
    pub id: String,
    #[serde(rename = "ref", default)]
    pub reference: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Connection {
    pub from: OutputPort,
    pub to: InputPort,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputPort {
    pub module: String,
    pub output: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputPort {
    pub module: String,
    pub input: String,
}

impl ConcreteWorkflow {
    /// Converts modules to nodes labelled by module id and connections to
    /// edges numbered `e0`, `e1`, ... in declaration order.
    pub fn to_document(&self) -> WorkflowDocument {
        let nodes = self
            .modules
            .iter()
            .map(|module| NodeElement {
                data: NodeData {
                    id: module.id.clone(),
                    label: Some(module.id.clone()),
                    reference: Some(module.reference.clone()),
                },
            })
            .collect();
        let edges = self
            .connections
            .iter()
            .enumerate()
            .map(|(idx, conn)| EdgeElement {
                data: EdgeData {
                    id: format!("e{idx}"),
                    source: conn.from.module.clone(),
                    target: conn.to.module.clone(),
                    source_port: conn.from.output.clone(),
                    target_port: conn.to.input.clone(),
                },
            })
            .collect();
        WorkflowDocument {
            elements: Elements { nodes, edges },
        }
    }
}

/// Converts an element document into a validated [`Graph`].
///
/// A node without a label is labelled by its id; a missing `ref` becomes the
/// empty string. No partial graph is produced on failure.
pub fn adapt(document: &WorkflowDocument) -> Result<Graph, MalformedWorkflowError> {
    let nodes = document
        .elements
        .nodes
        .iter()
        .map(|element| {
            let data = &element.data;
            Node {
                id: data.id.clone(),
                label: data.label.clone().unwrap_or_else(|| data.id.clone()),
                reference: data.reference.clone().unwrap_or_default(),
            }
        })
        .collect();
    let edges = document
        .elements
        .edges
        .iter()
        .map(|element| {
            let data = &element.data;
            Edge {
                id: data.id.clone(),
                source: data.source.clone(),
                target: data.target.clone(),
                source_port: data.source_port.clone(),
                target_port: data.target_port.clone(),
            }
        })
        .collect();
    let graph = Graph::from_parts(nodes, edges)?;
    tracing::debug!(
        nodes = graph.nodes().len(),
        edges = graph.edges().len(),
        "adapted workflow document"
    );
    Ok(graph)
}

/// Inverse of [`adapt`].
pub fn to_document(graph: &Graph) -> WorkflowDocument {
    let nodes = graph
        .nodes()
        .iter()
        .map(|node| NodeElement {
            data: NodeData {
                id: node.id.clone(),
                label: Some(node.label.clone()),
                reference: Some(node.reference.clone()),
            },
        })
        .collect();
    let edges = graph
        .edges()
        .iter()
        .map(|edge| EdgeElement {
            data: EdgeData {
                id: edge.id.clone(),
                source: edge.source.clone(),
                target: edge.target.clone(),
                source_port: edge.source_port.clone(),
                target_port: edge.target_port.clone(),
            },
        })
        .collect();
    WorkflowDocument {
        elements: Elements { nodes, edges },
    }
}

/// Reads either an element document or a concrete workflow.
pub fn parse_document(input: &str) -> Result<WorkflowDocument, WorkflowError> {
    let value: serde_json::Value = serde_json::from_str(input)?;
    if value.get("elements").is_some() {
        return Ok(serde_json::from_value(value)?);
    }
    if value.get("modules").is_some() || value.get("connections").is_some() {
        let concrete: ConcreteWorkflow = serde_json::from_value(value)?;
        tracing::debug!(
            workflow_id = concrete.workflow_id.as_deref().unwrap_or("unnamed"),
            modules = concrete.modules.len(),
            connections = concrete.connections.len(),
            "converting concrete workflow"
        );
        return Ok(concrete.to_document());
    }
    Err(WorkflowError::UnknownShape)
}

pub fn parse_workflow(input: &str) -> Result<Graph, WorkflowError> {
    let document = parse_document(input)?;
    Ok(adapt(&document)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapts_element_document() {
        let input = r#"{
            "elements": {
                "nodes": [
                    {"data": {"id": "fetch", "label": "fetch", "ref": "modules/io/fetch.json"}},
                    {"data": {"id": "clean", "label": "Clean"}}
                ],
                "edges": [
                    {"data": {"id": "e0", "source": "fetch", "target": "clean",
                              "source_port": "raw", "target_port": "input"}}
                ]
            }
        }"#;
        let graph = parse_workflow(input).unwrap();
        assert_eq!(graph.nodes().len(), 2);
        assert_eq!(graph.node("clean").unwrap().reference, "");
        assert_eq!(graph.node("clean").unwrap().label, "Clean");
        let edge = &graph.edges()[0];
        assert_eq!(edge.source_port, "raw");
        assert_eq!(edge.target_port, "input");
    }

    #[test]
    fn converts_concrete_workflow() {
        let input = r#"{
            "workflow_id": "demo",
            "modules": [
                {"id": "load", "ref": "mods/load.json"},
                {"id": "train", "ref": "mods/train.json"},
                {"id": "eval"}
            ],
            "connections": [
                {"from": {"module": "load", "output": "table"}, "to": {"module": "train", "input": "data"}},
                {"from": {"module": "train", "output": "model"}, "to": {"module": "eval", "input": "model"}}
            ]
        }"#;
        let graph = parse_workflow(input).unwrap();
        let ids: Vec<&str> = graph.edges().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["e0", "e1"]);
        assert_eq!(graph.node("train").unwrap().label, "train");
        assert_eq!(graph.node("eval").unwrap().reference, "");
    }

    #[test]
    fn dangling_connection_is_malformed() {
        let input = r#"{
            "modules": [{"id": "a"}],
            "connections": [
                {"from": {"module": "a", "output": "x"}, "to": {"module": "b", "input": "y"}}
            ]
        }"#;
        let err = parse_workflow(input).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Malformed(MalformedWorkflowError::DanglingEdge { .. })
        ));
    }

    #[test]
    fn rejects_unknown_shape() {
        assert!(matches!(
            parse_document(r#"{"nodes": []}"#),
            Err(WorkflowError::UnknownShape)
        ));
        assert!(matches!(parse_document("not json"), Err(WorkflowError::Json(_))));
    }

    #[test]
    fn document_round_trips_graph() {
        let graph = Graph::from_parts(
            vec![
                Node {
                    id: "a".into(),
                    label: "Alpha".into(),
                    reference: "x/a.json".into(),
                },
                Node {
                    id: "b".into(),
                    label: "Beta".into(),
                    reference: String::new(),
                },
            ],
            vec![Edge {
                id: "ab".into(),
                source: "a".into(),
                target: "b".into(),
                source_port: "out".into(),
                target_port: "in".into(),
            }],
        )
        .unwrap();
        assert_eq!(adapt(&to_document(&graph)).unwrap(), graph);
    }

    #[test]
    fn error_messages_name_the_offender() {
        let err = MalformedWorkflowError::DanglingEdge {
            edge_id: "e3".into(),
            endpoint: EdgeEndpoint::Source,
            node_id: "ghost".into(),
        };
        assert_eq!(err.to_string(), "edge e3 references unknown source node ghost");
    }
}
