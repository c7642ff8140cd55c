use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::RejectReason;

/// An entity that survived validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
	pub id: String,
	pub label: String,
	#[serde(rename = "type")]
	pub kind: String,
	pub properties: BTreeMap<String, String>,
	pub mentions: u32,
}

/// A relationship whose endpoints both resolve to nodes of the same model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
	/// `edge-{k}`, where `k` is the position in the input relationship list.
	pub id: String,
	pub source: String,
	pub target: String,
	#[serde(rename = "type")]
	pub kind: String,
}

/// A relationship that was left out, kept for the rejection log.
#[derive(Clone, Debug, PartialEq)]
pub struct RejectedEdge {
	/// Position in the input relationship list.
	pub index: usize,
	pub source: Option<String>,
	pub target: Option<String>,
	pub reason: RejectReason,
	/// The relationship exactly as received.
	pub raw: serde_json::Value,
}

/// Validated, immutable graph. A new payload always produces a new model.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphModel {
	nodes: Vec<GraphNode>,
	edges: Vec<GraphEdge>,
}

impl GraphModel {
	pub(crate) fn from_parts(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
		Self { nodes, edges }
	}

	pub fn nodes(&self) -> &[GraphNode] {
		&self.nodes
	}

	pub fn edges(&self) -> &[GraphEdge] {
		&self.edges
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn node(&self, id: &str) -> Option<&GraphNode> {
		self.nodes.iter().find(|n| n.id == id)
	}

	pub fn node_index(&self, id: &str) -> Option<usize> {
		self.nodes.iter().position(|n| n.id == id)
	}

	/// Edges touching `id`, split into (outgoing, incoming).
	pub fn incident_edges(&self, id: &str) -> (Vec<&GraphEdge>, Vec<&GraphEdge>) {
		let outgoing = self.edges.iter().filter(|e| e.source == id).collect();
		let incoming = self.edges.iter().filter(|e| e.target == id).collect();
		(outgoing, incoming)
	}

	/// Serialized form used by the JSON export.
	pub fn to_json(&self) -> serde_json::Result<String> {
		serde_json::to_string_pretty(self)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node(id: &str) -> GraphNode {
		GraphNode {
			id: id.into(),
			label: id.to_uppercase(),
			kind: "PERSON".into(),
			properties: BTreeMap::new(),
			mentions: 1,
		}
	}

	fn edge(k: usize, s: &str, t: &str) -> GraphEdge {
		GraphEdge {
			id: format!("edge-{k}"),
			source: s.into(),
			target: t.into(),
			kind: "knows".into(),
		}
	}

	#[test]
	fn incident_edges_split_by_direction() {
		let model = GraphModel::from_parts(
			vec![node("a"), node("b"), node("c")],
			vec![edge(0, "a", "b"), edge(1, "c", "a"), edge(2, "b", "c")],
		);
		let (out, inc) = model.incident_edges("a");
		assert_eq!(out.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(), ["edge-0"]);
		assert_eq!(inc.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(), ["edge-1"]);
	}

	#[test]
	fn json_uses_type_field_names() {
		let model = GraphModel::from_parts(vec![node("a"), node("b")], vec![edge(0, "a", "b")]);
		let value: serde_json::Value = serde_json::from_str(&model.to_json().unwrap()).unwrap();
		assert_eq!(value["nodes"][0]["type"], "PERSON");
		assert_eq!(value["edges"][0]["type"], "knows");
		assert_eq!(value["edges"][0]["id"], "edge-0");
	}
}
