//! Untrusted backend payload → validated [`GraphModel`].

use std::collections::{BTreeMap, HashMap, HashSet};

use log::{debug, warn};
use serde_json::{Map, Value};

use super::model::{GraphEdge, GraphModel, GraphNode, RejectedEdge};
use crate::error::{Endpoint, PayloadError, RejectReason};

const DEFAULT_LABEL: &str = "Unknown";
const DEFAULT_NODE_TYPE: &str = "default";
const DEFAULT_EDGE_TYPE: &str = "related";

/// A model plus every relationship that did not make it in.
#[derive(Clone, Debug, PartialEq)]
pub struct BuildOutput {
	pub model: GraphModel,
	pub rejected: Vec<RejectedEdge>,
}

/// Build a model from a raw payload.
///
/// The graph is read from the payload root, or from a nested `graph` object
/// when the root has no `entities` (the backend's response envelope). Missing
/// or non-list containers yield a [`PayloadError`]; bad relationships only
/// end up in [`BuildOutput::rejected`].
pub fn build(payload: &Value) -> Result<BuildOutput, PayloadError> {
	let root = graph_root(payload)?;
	let entities = container(root, "entities")?;
	let relationships = container(root, "relationships")?;

	let nodes = collect_nodes(entities);
	let known: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();

	let mut edges = Vec::new();
	let mut rejected = Vec::new();
	for (k, raw) in relationships.iter().enumerate() {
		match resolve_edge(k, raw, &known) {
			Ok(edge) => edges.push(edge),
			Err(rejection) => {
				warn!("dropping relationship {}: {}", k, rejection.reason);
				rejected.push(rejection);
			}
		}
	}

	debug!(
		"built graph: {} nodes, {} edges, {} rejected",
		nodes.len(),
		edges.len(),
		rejected.len()
	);
	Ok(BuildOutput {
		model: GraphModel::from_parts(nodes, edges),
		rejected,
	})
}

fn graph_root(payload: &Value) -> Result<&Map<String, Value>, PayloadError> {
	let root = payload.as_object().ok_or(PayloadError::NotAnObject)?;
	if root.contains_key("entities") {
		return Ok(root);
	}
	match root.get("graph").and_then(Value::as_object) {
		Some(nested) => Ok(nested),
		None => Ok(root),
	}
}

fn container<'a>(
	root: &'a Map<String, Value>,
	field: &'static str,
) -> Result<&'a Vec<Value>, PayloadError> {
	match root.get(field) {
		None | Some(Value::Null) => Err(PayloadError::MissingContainer(field)),
		Some(Value::Array(items)) => Ok(items),
		Some(_) => Err(PayloadError::NotASequence(field)),
	}
}

fn collect_nodes(entities: &[Value]) -> Vec<GraphNode> {
	let mut nodes: Vec<GraphNode> = Vec::with_capacity(entities.len());
	let mut slots: HashMap<String, usize> = HashMap::new();

	for (i, raw) in entities.iter().enumerate() {
		let Some(record) = raw.as_object() else {
			warn!("skipping entity {}: not an object", i);
			continue;
		};
		let node = node_from_record(record);
		match slots.get(&node.id) {
			Some(&slot) => {
				debug!("entity id `{}` repeated, keeping the later attributes", node.id);
				nodes[slot] = node;
			}
			None => {
				slots.insert(node.id.clone(), nodes.len());
				nodes.push(node);
			}
		}
	}
	nodes
}

fn node_from_record(record: &Map<String, Value>) -> GraphNode {
	let label = scalar_text(record.get("name")).unwrap_or_else(|| DEFAULT_LABEL.to_string());
	let id = scalar_text(record.get("id")).unwrap_or_else(|| label.clone());
	let kind =
		scalar_text(record.get("type")).unwrap_or_else(|| DEFAULT_NODE_TYPE.to_string());
	let properties = record
		.get("properties")
		.and_then(Value::as_object)
		.map(|props| {
			props
				.iter()
				.filter_map(|(k, v)| property_text(v).map(|text| (k.clone(), text)))
				.collect()
		})
		.unwrap_or_else(BTreeMap::new);

	GraphNode {
		id,
		label,
		kind,
		properties,
		mentions: mentions(record.get("mentions")),
	}
}

fn resolve_edge(
	index: usize,
	raw: &Value,
	known: &HashSet<&str>,
) -> Result<GraphEdge, RejectedEdge> {
	let reject = |source: Option<String>, target: Option<String>, reason| RejectedEdge {
		index,
		source,
		target,
		reason,
		raw: raw.clone(),
	};

	let Some(record) = raw.as_object() else {
		return Err(reject(None, None, RejectReason::NotARecord));
	};
	let source = scalar_text(record.get("source")).or_else(|| scalar_text(record.get("from")));
	let target = scalar_text(record.get("target")).or_else(|| scalar_text(record.get("to")));

	let (src, tgt) = match (&source, &target) {
		(None, _) => {
			let reason = RejectReason::MissingEndpoint(Endpoint::Source);
			return Err(reject(source.clone(), target.clone(), reason));
		}
		(_, None) => {
			let reason = RejectReason::MissingEndpoint(Endpoint::Target);
			return Err(reject(source.clone(), target.clone(), reason));
		}
		(Some(s), Some(t)) => (s.as_str(), t.as_str()),
	};

	let reason = match (known.contains(src), known.contains(tgt)) {
		(true, true) => None,
		(false, true) => Some(RejectReason::UnknownSource(src.to_string())),
		(true, false) => Some(RejectReason::UnknownTarget(tgt.to_string())),
		(false, false) => Some(RejectReason::UnknownEndpoints {
			source_id: src.to_string(),
			target_id: tgt.to_string(),
		}),
	};
	if let Some(reason) = reason {
		return Err(reject(source.clone(), target.clone(), reason));
	}

	let kind = scalar_text(record.get("type"))
		.or_else(|| scalar_text(record.get("relationship")))
		.unwrap_or_else(|| DEFAULT_EDGE_TYPE.to_string());
	Ok(GraphEdge {
		id: format!("edge-{index}"),
		source: src.to_string(),
		target: tgt.to_string(),
		kind,
	})
}

/// Identifier-style coercion. `null` and the empty string count as missing.
fn scalar_text(value: Option<&Value>) -> Option<String> {
	match value? {
		Value::Null => None,
		Value::String(s) if s.is_empty() => None,
		Value::String(s) => Some(s.clone()),
		other => Some(other.to_string()),
	}
}

fn property_text(value: &Value) -> Option<String> {
	match value {
		Value::Null => None,
		Value::String(s) => Some(s.clone()),
		other => Some(other.to_string()),
	}
}

fn mentions(value: Option<&Value>) -> u32 {
	value
		.and_then(Value::as_f64)
		.filter(|m| m.is_finite() && *m >= 1.0)
		.map(|m| m.floor().min(u32::MAX as f64) as u32)
		.unwrap_or(1)
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn defaults_fill_missing_fields() {
		let out = build(&json!({ "entities": [{ "id": 7 }], "relationships": [] })).unwrap();
		let node = &out.model.nodes()[0];
		assert_eq!(node.id, "7");
		assert_eq!(node.label, "Unknown");
		assert_eq!(node.kind, "default");
		assert!(node.properties.is_empty());
		assert_eq!(node.mentions, 1);
	}

	#[test]
	fn name_stands_in_for_missing_id() {
		let out = build(&json!({
			"entities": [{ "name": "Alice", "type": "PERSON", "mentions": 3 }],
			"relationships": []
		}))
		.unwrap();
		assert_eq!(out.model.nodes()[0].id, "Alice");
		assert_eq!(out.model.nodes()[0].mentions, 3);
	}

	#[test]
	fn alternate_edge_field_names_resolve() {
		let out = build(&json!({
			"entities": [{ "id": "a" }, { "id": "b" }],
			"relationships": [{ "from": "a", "to": "b", "relationship": "owns" }]
		}))
		.unwrap();
		let edge = &out.model.edges()[0];
		assert_eq!((edge.source.as_str(), edge.target.as_str()), ("a", "b"));
		assert_eq!(edge.kind, "owns");
	}

	#[test]
	fn edge_type_defaults_to_related() {
		let out = build(&json!({
			"entities": [{ "id": "a" }],
			"relationships": [{ "source": "a", "target": "a" }]
		}))
		.unwrap();
		assert_eq!(out.model.edges()[0].kind, "related");
	}

	#[test]
	fn edge_ids_follow_input_position() {
		let out = build(&json!({
			"entities": [{ "id": "a" }, { "id": "b" }],
			"relationships": [
				{ "source": "a", "target": "nope" },
				{ "source": "a", "target": "b" }
			]
		}))
		.unwrap();
		assert_eq!(out.model.edges()[0].id, "edge-1");
		assert_eq!(out.rejected[0].index, 0);
	}

	#[test]
	fn rejection_reasons_name_the_bad_endpoint() {
		let out = build(&json!({
			"entities": [{ "id": "a" }],
			"relationships": [
				{ "source": "x", "target": "a" },
				{ "source": "a", "target": "y" },
				{ "source": "x", "target": "y" },
				{ "target": "a" },
				"not a record"
			]
		}))
		.unwrap();
		let reasons: Vec<_> = out.rejected.iter().map(|r| r.reason.clone()).collect();
		assert_eq!(
			reasons,
			vec![
				RejectReason::UnknownSource("x".into()),
				RejectReason::UnknownTarget("y".into()),
				RejectReason::UnknownEndpoints {
					source_id: "x".into(),
					target_id: "y".into()
				},
				RejectReason::MissingEndpoint(Endpoint::Source),
				RejectReason::NotARecord,
			]
		);
		assert_eq!(out.rejected[4].raw, json!("not a record"));
	}

	#[test]
	fn properties_are_coerced_to_text() {
		let out = build(&json!({
			"entities": [{
				"id": "a",
				"properties": { "age": 42, "alive": true, "note": null, "tags": ["x"] }
			}],
			"relationships": []
		}))
		.unwrap();
		let props = &out.model.nodes()[0].properties;
		assert_eq!(props.get("age").map(String::as_str), Some("42"));
		assert_eq!(props.get("alive").map(String::as_str), Some("true"));
		assert_eq!(props.get("tags").map(String::as_str), Some("[\"x\"]"));
		assert!(!props.contains_key("note"));
	}

	#[test]
	fn bad_mentions_fall_back_to_one() {
		for raw in [json!(0), json!(-4), json!("many"), json!(null)] {
			let out = build(&json!({
				"entities": [{ "id": "a", "mentions": raw }],
				"relationships": []
			}))
			.unwrap();
			assert_eq!(out.model.nodes()[0].mentions, 1);
		}
	}

	#[test]
	fn nested_graph_envelope_is_accepted() {
		let out = build(&json!({
			"success": true,
			"graph": { "entities": [{ "id": "a" }], "relationships": [] },
			"message": "Graph generated successfully"
		}))
		.unwrap();
		assert_eq!(out.model.nodes().len(), 1);
	}

	#[test]
	fn malformed_containers_are_invalid() {
		assert_eq!(build(&json!([])), Err(PayloadError::NotAnObject));
		assert_eq!(
			build(&json!({ "relationships": [] })),
			Err(PayloadError::MissingContainer("entities"))
		);
		assert_eq!(
			build(&json!({ "entities": [] })),
			Err(PayloadError::MissingContainer("relationships"))
		);
		assert_eq!(
			build(&json!({ "entities": {}, "relationships": [] })),
			Err(PayloadError::NotASequence("entities"))
		);
	}
}
