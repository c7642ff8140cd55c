use std::collections::HashMap;

use super::model::GraphModel;

/// How many nodes or edges carry one type tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeCount {
	pub kind: String,
	pub count: usize,
}

/// Legend figures for a validated model.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GraphStats {
	pub node_count: usize,
	pub edge_count: usize,
	/// In order of first appearance among the model's nodes.
	pub entity_types: Vec<TypeCount>,
	/// In order of first appearance among the model's edges.
	pub relationship_types: Vec<TypeCount>,
}

pub fn aggregate(model: &GraphModel) -> GraphStats {
	GraphStats {
		node_count: model.nodes().len(),
		edge_count: model.edges().len(),
		entity_types: tally(model.nodes().iter().map(|n| n.kind.as_str())),
		relationship_types: tally(model.edges().iter().map(|e| e.kind.as_str())),
	}
}

fn tally<'a>(kinds: impl Iterator<Item = &'a str>) -> Vec<TypeCount> {
	let mut counts: Vec<TypeCount> = Vec::new();
	let mut slots: HashMap<&str, usize> = HashMap::new();
	for kind in kinds {
		match slots.get(kind) {
			Some(&slot) => counts[slot].count += 1,
			None => {
				slots.insert(kind, counts.len());
				counts.push(TypeCount {
					kind: kind.to_string(),
					count: 1,
				});
			}
		}
	}
	counts
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::graph::build;

	#[test]
	fn buckets_keep_first_appearance_order() {
		let out = build(&json!({
			"entities": [
				{ "id": "a", "type": "PERSON" },
				{ "id": "b", "type": "ORGANIZATION" },
				{ "id": "c", "type": "PERSON" }
			],
			"relationships": [
				{ "source": "a", "target": "b", "type": "works_at" },
				{ "source": "c", "target": "b", "type": "works_at" },
				{ "source": "a", "target": "c", "type": "knows" },
				{ "source": "a", "target": "ghost", "type": "haunts" }
			]
		}))
		.unwrap();
		let stats = aggregate(&out.model);

		assert_eq!(stats.node_count, 3);
		assert_eq!(stats.edge_count, 3);
		assert_eq!(
			stats.entity_types,
			vec![
				TypeCount { kind: "PERSON".into(), count: 2 },
				TypeCount { kind: "ORGANIZATION".into(), count: 1 },
			]
		);
		// rejected relationships never reach the legend
		assert_eq!(
			stats
				.relationship_types
				.iter()
				.map(|t| t.kind.as_str())
				.collect::<Vec<_>>(),
			["works_at", "knows"]
		);
	}

	#[test]
	fn empty_model_has_no_buckets() {
		let stats = aggregate(&GraphModel::default());
		assert_eq!(stats, GraphStats::default());
	}
}
