use std::collections::{HashMap, VecDeque};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::error::RenderError;
use crate::graph::GraphModel;

const GRID_SPACING: f64 = 120.0;
const LEVEL_SPACING: f64 = 140.0;
const SIBLING_SPACING: f64 = 110.0;
const RING_STEP: f64 = 70.0;
const MIN_RING_RADIUS: f64 = 120.0;

/// Named placement algorithms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Layout {
	#[default]
	ForceDirected,
	Circular,
	Grid,
	/// Breadth-first levels from the nodes without incoming edges.
	Hierarchical,
}

impl Layout {
	pub const ALL: [Layout; 4] = [
		Layout::ForceDirected,
		Layout::Circular,
		Layout::Grid,
		Layout::Hierarchical,
	];

	pub fn name(self) -> &'static str {
		match self {
			Layout::ForceDirected => "force-directed",
			Layout::Circular => "circular",
			Layout::Grid => "grid",
			Layout::Hierarchical => "hierarchical",
		}
	}

	pub fn title(self) -> &'static str {
		match self {
			Layout::ForceDirected => "Force",
			Layout::Circular => "Circle",
			Layout::Grid => "Grid",
			Layout::Hierarchical => "Hierarchy",
		}
	}

	/// Whether the physics simulation keeps moving nodes after placement.
	pub fn is_simulated(self) -> bool {
		matches!(self, Layout::ForceDirected)
	}
}

impl fmt::Display for Layout {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for Layout {
	type Err = RenderError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"force-directed" | "force" | "cose" => Ok(Layout::ForceDirected),
			"circular" | "circle" => Ok(Layout::Circular),
			"grid" => Ok(Layout::Grid),
			"hierarchical" | "breadthfirst" => Ok(Layout::Hierarchical),
			_ => Err(RenderError::InvalidLayout(s.to_string())),
		}
	}
}

/// World-space positions, one per model node, centered on the origin.
///
/// For [`Layout::ForceDirected`] these are the simulation's seed positions.
pub fn place(layout: Layout, model: &GraphModel) -> Vec<(f64, f64)> {
	let n = model.nodes().len();
	match layout {
		Layout::ForceDirected | Layout::Circular => ring(n),
		Layout::Grid => grid(n),
		Layout::Hierarchical => levels(model),
	}
}

fn ring(n: usize) -> Vec<(f64, f64)> {
	if n == 1 {
		return vec![(0.0, 0.0)];
	}
	let radius = (n as f64 * RING_STEP / (2.0 * PI)).max(MIN_RING_RADIUS);
	(0..n)
		.map(|i| {
			let angle = i as f64 * 2.0 * PI / n as f64 - PI / 2.0;
			(radius * angle.cos(), radius * angle.sin())
		})
		.collect()
}

fn grid(n: usize) -> Vec<(f64, f64)> {
	if n == 0 {
		return Vec::new();
	}
	let cols = (n as f64).sqrt().ceil() as usize;
	let rows = n.div_ceil(cols);
	let (ox, oy) = (
		(cols - 1) as f64 * GRID_SPACING / 2.0,
		(rows - 1) as f64 * GRID_SPACING / 2.0,
	);
	(0..n)
		.map(|i| {
			let (row, col) = (i / cols, i % cols);
			(col as f64 * GRID_SPACING - ox, row as f64 * GRID_SPACING - oy)
		})
		.collect()
}

/// Depth of every node from a breadth-first walk along edge direction.
///
/// Roots are the nodes with no incoming edge; nodes only reachable through a
/// cycle start a new walk, in model order, once the earlier walks are done.
pub fn depths(model: &GraphModel) -> Vec<usize> {
	let n = model.nodes().len();
	let index: HashMap<&str, usize> = model
		.nodes()
		.iter()
		.enumerate()
		.map(|(i, node)| (node.id.as_str(), i))
		.collect();

	let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
	let mut has_parent = vec![false; n];
	for edge in model.edges() {
		if let (Some(&s), Some(&t)) = (index.get(edge.source.as_str()), index.get(edge.target.as_str())) {
			if s != t {
				children[s].push(t);
				has_parent[t] = true;
			}
		}
	}

	let mut depth: Vec<Option<usize>> = vec![None; n];
	let roots = (0..n).filter(|&i| !has_parent[i]).chain(0..n);
	for root in roots {
		if depth[root].is_some() {
			continue;
		}
		depth[root] = Some(0);
		let mut queue = VecDeque::from([root]);
		while let Some(current) = queue.pop_front() {
			let next = depth[current].unwrap_or(0) + 1;
			for &child in &children[current] {
				if depth[child].is_none() {
					depth[child] = Some(next);
					queue.push_back(child);
				}
			}
		}
	}
	depth.into_iter().map(|d| d.unwrap_or(0)).collect()
}

fn levels(model: &GraphModel) -> Vec<(f64, f64)> {
	let depth = depths(model);
	let max_depth = depth.iter().copied().max().unwrap_or(0);

	let mut rows: Vec<Vec<usize>> = vec![Vec::new(); max_depth + 1];
	for (i, &d) in depth.iter().enumerate() {
		rows[d].push(i);
	}

	let oy = max_depth as f64 * LEVEL_SPACING / 2.0;
	let mut positions = vec![(0.0, 0.0); depth.len()];
	for (d, row) in rows.iter().enumerate() {
		let ox = row.len().saturating_sub(1) as f64 * SIBLING_SPACING / 2.0;
		for (slot, &i) in row.iter().enumerate() {
			positions[i] = (
				slot as f64 * SIBLING_SPACING - ox,
				d as f64 * LEVEL_SPACING - oy,
			);
		}
	}
	positions
}
